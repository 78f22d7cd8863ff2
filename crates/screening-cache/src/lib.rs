//! # screening-cache
//!
//! Cache provider implementations for the screening pipeline:
//!
//! - **memory**: in-process cache using [moka](https://crates.io/crates/moka)
//!   with per-entry TTL
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration.
//! [`ScreeningCache`] sits on top and turns every cache failure into a
//! logged miss.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod screening;

pub use provider::CacheManager;
pub use screening::ScreeningCache;
