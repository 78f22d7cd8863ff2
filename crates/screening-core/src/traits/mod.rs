//! Core traits defined in `screening-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
