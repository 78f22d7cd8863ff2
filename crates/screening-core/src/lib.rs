//! # screening-core
//!
//! Core crate for the resume screening pipeline. Contains configuration
//! schemas, the unified error system, and the cache provider trait.
//!
//! This crate has **no** internal dependencies on other screening crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
