//! Background processing for the resume screening pipeline.
//!
//! This crate provides:
//! - A worker runner that claims tasks under a concurrency limit
//! - A lock renewer that keeps long-running tasks claimed
//! - The handler contract and the screening task handler

pub mod executor;
pub mod jobs;
pub mod lock;
pub mod runner;

pub use executor::{JobExecutionError, JobHandler};
pub use jobs::ScreeningJobHandler;
pub use lock::LockRenewer;
pub use runner::{TaskResolution, WorkerRunner};
