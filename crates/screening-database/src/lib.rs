//! # screening-database
//!
//! PostgreSQL connection management, embedded migrations, and repository
//! implementations for screening jobs, results, staged resumes, tasks, and
//! job postings.
//!
//! The rest of the workspace talks to persistence through two traits:
//! [`ScreeningStore`] for jobs and results, and [`TaskQueue`] for the
//! durable per-resume work queue. Both have a Postgres implementation and
//! an in-memory one used by tests and local runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod queue;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::{MemoryScreeningStore, MemoryTaskQueue};
pub use queue::{PgTaskQueue, TaskQueue};
pub use store::{PgScreeningStore, ResultWrite, ScreeningStore};
