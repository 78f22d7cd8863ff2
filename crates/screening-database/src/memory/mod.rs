//! In-memory store and queue for tests and single-process runs.

mod queue;
mod store;

pub use queue::MemoryTaskQueue;
pub use store::MemoryScreeningStore;
