//! Durable screening task entities.

pub mod model;
pub mod retry;
pub mod status;

pub use model::{NewTask, QueueStats, Task};
pub use retry::RetryPolicy;
pub use status::TaskStatus;
