//! # screening-entity
//!
//! Typed records for the resume screening pipeline. Every struct in this
//! crate represents a database table row or a value object exchanged with
//! a collaborator. Persisted rows additionally derive `sqlx::FromRow` so
//! they are validated at the repository boundary instead of travelling as
//! untyped maps.

pub mod candidate;
pub mod requirements;
pub mod screening;
pub mod task;

pub use candidate::{ParsedResume, ResumeAnalysis, ResumeUpload, StagedResume};
pub use requirements::JobRequirements;
pub use screening::{
    MatchBands, MatchCategory, NewScreeningResult, ResultFilter, ResultPage, ResultSortBy,
    ScreeningAnalytics, ScreeningJob, ScreeningResult, ScreeningStatus,
};
pub use task::{NewTask, QueueStats, RetryPolicy, Task, TaskStatus};
