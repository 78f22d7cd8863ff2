//! Repository implementations for screening entities.

pub mod job_posting;
pub mod resume;
pub mod screening_job;
pub mod screening_result;
pub mod task;

pub use job_posting::JobPostingRepository;
pub use resume::ResumeRepository;
pub use screening_job::ScreeningJobRepository;
pub use screening_result::ScreeningResultRepository;
pub use task::TaskRepository;
