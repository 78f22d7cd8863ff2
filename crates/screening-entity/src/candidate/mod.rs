//! Candidate-side records: uploaded resumes and what collaborators derive from them.

pub mod profile;
pub mod resume;

pub use profile::{ParsedResume, ResumeAnalysis};
pub use resume::{ResumeUpload, StagedResume};
