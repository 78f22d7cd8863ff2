//! Screening job and result entities.

pub mod analytics;
pub mod filter;
pub mod job;
pub mod result;

pub use analytics::{MatchBands, MatchCategory, ScreeningAnalytics};
pub use filter::{ResultFilter, ResultPage, ResultSortBy};
pub use job::{ScreeningJob, ScreeningStatus};
pub use result::{NewScreeningResult, ScreeningResult};
