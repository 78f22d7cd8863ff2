//! Request and response data transfer objects.

pub mod request;
pub mod response;

pub use request::{PageQuery, RankingQuery, ResultsQuery, ShortlistRequest};
pub use response::{ApiResponse, HealthResponse, ScreeningJobResponse, ShortlistResponse};
