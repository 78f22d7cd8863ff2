//! # screening-service
//!
//! Business logic for the resume screening pipeline: the deterministic
//! ranking engine, the parser/analyzer/requirements collaborators, the
//! analytics aggregator, and the [`ScreeningCoordinator`] other layers
//! call into.
//!
//! Services follow constructor injection; all dependencies are provided
//! at construction time via `Arc` references.

pub mod analytics;
pub mod collaborators;
pub mod context;
pub mod coordinator;
pub mod ranking;
pub mod requirements;

pub use analytics::AnalyticsAggregator;
pub use collaborators::{
    HttpResumeAnalyzer, HttpResumeParser, RequirementsSource, ResumeAnalyzer, ResumeParser,
};
pub use context::RequestContext;
pub use coordinator::ScreeningCoordinator;
pub use ranking::{CandidateEvaluation, RankedCandidate, RankingEngine, ScoreBreakdown, Scored};
pub use requirements::RequirementsService;
