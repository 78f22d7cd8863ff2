//! Deterministic candidate scoring.

pub mod engine;
pub mod matching;

pub use engine::{
    CandidateEvaluation, RankedCandidate, RankingEngine, ScoreBreakdown, Scored,
    calculate_experience_score, calculate_skill_match_score, calculate_strengths_score,
};
pub use matching::{SkillMatch, match_skills, skill_matches};
