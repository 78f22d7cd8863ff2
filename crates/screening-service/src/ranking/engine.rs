//! Composite screening score and candidate ranking.
//!
//! Every function here is pure: no I/O, no clock, no randomness. The
//! composite score is
//!
//! ```text
//! clamp(round(skills * 0.6 + experience * 0.2 + strengths * 0.1 + overall * 0.1), 0, 100)
//! ```
//!
//! where every component is itself on a 0-100 scale.

use serde::{Deserialize, Serialize};

use screening_entity::requirements::JobRequirements;
use screening_entity::screening::{MatchBands, MatchCategory, ScreeningResult};

use super::matching::{SkillMatch, skill_matches};

const SKILL_WEIGHT: f64 = 0.6;
const EXPERIENCE_WEIGHT: f64 = 0.2;
const STRENGTHS_WEIGHT: f64 = 0.1;
const OVERALL_WEIGHT: f64 = 0.1;

/// Score used for a component with nothing to compare against.
pub const NEUTRAL_SCORE: f64 = 50.0;

const NICE_TO_HAVE_MAX_BONUS: f64 = 20.0;
const MISSING_MAX_PENALTY: f64 = 40.0;

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

fn count_covered(matched: &[String], list: &[String]) -> usize {
    list.iter()
        .filter(|skill| matched.iter().any(|m| skill_matches(m, skill)))
        .count()
}

/// Skill component of the score.
///
/// Required coverage (0-100, or 100 with no required skills) plus a
/// nice-to-have bonus of at most 20, minus a penalty of at most 40 for
/// missing required skills, limited to 0-100.
pub fn calculate_skill_match_score(
    matched: &[String],
    missing: &[String],
    required: &[String],
    nice_to_have: &[String],
) -> f64 {
    let coverage = if required.is_empty() {
        100.0
    } else {
        count_covered(matched, required) as f64 / required.len() as f64 * 100.0
    };

    let bonus = if nice_to_have.is_empty() {
        0.0
    } else {
        let ratio = count_covered(matched, nice_to_have) as f64 / nice_to_have.len() as f64;
        (ratio * NICE_TO_HAVE_MAX_BONUS).min(NICE_TO_HAVE_MAX_BONUS)
    };

    let penalty = if required.is_empty() {
        0.0
    } else {
        (missing.len() as f64 / required.len() as f64 * MISSING_MAX_PENALTY)
            .min(MISSING_MAX_PENALTY)
    };

    clamp_percent(coverage + bonus - penalty)
}

/// Experience component: 100 at or above the requirement, proportional
/// below it.
pub fn calculate_experience_score(candidate_years: f64, required_years: f64) -> f64 {
    let candidate = if candidate_years.is_finite() { candidate_years.max(0.0) } else { 0.0 };
    if !required_years.is_finite() || required_years <= 0.0 || candidate >= required_years {
        return 100.0;
    }
    clamp_percent(candidate / required_years * 100.0)
}

/// Strengths component: share of expected strengths found within the
/// actual ones, or [`NEUTRAL_SCORE`] when nothing is expected.
pub fn calculate_strengths_score(actual: &[String], expected: &[String]) -> f64 {
    let expected: Vec<String> = expected
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    if expected.is_empty() {
        return NEUTRAL_SCORE;
    }

    let actual: Vec<String> = actual.iter().map(|a| a.to_lowercase()).collect();
    let found = expected
        .iter()
        .filter(|e| actual.iter().any(|a| a.contains(e.as_str())))
        .count();
    clamp_percent(found as f64 / expected.len() as f64 * 100.0)
}

/// What the scorer knows about a candidate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    /// Skill comparison against the posting.
    pub skills: SkillMatch,
    /// Parsed years of experience.
    pub experience_years: f64,
    /// Analyzer strengths.
    pub strengths: Vec<String>,
    /// Analyzer's own 0-100 estimate, if any.
    pub overall_match: Option<f64>,
}

/// Component scores and the composite they produce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Skill component.
    pub skill_match: f64,
    /// Experience component.
    pub experience: f64,
    /// Strengths component.
    pub strengths: f64,
    /// Analyzer estimate component.
    pub overall: f64,
    /// Weighted, rounded and clamped composite.
    pub total: i32,
}

/// Anything that carries a match percentage and can be ranked.
pub trait Scored {
    /// The 0-100 score to rank by.
    fn score(&self) -> i32;
}

impl Scored for ScreeningResult {
    fn score(&self) -> i32 {
        self.match_percentage
    }
}

/// A candidate with its 1-based position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate<T> {
    /// 1-based rank.
    pub rank: usize,
    /// Score ranked by.
    pub score: i32,
    /// Band of the score.
    pub category: MatchCategory,
    /// The ranked item.
    pub candidate: T,
}

/// Scores, categorises and ranks candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingEngine {
    bands: MatchBands,
}

impl RankingEngine {
    /// Create an engine with the given category bands.
    pub fn new(bands: MatchBands) -> Self {
        Self { bands }
    }

    /// The configured bands.
    pub fn bands(&self) -> MatchBands {
        self.bands
    }

    /// Composite score of a candidate against a posting.
    pub fn calculate_screening_score(
        &self,
        evaluation: &CandidateEvaluation,
        requirements: &JobRequirements,
    ) -> ScoreBreakdown {
        let skill_match = calculate_skill_match_score(
            &evaluation.skills.matched,
            &evaluation.skills.missing,
            &requirements.skills_required,
            &requirements.nice_to_have_skills,
        );
        let experience = calculate_experience_score(
            evaluation.experience_years,
            requirements.experience_required_years,
        );
        let strengths =
            calculate_strengths_score(&evaluation.strengths, &requirements.expected_strengths);
        let overall = evaluation
            .overall_match
            .filter(|v| v.is_finite())
            .map(clamp_percent)
            .unwrap_or(NEUTRAL_SCORE);

        let weighted = skill_match * SKILL_WEIGHT
            + experience * EXPERIENCE_WEIGHT
            + strengths * STRENGTHS_WEIGHT
            + overall * OVERALL_WEIGHT;

        ScoreBreakdown {
            skill_match,
            experience,
            strengths,
            overall,
            total: clamp_percent(weighted.round()) as i32,
        }
    }

    /// Band a score falls into.
    pub fn categorize_by_match(&self, score: i32) -> MatchCategory {
        self.bands.categorize(score)
    }

    /// Stable descending sort by score; equal scores keep input order.
    pub fn rank_candidates<T: Scored>(&self, candidates: Vec<T>) -> Vec<RankedCandidate<T>> {
        let mut scored: Vec<(i32, T)> = candidates.into_iter().map(|c| (c.score(), c)).collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .enumerate()
            .map(|(index, (score, candidate))| RankedCandidate {
                rank: index + 1,
                score,
                category: self.categorize_by_match(score),
                candidate,
            })
            .collect()
    }
}
