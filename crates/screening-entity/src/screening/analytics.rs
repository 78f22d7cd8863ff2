//! Aggregate analytics and match categories.

use std::fmt;

use serde::{Deserialize, Serialize};

use screening_core::config::RankingConfig;

/// Band a match percentage falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchCategory {
    /// At or above the strong threshold.
    Strong,
    /// At or above the moderate threshold, below strong.
    Moderate,
    /// Below the moderate threshold.
    Weak,
}

impl fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong => write!(f, "strong"),
            Self::Moderate => write!(f, "moderate"),
            Self::Weak => write!(f, "weak"),
        }
    }
}

/// Lower bounds of the strong and moderate bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchBands {
    /// Scores `>= strong` are strong.
    pub strong: u8,
    /// Scores `>= moderate` and `< strong` are moderate.
    pub moderate: u8,
}

impl Default for MatchBands {
    fn default() -> Self {
        Self {
            strong: 70,
            moderate: 50,
        }
    }
}

impl From<&RankingConfig> for MatchBands {
    fn from(config: &RankingConfig) -> Self {
        Self {
            strong: config.strong_threshold,
            moderate: config.moderate_threshold,
        }
    }
}

impl MatchBands {
    /// Place a score into its band.
    pub fn categorize(&self, score: i32) -> MatchCategory {
        if score >= i32::from(self.strong) {
            MatchCategory::Strong
        } else if score >= i32::from(self.moderate) {
            MatchCategory::Moderate
        } else {
            MatchCategory::Weak
        }
    }
}

/// Summary of a job's scored results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScreeningAnalytics {
    /// Number of results.
    pub total_screened: u64,
    /// Mean match percentage, rounded to two decimals; 0 with no results.
    pub average_match: f64,
    /// Results in the strong band.
    pub strong_matches: u64,
    /// Results in the moderate band.
    pub moderate_matches: u64,
    /// Results in the weak band.
    pub weak_matches: u64,
}

impl ScreeningAnalytics {
    /// Fold a list of scores into a summary.
    pub fn from_scores<I>(scores: I, bands: MatchBands) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let mut analytics = Self::default();
        let mut sum: i64 = 0;
        for score in scores {
            analytics.total_screened += 1;
            sum += i64::from(score);
            match bands.categorize(score) {
                MatchCategory::Strong => analytics.strong_matches += 1,
                MatchCategory::Moderate => analytics.moderate_matches += 1,
                MatchCategory::Weak => analytics.weak_matches += 1,
            }
        }
        if analytics.total_screened > 0 {
            let mean = sum as f64 / analytics.total_screened as f64;
            analytics.average_match = (mean * 100.0).round() / 100.0;
        }
        analytics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        let bands = MatchBands::default();
        assert_eq!(bands.categorize(100), MatchCategory::Strong);
        assert_eq!(bands.categorize(70), MatchCategory::Strong);
        assert_eq!(bands.categorize(69), MatchCategory::Moderate);
        assert_eq!(bands.categorize(50), MatchCategory::Moderate);
        assert_eq!(bands.categorize(49), MatchCategory::Weak);
        assert_eq!(bands.categorize(0), MatchCategory::Weak);
    }

    #[test]
    fn test_from_scores() {
        let analytics = ScreeningAnalytics::from_scores([90, 60, 10], MatchBands::default());
        assert_eq!(analytics.total_screened, 3);
        assert_eq!(analytics.strong_matches, 1);
        assert_eq!(analytics.moderate_matches, 1);
        assert_eq!(analytics.weak_matches, 1);
        assert!((analytics.average_match - 53.33).abs() < 1e-9);
    }

    #[test]
    fn test_from_no_scores() {
        let analytics = ScreeningAnalytics::from_scores([], MatchBands::default());
        assert_eq!(analytics, ScreeningAnalytics::default());
    }
}
