//! Screening pipeline limits, retry policy, and ranking thresholds.

use serde::{Deserialize, Serialize};

/// Screening pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Maximum number of resumes accepted in one bulk submission.
    #[serde(default = "default_max_batch")]
    pub max_batch_size: usize,
    /// Maximum size of a single resume in bytes.
    #[serde(default = "default_max_resume_bytes")]
    pub max_resume_bytes: u64,
    /// Default page size for result listings.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,
    /// Largest page size a caller may request.
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u32,
    /// Retry policy attached to every enqueued task.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Match categorisation thresholds.
    #[serde(default)]
    pub ranking: RankingConfig,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch(),
            max_resume_bytes: default_max_resume_bytes(),
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
            retry: RetryConfig::default(),
            ranking: RankingConfig::default(),
        }
    }
}

/// Task retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total delivery attempts per task, the first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Factor applied to the delay after each failed attempt.
    #[serde(default = "default_multiplier")]
    pub backoff_multiplier: f64,
    /// Ceiling for any single retry delay, in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            backoff_multiplier: default_multiplier(),
            max_delay_ms: default_max_delay(),
        }
    }
}

/// Thresholds splitting match percentages into strong / moderate / weak.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Scores at or above this are "strong".
    #[serde(default = "default_strong")]
    pub strong_threshold: u8,
    /// Scores at or above this (and below strong) are "moderate".
    #[serde(default = "default_moderate")]
    pub moderate_threshold: u8,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            strong_threshold: default_strong(),
            moderate_threshold: default_moderate(),
        }
    }
}

fn default_max_batch() -> usize {
    500
}

fn default_max_resume_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_page_limit() -> u32 {
    20
}

fn default_max_page_limit() -> u32 {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    2000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_delay() -> u64 {
    60_000
}

fn default_strong() -> u8 {
    70
}

fn default_moderate() -> u8 {
    50
}
