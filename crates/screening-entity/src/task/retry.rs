//! Retry and backoff policy attached to each task.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use screening_core::config::RetryConfig;

/// How often and how patiently a failed task is retried.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total delivery attempts, the first one included.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Factor applied per further attempt.
    pub backoff_multiplier: f64,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            backoff_multiplier: config.backoff_multiplier.max(1.0),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the `attempt`-th failed attempt (1-based).
    ///
    /// `min(max_delay, base_delay * multiplier^(attempt - 1))`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.backoff_multiplier.powi(exponent);
        let millis = self.base_delay.as_millis() as f64 * factor;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        if capped.is_finite() && capped > 0.0 {
            Duration::from_millis(capped as u64)
        } else if capped.is_finite() {
            Duration::ZERO
        } else {
            self.max_delay
        }
    }

    /// Whether a task that has been attempted `attempts` times may run again.
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_exponential_delays() {
        let policy = policy();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(8));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = policy();
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(60));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(60));
    }

    #[test]
    fn test_should_retry() {
        let policy = policy();
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn test_from_default_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(2000));
    }
}
