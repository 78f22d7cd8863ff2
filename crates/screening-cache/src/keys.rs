//! Cache key builders for every screening cache entry.
//!
//! Keys follow a `namespace:entity:id` scheme. Everything derived from a
//! screening job's results lives under keys containing the job id so the
//! whole set can be invalidated at once.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use screening_entity::screening::ResultFilter;

/// Prefix applied to all screening cache keys.
const PREFIX: &str = "screening";

/// Hex characters of the filter digest kept in a result-page key.
const FILTER_HASH_LEN: usize = 16;

/// Cache key for a job posting's requirements.
pub fn job_requirements(job_id: Uuid) -> String {
    format!("{PREFIX}:job:{job_id}")
}

/// Cache key for one filtered page of a screening job's results.
pub fn results_page(screening_job_id: Uuid, filter: &ResultFilter) -> String {
    format!("{PREFIX}:results:{screening_job_id}:{}", filter_hash(filter))
}

/// Pattern matching every cached result page of a screening job.
pub fn results_pattern(screening_job_id: Uuid) -> String {
    format!("{PREFIX}:results:{screening_job_id}:*")
}

/// Cache key for a screening job's analytics summary.
pub fn analytics(screening_job_id: Uuid) -> String {
    format!("{PREFIX}:analytics:{screening_job_id}")
}

/// Cache key for a candidate's parsed resume.
pub fn candidate(candidate_id: Uuid) -> String {
    format!("{PREFIX}:candidate:{candidate_id}")
}

/// Pattern matching every screening cache key.
pub fn all_pattern() -> String {
    format!("{PREFIX}:*")
}

/// Place a deployment-wide namespace in front of a key.
///
/// An empty prefix leaves the key as is, so the default deployment uses the
/// bare `screening:...` keys; `"staging"` yields `staging:screening:...`.
pub fn with_prefix(prefix: &str, key: &str) -> String {
    let prefix = prefix.trim_end_matches(':');
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}:{key}")
    }
}

/// Stable digest of a filter's canonical form.
pub fn filter_hash(filter: &ResultFilter) -> String {
    let digest = Sha256::digest(filter.cache_fragment().as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(FILTER_HASH_LEN);
    hex
}
