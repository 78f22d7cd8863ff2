//! Input checks run before anything is persisted or queued.

use uuid::Uuid;

use screening_core::config::ScreeningConfig;
use screening_core::error::AppError;
use screening_core::result::AppResult;
use screening_entity::candidate::ResumeUpload;
use screening_entity::screening::ResultFilter;

/// Reject empty, oversized, or malformed batches.
pub fn validate_batch(resumes: &[ResumeUpload], config: &ScreeningConfig) -> AppResult<()> {
    if resumes.is_empty() {
        return Err(AppError::validation("At least one resume is required"));
    }
    if resumes.len() > config.max_batch_size {
        return Err(AppError::validation(format!(
            "Batch of {} resumes exceeds the maximum of {}",
            resumes.len(),
            config.max_batch_size
        )));
    }
    for resume in resumes {
        if resume.size() == 0 {
            return Err(AppError::validation(format!(
                "Resume '{}' is empty",
                resume.filename
            )));
        }
        if resume.size() > config.max_resume_bytes {
            return Err(AppError::validation(format!(
                "Resume '{}' exceeds maximum size of {} bytes",
                resume.filename, config.max_resume_bytes
            )));
        }
    }
    Ok(())
}

/// Page size must be positive and within the configured ceiling.
pub fn validate_limit(limit: u32, config: &ScreeningConfig) -> AppResult<()> {
    if limit == 0 || limit > config.max_page_limit {
        return Err(AppError::validation(format!(
            "limit must be between 1 and {}",
            config.max_page_limit
        )));
    }
    Ok(())
}

/// Check a result filter.
pub fn validate_filter(filter: &ResultFilter, config: &ScreeningConfig) -> AppResult<()> {
    validate_limit(filter.limit, config)?;
    if filter.min_match_percentage.is_some_and(|min| min > 100) {
        return Err(AppError::validation(
            "min_match_percentage must be between 0 and 100",
        ));
    }
    Ok(())
}

/// A shortlist must name at least one result.
pub fn validate_shortlist(result_ids: &[Uuid]) -> AppResult<()> {
    if result_ids.is_empty() {
        return Err(AppError::validation("Shortlist must contain at least one result"));
    }
    Ok(())
}
