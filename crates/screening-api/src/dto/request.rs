//! Request DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use screening_core::config::ScreeningConfig;
use screening_core::error::AppError;
use screening_entity::screening::{ResultFilter, ResultSortBy};

/// `?limit&offset` on list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    /// Page size; the configured default when absent.
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u32>,
}

/// Query string of the results endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsQuery {
    /// Minimum match percentage.
    pub min_match_percentage: Option<u8>,
    /// `match` or `created`.
    pub sort_by: Option<String>,
    /// Sort descending (default `true`).
    pub sort_desc: Option<bool>,
    /// Page size.
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u32>,
}

impl ResultsQuery {
    /// Build a filter, filling the page size from configuration.
    pub fn into_filter(self, config: &ScreeningConfig) -> Result<ResultFilter, AppError> {
        let sort_by = self
            .sort_by
            .as_deref()
            .map(str::parse::<ResultSortBy>)
            .transpose()
            .map_err(AppError::validation)?;
        Ok(ResultFilter {
            min_match_percentage: self.min_match_percentage,
            sort_by,
            sort_desc: self.sort_desc,
            limit: self.limit.unwrap_or(config.default_page_limit),
            offset: self.offset.unwrap_or(0),
        })
    }
}

/// `?limit` on the ranking endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingQuery {
    /// Keep only the top `limit` candidates.
    pub limit: Option<u32>,
}

/// Body of `POST /api/screenings/{id}/shortlist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistRequest {
    /// Results to shortlist.
    pub result_ids: Vec<Uuid>,
}
