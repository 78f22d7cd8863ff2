//! Result filter and page types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::result::ScreeningResult;

/// Column a result page is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResultSortBy {
    /// Order by `match_percentage`.
    #[default]
    Match,
    /// Order by `created_at`.
    Created,
}

impl ResultSortBy {
    /// The column name used in ORDER BY clauses.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Match => "match_percentage",
            Self::Created => "created_at",
        }
    }
}

impl fmt::Display for ResultSortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Created => write!(f, "created"),
        }
    }
}

impl std::str::FromStr for ResultSortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "match" | "match_percentage" => Ok(Self::Match),
            "created" | "created_at" => Ok(Self::Created),
            other => Err(format!("unknown sort field '{other}'")),
        }
    }
}

/// Filter, order and page selection for a job's results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultFilter {
    /// Only return results scoring at least this much.
    #[serde(default)]
    pub min_match_percentage: Option<u8>,
    /// Sort column; defaults to match percentage.
    #[serde(default)]
    pub sort_by: Option<ResultSortBy>,
    /// Sort descending; defaults to `true`.
    #[serde(default)]
    pub sort_desc: Option<bool>,
    /// Page size.
    pub limit: u32,
    /// Rows to skip.
    #[serde(default)]
    pub offset: u32,
}

impl Default for ResultFilter {
    fn default() -> Self {
        Self {
            min_match_percentage: None,
            sort_by: None,
            sort_desc: None,
            limit: 20,
            offset: 0,
        }
    }
}

impl ResultFilter {
    /// Effective sort column.
    pub fn sort_column(&self) -> ResultSortBy {
        self.sort_by.unwrap_or_default()
    }

    /// Effective sort direction.
    pub fn descending(&self) -> bool {
        self.sort_desc.unwrap_or(true)
    }

    /// Canonical text form; two filters selecting the same page produce the
    /// same fragment regardless of which optional fields were left unset.
    pub fn cache_fragment(&self) -> String {
        format!(
            "min={};sort={};desc={};limit={};offset={}",
            self.min_match_percentage.unwrap_or(0),
            self.sort_column(),
            self.descending(),
            self.limit,
            self.offset
        )
    }
}

/// One page of results plus the unpaginated total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    /// Results on this page.
    pub results: Vec<ScreeningResult>,
    /// Total results matching the filter.
    pub total: u64,
}

impl ResultPage {
    /// An empty page.
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            total: 0,
        }
    }
}
