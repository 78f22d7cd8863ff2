//! `Employer` extractor: reads the employer id set by the upstream gateway.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use screening_core::error::AppError;
use screening_service::RequestContext;

use crate::error::ApiError;

/// Header carrying the authenticated employer's id.
pub const EMPLOYER_HEADER: &str = "x-employer-id";

/// The calling employer and the request context built for it.
#[derive(Debug, Clone)]
pub struct Employer(pub RequestContext);

impl Employer {
    /// The employer's id.
    pub fn id(&self) -> Uuid {
        // Always set: the extractor only builds employer contexts.
        self.0.employer_id.unwrap_or_default()
    }
}

impl std::ops::Deref for Employer {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Employer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(EMPLOYER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::validation("Missing X-Employer-Id header"))?;

        let employer_id = Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::validation("X-Employer-Id must be a UUID"))?;

        Ok(Employer(RequestContext::employer(employer_id)))
    }
}
