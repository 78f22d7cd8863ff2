//! HTTP AI analyzer client.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use screening_core::config::EndpointConfig;
use screening_core::result::AppResult;
use screening_entity::candidate::ResumeAnalysis;

use super::{ResumeAnalyzer, build_client, map_request_error};

const COLLABORATOR: &str = "Resume analyzer";

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    full_text: &'a str,
    job_title: &'a str,
    description: &'a str,
}

/// Sends resume text and posting context to the analyzer service.
#[derive(Debug, Clone)]
pub struct HttpResumeAnalyzer {
    client: reqwest::Client,
    url: String,
}

impl HttpResumeAnalyzer {
    /// Create a client for the configured endpoint.
    pub fn new(config: &EndpointConfig) -> AppResult<Self> {
        Ok(Self {
            client: build_client(COLLABORATOR, config.timeout())?,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl ResumeAnalyzer for HttpResumeAnalyzer {
    async fn analyze(
        &self,
        full_text: &str,
        job_title: &str,
        description: &str,
    ) -> AppResult<ResumeAnalysis> {
        debug!(job_title, chars = full_text.len(), "Analyzing resume");
        let request = AnalyzeRequest {
            full_text,
            job_title,
            description,
        };
        self.client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| map_request_error(COLLABORATOR, e))?
            .json::<ResumeAnalysis>()
            .await
            .map_err(|e| map_request_error(COLLABORATOR, e))
    }
}
