//! HTTP resume parser client.

use async_trait::async_trait;
use tracing::debug;

use screening_core::config::EndpointConfig;
use screening_core::error::AppError;
use screening_core::result::AppResult;
use screening_entity::candidate::ParsedResume;

use super::{ResumeParser, build_client, map_request_error};

const COLLABORATOR: &str = "Resume parser";

/// Posts the raw file to the parser service and reads back JSON.
#[derive(Debug, Clone)]
pub struct HttpResumeParser {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpResumeParser {
    /// Create a client for the configured endpoint.
    pub fn new(config: &EndpointConfig) -> AppResult<Self> {
        Ok(Self {
            client: build_client(COLLABORATOR, config.timeout())?,
            url: reqwest::Url::parse(&config.url).map_err(|e| {
                AppError::configuration(format!("Invalid parser url '{}': {e}", config.url))
            })?,
        })
    }

    /// Endpoint for one upload, carrying the filename as a query parameter.
    fn upload_url(&self, filename: &str) -> reqwest::Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("filename", filename);
        url
    }
}

#[async_trait]
impl ResumeParser for HttpResumeParser {
    async fn parse(&self, filename: &str, content: &[u8]) -> AppResult<ParsedResume> {
        debug!(filename, bytes = content.len(), "Parsing resume");
        self.client
            .post(self.upload_url(filename))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content.to_vec())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| map_request_error(COLLABORATOR, e))?
            .json::<ParsedResume>()
            .await
            .map_err(|e| map_request_error(COLLABORATOR, e))
    }
}

#[cfg(test)]
mod tests {
    use screening_core::error::ErrorKind;

    use super::*;

    fn endpoint(url: &str) -> EndpointConfig {
        EndpointConfig {
            url: url.to_string(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_upload_url_encodes_filename() {
        let parser = HttpResumeParser::new(&endpoint("http://parser.internal/parse")).unwrap();
        let url = parser.upload_url("Jane Doe & CV.pdf");
        assert_eq!(url.path(), "/parse");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("filename".to_string(), "Jane Doe & CV.pdf".to_string())]);
    }

    #[test]
    fn test_upload_url_keeps_existing_query() {
        let parser =
            HttpResumeParser::new(&endpoint("http://parser.internal/parse?lang=en")).unwrap();
        let url = parser.upload_url("cv.pdf");
        assert_eq!(url.query(), Some("lang=en&filename=cv.pdf"));
    }

    #[test]
    fn test_rejects_invalid_url() {
        let err = HttpResumeParser::new(&endpoint("not a url")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
