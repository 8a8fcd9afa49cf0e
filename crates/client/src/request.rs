use billsight_core::SubmissionTarget;
use serde_json::json;

use crate::error::ClientError;
use crate::transport::{HttpRequest, Method};

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const OCTET_STREAM: &str = "application/octet-stream";
pub const JSON: &str = "application/json";

const SERVICE_PATH: &str = "contentunderstanding";

/// Transport-ready body for an analyze call.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

impl Submission {
    pub async fn build(target: &SubmissionTarget) -> Result<Self, ClientError> {
        match target {
            SubmissionTarget::LocalFile(path) => {
                let body = tokio::fs::read(path).await?;
                Ok(Submission { body, content_type: OCTET_STREAM })
            }
            SubmissionTarget::RemoteUrl(url) => {
                let body = json!({ "url": url.as_str() }).to_string().into_bytes();
                Ok(Submission { body, content_type: JSON })
            }
        }
    }

    /// Build a request carrying this body plus the given auth headers.
    pub fn into_request(self, url: String, auth_headers: &[(String, String)]) -> HttpRequest {
        HttpRequest::new(Method::Post, url)
            .header(CONTENT_TYPE_HEADER, self.content_type)
            .headers(auth_headers)
            .body(self.body)
    }
}

/// URL layout of the service, rooted at a trimmed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    endpoint: String,
    api_version: String,
}

impl Endpoints {
    pub fn new(endpoint: &str, api_version: &str) -> Self {
        Self {
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
            api_version: api_version.trim().to_string(),
        }
    }

    pub fn analyze(&self, analyzer_id: &str) -> String {
        format!(
            "{}/{SERVICE_PATH}/analyzers/{analyzer_id}:analyze?api-version={}",
            self.endpoint, self.api_version
        )
    }

    pub fn analyzer(&self, analyzer_id: &str) -> String {
        format!(
            "{}/{SERVICE_PATH}/analyzers/{analyzer_id}?api-version={}",
            self.endpoint, self.api_version
        )
    }
}
