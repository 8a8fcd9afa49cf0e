use billsight_core::credentials::DEFAULT_CLIENT_TAG;
use billsight_core::{
    AnalysisResult, ConfigError, Credentials, OperationHandle, OperationKind, SubmissionTarget,
};
use tokio_util::sync::CancellationToken;

use crate::analyzer::{AnalyzerDefinition, DeleteOutcome};
use crate::error::ClientError;
use crate::poller::{operation_handle, Poller};
use crate::request::{Endpoints, Submission, CONTENT_TYPE_HEADER, JSON};
use crate::transport::{HttpRequest, Method, Transport};

/// Submit/poll client for the Content Understanding REST API.
///
/// Headers and endpoints are fixed at construction; every call is otherwise
/// independent, so a shared client can serve concurrent documents.
pub struct ContentUnderstandingClient<T: Transport> {
    transport: T,
    endpoints: Endpoints,
    headers: Vec<(String, String)>,
    poller: Poller,
}

#[derive(Debug, Clone)]
pub struct ClientBuilder {
    endpoint: Option<String>,
    api_version: Option<String>,
    credentials: Option<Credentials>,
    client_tag: String,
    poller: Poller,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_version: None,
            credentials: None,
            client_tag: DEFAULT_CLIENT_TAG.to_string(),
            poller: Poller::default(),
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn client_tag(mut self, tag: impl Into<String>) -> Self {
        self.client_tag = tag.into();
        self
    }

    pub fn poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }

    pub fn build<T: Transport>(self, transport: T) -> Result<ContentUnderstandingClient<T>, ClientError> {
        let endpoint = non_empty(self.endpoint).ok_or(ConfigError::MissingSetting("endpoint"))?;
        let api_version =
            non_empty(self.api_version).ok_or(ConfigError::MissingSetting("api_version"))?;
        let credentials = self.credentials.ok_or(ConfigError::MissingCredentials)?;

        Ok(ContentUnderstandingClient {
            transport,
            endpoints: Endpoints::new(&endpoint, &api_version),
            headers: credentials.headers(&self.client_tag),
            poller: self.poller,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl<T: Transport> ContentUnderstandingClient<T> {
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn poller(&self) -> Poller {
        self.poller
    }

    /// Submit a document and return the handle to poll.
    pub async fn begin_analyze(
        &self,
        analyzer_id: &str,
        target: &SubmissionTarget,
    ) -> Result<OperationHandle, ClientError> {
        let url = self.endpoints.analyze(analyzer_id);
        tracing::info!(analyzer_id, document = %target, "Analyzing file");
        tracing::debug!(%url, "POST request");

        let request = Submission::build(target).await?.into_request(url, &self.headers);
        let response = self.transport.send(request).await?.error_for_status()?;
        let handle = operation_handle(&response)?;

        tracing::info!(operation = handle.short_id(), "Analysis started");
        Ok(handle)
    }

    pub async fn poll_result(
        &self,
        handle: &OperationHandle,
        kind: OperationKind,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ClientError> {
        self.poller
            .poll(&self.transport, handle, &self.headers, kind.success_tokens(), cancel)
            .await
    }

    /// Submit, then wait for the terminal result.
    pub async fn analyze(
        &self,
        analyzer_id: &str,
        target: &SubmissionTarget,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ClientError> {
        let handle = self.begin_analyze(analyzer_id, target).await?;
        self.poll_result(&handle, OperationKind::Analysis, cancel).await
    }

    pub async fn begin_create_analyzer(
        &self,
        analyzer_id: &str,
        definition: &AnalyzerDefinition,
    ) -> Result<OperationHandle, ClientError> {
        tracing::info!(analyzer_id, "Creating analyzer");
        let request = HttpRequest::new(Method::Put, self.endpoints.analyzer(analyzer_id))
            .header(CONTENT_TYPE_HEADER, JSON)
            .headers(&self.headers)
            .body(definition.to_bytes());
        let response = self.transport.send(request).await?.error_for_status()?;
        operation_handle(&response)
    }

    /// Create an analyzer and wait until the service reports it ready.
    pub async fn create_analyzer(
        &self,
        analyzer_id: &str,
        definition: &AnalyzerDefinition,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ClientError> {
        let handle = self.begin_create_analyzer(analyzer_id, definition).await?;
        self.poll_result(&handle, OperationKind::Provisioning, cancel).await
    }

    /// Synchronous on the service side; nothing to poll.
    pub async fn delete_analyzer(&self, analyzer_id: &str) -> Result<DeleteOutcome, ClientError> {
        tracing::info!(analyzer_id, "Deleting analyzer");
        let request =
            HttpRequest::new(Method::Delete, self.endpoints.analyzer(analyzer_id)).headers(&self.headers);
        let response = self.transport.send(request).await?;
        if response.status == 404 {
            tracing::info!(analyzer_id, "Analyzer not present");
            return Ok(DeleteOutcome::NotPresent);
        }
        response.error_for_status()?;
        Ok(DeleteOutcome::Deleted)
    }
}
