use std::time::Duration;

use billsight_core::{AnalysisResult, OperationHandle, OperationStatus};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

pub const OPERATION_LOCATION_HEADER: &str = "operation-location";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Pull the operation handle out of a submission response.
pub fn operation_handle(response: &HttpResponse) -> Result<OperationHandle, ClientError> {
    response
        .header(OPERATION_LOCATION_HEADER)
        .and_then(|location| OperationHandle::new(location))
        .ok_or(ClientError::OperationHandleMissing)
}

/// Fixed-interval status poller bounded by a wall-clock budget.
///
/// Holds no per-operation state, so one value can drive any number of
/// operations, sequentially or concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self { interval: DEFAULT_INTERVAL, timeout: DEFAULT_TIMEOUT }
    }
}

impl Poller {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// GET `handle` until its status is in `success_tokens`, the service reports
    /// `failed`, the time budget runs out, or `cancel` fires during a sleep.
    ///
    /// The first request is always sent. Transport and HTTP errors end the loop
    /// immediately; only non-terminal statuses are retried.
    pub async fn poll<T>(
        &self,
        transport: &T,
        handle: &OperationHandle,
        headers: &[(String, String)],
        success_tokens: &[&str],
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ClientError>
    where
        T: Transport + ?Sized,
    {
        let start = Instant::now();
        let operation = handle.short_id();

        loop {
            let request = HttpRequest::new(Method::Get, handle.as_str()).headers(headers);
            let response = transport.send(request).await?.error_for_status()?;
            let result = AnalysisResult::new(response.json()?);
            let elapsed = start.elapsed();
            let status = result.status_text().trim();

            if success_tokens.iter().any(|t| t.eq_ignore_ascii_case(status)) {
                tracing::info!(
                    operation,
                    status,
                    elapsed_secs = elapsed.as_secs_f64(),
                    "Request result is ready"
                );
                return Ok(result);
            }

            if result.status() == OperationStatus::Failed {
                tracing::error!(operation, body = %result.raw(), "Request failed");
                return Err(ClientError::AnalysisFailed { body: result.into_raw() });
            }

            if elapsed > self.timeout {
                tracing::warn!(operation, elapsed_secs = elapsed.as_secs_f64(), "Operation timed out");
                return Err(ClientError::Timeout { elapsed });
            }

            tracing::debug!(
                operation,
                status,
                elapsed_secs = elapsed.as_secs_f64(),
                "Request in progress"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(operation, "Polling cancelled");
                    return Err(ClientError::Cancelled);
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
