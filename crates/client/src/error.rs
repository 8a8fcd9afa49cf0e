use std::time::Duration;

use billsight_core::{ConfigError, InvalidTarget, OperationStatus};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    InvalidTarget(#[from] InvalidTarget),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Operation location not found in response headers")]
    OperationHandleMissing,
    #[error("Malformed response body: {0}")]
    Decode(String),
    #[error("Analysis failed: {body}")]
    AnalysisFailed { body: Value },
    #[error("Operation timed out after {:.2} seconds", elapsed.as_secs_f64())]
    Timeout { elapsed: Duration },
    #[error("Operation cancelled")]
    Cancelled,
}

impl ClientError {
    /// The operation status this error stands for, when it ended a poll loop.
    pub fn terminal_status(&self) -> Option<OperationStatus> {
        match self {
            ClientError::AnalysisFailed { .. } => Some(OperationStatus::Failed),
            ClientError::Timeout { .. } => Some(OperationStatus::TimedOut),
            _ => None,
        }
    }
}
