use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference URL returned in the `operation-location` header of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle(String);

impl OperationHandle {
    /// Empty or whitespace-only locations cannot be polled.
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        if location.trim().is_empty() {
            None
        } else {
            Some(OperationHandle(location))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing path segment without query, e.g. the operation id.
    pub fn short_id(&self) -> &str {
        let path = self.0.split('?').next().unwrap_or(&self.0);
        path.rsplit('/').next().unwrap_or(path)
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Any non-terminal status text, kept verbatim for logging.
    Running(String),
    Succeeded,
    Failed,
    Ready,
    /// Client-side only; the service never reports this.
    TimedOut,
}

impl OperationStatus {
    /// Case-insensitive; unknown and empty text count as running.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "succeeded" => OperationStatus::Succeeded,
            "failed" => OperationStatus::Failed,
            "ready" => OperationStatus::Ready,
            _ => OperationStatus::Running(raw.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::Running(_))
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationStatus::Running(raw) if raw.is_empty() => write!(f, "running"),
            OperationStatus::Running(raw) => write!(f, "running ({raw})"),
            OperationStatus::Succeeded => write!(f, "succeeded"),
            OperationStatus::Failed => write!(f, "failed"),
            OperationStatus::Ready => write!(f, "ready"),
            OperationStatus::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// The resource kind being tracked, which decides which statuses count as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Analysis,
    Provisioning,
}

impl OperationKind {
    pub fn success_tokens(self) -> &'static [&'static str] {
        match self {
            OperationKind::Analysis => &["succeeded"],
            OperationKind::Provisioning => &["ready", "succeeded"],
        }
    }
}
