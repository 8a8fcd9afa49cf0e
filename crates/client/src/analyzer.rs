use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientError;

pub const DEFAULT_SCHEMA_NAME: &str = "UtilityBillSchema";

/// Analyzer schema body sent with a provisioning PUT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyzerDefinition(Map<String, Value>);

/// Result of a delete call; a missing analyzer is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotPresent,
}

impl AnalyzerDefinition {
    pub fn from_json(text: &str) -> Result<Self, ClientError> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(AnalyzerDefinition(map)),
            Ok(_) => Err(ClientError::Decode("analyzer definition must be a JSON object".into())),
            Err(e) => Err(ClientError::Decode(e.to_string())),
        }
    }

    /// The service rejects a `fieldSchema` without a name.
    pub fn ensure_schema_name(&mut self, default: &str) {
        if let Some(Value::Object(schema)) = self.0.get_mut("fieldSchema") {
            schema
                .entry("name")
                .or_insert_with(|| Value::String(default.to_string()));
        }
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.0.get("fieldSchema")?.get("name")?.as_str()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        Value::Object(self.0.clone()).to_string().into_bytes()
    }
}
