use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::status::OperationStatus;

/// Terminal payload of an operation, kept as the decoded JSON body.
///
/// Accessors never fail: absent or misshapen parts come back as `None` or empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    pub fn new(body: Value) -> Self {
        AnalysisResult(body)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn into_raw(self) -> Value {
        self.0
    }

    pub fn status_text(&self) -> &str {
        self.0.get("status").and_then(Value::as_str).unwrap_or("")
    }

    pub fn status(&self) -> OperationStatus {
        OperationStatus::parse(self.status_text())
    }

    /// `result.contents`, if present as an array.
    pub fn contents(&self) -> Option<&Vec<Value>> {
        self.0.get("result")?.get("contents")?.as_array()
    }

    /// `result.contents[0].fields`, if present as an object.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.contents()?.first()?.get("fields")?.as_object()
    }
}

impl From<Value> for AnalysisResult {
    fn from(body: Value) -> Self {
        AnalysisResult(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_walk_nested_payload() {
        let r = AnalysisResult::new(json!({
            "status": "Succeeded",
            "result": { "contents": [ { "fields": { "BillingPeriod": { "valueString": "Jan" } } } ] }
        }));
        assert_eq!(r.status(), OperationStatus::Succeeded);
        assert_eq!(r.contents().map(Vec::len), Some(1));
        assert!(r.fields().unwrap().contains_key("BillingPeriod"));
    }

    #[test]
    fn accessors_tolerate_missing_parts() {
        let r = AnalysisResult::new(json!({ "result": { "contents": "oops" } }));
        assert_eq!(r.status_text(), "");
        assert!(r.contents().is_none());
        assert!(r.fields().is_none());
    }
}
