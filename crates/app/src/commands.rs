use billsight_client::{
    AnalyzerDefinition, CancellationToken, ClientError, ContentUnderstandingClient, DeleteOutcome,
    Transport, DEFAULT_SCHEMA_NAME,
};
use billsight_core::{AnalysisResult, OperationStatus, SubmissionTarget};
use billsight_extract::{ExtractError, ExtractedRecord, Normalizer};
use serde::Serialize;

#[derive(Debug)]
pub struct CommandError {
    pub message: String,
    pub cancelled: bool,
}

impl From<ClientError> for CommandError {
    fn from(e: ClientError) -> Self {
        let cancelled = matches!(e, ClientError::Cancelled);
        CommandError { message: e.to_string(), cancelled }
    }
}

impl From<ExtractError> for CommandError {
    fn from(e: ExtractError) -> Self {
        CommandError { message: e.to_string(), cancelled: false }
    }
}

/// One line of the `analyze` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub document: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ExtractedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

// ── analyze ──────────────────────────────────────────────────────────────────

/// Analyze each target in turn. A failing document is reported and the batch
/// moves on; cancellation stops the batch.
pub async fn analyze<T: Transport>(
    client: &ContentUnderstandingClient<T>,
    analyzer_id: &str,
    normalizer: &Normalizer,
    targets: &[String],
    cancel: &CancellationToken,
) -> Vec<DocumentReport> {
    let mut reports = Vec::with_capacity(targets.len());

    for location in targets {
        match analyze_one(client, analyzer_id, normalizer, location, cancel).await {
            Ok(record) => {
                tracing::info!(document = %location, "Document analyzed");
                reports.push(DocumentReport {
                    document: location.clone(),
                    status: OperationStatus::Succeeded.to_string(),
                    record: Some(record),
                    error: None,
                });
            }
            Err((status, e)) => {
                tracing::warn!(document = %location, "Analysis failed: {}", e.message);
                let cancelled = e.cancelled;
                reports.push(DocumentReport {
                    document: location.clone(),
                    status,
                    record: None,
                    error: Some(e.message),
                });
                if cancelled {
                    tracing::warn!("Batch cancelled, skipping remaining documents");
                    break;
                }
            }
        }
    }

    reports
}

async fn analyze_one<T: Transport>(
    client: &ContentUnderstandingClient<T>,
    analyzer_id: &str,
    normalizer: &Normalizer,
    location: &str,
    cancel: &CancellationToken,
) -> Result<ExtractedRecord, (String, CommandError)> {
    let target = SubmissionTarget::resolve(location)
        .map_err(|e| ("invalid".to_string(), CommandError::from(ClientError::from(e))))?;

    let result = client
        .analyze(analyzer_id, &target, cancel)
        .await
        .map_err(|e| (failure_status(&e), CommandError::from(e)))?;

    normalizer
        .extract(&result)
        .map_err(|e| (result.status().to_string(), CommandError::from(e)))
}

fn failure_status(e: &ClientError) -> String {
    match e.terminal_status() {
        Some(status) => status.to_string(),
        None if matches!(e, ClientError::Cancelled) => "cancelled".to_string(),
        None => "error".to_string(),
    }
}

// ── provision ────────────────────────────────────────────────────────────────

/// Replace the analyzer with the given definition and wait until it is ready.
pub async fn provision<T: Transport>(
    client: &ContentUnderstandingClient<T>,
    analyzer_id: &str,
    definition_json: &str,
    cancel: &CancellationToken,
) -> Result<AnalysisResult, CommandError> {
    let mut definition = AnalyzerDefinition::from_json(definition_json)?;
    definition.ensure_schema_name(DEFAULT_SCHEMA_NAME);

    match client.delete_analyzer(analyzer_id).await {
        Ok(DeleteOutcome::Deleted) => tracing::info!(analyzer_id, "Existing analyzer deleted"),
        Ok(DeleteOutcome::NotPresent) => {}
        // Creation may still succeed; let the PUT report the real problem.
        Err(e) => tracing::warn!(analyzer_id, "Could not delete analyzer: {e}"),
    }

    let result = client.create_analyzer(analyzer_id, &definition, cancel).await?;
    tracing::info!(analyzer_id, status = result.status_text(), "Analyzer ready");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use billsight_client::{ClientBuilder, HttpResponse, Method, MockTransport, Poller};
    use billsight_core::Credentials;
    use billsight_extract::FieldValue;
    use serde_json::json;
    use std::io::Write;
    use std::time::Duration;

    const OP: &str = "https://svc.example.com/contentunderstanding/analyzerResults/abc?api-version=v";

    fn client(responses: Vec<HttpResponse>) -> ContentUnderstandingClient<MockTransport> {
        ClientBuilder::new()
            .endpoint("https://svc.example.com")
            .api_version("v")
            .credentials(Credentials::SubscriptionKey("key".into()))
            .poller(Poller::new(Duration::from_secs(1), Duration::from_secs(30)))
            .build(MockTransport::new(responses))
            .unwrap()
    }

    fn accepted() -> HttpResponse {
        HttpResponse::new(202).with_header("Operation-Location", OP)
    }

    fn succeeded(consumption: f64) -> HttpResponse {
        HttpResponse::new(200).with_json(&json!({
            "status": "Succeeded",
            "result": { "contents": [ { "fields": {
                "BillingPeriod": { "valueString": "Jan 2024" },
                "ElectricityConsumption": { "valueNumber": consumption }
            } } ] }
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn batch_continues_past_failed_document() {
        let client = client(vec![
            accepted(),
            HttpResponse::new(200).with_json(&json!({ "status": "Failed", "error": { "code": "BadDoc" } })),
            accepted(),
            HttpResponse::new(200).with_json(&json!({ "status": "Running" })),
            succeeded(420.0),
        ]);
        let targets = vec![
            "https://files.example.com/a.pdf".to_string(),
            "not a path or url".to_string(),
            "https://files.example.com/b.pdf".to_string(),
        ];

        let reports = analyze(
            &client,
            "bills",
            &Normalizer::default(),
            &targets,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].status, "failed");
        assert!(!reports[0].is_success());
        assert_eq!(reports[1].status, "invalid");
        assert!(reports[2].is_success());
        let record = reports[2].record.as_ref().unwrap();
        assert_eq!(record.electricity_consumption, FieldValue::Number(420.0));
        assert_eq!(client.transport().remaining(), 0);
    }

    #[tokio::test]
    async fn local_file_is_read_and_normalized() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.7").unwrap();
        let client = client(vec![accepted(), succeeded(12.5)]);
        let targets = vec![file.path().display().to_string()];

        let reports = analyze(
            &client,
            "bills",
            &Normalizer::default(),
            &targets,
            &CancellationToken::new(),
        )
        .await;

        assert!(reports[0].is_success());
        let sent = client.transport().requests();
        assert_eq!(sent[0].body.as_deref(), Some(&b"%PDF-1.7"[..]));
    }

    #[tokio::test]
    async fn cancellation_stops_the_batch() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let client = client(vec![
            accepted(),
            HttpResponse::new(200).with_json(&json!({ "status": "Running" })),
        ]);
        let targets = vec![
            "https://files.example.com/a.pdf".to_string(),
            "https://files.example.com/b.pdf".to_string(),
        ];

        let reports = analyze(&client, "bills", &Normalizer::default(), &targets, &cancel).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, "cancelled");
    }

    #[test]
    fn report_serialization_omits_empty_parts() {
        let report = DocumentReport {
            document: "a.pdf".into(),
            status: "failed".into(),
            record: None,
            error: Some("Analysis failed".into()),
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({ "document": "a.pdf", "status": "failed", "error": "Analysis failed" })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn provision_deletes_then_creates() {
        let client = client(vec![
            HttpResponse::new(404),
            HttpResponse::new(201).with_header("Operation-Location", OP),
            HttpResponse::new(200).with_json(&json!({ "status": "Running" })),
            HttpResponse::new(200).with_json(&json!({ "status": "ready" })),
        ]);
        let definition = r#"{ "description": "bills", "fieldSchema": { "fields": {} } }"#;

        let result = provision(&client, "bills", definition, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.status(), OperationStatus::Ready);
        let sent = client.transport().requests();
        assert_eq!(sent[0].method, Method::Delete);
        assert_eq!(sent[1].method, Method::Put);
        let body: serde_json::Value = serde_json::from_slice(sent[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["fieldSchema"]["name"], DEFAULT_SCHEMA_NAME);
    }

    #[tokio::test]
    async fn provision_continues_when_delete_fails() {
        let client = client(vec![
            HttpResponse::new(500),
            HttpResponse::new(201).with_header("Operation-Location", OP),
            HttpResponse::new(200).with_json(&json!({ "status": "Succeeded" })),
        ]);

        let result = provision(&client, "bills", "{}", &CancellationToken::new()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn provision_rejects_non_object_definition() {
        let client = client(vec![]);
        let err = provision(&client, "bills", "[1, 2]", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.message.contains("JSON object"));
        assert!(client.transport().requests().is_empty());
    }
}
