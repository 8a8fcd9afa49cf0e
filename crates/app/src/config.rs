use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use billsight_client::{ClientBuilder, Poller};
use billsight_core::credentials::DEFAULT_CLIENT_TAG;
use billsight_core::{ConfigError, Credentials, TokenProvider};
use billsight_extract::FieldKeys;
use serde::Deserialize;

pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";
pub const ENV_PREFIX: &str = "AZURE_CONTENT_UNDERSTANDING_";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    pub timeout_secs: u64,
    pub interval_secs: u64,
    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self { timeout_secs: 300, interval_secs: 2, request_timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint: Option<String>,
    pub api_version: String,
    pub subscription_key: Option<String>,
    pub aad_token: Option<String>,
    pub analyzer_id: Option<String>,
    pub client_tag: String,
    pub polling: PollingSettings,
    pub fields: FieldKeys,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            subscription_key: None,
            aad_token: None,
            analyzer_id: None,
            client_tag: DEFAULT_CLIENT_TAG.to_string(),
            polling: PollingSettings::default(),
            fields: FieldKeys::default(),
        }
    }
}

impl Settings {
    pub fn from_toml(toml_content: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_content).context("Failed to parse settings TOML")
    }

    /// File (if any), then environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        settings.apply_env(|name| std::env::var(name).ok());
        Ok(settings)
    }

    /// Override from `AZURE_CONTENT_UNDERSTANDING_*` variables; empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}")).filter(|v| !v.is_empty());

        if let Some(v) = var("ENDPOINT") {
            self.endpoint = Some(v);
        }
        if let Some(v) = var("API_VERSION") {
            self.api_version = v;
        }
        if let Some(v) = var("SUBSCRIPTION_KEY") {
            self.subscription_key = Some(v);
        }
        if let Some(v) = var("AAD_TOKEN") {
            self.aad_token = Some(v);
        }
        if let Some(v) = var("ANALYZER_ID") {
            self.analyzer_id = Some(v);
        }
    }

    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let token = self.aad_token.as_deref();
        Credentials::resolve(
            self.subscription_key.as_deref(),
            token.as_ref().map(|t| t as &dyn TokenProvider),
        )
    }

    pub fn analyzer_id(&self) -> Result<&str, ConfigError> {
        self.analyzer_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingSetting("analyzer_id"))
    }

    pub fn poller(&self) -> Poller {
        Poller::new(
            Duration::from_secs(self.polling.interval_secs),
            Duration::from_secs(self.polling.timeout_secs),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.polling.request_timeout_secs)
    }

    pub fn client_builder(&self) -> Result<ClientBuilder, ConfigError> {
        let mut builder = ClientBuilder::new()
            .api_version(self.api_version.clone())
            .credentials(self.credentials()?)
            .client_tag(self.client_tag.clone())
            .poller(self.poller());
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint.clone());
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_when_empty() {
        let s = Settings::from_toml("").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.api_version, DEFAULT_API_VERSION);
        assert_eq!(s.poller(), Poller::new(Duration::from_secs(2), Duration::from_secs(300)));
    }

    #[test]
    fn parses_full_file() {
        let s = Settings::from_toml(
            r#"
            endpoint = "https://example.cognitiveservices.azure.com"
            subscription_key = "abc"
            analyzer_id = "utility-bill-analyzer"

            [polling]
            timeout_secs = 60
            interval_secs = 5

            [fields.consumption]
            primary = "GasConsumption"
            alternates = ["燃氣用量"]
            "#,
        )
        .unwrap();
        assert_eq!(s.analyzer_id().unwrap(), "utility-bill-analyzer");
        assert_eq!(s.polling.timeout_secs, 60);
        assert_eq!(s.polling.request_timeout_secs, 30);
        assert_eq!(s.fields.consumption.primary, "GasConsumption");
        assert_eq!(s.fields.billing_period.primary, "BillingPeriod");
        assert_eq!(s.credentials().unwrap(), Credentials::SubscriptionKey("abc".into()));
    }

    #[test]
    fn bad_toml_is_reported() {
        assert!(Settings::from_toml("endpoint = [").is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut s = Settings::from_toml(r#"endpoint = "https://file""#).unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("AZURE_CONTENT_UNDERSTANDING_ENDPOINT", "https://env"),
            ("AZURE_CONTENT_UNDERSTANDING_AAD_TOKEN", "tok"),
            ("AZURE_CONTENT_UNDERSTANDING_ANALYZER_ID", ""),
        ]);
        s.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(s.endpoint.as_deref(), Some("https://env"));
        assert_eq!(s.credentials().unwrap(), Credentials::BearerToken("tok".into()));
        assert_eq!(s.analyzer_id(), Err(ConfigError::MissingSetting("analyzer_id")));
    }

    #[test]
    fn placeholder_credentials_are_rejected() {
        let s = Settings {
            subscription_key: Some("AZURE_CONTENT_UNDERSTANDING_SUBSCRIPTION_KEY".into()),
            aad_token: Some("AZURE_CONTENT_UNDERSTANDING_AAD_TOKEN".into()),
            ..Settings::default()
        };
        assert_eq!(s.credentials(), Err(ConfigError::MissingCredentials));
        assert!(s.client_builder().is_err());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "analyzer_id = \"from-file\"").unwrap();
        let s = Settings::load(Some(file.path())).unwrap();
        // The analyzer id may still be overridden by the ambient environment.
        assert!(s.analyzer_id().is_ok());
    }
}
