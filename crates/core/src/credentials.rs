use std::fmt;
use thiserror::Error;

/// Sentinel left in sample configs where a real subscription key belongs.
pub const SUBSCRIPTION_KEY_PLACEHOLDER: &str = "AZURE_CONTENT_UNDERSTANDING_SUBSCRIPTION_KEY";
/// Sentinel left in sample configs where a real AAD token belongs.
pub const AAD_TOKEN_PLACEHOLDER: &str = "AZURE_CONTENT_UNDERSTANDING_AAD_TOKEN";

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CLIENT_TAG_HEADER: &str = "x-ms-useragent";
pub const DEFAULT_CLIENT_TAG: &str = "cu-sample-code";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Either a subscription key or an AAD token must be provided")]
    MissingCredentials,
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),
}

/// Something that can hand out a bearer token on demand.
pub trait TokenProvider {
    fn token(&self) -> Option<String>;
}

impl TokenProvider for String {
    fn token(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl TokenProvider for &str {
    fn token(&self) -> Option<String> {
        Some((*self).to_string())
    }
}

/// Adapts a closure into a [`TokenProvider`].
pub struct TokenFn<F>(pub F);

impl<F> TokenProvider for TokenFn<F>
where
    F: Fn() -> Option<String>,
{
    fn token(&self) -> Option<String> {
        (self.0)()
    }
}

/// The single authentication mode used for every request of a client.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    SubscriptionKey(String),
    BearerToken(String),
}

impl Credentials {
    /// Pick the usable secret. The subscription key wins when both are set.
    pub fn resolve(
        subscription_key: Option<&str>,
        token_provider: Option<&dyn TokenProvider>,
    ) -> Result<Self, ConfigError> {
        if let Some(key) = subscription_key.and_then(|k| usable(k, SUBSCRIPTION_KEY_PLACEHOLDER)) {
            return Ok(Credentials::SubscriptionKey(key.to_string()));
        }

        token_provider
            .and_then(|p| p.token())
            .and_then(|t| usable(&t, AAD_TOKEN_PLACEHOLDER).map(str::to_string))
            .map(Credentials::BearerToken)
            .ok_or(ConfigError::MissingCredentials)
    }

    /// The auth header plus the client identification header.
    pub fn headers(&self, client_tag: &str) -> Vec<(String, String)> {
        let auth = match self {
            Credentials::SubscriptionKey(key) => (SUBSCRIPTION_KEY_HEADER.to_string(), key.clone()),
            Credentials::BearerToken(token) => {
                (AUTHORIZATION_HEADER.to_string(), format!("Bearer {token}"))
            }
        };
        vec![auth, (CLIENT_TAG_HEADER.to_string(), client_tag.to_string())]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::SubscriptionKey(_) => write!(f, "SubscriptionKey(<redacted>)"),
            Credentials::BearerToken(_) => write!(f, "BearerToken(<redacted>)"),
        }
    }
}

/// The trimmed secret, unless it is blank or the placeholder.
fn usable<'a>(value: &'a str, placeholder: &str) -> Option<&'a str> {
    let value = value.trim();
    (!value.is_empty() && value != placeholder).then_some(value)
}
