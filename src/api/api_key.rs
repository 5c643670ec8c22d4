//! API key resolution with a development fallback.

use anyhow::{Context, Result};
use tracing::debug;

use super::client::ApiClient;
use super::types::ApiKeyResponse;

/// Endpoint that serves the configured control plane key.
pub const API_KEY_ENDPOINT: &str = "/swagger-ui/api-key.json";

/// Development key used whenever the endpoint does not provide one.
pub const FALLBACK_API_KEY: &str = "changeme-control-plane-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Endpoint,
    Fallback,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Endpoint => "endpoint",
            KeySource::Fallback => "fallback",
        }
    }
}

/// API key resolved once per page load. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedApiKey {
    value: String,
    source: KeySource,
}

impl ResolvedApiKey {
    fn from_endpoint(value: String) -> Self {
        Self {
            value,
            source: KeySource::Endpoint,
        }
    }

    pub fn fallback() -> Self {
        Self {
            value: FALLBACK_API_KEY.to_string(),
            source: KeySource::Fallback,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    /// Key with everything past the first four characters hidden.
    pub fn masked(&self) -> String {
        let visible: String = self.value.chars().take(4).collect();
        let hidden = self.value.chars().count().saturating_sub(4);
        if hidden == 0 {
            "*".repeat(visible.chars().count())
        } else {
            format!("{}{}", visible, "*".repeat(hidden))
        }
    }
}

impl std::fmt::Debug for ResolvedApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedApiKey")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

/// Decide the key from a response status and body.
///
/// `None` means the caller should fall back.
pub fn api_key_from_body(success: bool, body: &str) -> Result<Option<String>> {
    if !success {
        return Ok(None);
    }
    let parsed: ApiKeyResponse =
        serde_json::from_str(body).context("Failed to parse API key response")?;
    Ok(parsed.into_key())
}

impl ApiClient {
    /// Resolve the API key for "try it out" requests.
    ///
    /// One attempt against [`API_KEY_ENDPOINT`]. Every failure (transport,
    /// status, body, missing field) ends in [`FALLBACK_API_KEY`]; this never
    /// fails outward.
    pub async fn resolve_api_key(&self) -> ResolvedApiKey {
        match self.fetch_api_key().await {
            Ok(Some(key)) => {
                debug!("Resolved API key from {}", API_KEY_ENDPOINT);
                ResolvedApiKey::from_endpoint(key)
            }
            Ok(None) => {
                debug!(
                    "{} did not provide an API key, using fallback",
                    API_KEY_ENDPOINT
                );
                ResolvedApiKey::fallback()
            }
            Err(e) => {
                debug!("API key lookup failed, using fallback: {:#}", e);
                ResolvedApiKey::fallback()
            }
        }
    }

    async fn fetch_api_key(&self) -> Result<Option<String>> {
        let url = self.build_url(API_KEY_ENDPOINT)?;
        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            debug!("API key endpoint returned {}", status);
        }
        let body = response
            .text()
            .await
            .context("Failed to read API key response")?;
        api_key_from_body(status.is_success(), &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(Url::parse(&server.uri()).unwrap()).unwrap()
    }

    async fn serve_key(response: ResponseTemplate) -> ResolvedApiKey {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(API_KEY_ENDPOINT))
            .respond_with(response)
            .mount(&server)
            .await;
        client_for(&server).resolve_api_key().await
    }

    #[test]
    fn test_fallback_constant() {
        assert_eq!(FALLBACK_API_KEY, "changeme-control-plane-key");
        assert_eq!(ResolvedApiKey::fallback().as_str(), FALLBACK_API_KEY);
        assert_eq!(ResolvedApiKey::fallback().source(), KeySource::Fallback);
    }

    #[test]
    fn test_api_key_from_body() {
        assert_eq!(
            api_key_from_body(true, r#"{"apiKey":"abc123"}"#).unwrap(),
            Some("abc123".to_string())
        );
        assert_eq!(api_key_from_body(false, r#"{"apiKey":"abc123"}"#).unwrap(), None);
        assert_eq!(api_key_from_body(true, r#"{"other":"x"}"#).unwrap(), None);
        assert_eq!(api_key_from_body(true, r#"{"apiKey":""}"#).unwrap(), None);
        assert!(api_key_from_body(true, "not json").is_err());
        assert!(api_key_from_body(true, "null").is_err());
    }

    #[test]
    fn test_masked_and_debug() {
        let key = ResolvedApiKey::from_endpoint("abc123".to_string());
        assert_eq!(key.masked(), "abc1**");
        assert_eq!(ResolvedApiKey::from_endpoint("ab".to_string()).masked(), "**");

        let debug_str = format!("{:?}", key);
        assert!(!debug_str.contains("abc123"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_resolves_key_from_endpoint() {
        let key = serve_key(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "apiKey": "abc123" })),
        )
        .await;
        assert_eq!(key.as_str(), "abc123");
        assert_eq!(key.source(), KeySource::Endpoint);
    }

    #[tokio::test]
    async fn test_not_found_uses_fallback() {
        let key = serve_key(ResponseTemplate::new(404)).await;
        assert_eq!(key.as_str(), "changeme-control-plane-key");
        assert_eq!(key.source(), KeySource::Fallback);
    }

    #[tokio::test]
    async fn test_server_error_uses_fallback() {
        let key = serve_key(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "apiKey": "abc123" })),
        )
        .await;
        assert_eq!(key.as_str(), FALLBACK_API_KEY);
    }

    #[tokio::test]
    async fn test_missing_field_uses_fallback() {
        let key = serve_key(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "other": "x" })),
        )
        .await;
        assert_eq!(key.as_str(), FALLBACK_API_KEY);
    }

    #[tokio::test]
    async fn test_empty_field_uses_fallback() {
        let key = serve_key(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "apiKey": "" })),
        )
        .await;
        assert_eq!(key.as_str(), FALLBACK_API_KEY);
    }

    #[tokio::test]
    async fn test_malformed_json_uses_fallback() {
        let key = serve_key(ResponseTemplate::new(200).set_body_string("{not json")).await;
        assert_eq!(key.as_str(), FALLBACK_API_KEY);
    }

    #[tokio::test]
    async fn test_network_error_uses_fallback() {
        // Nothing listens on port 1.
        let client = ApiClient::new(Url::parse("http://127.0.0.1:1").unwrap()).unwrap();
        let key = client.resolve_api_key().await;
        assert_eq!(key.as_str(), FALLBACK_API_KEY);
        assert_eq!(key.source(), KeySource::Fallback);
    }
}
