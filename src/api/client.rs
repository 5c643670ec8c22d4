use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use super::types::{ApiError, TryItOutResponse};
use crate::viewer::ViewerRequest;

/// Default request timeout in seconds
pub(super) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the User-Agent string
fn build_user_agent() -> String {
    std::env::var("CONTROL_PLANE_DOCS_USER_AGENT")
        .unwrap_or_else(|_| format!("controlplane-docs/{}", DEFAULT_VERSION))
}

/// HTTP client for the control plane, bound to the page origin.
///
/// Every request is sent once; there is no retry.
pub struct ApiClient {
    pub(super) client: Client,
    pub(super) base_url: Url,
    pub(super) user_agent: String,
    pub(super) session_id: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            user_agent: build_user_agent(),
            session_id: Uuid::new_v4().to_string(),
        })
    }

    fn join_url(base_url: &Url, endpoint: &str) -> Result<Url> {
        base_url
            .join(endpoint)
            .with_context(|| format!("Failed to build URL for endpoint: {}", endpoint))
    }

    /// Resolve an endpoint against the base URL.
    pub fn build_url(&self, endpoint: &str) -> Result<Url> {
        Self::join_url(&self.base_url, endpoint)
    }

    /// Issue a GET request. Non-success statuses are returned, not raised.
    pub async fn get(&self, url: Url) -> Result<reqwest::Response> {
        debug!("=== API Request ===");
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .header("User-Agent", &self.user_agent)
            .header("x-request-session-id", &self.session_id)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        debug!("Status: {}", response.status());
        Ok(response)
    }

    /// GET a JSON document, failing on non-success statuses.
    pub async fn get_json<R>(&self, url: Url) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.get(url.clone()).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let api_error = ApiError::from_http_response(status.as_u16(), body);
            error!("Request to {} failed: {}", url, api_error);
            anyhow::bail!(api_error);
        }

        let text = response
            .text()
            .await
            .context("Failed to read response body")?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse response from {}", url))
    }

    /// Send a "try it out" request exactly as the viewer built it.
    pub async fn send(&self, request: &ViewerRequest) -> Result<TryItOutResponse> {
        let request_id = Uuid::new_v4().to_string();

        debug!("=== Try It Out ===");
        debug!("{} {}", request.method, request.url);
        debug!("Request ID: {}", request_id);

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .header("User-Agent", &self.user_agent)
            .header("x-request-id", &request_id)
            .header("x-request-session-id", &self.session_id);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", request.url))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        debug!("Status: {}", status);
        Ok(TryItOutResponse {
            status,
            headers,
            body,
        })
    }
}
