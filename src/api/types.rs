//! Wire types for the control plane endpoints the explorer talks to.

use serde::Deserialize;

/// Body served at `/swagger-ui/api-key.json`.
///
/// ```json
/// { "apiKey": "changeme-control-plane-key" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ApiKeyResponse {
    /// The key, if present and non-empty.
    pub fn into_key(self) -> Option<String> {
        self.api_key.filter(|key| !key.is_empty())
    }
}

/// Document entry in a Swagger UI `urls` list.
#[derive(Debug, Clone, Deserialize)]
pub struct SwaggerUrl {
    pub url: String,
}

/// Swagger UI configuration served at the documentation source location.
///
/// Example from the control plane:
/// ```json
/// {
///     "configUrl": "/v3/api-docs/swagger-config",
///     "oauth2RedirectUrl": "http://localhost:8080/swagger-ui/oauth2-redirect.html",
///     "url": "/v3/api-docs",
///     "validatorUrl": ""
/// }
/// ```
///
/// Only the document location is used; validation and OAuth2 redirects do
/// not apply to an API key explorer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwaggerUiConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub urls: Vec<SwaggerUrl>,
}

impl SwaggerUiConfig {
    /// Location of the API document: `url` wins, otherwise the first `urls` entry.
    pub fn document_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.urls.first().map(|entry| entry.url.as_str()))
    }
}

/// Response to a "try it out" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryItOutResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TryItOutResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Non-success HTTP response from the control plane.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub http_status: u16,
    /// Response body, possibly empty
    pub body: String,
}

impl ApiError {
    pub fn from_http_response(http_status: u16, body: String) -> Self {
        Self { http_status, body }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.http_status {
            401 => write!(
                f,
                "Unauthorized (HTTP 401). The control plane rejected the API key: {}",
                self.body
            ),
            404 => write!(f, "Not found (HTTP 404)"),
            status if self.body.is_empty() => write!(f, "API error (HTTP {})", status),
            status => write!(f, "API error (HTTP {}): {}", status, self.body),
        }
    }
}

impl std::error::Error for ApiError {}
