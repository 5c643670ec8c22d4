//! HTTP client for the control plane.
//!
//! Covers the endpoints the documentation page depends on: the API key
//! endpoint, the Swagger UI configuration, the OpenAPI document, and the
//! "try it out" requests issued against the documented API.

mod api_key;
mod client;
mod types;

pub use api_key::{KeySource, ResolvedApiKey, API_KEY_ENDPOINT};
pub use client::ApiClient;
pub use types::{SwaggerUiConfig, TryItOutResponse};
