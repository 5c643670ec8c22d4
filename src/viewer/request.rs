//! Outgoing "try it out" requests and the interceptor hook.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Method;
use url::Url;

/// Header the control plane reads the API key from.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// A request the viewer is about to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerRequest {
    pub method: Method,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl ViewerRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// True when the header is present with a non-empty value.
    pub fn has_header_value(&self, name: &str) -> bool {
        self.header(name).is_some_and(|value| !value.is_empty())
    }

    /// Set a header, reusing the existing entry's spelling when one matches.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let key = self
            .headers
            .keys()
            .find(|key| key.eq_ignore_ascii_case(&name))
            .cloned()
            .unwrap_or(name);
        self.headers.insert(key, value.into());
    }
}

/// Hook run on every outgoing request before it is sent.
pub type RequestInterceptor = Arc<dyn Fn(ViewerRequest) -> ViewerRequest + Send + Sync>;

/// Fill the API key header when it is missing or empty.
///
/// An explicit value is never replaced.
pub fn inject_api_key(mut request: ViewerRequest, api_key: &str) -> ViewerRequest {
    if !request.has_header_value(API_KEY_HEADER) {
        request.set_header(API_KEY_HEADER, api_key);
    }
    request
}

/// Interceptor bound to the resolved API key.
pub fn api_key_interceptor(api_key: impl Into<String>) -> RequestInterceptor {
    let api_key = api_key.into();
    Arc::new(move |request| inject_api_key(request, &api_key))
}
