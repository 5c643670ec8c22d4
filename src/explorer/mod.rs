//! Terminal API explorer: the documentation viewer used by the CLI.
//!
//! The explorer downloads the Swagger UI configuration from the configured
//! documentation source, follows it to the OpenAPI document, renders the
//! operations into its mount element, and sends "try it out" requests with
//! authorized schemes and the request interceptor applied.

mod authorizations;
mod document;
mod render;

pub use authorizations::{Authorization, AuthorizationStore, Authorizations};
pub use document::{ApiDocument, Operation};
pub use render::deep_link;

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use reqwest::Method;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{ApiClient, SwaggerUiConfig, TryItOutResponse};
use crate::page::{Mount, Page};
use crate::viewer::{
    DocumentationViewer, Plugin, ViewerConfig, ViewerError, ViewerFactory, ViewerRequest,
};

/// What the explorer knows about its API document.
#[derive(Debug)]
enum DocumentState {
    /// No document location to download from
    NotProvided,
    Loaded { url: Url, document: ApiDocument },
    Failed { url: Url, reason: String },
}

/// A "try it out" request as entered by the user.
#[derive(Debug, Clone)]
pub struct TryItOut {
    pub method: Method,
    /// Path relative to the documented server, or an absolute URL
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl TryItOut {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

pub struct ApiExplorer {
    config: ViewerConfig,
    client: Arc<ApiClient>,
    origin: Url,
    mount: Mount,
    state: DocumentState,
    authorizations: RwLock<Authorizations>,
    store: Option<AuthorizationStore>,
}

impl ApiExplorer {
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn mount_id(&self) -> &str {
        self.mount.id()
    }

    pub fn document(&self) -> Option<&ApiDocument> {
        match &self.state {
            DocumentState::Loaded { document, .. } => Some(document),
            _ => None,
        }
    }

    pub fn document_url(&self) -> Option<&Url> {
        match &self.state {
            DocumentState::Loaded { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn load_error(&self) -> Option<&str> {
        match &self.state {
            DocumentState::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.document()
            .map(ApiDocument::operations)
            .unwrap_or_default()
    }

    /// Deep link for an operation, `None` when deep linking is off.
    pub fn deep_link(&self, operation: &Operation) -> Option<String> {
        self.config.deep_linking.then(|| deep_link(operation))
    }

    pub fn find_by_deep_link(&self, link: &str) -> Option<Operation> {
        if !self.config.deep_linking {
            return None;
        }
        self.operations()
            .into_iter()
            .find(|operation| deep_link(operation) == link)
    }

    /// File authorizations are persisted to, when persistence is on.
    pub fn authorizations_path(&self) -> Option<&Path> {
        self.store.as_ref().map(AuthorizationStore::path)
    }

    fn authorizations(&self) -> Authorizations {
        self.authorizations
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn authorized_schemes(&self) -> Vec<String> {
        self.authorizations().into_keys().collect()
    }

    pub fn is_authorized(&self, scheme: &str) -> bool {
        self.authorizations().contains_key(scheme)
    }

    fn render(&self) {
        let content = render::render(&self.config, &self.state, &self.authorizations());
        self.mount.render(content);
    }

    fn persist(&self, authorizations: &Authorizations) {
        let (Some(store), Some(url)) = (&self.store, self.document_url()) else {
            return;
        };
        if let Err(e) = store.save(url.as_str(), authorizations) {
            warn!("Failed to persist authorizations: {:#}", e);
        }
    }

    /// Base URL "try it out" paths are appended to.
    ///
    /// The first documented server, resolved against the document URL,
    /// otherwise the page origin.
    fn server_url(&self) -> Url {
        if let DocumentState::Loaded { url, document } = &self.state {
            if let Some(server) = document.servers.first() {
                match url.join(&server.url) {
                    Ok(resolved) => return resolved,
                    Err(e) => warn!("Ignoring invalid server URL {}: {}", server.url, e),
                }
            }
        }
        self.origin.clone()
    }

    fn request_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path).with_context(|| format!("Invalid request URL: {}", path));
        }
        let base = self.server_url();
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).with_context(|| format!("Invalid request path: {}", path))
    }

    /// Build the request that would be sent for `try_it`.
    ///
    /// Explicit headers go in first, then authorized API key schemes required
    /// by the matching operation (or the whole document) fill headers that are
    /// still empty, then the request interceptor runs.
    pub fn build_request(&self, try_it: &TryItOut) -> Result<ViewerRequest> {
        let url = self.request_url(&try_it.path)?;
        let operation = self.document().and_then(|document| {
            let server_path = self.server_url().path().trim_end_matches('/').to_string();
            let path = url.path().strip_prefix(&server_path).unwrap_or(url.path());
            document.find_operation(&try_it.method, path)
        });
        if let Some(operation) = &operation {
            debug!("{} {} -> {}", try_it.method, url.path(), operation.effective_id());
        }

        let mut request = ViewerRequest::new(try_it.method.clone(), url);
        for (name, value) in &try_it.headers {
            request.set_header(name.as_str(), value.as_str());
        }
        request.body = try_it.body.clone();

        if let Some(document) = self.document() {
            let authorizations = self.authorizations();
            for name in document.schemes_for(operation.as_ref()) {
                let (Some(auth), Some(header)) = (
                    authorizations.get(name),
                    document
                        .security_scheme(name)
                        .and_then(|scheme| scheme.api_key_header()),
                ) else {
                    continue;
                };
                if !request.has_header_value(header) {
                    request.set_header(header, auth.value.as_str());
                }
            }
        }

        Ok(self.config.intercept(request))
    }

    /// Send a "try it out" request.
    pub async fn execute(&self, try_it: TryItOut) -> Result<TryItOutResponse> {
        let request = self.build_request(&try_it)?;
        self.client.send(&request).await
    }
}

impl DocumentationViewer for ApiExplorer {
    fn preauthorize_api_key(&self, scheme: &str, key: &str) -> bool {
        let Some(document) = self.document() else {
            warn!("Cannot pre-authorize {}: no API definition is loaded", scheme);
            return false;
        };

        match document.security_scheme(scheme) {
            Some(declared) if declared.is_api_key() => {}
            Some(declared) => {
                warn!(
                    "Security scheme {} is of type {}, not apiKey",
                    scheme, declared.kind
                );
                return false;
            }
            None => {
                warn!(
                    "Security scheme {} is not declared by the API definition",
                    scheme
                );
                return false;
            }
        }

        let snapshot = {
            let mut authorizations = self
                .authorizations
                .write()
                .unwrap_or_else(|e| e.into_inner());
            authorizations.insert(scheme.to_string(), Authorization::new(scheme, key));
            authorizations.clone()
        };

        if self.config.persist_authorization {
            self.persist(&snapshot);
        }
        self.render();

        info!("🔑 Pre-authorized security scheme {}", scheme);
        true
    }
}

impl std::fmt::Debug for ApiExplorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiExplorer")
            .field("config", &self.config)
            .field("mount", &self.mount.id())
            .field("state", &self.state)
            .field("authorized", &self.authorized_schemes())
            .finish()
    }
}

/// Builds [`ApiExplorer`]s against one control plane.
pub struct ApiExplorerFactory {
    client: Arc<ApiClient>,
    cache_dir: Option<PathBuf>,
}

impl ApiExplorerFactory {
    pub fn new(client: Arc<ApiClient>, cache_dir: Option<PathBuf>) -> Self {
        Self { client, cache_dir }
    }
}

impl ViewerFactory for ApiExplorerFactory {
    type Viewer = ApiExplorer;

    async fn create(&self, config: ViewerConfig, page: &Page) -> Result<ApiExplorer, ViewerError> {
        config.validate()?;

        let mount = page
            .mount(&config.dom_id)
            .ok_or_else(|| ViewerError::MountNotFound(config.dom_id.clone()))?;

        let config_url = page
            .resolve(&config.config_url)
            .map_err(|e| ViewerError::InvalidSource {
                url: config.config_url.clone(),
                reason: e.to_string(),
            })?;

        let state = if config.has_plugin(Plugin::DownloadUrl) {
            load_document(&self.client, config_url).await
        } else {
            debug!("DownloadUrl plugin not configured, skipping document download");
            DocumentState::NotProvided
        };

        let store = if config.persist_authorization {
            match AuthorizationStore::new(self.cache_dir.clone()) {
                Ok(store) => Some(store),
                Err(e) => {
                    warn!("Authorization persistence unavailable: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        let authorizations = match (&store, &state) {
            (Some(store), DocumentState::Loaded { url, .. }) => {
                store.load(url.as_str()).unwrap_or_else(|e| {
                    warn!("Failed to restore authorizations: {:#}", e);
                    Authorizations::new()
                })
            }
            _ => Authorizations::new(),
        };
        if !authorizations.is_empty() {
            debug!("Restored {} authorization(s)", authorizations.len());
        }

        let explorer = ApiExplorer {
            config,
            client: self.client.clone(),
            origin: page.origin().clone(),
            mount,
            state,
            authorizations: RwLock::new(authorizations),
            store,
        };
        explorer.render();

        info!("📘 Documentation viewer mounted at {}", explorer.mount_id());
        Ok(explorer)
    }
}

/// Follow the Swagger UI configuration to the API document.
///
/// Failures are captured in the returned state so they can be rendered.
async fn load_document(client: &ApiClient, config_url: Url) -> DocumentState {
    let ui_config: SwaggerUiConfig = match client.get_json(config_url.clone()).await {
        Ok(ui_config) => ui_config,
        Err(e) => {
            warn!("Failed to load Swagger UI configuration: {:#}", e);
            return DocumentState::Failed {
                url: config_url,
                reason: format!("{:#}", e),
            };
        }
    };

    let Some(document_path) = ui_config.document_url() else {
        warn!("Swagger UI configuration at {} names no document", config_url);
        return DocumentState::NotProvided;
    };

    let document_url = match config_url.join(document_path) {
        Ok(url) => url,
        Err(e) => {
            return DocumentState::Failed {
                url: config_url,
                reason: format!("Invalid document URL {}: {}", document_path, e),
            };
        }
    };

    match client.get_json::<ApiDocument>(document_url.clone()).await {
        Ok(document) => {
            debug!(
                "Loaded {} ({} operations) from {}",
                document.info.title,
                document.operations().len(),
                document_url
            );
            DocumentState::Loaded {
                url: document_url,
                document,
            }
        }
        Err(e) => {
            warn!("Failed to load API definition: {:#}", e);
            DocumentState::Failed {
                url: document_url,
                reason: format!("{:#}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::document::fixtures::CONTROL_PLANE_DOCUMENT;
    use super::*;
    use crate::viewer::{api_key_interceptor, Layout, API_KEY_HEADER};
    use tempfile::{tempdir, TempDir};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn control_plane() -> MockServer {
        serve_document(CONTROL_PLANE_DOCUMENT.to_string()).await
    }

    async fn serve_document(document: String) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/api-docs/swagger-config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "configUrl": "/v3/api-docs/swagger-config",
                "url": "/v3/api-docs",
                "validatorUrl": ""
            })))
            .mount(&server)
            .await;
        let document = document.replace("http://localhost:8080", &server.uri());
        Mock::given(method("GET"))
            .and(path("/v3/api-docs"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(document, "application/json"))
            .mount(&server)
            .await;
        server
    }

    fn page_for(server: &MockServer) -> Page {
        Page::new(Url::parse(&server.uri()).unwrap())
    }

    fn factory_for(server: &MockServer, cache: &TempDir) -> ApiExplorerFactory {
        let client = ApiClient::new(Url::parse(&server.uri()).unwrap()).unwrap();
        ApiExplorerFactory::new(Arc::new(client), Some(cache.path().to_path_buf()))
    }

    fn config(key: &str) -> ViewerConfig {
        ViewerConfig::control_plane(api_key_interceptor(key))
    }

    #[tokio::test]
    async fn test_create_renders_into_mount() {
        let server = control_plane().await;
        let cache = tempdir().unwrap();
        let page = page_for(&server);

        let explorer = factory_for(&server, &cache)
            .create(config("k"), &page)
            .await
            .unwrap();

        assert_eq!(explorer.document().unwrap().info.title, "Egress Control Plane API");
        assert_eq!(explorer.operations().len(), 4);
        let content = page.content("#swagger-ui").unwrap();
        assert!(content.contains("Egress Control Plane API"));
        assert!(content.contains("[not authorized]"));
    }

    #[tokio::test]
    async fn test_create_fails_without_mount() {
        let server = control_plane().await;
        let cache = tempdir().unwrap();
        let page = Page::empty(Url::parse(&server.uri()).unwrap());

        let err = factory_for(&server, &cache)
            .create(config("k"), &page)
            .await
            .unwrap_err();
        assert!(matches!(err, ViewerError::MountNotFound(id) if id == "#swagger-ui"));
    }

    #[tokio::test]
    async fn test_create_fails_on_invalid_layout() {
        let server = control_plane().await;
        let cache = tempdir().unwrap();
        let mut config = config("k");
        // Standalone layout without the standalone preset
        config.presets.truncate(1);

        let err = factory_for(&server, &cache)
            .create(config, &page_for(&server))
            .await
            .unwrap_err();
        assert!(matches!(err, ViewerError::MissingPreset { .. }));
    }

    #[tokio::test]
    async fn test_load_failure_is_rendered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/api-docs/swagger-config"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let cache = tempdir().unwrap();
        let page = page_for(&server);

        let explorer = factory_for(&server, &cache)
            .create(config("k"), &page)
            .await
            .unwrap();

        assert!(explorer.document().is_none());
        assert!(explorer.load_error().unwrap().contains("404"));
        assert!(page
            .content("#swagger-ui")
            .unwrap()
            .contains("Failed to load API definition."));
        assert!(!explorer.preauthorize_api_key("apiKey", "k"));
    }

    #[tokio::test]
    async fn test_without_download_plugin_nothing_is_fetched() {
        let server = MockServer::start().await;
        let cache = tempdir().unwrap();
        let page = page_for(&server);
        let mut config = config("k");
        config.plugins.clear();
        config.layout = Layout::BaseLayout;

        let explorer = factory_for(&server, &cache)
            .create(config, &page)
            .await
            .unwrap();

        assert!(explorer.document().is_none());
        assert_eq!(
            page.content("#swagger-ui").unwrap(),
            "No API definition provided.\n"
        );
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preauthorize_declared_scheme() {
        let server = control_plane().await;
        let cache = tempdir().unwrap();
        let page = page_for(&server);
        let explorer = factory_for(&server, &cache)
            .create(config("k"), &page)
            .await
            .unwrap();

        assert!(explorer.preauthorize_api_key("apiKey", "abc123"));
        assert!(explorer.is_authorized("apiKey"));
        assert_eq!(explorer.authorized_schemes(), vec!["apiKey".to_string()]);
        assert!(page.content("#swagger-ui").unwrap().contains("[authorized]"));
    }

    #[tokio::test]
    async fn test_preauthorize_unknown_scheme_is_noop() {
        let server = control_plane().await;
        let cache = tempdir().unwrap();
        let explorer = factory_for(&server, &cache)
            .create(config("k"), &page_for(&server))
            .await
            .unwrap();

        assert!(!explorer.preauthorize_api_key("bearerAuth", "abc123"));
        assert!(explorer.authorized_schemes().is_empty());
    }

    #[tokio::test]
    async fn test_persisted_authorization_is_restored() {
        let server = control_plane().await;
        let cache = tempdir().unwrap();

        let first = factory_for(&server, &cache)
            .create(config("k"), &page_for(&server))
            .await
            .unwrap();
        assert!(first.preauthorize_api_key("apiKey", "abc123"));
        assert_eq!(
            first.authorizations_path(),
            Some(cache.path().join("authorizations.json").as_path())
        );

        let second = factory_for(&server, &cache)
            .create(config("k"), &page_for(&server))
            .await
            .unwrap();
        assert!(second.is_authorized("apiKey"));
    }

    #[tokio::test]
    async fn test_no_persistence_when_disabled() {
        let server = control_plane().await;
        let cache = tempdir().unwrap();
        let mut config = config("k");
        config.persist_authorization = false;

        let explorer = factory_for(&server, &cache)
            .create(config, &page_for(&server))
            .await
            .unwrap();
        assert!(explorer.preauthorize_api_key("apiKey", "abc123"));
        assert!(explorer.authorizations_path().is_none());
        assert!(!cache.path().join("authorizations.json").exists());
    }

    #[tokio::test]
    async fn test_deep_links() {
        let server = control_plane().await;
        let cache = tempdir().unwrap();
        let explorer = factory_for(&server, &cache)
            .create(config("k"), &page_for(&server))
            .await
            .unwrap();

        let found = explorer
            .find_by_deep_link("#/rate-limit-rule-controller/deleteRule")
            .unwrap();
        assert_eq!(found.method, Method::DELETE);
        assert_eq!(found.path, "/api/rules/{id}");
        assert_eq!(
            explorer.deep_link(&found).as_deref(),
            Some("#/rate-limit-rule-controller/deleteRule")
        );
        assert!(explorer.find_by_deep_link("#/nope/nothing").is_none());
    }

    #[tokio::test]
    async fn test_build_request_uses_authorized_key() {
        let server = control_plane().await;
        let cache = tempdir().unwrap();
        let explorer = factory_for(&server, &cache)
            .create(config("interceptor-key"), &page_for(&server))
            .await
            .unwrap();
        explorer.preauthorize_api_key("apiKey", "abc123");

        let request = explorer
            .build_request(&TryItOut::new(Method::GET, "/api/rules"))
            .unwrap();
        assert_eq!(request.url.as_str(), format!("{}/api/rules", server.uri()));
        assert_eq!(request.header(API_KEY_HEADER), Some("abc123"));

        let try_it = TryItOut::new(Method::GET, "api/rules").with_header("x-api-key", "custom");
        let request = explorer.build_request(&try_it).unwrap();
        assert_eq!(request.header(API_KEY_HEADER), Some("custom"));
    }

    #[tokio::test]
    async fn test_interceptor_fills_key_without_authorization() {
        let server = control_plane().await;
        let cache = tempdir().unwrap();
        let explorer = factory_for(&server, &cache)
            .create(config("interceptor-key"), &page_for(&server))
            .await
            .unwrap();

        let request = explorer
            .build_request(&TryItOut::new(Method::GET, "/api/rules"))
            .unwrap();
        assert_eq!(request.header(API_KEY_HEADER), Some("interceptor-key"));
    }

    #[tokio::test]
    async fn test_execute_sends_key() {
        let server = control_plane().await;
        Mock::given(method("POST"))
            .and(path("/api/rules"))
            .and(header("X-API-KEY", "abc123"))
            .respond_with(ResponseTemplate::new(201).set_body_string("{\"id\":1}"))
            .mount(&server)
            .await;
        let cache = tempdir().unwrap();
        let explorer = factory_for(&server, &cache)
            .create(config("abc123"), &page_for(&server))
            .await
            .unwrap();

        let response = explorer
            .execute(TryItOut::new(Method::POST, "/api/rules").with_body("{}"))
            .await
            .unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, "{\"id\":1}");
    }

    #[tokio::test]
    async fn test_build_request_follows_operation_security() {
        let mut document: serde_json::Value = serde_json::from_str(CONTROL_PLANE_DOCUMENT).unwrap();
        document["components"]["securitySchemes"]["adminKey"] = serde_json::json!({
            "type": "apiKey",
            "in": "header",
            "name": "X-ADMIN-KEY"
        });
        document["paths"]["/api/rules/{id}"]["delete"]["security"] =
            serde_json::json!([{ "adminKey": [] }]);
        document["paths"]["/api/ping"]["get"]["security"] = serde_json::json!([]);

        let server = serve_document(document.to_string()).await;
        let cache = tempdir().unwrap();
        let explorer = factory_for(&server, &cache)
            .create(config("interceptor-key"), &page_for(&server))
            .await
            .unwrap();
        assert!(explorer.preauthorize_api_key("apiKey", "abc123"));
        assert!(explorer.preauthorize_api_key("adminKey", "admin-secret"));

        let delete = explorer
            .build_request(&TryItOut::new(Method::DELETE, "/api/rules/7"))
            .unwrap();
        assert_eq!(delete.header("X-ADMIN-KEY"), Some("admin-secret"));
        assert_eq!(delete.header(API_KEY_HEADER), Some("interceptor-key"));

        let list = explorer
            .build_request(&TryItOut::new(Method::GET, "/api/rules"))
            .unwrap();
        assert_eq!(list.header(API_KEY_HEADER), Some("abc123"));
        assert_eq!(list.header("X-ADMIN-KEY"), None);

        let ping = explorer
            .build_request(&TryItOut::new(Method::GET, "/api/ping"))
            .unwrap();
        assert_eq!(ping.header(API_KEY_HEADER), Some("interceptor-key"));
        assert_eq!(ping.header("X-ADMIN-KEY"), None);
    }

    #[tokio::test]
    async fn test_unmatched_path_uses_document_security() {
        let server = control_plane().await;
        let cache = tempdir().unwrap();
        let explorer = factory_for(&server, &cache)
            .create(config("interceptor-key"), &page_for(&server))
            .await
            .unwrap();
        explorer.preauthorize_api_key("apiKey", "abc123");

        let request = explorer
            .build_request(&TryItOut::new(Method::GET, "/api/undocumented"))
            .unwrap();
        assert_eq!(request.header(API_KEY_HEADER), Some("abc123"));
    }
}
