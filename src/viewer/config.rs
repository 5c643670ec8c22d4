//! Fixed viewer configuration.

use super::request::{RequestInterceptor, ViewerRequest};
use super::ViewerError;

/// Where the viewer fetches its own configuration and the API document location.
pub const DEFAULT_CONFIG_URL: &str = "/v3/api-docs/swagger-config";

/// Page element the viewer renders into.
pub const DEFAULT_DOM_ID: &str = "#swagger-ui";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Operation, model and authorization components
    Apis,
    /// Top bar and the standalone layout
    Standalone,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Apis => "apis",
            Preset::Standalone => "standalone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plugin {
    /// Downloads the API document from the configured URL
    DownloadUrl,
}

impl Plugin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plugin::DownloadUrl => "DownloadUrl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    BaseLayout,
    StandaloneLayout,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::BaseLayout => "BaseLayout",
            Layout::StandaloneLayout => "StandaloneLayout",
        }
    }

    /// Preset that has to be loaded for this layout to exist.
    fn required_preset(&self) -> Preset {
        match self {
            Layout::BaseLayout => Preset::Apis,
            Layout::StandaloneLayout => Preset::Standalone,
        }
    }
}

/// Immutable viewer configuration, built once per page load.
#[derive(Clone)]
pub struct ViewerConfig {
    pub config_url: String,
    pub dom_id: String,
    pub deep_linking: bool,
    pub persist_authorization: bool,
    pub request_interceptor: Option<RequestInterceptor>,
    pub presets: Vec<Preset>,
    pub plugins: Vec<Plugin>,
    pub layout: Layout,
}

impl ViewerConfig {
    /// The control plane documentation page configuration.
    pub fn control_plane(request_interceptor: RequestInterceptor) -> Self {
        Self {
            config_url: DEFAULT_CONFIG_URL.to_string(),
            dom_id: DEFAULT_DOM_ID.to_string(),
            deep_linking: true,
            persist_authorization: true,
            request_interceptor: Some(request_interceptor),
            presets: vec![Preset::Apis, Preset::Standalone],
            plugins: vec![Plugin::DownloadUrl],
            layout: Layout::StandaloneLayout,
        }
    }

    pub fn has_preset(&self, preset: Preset) -> bool {
        self.presets.contains(&preset)
    }

    pub fn has_plugin(&self, plugin: Plugin) -> bool {
        self.plugins.contains(&plugin)
    }

    /// Check that the configured layout and components can actually be built.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.config_url.trim().is_empty() {
            return Err(ViewerError::InvalidSource {
                url: self.config_url.clone(),
                reason: "documentation source is empty".to_string(),
            });
        }

        for preset in [Preset::Apis, self.layout.required_preset()] {
            if !self.has_preset(preset) {
                return Err(ViewerError::MissingPreset {
                    layout: self.layout.as_str(),
                    preset: preset.as_str(),
                });
            }
        }

        Ok(())
    }

    /// Run the request interceptor, if any.
    pub fn intercept(&self, request: ViewerRequest) -> ViewerRequest {
        match &self.request_interceptor {
            Some(interceptor) => interceptor(request),
            None => request,
        }
    }
}

impl std::fmt::Debug for ViewerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerConfig")
            .field("config_url", &self.config_url)
            .field("dom_id", &self.dom_id)
            .field("deep_linking", &self.deep_linking)
            .field("persist_authorization", &self.persist_authorization)
            .field(
                "request_interceptor",
                &self.request_interceptor.as_ref().map(|_| "<fn>"),
            )
            .field("presets", &self.presets)
            .field("plugins", &self.plugins)
            .field("layout", &self.layout)
            .finish()
    }
}
