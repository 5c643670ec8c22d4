//! Documentation viewer contract.
//!
//! The bootstrap only relies on what is declared here: a fixed
//! configuration, a request interceptor, a factory that builds a viewer
//! into a page, and the pre-authorization capability of the built viewer.

mod config;
mod request;

pub use config::{Layout, Plugin, ViewerConfig, DEFAULT_DOM_ID};
pub use request::{api_key_interceptor, ViewerRequest, API_KEY_HEADER};

use crate::page::Page;

/// Errors raised while constructing a viewer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("mount point {0} does not exist on the page")]
    MountNotFound(String),

    #[error("layout {layout} requires the {preset} preset")]
    MissingPreset {
        layout: &'static str,
        preset: &'static str,
    },

    #[error("invalid documentation source {url}: {reason}")]
    InvalidSource { url: String, reason: String },
}

/// A live documentation viewer.
pub trait DocumentationViewer {
    /// Mark an API key security scheme as authorized with `key`.
    ///
    /// Returns false when the scheme is unknown to the loaded document.
    fn preauthorize_api_key(&self, scheme: &str, key: &str) -> bool;
}

/// Builds a viewer from its configuration and renders it into the page.
pub trait ViewerFactory {
    type Viewer: DocumentationViewer;

    async fn create(&self, config: ViewerConfig, page: &Page)
        -> Result<Self::Viewer, ViewerError>;
}
