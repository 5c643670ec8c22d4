//! Page-load bootstrap of the documentation viewer.
//!
//! The sequence runs once per page:
//! ```text
//! resolve API key        // endpoint, or the fallback key
//! construct viewer       // fixed config, interceptor bound to the key
//! pre-authorize          // security scheme "apiKey" with the key
//! publish                // write-once slot
//! ```
//!
//! Key resolution never fails. A viewer construction failure ends the run
//! and nothing is published.

use tracing::{debug, error, info};

use crate::api::{ApiClient, ResolvedApiKey};
use crate::page::Page;
use crate::runtime::ViewerSlot;
use crate::viewer::{
    api_key_interceptor, DocumentationViewer, ViewerConfig, ViewerError, ViewerFactory,
};

/// Security scheme declared by the control plane API document.
pub const SECURITY_SCHEME: &str = "apiKey";

/// Error types for the bootstrap sequence
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The page already ran (or is running) its bootstrap
    #[error("the documentation viewer bootstrap already ran for this page")]
    AlreadyStarted,

    /// The viewer could not be built from its configuration
    #[error("failed to construct documentation viewer: {0}")]
    ViewerConstruction(#[from] ViewerError),

    /// Another viewer was published while this one was being built
    #[error("a documentation viewer is already published")]
    AlreadyPublished,
}

/// Bootstrap progress. Stages only move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum BootstrapStage {
    #[default]
    Uninitialized,
    KeyResolving,
    KeyResolved,
    ViewerConstructed,
    PreAuthorized,
    Published,
}

impl BootstrapStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BootstrapStage::Uninitialized => "uninitialized",
            BootstrapStage::KeyResolving => "key resolving",
            BootstrapStage::KeyResolved => "key resolved",
            BootstrapStage::ViewerConstructed => "viewer constructed",
            BootstrapStage::PreAuthorized => "pre-authorized",
            BootstrapStage::Published => "published",
        }
    }
}

/// Bootstrap context for one page.
///
/// # Example
/// ```ignore
/// let mut bootstrap = Bootstrap::new(&client, factory, &page);
/// let ui = bootstrap.run(runtime::ui_slot()).await?;
/// ```
pub struct Bootstrap<'a, F> {
    client: &'a ApiClient,
    factory: F,
    page: &'a Page,
    stage: BootstrapStage,
    api_key: Option<ResolvedApiKey>,
}

impl<'a, F> Bootstrap<'a, F>
where
    F: ViewerFactory,
{
    pub fn new(client: &'a ApiClient, factory: F, page: &'a Page) -> Self {
        Self {
            client,
            factory,
            page,
            stage: BootstrapStage::Uninitialized,
            api_key: None,
        }
    }

    pub fn stage(&self) -> BootstrapStage {
        self.stage
    }

    /// The key resolved by this run, once resolution finished.
    pub fn api_key(&self) -> Option<&ResolvedApiKey> {
        self.api_key.as_ref()
    }

    fn advance(&mut self, next: BootstrapStage) {
        debug_assert!(next > self.stage, "bootstrap stages never regress");
        debug!("Bootstrap: {} -> {}", self.stage.as_str(), next.as_str());
        self.stage = next;
    }

    /// Run the whole sequence and publish the viewer into `slot`.
    pub async fn run<'s>(
        &mut self,
        slot: &'s ViewerSlot<F::Viewer>,
    ) -> Result<&'s F::Viewer, BootstrapError> {
        if !slot.begin() {
            return Err(BootstrapError::AlreadyStarted);
        }

        self.advance(BootstrapStage::KeyResolving);
        let api_key = self.client.resolve_api_key().await;
        info!(
            "🔑 Using API key {} ({})",
            api_key.masked(),
            api_key.source().as_str()
        );
        self.api_key = Some(api_key.clone());
        self.advance(BootstrapStage::KeyResolved);

        let config = ViewerConfig::control_plane(api_key_interceptor(api_key.as_str()));
        let viewer = self.factory.create(config, self.page).await.map_err(|e| {
            error!("❌ Documentation viewer could not be constructed: {}", e);
            BootstrapError::from(e)
        })?;
        self.advance(BootstrapStage::ViewerConstructed);

        viewer.preauthorize_api_key(SECURITY_SCHEME, api_key.as_str());
        self.advance(BootstrapStage::PreAuthorized);

        let published = slot
            .publish(viewer)
            .map_err(|_| BootstrapError::AlreadyPublished)?;
        self.advance(BootstrapStage::Published);

        info!("✅ Documentation viewer ready");
        Ok(published)
    }
}
