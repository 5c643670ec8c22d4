//! Page-load initialization.
//!
//! `on_page_load` is the single entry point: it builds the page for the
//! control plane origin and runs the bootstrap against the process-wide
//! viewer slot. Key lookup problems are absorbed by the fallback key; a
//! viewer that cannot be constructed is fatal.

mod bootstrap;

pub use bootstrap::BootstrapStage;

use bootstrap::Bootstrap;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use url::Url;

use crate::api::{ApiClient, ResolvedApiKey};
use crate::explorer::{ApiExplorer, ApiExplorerFactory};
use crate::page::Page;
use crate::runtime;

/// What a finished page load leaves behind.
pub struct PageSession {
    pub page: Page,
    pub ui: &'static ApiExplorer,
    pub api_key: ResolvedApiKey,
    pub stage: BootstrapStage,
}

/// Run the bootstrap for the control plane at `origin`.
pub async fn on_page_load(origin: Url, cache_dir: Option<PathBuf>) -> Result<PageSession> {
    let client = Arc::new(ApiClient::new(origin.clone())?);
    let page = Page::new(origin);
    let factory = ApiExplorerFactory::new(client.clone(), cache_dir);

    let (ui, api_key, stage) = {
        let mut bootstrap = Bootstrap::new(&client, factory, &page);
        let ui = bootstrap
            .run(runtime::ui_slot())
            .await
            .context("Documentation page failed to load")?;
        let api_key = bootstrap
            .api_key()
            .cloned()
            .context("Bootstrap finished without an API key")?;
        (ui, api_key, bootstrap.stage())
    };

    Ok(PageSession {
        page,
        ui,
        api_key,
        stage,
    })
}
