//! Persisted authorizations.
//!
//! With `persist_authorization` on, authorized schemes survive across runs
//! in `~/.controlplane-docs/authorizations.json` (or a custom cache
//! directory), keyed by the URL of the document they belong to.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default cache directory name under the home directory
pub const DEFAULT_CACHE_DIR_NAME: &str = ".controlplane-docs";

const AUTHORIZATIONS_FILE: &str = "authorizations.json";

/// An authorized security scheme.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    pub scheme: String,
    pub value: String,
    /// RFC 3339 timestamp
    pub authorized_at: String,
}

impl Authorization {
    pub fn new(scheme: &str, value: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            value: value.to_string(),
            authorized_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl std::fmt::Debug for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorization")
            .field("scheme", &self.scheme)
            .field("value", &"[REDACTED]")
            .field("authorized_at", &self.authorized_at)
            .finish()
    }
}

pub type Authorizations = BTreeMap<String, Authorization>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct AuthorizationsFile {
    #[serde(default)]
    documents: BTreeMap<String, Authorizations>,
}

/// File-backed authorization store.
#[derive(Debug, Clone)]
pub struct AuthorizationStore {
    path: PathBuf,
}

impl AuthorizationStore {
    /// Create a store in `cache_dir`, defaulting to `~/.controlplane-docs`.
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        let base_dir = match cache_dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .context("Could not determine home directory")?
                .join(DEFAULT_CACHE_DIR_NAME),
        };

        std::fs::create_dir_all(&base_dir)
            .with_context(|| format!("Failed to create cache directory: {:?}", base_dir))?;

        Ok(Self {
            path: base_dir.join(AUTHORIZATIONS_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<AuthorizationsFile> {
        if !self.path.exists() {
            return Ok(AuthorizationsFile::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read authorizations file: {:?}", self.path))?;

        serde_json::from_str(&content).context("Failed to parse authorizations JSON")
    }

    fn write_file(&self, file: &AuthorizationsFile) -> Result<()> {
        let content =
            serde_json::to_string_pretty(file).context("Failed to serialize authorizations")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write authorizations file: {:?}", self.path))?;

        debug!("Authorizations saved to {:?}", self.path);
        Ok(())
    }

    /// Authorizations stored for a document.
    pub fn load(&self, document_url: &str) -> Result<Authorizations> {
        let mut file = self.read_file()?;
        Ok(file.documents.remove(document_url).unwrap_or_default())
    }

    /// Replace the authorizations stored for a document.
    pub fn save(&self, document_url: &str, authorizations: &Authorizations) -> Result<()> {
        let mut file = self.read_file().unwrap_or_else(|e| {
            debug!("Discarding unreadable authorizations file: {}", e);
            AuthorizationsFile::default()
        });
        if authorizations.is_empty() {
            file.documents.remove(document_url);
        } else {
            file.documents
                .insert(document_url.to_string(), authorizations.clone());
        }
        self.write_file(&file)
    }
}
