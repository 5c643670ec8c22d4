use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Control plane the explorer targets when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Control plane API documentation explorer
#[derive(Debug, Parser)]
#[command(name = "controlplane-docs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Control plane base URL
    #[arg(long, env = "CONTROL_PLANE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Directory for persisted authorizations. Defaults to ~/.controlplane-docs
    #[arg(long, env = "CONTROL_PLANE_DOCS_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Render the API documentation (default)
    Show {
        /// Deep link of one operation, e.g. '#/rate-limit-rule-controller/listRules'
        link: Option<String>,
    },
    /// Show the resolved key, viewer configuration and authorizations
    Status,
    /// Send a "try it out" request through the explorer
    Try {
        /// HTTP method, e.g. GET
        method: String,

        /// Path on the documented server, e.g. /api/rules
        path: String,

        /// Extra header as 'Name: value' (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short, long)]
        data: Option<String>,
    },
}
