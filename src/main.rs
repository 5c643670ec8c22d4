use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

mod api;
mod cli;
mod command;
mod explorer;
mod page;
mod runtime;
mod startup;
mod viewer;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let origin = Url::parse(&cli.base_url)
        .with_context(|| format!("Invalid control plane URL: {}", cli.base_url))?;

    // The page loads once; everything else works on what it published.
    let session = startup::on_page_load(origin, cli.cache_dir).await?;

    match cli.command.unwrap_or(Commands::Show { link: None }) {
        Commands::Show { link } => command::run_show(&session, link.as_deref())?,
        Commands::Status => command::run_status(&session)?,
        Commands::Try {
            method,
            path,
            headers,
            data,
        } => command::run_try(&method, &path, &headers, data).await?,
    }

    Ok(())
}
