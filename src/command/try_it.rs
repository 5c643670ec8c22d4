use anyhow::{Context, Result};
use reqwest::Method;

use crate::cli::parse_header;
use crate::explorer::TryItOut;
use crate::runtime;

/// Send a request through the published viewer.
pub async fn run_try(
    method: &str,
    path: &str,
    headers: &[String],
    data: Option<String>,
) -> Result<()> {
    let ui = runtime::ui().context("Documentation viewer is not initialized")?;

    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method: {}", method))?;
    let mut try_it = TryItOut::new(method, path);
    for raw in headers {
        let (name, value) = parse_header(raw)?;
        try_it = try_it.with_header(name, value);
    }
    if let Some(body) = data {
        try_it = try_it.with_body(body);
    }

    let response = ui.execute(try_it).await?;

    if response.is_success() {
        println!("✅ HTTP {}", response.status);
    } else {
        println!("❌ HTTP {}", response.status);
    }
    for (name, value) in &response.headers {
        println!("{}: {}", name, value);
    }
    if !response.body.is_empty() {
        println!("\n{}", response.body);
    }

    Ok(())
}
