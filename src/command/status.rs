use anyhow::Result;

use crate::api::{KeySource, API_KEY_ENDPOINT};
use crate::startup::PageSession;
use crate::viewer::API_KEY_HEADER;

pub fn run_status(session: &PageSession) -> Result<()> {
    let ui = session.ui;
    let config = ui.config();

    println!("✅ Documentation viewer {}", session.stage.as_str());
    println!("   Page: {}", session.page.origin());
    match session.api_key.source() {
        KeySource::Endpoint => println!(
            "   API key: {} (from {})",
            session.api_key.masked(),
            API_KEY_ENDPOINT
        ),
        KeySource::Fallback => println!(
            "   API key: {} (fallback, {} did not provide one)",
            session.api_key.masked(),
            API_KEY_ENDPOINT
        ),
    }
    if config.request_interceptor.is_some() {
        println!("   Interceptor: fills {} when a request has none", API_KEY_HEADER);
    }

    println!("   Source: {}", config.config_url);
    println!("   Mount: {}", config.dom_id);
    println!("   Layout: {}", config.layout.as_str());
    println!(
        "   Presets: {}",
        config
            .presets
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "   Plugins: {}",
        config
            .plugins
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("   Deep linking: {}", config.deep_linking);
    println!("   Persist authorization: {}", config.persist_authorization);

    match (ui.document_url(), ui.load_error()) {
        (Some(url), _) => {
            println!(
                "   Document: {} ({} operations)",
                url,
                ui.operations().len()
            );
            for server in ui.document().map(|d| d.servers.as_slice()).unwrap_or_default() {
                match server.description.as_deref() {
                    Some(description) => println!("   Server: {} ({})", server.url, description),
                    None => println!("   Server: {}", server.url),
                }
            }
        }
        (None, Some(error)) => println!("⚠️  Document failed to load: {}", error),
        (None, None) => println!("⚠️  No API definition provided"),
    }

    let authorized = ui.authorized_schemes();
    if authorized.is_empty() {
        println!("   Authorized schemes: none");
    } else {
        println!("   Authorized schemes: {}", authorized.join(", "));
    }
    if let Some(path) = ui.authorizations_path() {
        println!("   Authorizations file: {}", path.display());
    }

    Ok(())
}
