use anyhow::{Context, Result};

use crate::startup::PageSession;

/// Print the rendered page, or a single operation when `link` is given.
pub fn run_show(session: &PageSession, link: Option<&str>) -> Result<()> {
    let Some(link) = link else {
        let content = session
            .page
            .content(session.ui.mount_id())
            .context("Documentation mount point disappeared")?;
        print!("{}", content);
        return Ok(());
    };

    let ui = session.ui;
    if !ui.config().deep_linking {
        anyhow::bail!("Deep linking is disabled for this viewer");
    }
    let operation = ui
        .find_by_deep_link(link)
        .with_context(|| format!("No operation at {}", link))?;

    print!("{} {}", operation.method, operation.path);
    match operation.summary.as_deref() {
        Some(summary) => println!("  {}", summary),
        None => println!(),
    }
    println!("   Operation: {}", operation.effective_id());
    println!("   Tag: {}", operation.primary_tag());
    if let Some(link) = ui.deep_link(&operation) {
        println!("   Link: {}", link);
    }

    let schemes = ui
        .document()
        .map(|document| document.schemes_for(Some(&operation)))
        .unwrap_or_default();
    if schemes.is_empty() {
        println!("   Security: none");
    }
    for scheme in schemes {
        if ui.is_authorized(scheme) {
            println!("   🔑 {} (authorized)", scheme);
        } else {
            println!("   🔒 {} (not authorized)", scheme);
        }
    }

    Ok(())
}
