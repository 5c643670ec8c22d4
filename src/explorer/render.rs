//! Text rendering of the explorer into its mount element.

use std::collections::BTreeMap;
use std::fmt::Write;

use super::authorizations::Authorizations;
use super::document::{ApiDocument, Operation};
use super::DocumentState;
use crate::viewer::{Layout, ViewerConfig};

/// Deep link fragment for an operation: `#/{tag}/{operationId}`.
pub fn deep_link(operation: &Operation) -> String {
    format!(
        "#/{}/{}",
        escape_segment(operation.primary_tag()),
        escape_segment(&operation.effective_id())
    )
}

fn escape_segment(segment: &str) -> String {
    segment
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() {
                "%20".to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}

pub(super) fn render(
    config: &ViewerConfig,
    state: &DocumentState,
    authorizations: &Authorizations,
) -> String {
    let mut out = String::new();

    if config.layout == Layout::StandaloneLayout {
        render_top_bar(&mut out, state);
    }

    match state {
        DocumentState::NotProvided => {
            out.push_str("No API definition provided.\n");
        }
        DocumentState::Failed { url, reason } => {
            out.push_str("Failed to load API definition.\n");
            let _ = writeln!(out, "Fetch error: {} {}", reason, url);
        }
        DocumentState::Loaded { document, .. } => {
            render_document(&mut out, config, document, authorizations);
        }
    }

    out
}

fn render_top_bar(out: &mut String, state: &DocumentState) {
    let source = match state {
        DocumentState::Loaded { url, .. } | DocumentState::Failed { url, .. } => url.as_str(),
        DocumentState::NotProvided => "-",
    };
    let _ = writeln!(out, "Explore: {}", source);
    let _ = writeln!(out, "{}", "-".repeat(source.len() + 9));
}

fn render_document(
    out: &mut String,
    config: &ViewerConfig,
    document: &ApiDocument,
    authorizations: &Authorizations,
) {
    let _ = write!(out, "{}  {}", document.info.title, document.info.version);
    if let Some(openapi) = document.openapi.as_deref() {
        let _ = write!(out, "  OAS {}", openapi);
    }
    out.push('\n');
    if let Some(description) = document.info.description.as_deref() {
        let _ = writeln!(out, "{}", description);
    }

    let schemes = &document.components.security_schemes;
    if !schemes.is_empty() {
        out.push_str("\nAuthorize\n");
        for (name, scheme) in schemes {
            let target = match (scheme.location.as_deref(), scheme.name.as_deref()) {
                (Some(location), Some(param)) => format!("{} ({})", param, location),
                _ => scheme.kind.clone(),
            };
            let state = if authorizations.contains_key(name) {
                "authorized"
            } else {
                "not authorized"
            };
            let _ = writeln!(out, "  {:<12} {:<24} [{}]", name, target, state);
            if let Some(description) = scheme.description.as_deref() {
                let _ = writeln!(out, "               {}", description);
            }
        }
    }

    let mut by_tag: BTreeMap<String, Vec<Operation>> = BTreeMap::new();
    for operation in document.operations() {
        by_tag
            .entry(operation.primary_tag().to_string())
            .or_default()
            .push(operation);
    }

    for (tag, operations) in &by_tag {
        let _ = writeln!(out, "\n{}", tag);
        for operation in operations {
            let mut line = format!("  {:<7} {}", operation.method.as_str(), operation.path);
            if let Some(summary) = operation.summary.as_deref() {
                let _ = write!(line, "  {}", summary);
            }
            if config.deep_linking {
                let _ = write!(line, "  {}", deep_link(operation));
            }
            let _ = writeln!(out, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::authorizations::Authorization;
    use crate::explorer::document::fixtures::CONTROL_PLANE_DOCUMENT;
    use crate::viewer::api_key_interceptor;
    use url::Url;

    fn loaded() -> DocumentState {
        DocumentState::Loaded {
            url: Url::parse("http://localhost:8080/v3/api-docs").unwrap(),
            document: serde_json::from_str(CONTROL_PLANE_DOCUMENT).unwrap(),
        }
    }

    fn config() -> ViewerConfig {
        ViewerConfig::control_plane(api_key_interceptor("k"))
    }

    #[test]
    fn test_deep_link_escapes_whitespace() {
        let op = Operation {
            method: reqwest::Method::GET,
            path: "/api/rules".to_string(),
            operation_id: Some("listRules".to_string()),
            summary: None,
            tags: vec!["rate limit rules".to_string()],
            security: None,
        };
        assert_eq!(deep_link(&op), "#/rate%20limit%20rules/listRules");
    }

    #[test]
    fn test_render_standalone_document() {
        let out = render(&config(), &loaded(), &Authorizations::new());

        assert!(out.starts_with("Explore: http://localhost:8080/v3/api-docs\n"));
        assert!(out.contains("Egress Control Plane API  v1  OAS 3.0.1\n"));
        assert!(out.contains("REST endpoints to manage outbound rate limit rules"));
        assert!(out.contains("Default: changeme-control-plane-key"));
        assert!(out.contains("X-API-KEY (header)"));
        assert!(out.contains("[not authorized]"));
        assert!(out.contains("rate-limit-rule-controller"));
        assert!(out.contains("#/rate-limit-rule-controller/listRules"));
        assert!(out.contains("#/default/get_api_ping"));
    }

    #[test]
    fn test_render_marks_authorized_scheme() {
        let mut auths = Authorizations::new();
        auths.insert("apiKey".to_string(), Authorization::new("apiKey", "k"));
        let out = render(&config(), &loaded(), &auths);
        assert!(out.contains("[authorized]"));
        assert!(!out.contains("[not authorized]"));
    }

    #[test]
    fn test_render_base_layout_without_deep_links() {
        let mut config = config();
        config.layout = Layout::BaseLayout;
        config.deep_linking = false;

        let out = render(&config, &loaded(), &Authorizations::new());
        assert!(!out.contains("Explore:"));
        assert!(!out.contains("#/"));
        assert!(out.starts_with("Egress Control Plane API"));
    }

    #[test]
    fn test_render_failed_and_missing_document() {
        let failed = DocumentState::Failed {
            url: Url::parse("http://localhost:8080/v3/api-docs/swagger-config").unwrap(),
            reason: "Not found (HTTP 404)".to_string(),
        };
        let out = render(&config(), &failed, &Authorizations::new());
        assert!(out.contains("Failed to load API definition."));
        assert!(out.contains("Not found (HTTP 404)"));

        let out = render(&config(), &DocumentState::NotProvided, &Authorizations::new());
        assert!(out.contains("No API definition provided."));
    }
}
