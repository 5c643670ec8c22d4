//! OpenAPI document model, reduced to what the explorer renders and uses.

use reqwest::Method;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Path item keys that are operations, in display order.
const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Tag used for operations that declare none.
pub const DEFAULT_TAG: &str = "default";

/// Security requirement: scheme name to required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Security scheme declaration.
///
/// The control plane declares:
/// ```json
/// "apiKey": { "type": "apiKey", "in": "header", "name": "X-API-KEY" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, rename = "in")]
    pub location: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SecurityScheme {
    pub fn is_api_key(&self) -> bool {
        self.kind == "apiKey"
    }

    /// Header name for API key schemes sent in a header.
    pub fn api_key_header(&self) -> Option<&str> {
        if self.is_api_key() && self.location.as_deref() == Some("header") {
            self.name.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    #[serde(default, rename = "securitySchemes")]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationObject {
    #[serde(default)]
    operation_id: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    security: Option<Vec<SecurityRequirement>>,
}

/// One documented operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub method: Method,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    /// Operation-level requirements; `None` inherits the document's.
    pub security: Option<Vec<SecurityRequirement>>,
}

impl Operation {
    /// The operationId, or one derived from method and path.
    ///
    /// `GET /api/rules/{id}` becomes `get_api_rules__id_`.
    pub fn effective_id(&self) -> String {
        if let Some(id) = self.operation_id.as_deref().filter(|id| !id.is_empty()) {
            return id.to_string();
        }
        let raw = format!("{}{}", self.method.as_str().to_lowercase(), self.path);
        raw.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }

    pub fn primary_tag(&self) -> &str {
        self.tags.first().map(String::as_str).unwrap_or(DEFAULT_TAG)
    }

    /// Whether a request for `method` on `path` hits this operation.
    ///
    /// `{param}` segments of the path template match any non-empty segment.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if self.method != *method {
            return false;
        }
        let template: Vec<&str> = self.path.trim_matches('/').split('/').collect();
        let actual: Vec<&str> = path.trim_matches('/').split('/').collect();
        template.len() == actual.len()
            && template.iter().zip(&actual).all(|(expected, segment)| {
                (is_template_param(expected) && !segment.is_empty()) || expected == segment
            })
    }

    fn is_templated(&self) -> bool {
        self.path.split('/').any(is_template_param)
    }
}

fn is_template_param(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

fn scheme_names(requirements: &[SecurityRequirement]) -> Vec<&str> {
    let mut names: Vec<&str> = requirements
        .iter()
        .flat_map(|requirement| requirement.keys().map(String::as_str))
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiDocument {
    #[serde(default)]
    pub openapi: Option<String>,
    #[serde(default)]
    pub info: ApiInfo,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    pub components: Components,
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,
}

impl ApiDocument {
    /// All operations, ordered by path then method.
    pub fn operations(&self) -> Vec<Operation> {
        let mut operations = Vec::new();
        for (path, item) in &self.paths {
            for method in HTTP_METHODS {
                let Some(value) = item.get(method) else {
                    continue;
                };
                let object: OperationObject = match serde_json::from_value(value.clone()) {
                    Ok(object) => object,
                    Err(e) => {
                        debug!("Malformed operation {} {}, listing it bare: {}", method, path, e);
                        OperationObject::default()
                    }
                };
                let Ok(method) = Method::from_bytes(method.to_uppercase().as_bytes()) else {
                    continue;
                };
                operations.push(Operation {
                    method,
                    path: path.clone(),
                    operation_id: object.operation_id,
                    summary: object.summary,
                    tags: object.tags,
                    security: object.security,
                });
            }
        }
        operations
    }

    pub fn security_scheme(&self, name: &str) -> Option<&SecurityScheme> {
        self.components.security_schemes.get(name)
    }

    /// The operation a request for `method` on `path` is sent to.
    ///
    /// A literal path wins over a templated one.
    pub fn find_operation(&self, method: &Method, path: &str) -> Option<Operation> {
        let mut candidates: Vec<Operation> = self
            .operations()
            .into_iter()
            .filter(|operation| operation.matches(method, path))
            .collect();
        candidates.sort_by_key(Operation::is_templated);
        candidates.into_iter().next()
    }

    /// Scheme names required for `operation`.
    ///
    /// An operation's own `security` replaces the document-wide list; an
    /// empty one makes the operation public. `None` yields the document-wide
    /// schemes.
    pub fn schemes_for<'a>(&'a self, operation: Option<&'a Operation>) -> Vec<&'a str> {
        let requirements = operation
            .and_then(|operation| operation.security.as_deref())
            .unwrap_or(self.security.as_slice());
        scheme_names(requirements)
    }
}
