//! Page environment the viewer is mounted into.
//!
//! A page has an origin that relative paths resolve against and a set of
//! named elements. The viewer renders into one of them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use url::Url;

use crate::viewer::DEFAULT_DOM_ID;

/// Handle to one page element.
#[derive(Debug, Clone)]
pub struct Mount {
    id: String,
    content: Arc<RwLock<String>>,
}

impl Mount {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            content: Arc::new(RwLock::new(String::new())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replace the element's content.
    pub fn render(&self, content: String) {
        let mut slot = self.content.write().unwrap_or_else(|e| e.into_inner());
        *slot = content;
    }

    pub fn content(&self) -> String {
        self.content
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[derive(Debug)]
pub struct Page {
    origin: Url,
    elements: HashMap<String, Mount>,
}

impl Page {
    /// Create a page with the default viewer element.
    pub fn new(origin: Url) -> Self {
        Self::empty(origin).with_element(DEFAULT_DOM_ID)
    }

    /// Create a page without any elements.
    pub fn empty(origin: Url) -> Self {
        Self {
            origin,
            elements: HashMap::new(),
        }
    }

    pub fn with_element(mut self, id: &str) -> Self {
        self.elements
            .entry(id.to_string())
            .or_insert_with(|| Mount::new(id));
        self
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Resolve a path relative to the page origin.
    pub fn resolve(&self, path: &str) -> Result<Url, url::ParseError> {
        self.origin.join(path)
    }

    pub fn mount(&self, id: &str) -> Option<Mount> {
        self.elements.get(id).cloned()
    }

    pub fn content(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(Mount::content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("http://localhost:8080").unwrap()
    }

    #[test]
    fn test_page_has_default_element() {
        let page = Page::new(origin());
        assert!(page.mount("#swagger-ui").is_some());
        assert_eq!(page.content("#swagger-ui").as_deref(), Some(""));
        assert!(page.mount("#other").is_none());
    }

    #[test]
    fn test_mount_render_is_visible_through_page() {
        let page = Page::empty(origin()).with_element("#docs");
        let mount = page.mount("#docs").unwrap();
        mount.render("hello".to_string());
        assert_eq!(page.content("#docs").as_deref(), Some("hello"));
        assert_eq!(mount.id(), "#docs");
    }

    #[test]
    fn test_resolve_relative_paths() {
        let page = Page::new(origin());
        assert_eq!(
            page.resolve("/swagger-ui/api-key.json").unwrap().as_str(),
            "http://localhost:8080/swagger-ui/api-key.json"
        );
        assert_eq!(
            page.resolve("https://docs.example.com/openapi.json").unwrap().as_str(),
            "https://docs.example.com/openapi.json"
        );
    }
}
