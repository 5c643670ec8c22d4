//! Published viewer instance.
//!
//! The bootstrap publishes the viewer it built into a write-once slot so
//! that commands and diagnostics can reach it afterwards:
//!
//! ```ignore
//! // At startup:
//! let ui = bootstrap.run(runtime::ui_slot()).await?;
//!
//! // Anywhere else:
//! if let Some(ui) = runtime::ui() {
//!     ui.execute(request).await?;
//! }
//! ```
//!
//! A slot is claimed once (`begin`) and filled once (`publish`). Until
//! then readers see `None`; a viewer that failed to build is never
//! published.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::explorer::ApiExplorer;

/// Write-once holder for a viewer instance.
pub struct ViewerSlot<V> {
    started: AtomicBool,
    viewer: OnceLock<V>,
}

impl<V> ViewerSlot<V> {
    pub const fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
            viewer: OnceLock::new(),
        }
    }

    /// Claim the slot for a bootstrap run. Only the first caller gets `true`.
    pub fn begin(&self) -> bool {
        !self.started.swap(true, Ordering::SeqCst)
    }

    /// Store the viewer. Fails, dropping `viewer`, if one is already published.
    pub fn publish(&self, viewer: V) -> Result<&V, AlreadyPublished> {
        let mut stored = false;
        let published = self.viewer.get_or_init(|| {
            stored = true;
            viewer
        });
        if stored {
            Ok(published)
        } else {
            tracing::warn!(
                "Attempting to publish a viewer when one is already published. Keeping existing."
            );
            Err(AlreadyPublished)
        }
    }

    pub fn get(&self) -> Option<&V> {
        self.viewer.get()
    }
}

impl<V> Default for ViewerSlot<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Returned by [`ViewerSlot::publish`] when the slot is already filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyPublished;

/// Process-wide viewer slot.
static UI: ViewerSlot<ApiExplorer> = ViewerSlot::new();

pub fn ui_slot() -> &'static ViewerSlot<ApiExplorer> {
    &UI
}

/// The published viewer, or `None` before the bootstrap completed.
pub fn ui() -> Option<&'static ApiExplorer> {
    UI.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_starts_empty() {
        let slot: ViewerSlot<String> = ViewerSlot::new();
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_begin_only_once() {
        let slot: ViewerSlot<String> = ViewerSlot::new();
        assert!(slot.begin());
        assert!(!slot.begin());
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_publish_is_write_once() {
        let slot: ViewerSlot<String> = ViewerSlot::new();
        assert_eq!(slot.publish("first".to_string()).unwrap(), "first");
        assert_eq!(slot.publish("second".to_string()), Err(AlreadyPublished));
        assert_eq!(slot.get().map(String::as_str), Some("first"));
    }
}
