//! Content producer trait abstraction.
//!
//! Content producers turn raw tab/category data into the element fragment a
//! view displays. They are pure with respect to the render pipeline: the
//! core calls them, hashes the result and decides whether to render.

use async_trait::async_trait;

use crate::error::RenderError;
use crate::surface::Node;
use crate::view::ViewId;

/// Inputs that select which variant of a view's content to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub group_by: String,
    pub show_ignored: bool,
}

impl ContentRequest {
    pub fn new(group_by: impl Into<String>, show_ignored: bool) -> Self {
        Self {
            group_by: group_by.into(),
            show_ignored,
        }
    }

    /// Fingerprint key for this request. Views whose content does not depend
    /// on the request share one key.
    pub fn fingerprint_key(&self, view: ViewId) -> String {
        match view {
            ViewId::Saved => format!(
                "{}:{}:{}",
                view.as_str(),
                self.group_by,
                if self.show_ignored { "all" } else { "visible" }
            ),
            ViewId::Categorize | ViewId::Settings => view.as_str().to_string(),
        }
    }
}

/// Trait for the content producers of every view.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Content of the current-tabs (categorize) view.
    async fn produce_current_view_content(&self) -> Result<Vec<Node>, RenderError>;

    /// Content of the saved-tabs view, grouped by `group_by`.
    async fn produce_saved_view_content(
        &self,
        group_by: &str,
        show_ignored: bool,
    ) -> Result<Vec<Node>, RenderError>;

    /// Content of the settings view.
    async fn produce_settings_content(&self) -> Result<Vec<Node>, RenderError>;

    /// Dispatch to the producer registered for `view`.
    async fn produce(
        &self,
        view: ViewId,
        request: &ContentRequest,
    ) -> Result<Vec<Node>, RenderError> {
        match view {
            ViewId::Categorize => self.produce_current_view_content().await,
            ViewId::Saved => {
                self.produce_saved_view_content(&request.group_by, request.show_ignored)
                    .await
            }
            ViewId::Settings => self.produce_settings_content().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_key_only_varies_for_saved() {
        let a = ContentRequest::new("category", false);
        let b = ContentRequest::new("domain", true);
        assert_eq!(
            a.fingerprint_key(ViewId::Categorize),
            b.fingerprint_key(ViewId::Categorize)
        );
        assert_ne!(a.fingerprint_key(ViewId::Saved), b.fingerprint_key(ViewId::Saved));
        assert_eq!(a.fingerprint_key(ViewId::Saved), "saved:category:visible");
    }
}
