//! Common test utilities for integration tests.
//!
//! This module provides reusable fixtures for driving a [`Coordinator`]
//! against in-memory storage and static content.
//!
//! # Example
//!
//! ```ignore
//! use common::TestCoreBuilder;
//!
//! let core = TestCoreBuilder::new()
//!     .with_storage(StorageConfig::new().with_active_view("saved").build())
//!     .initialized()
//!     .await;
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;

use tabsurface::surface::{Element, Node, Presentation};
use tabsurface::{Coordinator, CoreConfig, ViewId};

/// A coordinator plus handles on its collaborators.
pub struct TestCore {
    pub coordinator: Coordinator,
    pub storage: InMemoryStorage,
    pub content: StaticContent,
}

impl TestCore {
    /// Text of every `li` in `view`'s visible surface, in document order.
    pub fn visible_items(&self, view: ViewId) -> Vec<String> {
        self.coordinator
            .presentation()
            .surface(view)
            .map(|surface| item_labels(surface.root()))
            .unwrap_or_default()
    }

    /// Text of every `li` in `view`'s off-screen surface.
    pub fn offscreen_items(&self, view: ViewId) -> Vec<String> {
        self.coordinator
            .surfaces()
            .offscreen(view)
            .map(|surface| item_labels(surface.root()))
            .unwrap_or_default()
    }
}

/// Builder for creating test coordinators with various configurations.
#[derive(Default)]
pub struct TestCoreBuilder {
    config: Option<CoreConfig>,
    storage: Option<InMemoryStorage>,
    content: Option<StaticContent>,
    presentation: Option<Presentation>,
}

impl TestCoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: CoreConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_storage(mut self, storage: InMemoryStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_content(mut self, content: StaticContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = Some(presentation);
        self
    }

    /// Builds the core without initializing it.
    pub fn build(self) -> TestCore {
        let storage = self.storage.unwrap_or_default();
        let content = self.content.unwrap_or_default();
        let coordinator = Coordinator::new(
            self.presentation.unwrap_or_else(sample_presentation),
            Arc::new(storage.clone()),
            Arc::new(content.clone()),
            self.config.unwrap_or_default(),
        );
        TestCore {
            coordinator,
            storage,
            content,
        }
    }

    /// Builds and initializes the core, panicking if initialization fails.
    pub async fn initialized(self) -> TestCore {
        let mut core = self.build();
        core.coordinator
            .initialize()
            .await
            .expect("coordinator failed to initialize");
        core
    }
}

/// An initialized core with default collaborators.
pub async fn initialized_core() -> TestCore {
    TestCoreBuilder::new().initialized().await
}

/// A document holding visible surfaces for `views` only.
pub fn presentation_with(views: &[ViewId]) -> Presentation {
    views
        .iter()
        .fold(Presentation::new(), |p, view| p.with_view(*view, sample_view_root(*view)))
}

fn item_labels(root: &Element) -> Vec<String> {
    let mut labels = Vec::new();
    root.walk(&mut |el| {
        if el.tag == "li" {
            let text: String = el
                .children
                .iter()
                .filter_map(|child| match child {
                    Node::Text(text) => Some(text.as_str()),
                    Node::Element(_) => None,
                })
                .collect();
            labels.push(text);
        }
    });
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builder_default() {
        let core = TestCoreBuilder::new().build();
        assert!(!core.coordinator.is_initialized());
        assert_eq!(core.storage.load_count(), 0);
    }

    #[tokio::test]
    async fn test_initialized_core_shows_content() {
        let core = initialized_core().await;
        assert!(core.coordinator.is_initialized());
        assert_eq!(
            core.visible_items(ViewId::Categorize),
            vec!["docs.rs", "crates.io", "lwn.net"]
        );
    }

    #[test]
    fn test_presentation_with_subset() {
        let presentation = presentation_with(&[ViewId::Categorize]);
        assert!(presentation.has_surface(ViewId::Categorize));
        assert!(!presentation.has_surface(ViewId::Saved));
    }
}
