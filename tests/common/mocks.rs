//! Mock implementations for test fixtures.
//!
//! This module re-exports the mock implementations from `tabsurface::adapters::mock`
//! and provides additional test-specific storage and content configurations.

pub use tabsurface::adapters::mock::{
    sample_fragment, sample_presentation, sample_view_root, InMemoryStorage, StaticContent,
};
pub use tabsurface::traits::{DurableStorage, Settings};

use serde_json::{json, Map, Value};
use tabsurface::surface::{Element, Node, ITEM_ATTR, SECTION_ATTR};

/// Configuration for setting up the stored settings record.
pub struct StorageConfig {
    ui_state: Option<Value>,
    extra: Map<String, Value>,
    load_should_fail: bool,
    save_should_fail: bool,
}

impl StorageConfig {
    pub fn new() -> Self {
        Self {
            ui_state: None,
            extra: Map::new(),
            load_should_fail: false,
            save_should_fail: false,
        }
    }

    /// Stores a `uiState` whose global active view is `view`.
    pub fn with_active_view(mut self, view: &str) -> Self {
        let mut state = self.ui_state.take().unwrap_or_else(|| json!({}));
        state["global"] = json!({ "activeViewId": view });
        self.ui_state = Some(state);
        self
    }

    /// Stores a raw `uiState` value.
    pub fn with_ui_state(mut self, state: Value) -> Self {
        self.ui_state = Some(state);
        self
    }

    /// Adds a setting owned by some other collaborator.
    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.load_should_fail = true;
        self
    }

    pub fn failing_save(mut self) -> Self {
        self.save_should_fail = true;
        self
    }

    /// Builds the configured InMemoryStorage.
    pub fn build(self) -> InMemoryStorage {
        let storage = InMemoryStorage::with_settings(Settings {
            ui_state: self.ui_state,
            extra: self.extra,
        });
        storage.set_load_should_fail(self.load_should_fail);
        storage.set_save_should_fail(self.save_should_fail);
        storage
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A one-section fragment whose items carry `labels`, for simulating a data change.
pub fn fragment_with_items(section: &str, labels: &[&str]) -> Vec<Node> {
    let section = labels.iter().fold(
        Element::new("section")
            .with_id(format!("section-{}", section))
            .with_attr(SECTION_ATTR, section),
        |sec, label| {
            sec.with_child(
                Element::new("li")
                    .with_id(format!("item-{}", label))
                    .with_attr(ITEM_ATTR, *label)
                    .with_text(*label),
            )
        },
    );
    vec![section.into()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_storage_config_builds_record() {
        let storage = StorageConfig::new()
            .with_active_view("saved")
            .with_extra("apiKey", json!("secret"))
            .build();

        let settings = storage.load_settings().await.unwrap();
        assert_eq!(settings.ui_state.unwrap()["global"]["activeViewId"], "saved");
        assert_eq!(settings.extra["apiKey"], "secret");
    }

    #[tokio::test]
    async fn test_storage_config_failures() {
        let storage = StorageConfig::new().failing_load().build();
        assert!(storage.load_settings().await.is_err());

        let storage = StorageConfig::new().failing_save().build();
        assert!(storage.save_settings(&Settings::default()).await.is_err());
    }

    #[test]
    fn test_fragment_with_items() {
        let fragment = fragment_with_items("fresh", &["a", "b"]);
        let section = fragment[0].as_element().unwrap();
        assert_eq!(section.attr(SECTION_ATTR), Some("fresh"));
        assert_eq!(section.element_count(), 3);
    }
}
