//! Snapshot types: per-view interactive state and global state.
//!
//! Sets and maps are `BTreeSet`/`BTreeMap`, so they serialize as JSON arrays
//! and objects and come back with the same membership whatever order the
//! stored array had.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::surface::{ScrollOffsets, TextSelection};
use crate::view::ViewId;

/// Which element had focus, and its text selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusDescriptor {
    pub element_id: String,
    #[serde(default)]
    pub selection_start: Option<usize>,
    #[serde(default)]
    pub selection_end: Option<usize>,
}

impl FocusDescriptor {
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            selection_start: None,
            selection_end: None,
        }
    }

    pub fn with_selection(mut self, start: usize, end: usize) -> Self {
        self.selection_start = Some(start);
        self.selection_end = Some(end);
        self
    }

    pub fn selection(&self) -> Option<TextSelection> {
        match (self.selection_start, self.selection_end) {
            (Some(start), Some(end)) => Some(TextSelection { start, end }),
            _ => None,
        }
    }
}

/// Captured state of one form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldState {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub selected_index: Option<usize>,
}

/// Interactive state of one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub scroll: ScrollOffsets,
    pub search_text: String,
    pub group_by: String,
    /// `None` until the view's sections have been captured once, so a
    /// restore leaves producer-emitted sections as they are.
    pub expanded_sections: Option<BTreeSet<String>>,
    /// `None` until captured, like `expanded_sections`.
    pub selected_items: Option<BTreeSet<String>>,
    pub focus: Option<FocusDescriptor>,
    /// Settings-like views only: field id → captured field state.
    pub form_fields: BTreeMap<String, FieldState>,
    pub last_update: Option<DateTime<Utc>>,
}

impl ViewSnapshot {
    /// Defaults for `view`.
    pub fn for_view(view: ViewId) -> Self {
        Self {
            group_by: view.spec().default_group_by.to_string(),
            ..Self::default()
        }
    }

    /// Whether `section` was expanded when sections were last captured.
    pub fn section_expanded(&self, section: &str) -> bool {
        self.expanded_sections
            .as_ref()
            .map_or(false, |sections| sections.contains(section))
    }

    /// Whether `item` was selected when the view was last captured.
    pub fn item_selected(&self, item: &str) -> bool {
        self.selected_items
            .as_ref()
            .map_or(false, |items| items.contains(item))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

/// Process-wide UI state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalState {
    pub active_view_id: ViewId,
    pub theme: String,
    #[serde(default)]
    pub window_size: Option<WindowSize>,
    #[serde(default)]
    pub last_save_timestamp: Option<DateTime<Utc>>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            active_view_id: ViewId::Categorize,
            theme: "system".to_string(),
            window_size: None,
            last_save_timestamp: None,
        }
    }
}

/// A single mutation of [`GlobalState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalUpdate {
    ActiveView(ViewId),
    Theme(String),
    WindowSize(WindowSize),
}

impl GlobalState {
    pub fn apply(&mut self, update: GlobalUpdate) {
        match update {
            GlobalUpdate::ActiveView(view) => self.active_view_id = view,
            GlobalUpdate::Theme(theme) => self.theme = theme,
            GlobalUpdate::WindowSize(size) => self.window_size = Some(size),
        }
    }
}
