//! View identifiers and the per-view configuration table.
//!
//! Every logical pane of the popup is a [`ViewId`]. Anything that differs
//! between views (default grouping, which element holds the search text, how
//! fingerprints are keyed) lives in the [`ViewSpec`] table so callers match
//! exhaustively instead of comparing strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One logical tab/pane of the popup.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewId {
    /// Currently open tabs, grouped by category.
    #[default]
    Categorize,
    /// Saved tabs.
    Saved,
    /// Extension settings.
    Settings,
}

impl ViewId {
    /// All views, in toolbar order.
    pub const ALL: [ViewId; 3] = [ViewId::Categorize, ViewId::Saved, ViewId::Settings];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::Categorize => "categorize",
            ViewId::Saved => "saved",
            ViewId::Settings => "settings",
        }
    }

    /// Static configuration for this view.
    pub fn spec(&self) -> &'static ViewSpec {
        match self {
            ViewId::Categorize => &CATEGORIZE_SPEC,
            ViewId::Saved => &SAVED_SPEC,
            ViewId::Settings => &SETTINGS_SPEC,
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown view name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view '{0}'")]
pub struct UnknownView(pub String);

impl FromStr for ViewId {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "categorize" | "current" => Ok(ViewId::Categorize),
            "saved" => Ok(ViewId::Saved),
            "settings" => Ok(ViewId::Settings),
            other => Err(UnknownView(other.to_string())),
        }
    }
}

/// Per-view configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSpec {
    /// Grouping key used until the user picks another one.
    pub default_group_by: &'static str,
    /// Element id of the search input, if the view has one.
    pub search_input_id: Option<&'static str>,
    /// Element id of the grouping select, if the view has one.
    pub group_select_id: Option<&'static str>,
    /// Element id of the container that rendered content replaces.
    pub content_id: &'static str,
    /// Whether every identified form field is captured into the snapshot.
    pub tracks_form_fields: bool,
}

const CATEGORIZE_SPEC: ViewSpec = ViewSpec {
    default_group_by: "category",
    search_input_id: Some("searchInput"),
    group_select_id: Some("unifiedGroupingSelect"),
    content_id: "tabsContainer",
    tracks_form_fields: false,
};

const SAVED_SPEC: ViewSpec = ViewSpec {
    default_group_by: "category",
    search_input_id: Some("searchInput"),
    group_select_id: Some("unifiedGroupingSelect"),
    content_id: "savedContent",
    tracks_form_fields: false,
};

const SETTINGS_SPEC: ViewSpec = ViewSpec {
    default_group_by: "none",
    search_input_id: None,
    group_select_id: None,
    content_id: "settingsContent",
    tracks_form_fields: true,
};
