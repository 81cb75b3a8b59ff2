//! Semantic data-change events and the views they refresh.

use serde::{Deserialize, Serialize};

use crate::surfaces::Priority;
use crate::view::ViewId;

/// A change in the underlying tab data, reported by the background side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataChange {
    TabsCategorized,
    /// Tabs moved from the current window into the saved set.
    TabsSaved,
    TabsClosed,
    TabsOpened,
    SavedTabsEdited,
    GroupingChanged {
        view: ViewId,
        group_by: String,
    },
    FilterChanged {
        #[serde(default)]
        search: Option<String>,
        #[serde(default)]
        show_ignored: bool,
    },
    SettingsChanged,
}

impl DataChange {
    /// Views to refresh, in the order the updates are issued.
    pub fn updates(&self) -> Vec<(ViewId, Priority)> {
        match self {
            DataChange::TabsCategorized | DataChange::TabsClosed | DataChange::TabsOpened => {
                vec![(ViewId::Categorize, Priority::High)]
            }
            DataChange::TabsSaved => vec![
                (ViewId::Saved, Priority::High),
                (ViewId::Categorize, Priority::Normal),
            ],
            DataChange::SavedTabsEdited => vec![(ViewId::Saved, Priority::High)],
            DataChange::GroupingChanged { view, .. } => vec![(*view, Priority::High)],
            DataChange::FilterChanged { .. } => vec![(ViewId::Saved, Priority::Normal)],
            DataChange::SettingsChanged => vec![(ViewId::Settings, Priority::Normal)],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataChange::TabsCategorized => "tabs_categorized",
            DataChange::TabsSaved => "tabs_saved",
            DataChange::TabsClosed => "tabs_closed",
            DataChange::TabsOpened => "tabs_opened",
            DataChange::SavedTabsEdited => "saved_tabs_edited",
            DataChange::GroupingChanged { .. } => "grouping_changed",
            DataChange::FilterChanged { .. } => "filter_changed",
            DataChange::SettingsChanged => "settings_changed",
        }
    }
}
