//! The persisted `uiState` shape and merge-over-defaults loading.
//!
//! Stored state is overlaid on in-memory defaults one field at a time: a
//! field that does not deserialize (older shape, hand edits) keeps its
//! default instead of discarding the whole view.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::snapshot::{GlobalState, ViewSnapshot};
use crate::view::ViewId;

/// Everything the store persists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub views: BTreeMap<ViewId, ViewSnapshot>,
    pub global: GlobalState,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            views: ViewId::ALL
                .iter()
                .map(|v| (*v, ViewSnapshot::for_view(*v)))
                .collect(),
            global: GlobalState::default(),
        }
    }
}

impl UiState {
    /// Rebuild from stored JSON, starting from defaults.
    ///
    /// Unknown views and fields are ignored; fields that fail to parse keep
    /// their default and are logged.
    pub fn from_stored(stored: &Value) -> Self {
        let mut state = Self::default();

        if let Some(views) = stored.get("views").and_then(Value::as_object) {
            for (name, value) in views {
                let view = match name.parse::<ViewId>() {
                    Ok(view) => view,
                    Err(_) => {
                        tracing::debug!("Ignoring stored state for unknown view '{}'", name);
                        continue;
                    }
                };
                let (snapshot, rejected) = overlay(ViewSnapshot::for_view(view), value);
                if !rejected.is_empty() {
                    tracing::warn!(
                        "Stored state for '{}' had unusable fields {:?}, kept defaults",
                        view,
                        rejected
                    );
                }
                state.views.insert(view, snapshot);
            }
        }

        if let Some(global) = stored.get("global") {
            let (global, rejected) = overlay(GlobalState::default(), global);
            if !rejected.is_empty() {
                tracing::warn!(
                    "Stored global state had unusable fields {:?}, kept defaults",
                    rejected
                );
            }
            state.global = global;
        }

        state
    }
}

/// Overlay the fields of `stored` on `defaults`.
///
/// Returns the merged value and the names of stored fields that were not
/// applied (unknown, or rejected by deserialization).
pub(crate) fn overlay<T>(defaults: T, stored: &Value) -> (T, Vec<String>)
where
    T: Serialize + DeserializeOwned,
{
    let fields = match stored.as_object() {
        Some(fields) => fields,
        None => return (defaults, vec!["<not an object>".to_string()]),
    };
    let mut merged: Map<String, Value> = match serde_json::to_value(&defaults) {
        Ok(Value::Object(map)) => map,
        _ => return (defaults, Vec::new()),
    };

    let mut rejected = Vec::new();
    for (key, value) in fields {
        let previous = match merged.get(key) {
            Some(previous) => previous.clone(),
            None => {
                rejected.push(key.clone());
                continue;
            }
        };
        merged.insert(key.clone(), value.clone());
        if serde_json::from_value::<T>(Value::Object(merged.clone())).is_err() {
            merged.insert(key.clone(), previous);
            rejected.push(key.clone());
        }
    }

    match serde_json::from_value(Value::Object(merged)) {
        Ok(value) => (value, rejected),
        Err(_) => (defaults, rejected),
    }
}
