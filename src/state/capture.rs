//! Reading interactive state off a visible surface and writing it back.
//!
//! Restoring happens in two phases. [`apply_immediate`] writes field values
//! and focus right away; [`apply_deferred`] writes scroll offsets and
//! expanded-section markers once freshly patched content has settled.

use std::collections::BTreeSet;

use chrono::Utc;

use super::snapshot::{FieldState, FocusDescriptor, ViewSnapshot};
use crate::surface::{
    Element, InputKind, Presentation, COLLAPSED_CLASS, ITEM_ATTR, SECTION_ATTR, SELECTED_CLASS,
};
use crate::view::ViewId;

/// Read the state of `view` into a new snapshot based on `previous`.
///
/// Values whose element is missing keep what `previous` had. Returns `None`
/// when the view has no visible surface.
pub fn read_view_state(
    view: ViewId,
    presentation: &Presentation,
    previous: &ViewSnapshot,
) -> Option<ViewSnapshot> {
    let root = presentation.surface(view)?.root();
    let spec = view.spec();
    let mut snapshot = previous.clone();

    snapshot.scroll = root.live.scroll;

    if let Some(search) = spec.search_input_id.and_then(|id| root.find_by_id(id)) {
        snapshot.search_text = search.live.value.clone().unwrap_or_default();
    }
    if let Some(value) = spec
        .group_select_id
        .and_then(|id| root.find_by_id(id))
        .and_then(|select| select.live.value.clone())
    {
        snapshot.group_by = value;
    }

    let mut expanded = BTreeSet::new();
    let mut selected = BTreeSet::new();
    root.walk(&mut |el| {
        if let Some(section) = el.attr(SECTION_ATTR) {
            if !el.has_class(COLLAPSED_CLASS) {
                expanded.insert(section.to_string());
            }
        }
        if let Some(item) = el.attr(ITEM_ATTR) {
            if el.has_class(SELECTED_CLASS) {
                selected.insert(item.to_string());
            }
        }
    });
    snapshot.expanded_sections = Some(expanded);
    snapshot.selected_items = Some(selected);

    snapshot.focus = presentation.focused_element(view).and_then(|el| {
        let id = el.id.clone()?;
        let selection = presentation.focus().and_then(|f| f.selection);
        Some(FocusDescriptor {
            element_id: id,
            selection_start: selection.map(|s| s.start),
            selection_end: selection.map(|s| s.end),
        })
    });

    if spec.tracks_form_fields {
        snapshot.form_fields.clear();
        root.walk(&mut |el| {
            if let (Some(id), Some(kind)) = (el.id.as_ref(), el.input_kind()) {
                snapshot.form_fields.insert(id.clone(), field_state(el, kind));
            }
        });
    }

    snapshot.last_update = Some(Utc::now());
    Some(snapshot)
}

fn field_state(el: &Element, kind: InputKind) -> FieldState {
    match kind {
        InputKind::Toggle => FieldState {
            checked: el.live.checked,
            ..FieldState::default()
        },
        InputKind::Choice => FieldState {
            selected_index: el.live.selected_index,
            value: el.live.value.clone(),
            ..FieldState::default()
        },
        InputKind::Text => FieldState {
            value: el.live.value.clone(),
            ..FieldState::default()
        },
    }
}

/// Write field values, item selection and focus. Returns false when the
/// view has no surface.
pub fn apply_immediate(view: ViewId, snapshot: &ViewSnapshot, presentation: &mut Presentation) -> bool {
    let spec = view.spec();
    let root = match presentation.surface_mut(view) {
        Some(surface) => surface.root_mut(),
        None => return false,
    };

    if let Some(search) = spec.search_input_id.and_then(|id| root.find_by_id_mut(id)) {
        search.live.value = Some(snapshot.search_text.clone());
    }
    if let Some(select) = spec.group_select_id.and_then(|id| root.find_by_id_mut(id)) {
        select.live.value = Some(snapshot.group_by.clone());
    }

    for (id, field) in &snapshot.form_fields {
        let el = match root.find_by_id_mut(id) {
            Some(el) => el,
            None => {
                tracing::trace!("Form field '{}' not present in '{}'", id, view);
                continue;
            }
        };
        match el.input_kind() {
            Some(InputKind::Toggle) => el.live.checked = field.checked,
            Some(InputKind::Choice) => {
                el.live.selected_index = field.selected_index;
                if field.value.is_some() {
                    el.live.value = field.value.clone();
                }
            }
            Some(InputKind::Text) => el.live.value = field.value.clone(),
            None => {}
        }
    }

    if let Some(selected) = &snapshot.selected_items {
        root.walk_mut(&mut |el| {
            let on = match el.attr(ITEM_ATTR) {
                Some(item) => selected.contains(item),
                None => return,
            };
            el.set_class(SELECTED_CLASS, on);
        });
    }

    if let Some(focus) = &snapshot.focus {
        if !presentation.focus_element(view, &focus.element_id, focus.selection()) {
            tracing::debug!(
                "Focus target '{}' no longer exists in '{}'",
                focus.element_id,
                view
            );
        }
    }

    true
}

/// Write scroll offsets and expanded-section markers.
///
/// Sections are left alone when they were never captured.
pub fn apply_deferred(view: ViewId, snapshot: &ViewSnapshot, presentation: &mut Presentation) -> bool {
    let root = match presentation.surface_mut(view) {
        Some(surface) => surface.root_mut(),
        None => return false,
    };

    root.live.scroll = snapshot.scroll;
    if let Some(expanded) = &snapshot.expanded_sections {
        root.walk_mut(&mut |el| {
            let open = match el.attr(SECTION_ATTR) {
                Some(section) => expanded.contains(section),
                None => return,
            };
            el.set_class(COLLAPSED_CLASS, !open);
        });
    }

    true
}
