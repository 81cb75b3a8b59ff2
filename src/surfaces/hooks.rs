//! Patch hooks that keep user-owned state through reconciliation.

use std::collections::HashMap;

use crate::surface::{
    Element, InputKind, LiveState, NodeId, PatchHooks, COLLAPSED_CLASS, ITEM_ATTR, SECTION_ATTR,
    SELECTED_CLASS,
};

/// User-owned state of one element as it was before the patch.
#[derive(Debug)]
struct Prior {
    live: LiveState,
    /// Collapsed flag of a section element.
    collapsed: Option<bool>,
    /// Selected flag of an item element.
    selected: Option<bool>,
}

/// Preserves the live state of every matched element.
///
/// Inputs keep what the user set (checked, selected index, value by input
/// kind); every element keeps its scroll offsets. Sections keep their
/// expand/collapse class and items their selection class, so a producer
/// re-emitting defaults does not undo what the user toggled.
#[derive(Debug, Default)]
pub struct ReconcileHooks {
    before: HashMap<NodeId, Prior>,
    preserved: usize,
}

impl ReconcileHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements whose live state was written back.
    pub fn preserved(&self) -> usize {
        self.preserved
    }
}

impl PatchHooks for ReconcileHooks {
    fn before_element_update(&mut self, current: &Element, _incoming: &Element) -> bool {
        let prior = Prior {
            live: current.live.clone(),
            collapsed: current
                .attr(SECTION_ATTR)
                .map(|_| current.has_class(COLLAPSED_CLASS)),
            selected: current
                .attr(ITEM_ATTR)
                .map(|_| current.has_class(SELECTED_CLASS)),
        };
        self.before.insert(current.node_id, prior);
        true
    }

    fn after_element_update(&mut self, updated: &mut Element) {
        let prior = match self.before.remove(&updated.node_id) {
            Some(prior) => prior,
            None => return,
        };
        let live = prior.live;
        match updated.input_kind() {
            Some(InputKind::Toggle) => updated.live.checked = live.checked,
            Some(InputKind::Choice) => {
                updated.live.selected_index = live.selected_index;
                updated.live.value = live.value;
            }
            Some(InputKind::Text) => updated.live.value = live.value,
            None => {}
        }
        updated.live.scroll = live.scroll;
        if let (Some(collapsed), true) = (prior.collapsed, updated.attr(SECTION_ATTR).is_some()) {
            updated.set_class(COLLAPSED_CLASS, collapsed);
        }
        if let (Some(selected), true) = (prior.selected, updated.attr(ITEM_ATTR).is_some()) {
            updated.set_class(SELECTED_CLASS, selected);
        }
        self.preserved += 1;
    }
}
