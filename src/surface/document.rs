//! Render surfaces and the visible document.
//!
//! A [`Surface`] is a root element plus two flags: whether it is attached to
//! the document (only attached surfaces can be seen) and whether it accepts
//! input. [`Presentation`] is the document the user looks at: one visible
//! surface per view, the global focus, and the active-view classes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::node::{Element, Node, NodeId, HIDDEN_CLASS};
use crate::view::ViewId;

/// Class set on the root of the displayed view.
pub const ACTIVE_CLASS: &str = "active";

/// A render target.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    root: Element,
    attached: bool,
    interactive: bool,
}

impl Surface {
    /// An attached, interactive surface.
    pub fn visible(root: Element) -> Self {
        Self {
            root,
            attached: true,
            interactive: true,
        }
    }

    /// A detached, non-interactive copy of `source`'s current content.
    pub fn detached_copy_of(source: &Surface) -> Self {
        Self {
            root: source.root.fresh_copy(),
            attached: false,
            interactive: false,
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// What a style query would report: attached and not hidden.
    pub fn is_computed_visible(&self) -> bool {
        self.attached && !self.root.is_hidden()
    }

    /// Replace the root's children, keeping the root element itself.
    pub fn replace_children(&mut self, children: Vec<Node>) {
        self.root.children = children;
    }

    pub fn clear(&mut self) {
        self.root.children.clear();
    }
}

/// Text selection inside a focused text-like element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSelection {
    pub start: usize,
    pub end: usize,
}

/// The focused node and its selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTarget {
    pub view: ViewId,
    pub node_id: NodeId,
    pub selection: Option<TextSelection>,
}

/// The user-facing document.
#[derive(Debug, Default)]
pub struct Presentation {
    surfaces: BTreeMap<ViewId, Surface>,
    focus: Option<FocusTarget>,
}

impl Presentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Presentation::mount`].
    pub fn with_view(mut self, view: ViewId, root: Element) -> Self {
        self.mount(view, root);
        self
    }

    /// Attach `root` as the visible surface of `view`.
    pub fn mount(&mut self, view: ViewId, root: Element) {
        self.surfaces.insert(view, Surface::visible(root));
    }

    pub fn surface(&self, view: ViewId) -> Option<&Surface> {
        self.surfaces.get(&view)
    }

    pub fn surface_mut(&mut self, view: ViewId) -> Option<&mut Surface> {
        self.surfaces.get_mut(&view)
    }

    pub fn has_surface(&self, view: ViewId) -> bool {
        self.surfaces.contains_key(&view)
    }

    pub fn element_by_id(&self, view: ViewId, id: &str) -> Option<&Element> {
        self.surfaces.get(&view)?.root().find_by_id(id)
    }

    pub fn element_by_id_mut(&mut self, view: ViewId, id: &str) -> Option<&mut Element> {
        self.surfaces.get_mut(&view)?.root_mut().find_by_id_mut(id)
    }

    /// Show `view`, hide every other view.
    pub fn show_only(&mut self, view: ViewId) {
        for (id, surface) in self.surfaces.iter_mut() {
            let root = surface.root_mut();
            let active = *id == view;
            root.set_class(ACTIVE_CLASS, active);
            root.set_class(HIDDEN_CLASS, !active);
        }
    }

    /// The view whose root carries the active class, if any.
    pub fn displayed_view(&self) -> Option<ViewId> {
        self.surfaces
            .iter()
            .find(|(_, s)| s.root().has_class(ACTIVE_CLASS) && s.is_computed_visible())
            .map(|(id, _)| *id)
    }

    /// Focus the element with `element_id` in `view`. Returns false if it does not exist.
    pub fn focus_element(
        &mut self,
        view: ViewId,
        element_id: &str,
        selection: Option<TextSelection>,
    ) -> bool {
        match self.element_by_id(view, element_id) {
            Some(el) => {
                self.focus = Some(FocusTarget {
                    view,
                    node_id: el.node_id,
                    selection,
                });
                true
            }
            None => false,
        }
    }

    pub fn focus(&self) -> Option<FocusTarget> {
        self.focus
    }

    /// Remove focus and hand back what was focused.
    pub fn take_focus(&mut self) -> Option<FocusTarget> {
        self.focus.take()
    }

    /// Re-focus a previously focused node if it is still in its view.
    pub fn restore_focus(&mut self, target: FocusTarget) -> bool {
        let still_there = self
            .surfaces
            .get(&target.view)
            .is_some_and(|s| s.root().contains_node(target.node_id));
        if still_there {
            self.focus = Some(target);
        }
        still_there
    }

    pub fn blur(&mut self) {
        self.focus = None;
    }

    /// The focused element, when it lives in `view`.
    pub fn focused_element(&self, view: ViewId) -> Option<&Element> {
        let focus = self.focus.filter(|f| f.view == view)?;
        self.surfaces.get(&view)?.root().find_by_node_id(focus.node_id)
    }

    pub fn set_selection(&mut self, selection: Option<TextSelection>) {
        if let Some(focus) = self.focus.as_mut() {
            focus.selection = selection;
        }
    }

    /// Swap the visible surface of `view` with `other`.
    pub(crate) fn swap_surface(&mut self, view: ViewId, other: &mut Surface) -> bool {
        match self.surfaces.get_mut(&view) {
            Some(surface) => {
                std::mem::swap(surface, other);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presentation() -> Presentation {
        Presentation::new()
            .with_view(
                ViewId::Categorize,
                Element::new("div")
                    .with_id("categorizeView")
                    .with_child(Element::new("input").with_id("searchInput")),
            )
            .with_view(ViewId::Saved, Element::new("div").with_id("savedView"))
    }

    #[test]
    fn test_detached_copy_is_not_visible() {
        let visible = Surface::visible(Element::new("div").with_text("hello"));
        let copy = Surface::detached_copy_of(&visible);
        assert!(visible.is_computed_visible());
        assert!(!copy.is_computed_visible());
        assert!(!copy.is_interactive());
        assert!(copy.root().same_content(visible.root()));
        assert_ne!(copy.root().node_id, visible.root().node_id);
    }

    #[test]
    fn test_show_only_toggles_classes() {
        let mut p = presentation();
        p.show_only(ViewId::Saved);
        assert_eq!(p.displayed_view(), Some(ViewId::Saved));
        assert!(!p.surface(ViewId::Categorize).unwrap().is_computed_visible());

        p.show_only(ViewId::Categorize);
        assert_eq!(p.displayed_view(), Some(ViewId::Categorize));
        assert!(!p.surface(ViewId::Saved).unwrap().is_computed_visible());
    }

    #[test]
    fn test_focus_and_restore() {
        let mut p = presentation();
        let sel = Some(TextSelection { start: 1, end: 3 });
        assert!(p.focus_element(ViewId::Categorize, "searchInput", sel));
        assert_eq!(
            p.focused_element(ViewId::Categorize).unwrap().id.as_deref(),
            Some("searchInput")
        );
        assert!(p.focused_element(ViewId::Saved).is_none());

        let taken = p.take_focus().unwrap();
        assert!(p.focus().is_none());
        assert!(p.restore_focus(taken));
        assert_eq!(p.focus().unwrap().selection, sel);
    }

    #[test]
    fn test_restore_focus_fails_when_node_is_gone() {
        let mut p = presentation();
        p.focus_element(ViewId::Categorize, "searchInput", None);
        let taken = p.take_focus().unwrap();
        p.surface_mut(ViewId::Categorize).unwrap().clear();
        assert!(!p.restore_focus(taken));
        assert!(p.focus().is_none());
    }

    #[test]
    fn test_focus_unknown_element() {
        let mut p = presentation();
        assert!(!p.focus_element(ViewId::Saved, "nope", None));
        assert!(p.focus().is_none());
    }
}
