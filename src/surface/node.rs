//! Element trees rendered into surfaces.
//!
//! Nodes carry two kinds of data: logical content (tag, id, classes,
//! attributes, children) which producers build and fingerprints hash, and
//! [`LiveState`] which the user mutates by interacting with the visible
//! surface. Every element also has a process-unique [`NodeId`]; patching keeps
//! the id of every element it updates in place, so "is this still the same
//! node" is a cheap identity comparison.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Class marking a collapsed section.
pub const COLLAPSED_CLASS: &str = "collapsed";

/// Class marking an element (usually a surface root) as not displayed.
pub const HIDDEN_CLASS: &str = "hidden";

/// Attribute carrying the identifier of an expandable section.
pub const SECTION_ATTR: &str = "data-section-id";

/// Attribute carrying the identifier of a selectable item.
pub const ITEM_ATTR: &str = "data-item-id";

/// Class marking a selected item.
pub const SELECTED_CLASS: &str = "selected";

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one element instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a new, never-before-used id.
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Scroll position of a scrollable element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollOffsets {
    pub top: u32,
    pub left: u32,
}

impl ScrollOffsets {
    pub fn new(top: u32, left: u32) -> Self {
        Self { top, left }
    }

    pub fn is_zero(&self) -> bool {
        self.top == 0 && self.left == 0
    }
}

/// Interactive state owned by the user rather than by content producers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<usize>,
    #[serde(default, skip_serializing_if = "ScrollOffsets::is_zero")]
    pub scroll: ScrollOffsets,
}

/// How an element accepts input, which decides what state patching preserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Checkbox or radio button.
    Toggle,
    /// Choice list (`select`).
    Choice,
    /// Text-like input or textarea.
    Text,
}

/// A node in an element tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Deep copy with freshly allocated node ids.
    pub fn fresh_copy(&self) -> Node {
        match self {
            Node::Element(el) => Node::Element(el.fresh_copy()),
            Node::Text(t) => Node::Text(t.clone()),
        }
    }

    /// Content equality, ignoring node identity.
    pub fn same_content(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Element(a), Node::Element(b)) => a.same_content(b),
            (Node::Text(a), Node::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

/// An element with its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(skip, default = "NodeId::fresh")]
    pub node_id: NodeId,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub classes: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub live: LiveState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            node_id: NodeId::fresh(),
            tag: tag.into(),
            id: None,
            classes: BTreeSet::new(),
            attrs: BTreeMap::new(),
            live: LiveState::default(),
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.live.value = Some(value.into());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.live.checked = checked;
        self
    }

    pub fn with_selected_index(mut self, index: usize) -> Self {
        self.live.selected_index = Some(index);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn set_class(&mut self, class: &str, on: bool) {
        if on {
            if !self.classes.contains(class) {
                self.classes.insert(class.to_string());
            }
        } else {
            self.classes.remove(class);
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Hidden by class or by the `hidden` attribute.
    pub fn is_hidden(&self) -> bool {
        self.has_class(HIDDEN_CLASS) || self.attrs.contains_key("hidden")
    }

    pub fn input_kind(&self) -> Option<InputKind> {
        match self.tag.as_str() {
            "select" => Some(InputKind::Choice),
            "textarea" => Some(InputKind::Text),
            "input" => match self.attr("type") {
                Some("checkbox") | Some("radio") => Some(InputKind::Toggle),
                Some("button") | Some("submit") | Some("reset") => None,
                _ => Some(InputKind::Text),
            },
            _ => None,
        }
    }

    /// Deep copy with freshly allocated node ids.
    pub fn fresh_copy(&self) -> Element {
        Element {
            node_id: NodeId::fresh(),
            tag: self.tag.clone(),
            id: self.id.clone(),
            classes: self.classes.clone(),
            attrs: self.attrs.clone(),
            live: self.live.clone(),
            children: self.children.iter().map(Node::fresh_copy).collect(),
        }
    }

    /// Content equality, ignoring node identity.
    pub fn same_content(&self, other: &Element) -> bool {
        self.tag == other.tag
            && self.id == other.id
            && self.classes == other.classes
            && self.attrs == other.attrs
            && self.live == other.live
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.same_content(b))
    }

    /// Visit this element and every descendant element, depth-first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        visit(self);
        for child in &self.children {
            if let Node::Element(el) = child {
                el.walk(visit);
            }
        }
    }

    /// Mutable depth-first visit.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        visit(self);
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.walk_mut(visit);
            }
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find_map(|el| el.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find_map(|el| el.find_by_id_mut(id))
    }

    pub fn find_by_node_id(&self, node_id: NodeId) -> Option<&Element> {
        if self.node_id == node_id {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find_map(|el| el.find_by_node_id(node_id))
    }

    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.find_by_node_id(node_id).is_some()
    }

    /// Number of elements in this subtree, including `self`.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("div")
            .with_id("root")
            .with_child(
                Element::new("section")
                    .with_attr(SECTION_ATTR, "work")
                    .with_child(Element::new("input").with_id("q").with_value("rust")),
            )
            .with_text("footer")
    }

    #[test]
    fn test_node_ids_are_unique() {
        let a = Element::new("div");
        let b = Element::new("div");
        assert_ne!(a.node_id, b.node_id);
    }

    #[test]
    fn test_fresh_copy_keeps_content_but_not_identity() {
        let original = sample();
        let copy = original.fresh_copy();
        assert!(original.same_content(&copy));
        assert_ne!(original, copy);
        let q = original.find_by_id("q").unwrap();
        assert!(!copy.contains_node(q.node_id));
    }

    #[test]
    fn test_find_by_id() {
        let mut root = sample();
        assert_eq!(root.find_by_id("q").unwrap().live.value.as_deref(), Some("rust"));
        root.find_by_id_mut("q").unwrap().live.value = Some("go".to_string());
        assert_eq!(root.find_by_id("q").unwrap().live.value.as_deref(), Some("go"));
        assert!(root.find_by_id("missing").is_none());
    }

    #[test]
    fn test_input_kind() {
        assert_eq!(
            Element::new("input").with_attr("type", "checkbox").input_kind(),
            Some(InputKind::Toggle)
        );
        assert_eq!(
            Element::new("input").with_attr("type", "radio").input_kind(),
            Some(InputKind::Toggle)
        );
        assert_eq!(Element::new("select").input_kind(), Some(InputKind::Choice));
        assert_eq!(Element::new("input").input_kind(), Some(InputKind::Text));
        assert_eq!(Element::new("textarea").input_kind(), Some(InputKind::Text));
        assert_eq!(
            Element::new("input").with_attr("type", "button").input_kind(),
            None
        );
        assert_eq!(Element::new("div").input_kind(), None);
    }

    #[test]
    fn test_hidden_by_class_or_attribute() {
        assert!(Element::new("div").with_class(HIDDEN_CLASS).is_hidden());
        assert!(Element::new("div").with_attr("hidden", "").is_hidden());
        assert!(!Element::new("div").is_hidden());
    }

    #[test]
    fn test_serialization_skips_node_identity() {
        let el = sample();
        let json = serde_json::to_string(&el).unwrap();
        assert!(!json.contains("node_id"));
        let back: Element = serde_json::from_str(&json).unwrap();
        assert!(back.same_content(&el));
    }

    #[test]
    fn test_element_count() {
        assert_eq!(sample().element_count(), 3);
    }
}
