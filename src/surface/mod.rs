//! The presentation model the rendering core works against.
//!
//! - [`node`]: element trees with stable node identity and live input state
//! - [`document`]: surfaces and the visible document (focus, active classes)
//! - [`patch`]: keyed node-level diff/patch with update hooks

pub mod document;
pub mod node;
pub mod patch;

pub use document::{FocusTarget, Presentation, Surface, TextSelection, ACTIVE_CLASS};
pub use node::{
    Element, InputKind, LiveState, Node, NodeId, ScrollOffsets, COLLAPSED_CLASS, HIDDEN_CLASS,
    ITEM_ATTR, SECTION_ATTR, SELECTED_CLASS,
};
pub use patch::{patch_element, NoHooks, PatchHooks, PatchStats};
