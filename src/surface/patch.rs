//! Node-level tree patching.
//!
//! [`patch_element`] mutates a target tree until its content matches a source
//! tree, reusing target elements wherever it can instead of replacing whole
//! subtrees. Children are matched by element id first, then positionally by
//! tag among unkeyed siblings. Matched elements keep their [`NodeId`], which
//! is what lets focus and other identity-bound state survive a patch.
//!
//! Hooks run around every element update the way DOM morphing libraries
//! expose `onBeforeElUpdated`/`onElUpdated`.
//!
//! [`NodeId`]: super::node::NodeId

use std::collections::HashMap;

use super::node::{Element, Node};

/// Callbacks invoked around each in-place element update.
pub trait PatchHooks {
    /// Called before `current` is updated from `incoming`. Returning false
    /// leaves `current` and its subtree untouched.
    fn before_element_update(&mut self, _current: &Element, _incoming: &Element) -> bool {
        true
    }

    /// Called after `updated` (and its subtree) has been patched.
    fn after_element_update(&mut self, _updated: &mut Element) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl PatchHooks for NoHooks {}

/// What a patch did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PatchStats {
    /// Elements or text nodes whose own content changed.
    pub updated: usize,
    /// Nodes inserted from the source.
    pub inserted: usize,
    /// Nodes removed from the target.
    pub removed: usize,
    /// Elements skipped because a hook vetoed the update.
    pub skipped: usize,
}

impl PatchStats {
    /// True when the target already matched the source.
    pub fn is_noop(&self) -> bool {
        self.updated == 0 && self.inserted == 0 && self.removed == 0
    }
}

/// Patch `target` so its content matches `source`.
///
/// The root is always updated in place, even when tags differ.
pub fn patch_element(
    target: &mut Element,
    source: &Element,
    hooks: &mut dyn PatchHooks,
) -> PatchStats {
    let mut stats = PatchStats::default();
    morph(target, source, hooks, &mut stats);
    stats
}

fn morph(target: &mut Element, source: &Element, hooks: &mut dyn PatchHooks, stats: &mut PatchStats) {
    if !hooks.before_element_update(target, source) {
        stats.skipped += 1;
        return;
    }

    let mut changed = false;
    if target.tag != source.tag {
        target.tag = source.tag.clone();
        changed = true;
    }
    if target.id != source.id {
        target.id = source.id.clone();
        changed = true;
    }
    if target.classes != source.classes {
        target.classes = source.classes.clone();
        changed = true;
    }
    if target.attrs != source.attrs {
        target.attrs = source.attrs.clone();
        changed = true;
    }
    // Live state follows the source like DOM properties do; hooks decide what survives.
    if target.live != source.live {
        target.live = source.live.clone();
    }
    if changed {
        stats.updated += 1;
    }

    morph_children(target, source, hooks, stats);
    hooks.after_element_update(target);
}

fn morph_children(
    target: &mut Element,
    source: &Element,
    hooks: &mut dyn PatchHooks,
    stats: &mut PatchStats,
) {
    let mut old: Vec<Option<Node>> = std::mem::take(&mut target.children)
        .into_iter()
        .map(Some)
        .collect();

    let keyed: HashMap<String, usize> = old
        .iter()
        .enumerate()
        .filter_map(|(i, n)| match n {
            Some(Node::Element(el)) => el.id.clone().map(|id| (id, i)),
            _ => None,
        })
        .collect();

    let mut cursor = 0;
    let mut children = Vec::with_capacity(source.children.len());

    for incoming in &source.children {
        let slot = match incoming {
            Node::Element(el) => match &el.id {
                Some(id) => keyed
                    .get(id)
                    .copied()
                    .filter(|&i| matches!(&old[i], Some(Node::Element(o)) if o.tag == el.tag)),
                None => find_unkeyed(&old, cursor, |n| {
                    matches!(n, Node::Element(o) if o.id.is_none() && o.tag == el.tag)
                }),
            },
            Node::Text(_) => find_unkeyed(&old, cursor, |n| matches!(n, Node::Text(_))),
        };

        match slot.and_then(|i| old[i].take().map(|n| (i, n))) {
            Some((i, mut existing)) => {
                if incoming.as_element().map_or(true, |el| el.id.is_none()) {
                    cursor = i + 1;
                }
                match (&mut existing, incoming) {
                    (Node::Element(cur), Node::Element(new)) => morph(cur, new, hooks, stats),
                    (Node::Text(cur), Node::Text(new)) => {
                        if cur != new {
                            cur.clone_from(new);
                            stats.updated += 1;
                        }
                    }
                    _ => unreachable!("slot lookup only matches nodes of the same kind"),
                }
                children.push(existing);
            }
            None => {
                stats.inserted += 1;
                children.push(incoming.fresh_copy());
            }
        }
    }

    stats.removed += old.iter().filter(|n| n.is_some()).count();
    target.children = children;
}

fn find_unkeyed(old: &[Option<Node>], from: usize, accept: impl Fn(&Node) -> bool) -> Option<usize> {
    old.iter()
        .enumerate()
        .skip(from)
        .find(|(_, n)| n.as_ref().is_some_and(&accept))
        .map(|(i, _)| i)
}
