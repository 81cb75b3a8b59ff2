//! Static content source for testing and the demo driver.
//!
//! [`StaticContent`] serves fixed fragments per view and counts how often
//! each producer is called. [`sample_presentation`] builds a document whose
//! visible surfaces match the element ids the state store looks for.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::RenderError;
use crate::surface::{Element, Node, Presentation, COLLAPSED_CLASS, ITEM_ATTR, SECTION_ATTR};
use crate::traits::ContentSource;
use crate::view::ViewId;

/// Content source with fixed per-view fragments.
///
/// The saved view's fragment is rendered once per grouping key: when no
/// fragment was set explicitly, sections are named `<group_by>-<n>`.
#[derive(Debug, Clone)]
pub struct StaticContent {
    fragments: Arc<Mutex<BTreeMap<ViewId, Vec<Node>>>>,
    calls: Arc<Mutex<BTreeMap<ViewId, usize>>>,
    failing: Arc<Mutex<BTreeMap<ViewId, bool>>>,
    last_saved_request: Arc<Mutex<Option<(String, bool)>>>,
}

impl StaticContent {
    /// A source serving [`sample_fragment`] for every view.
    pub fn new() -> Self {
        let fragments = ViewId::ALL
            .iter()
            .filter(|v| **v != ViewId::Saved)
            .map(|v| (*v, sample_fragment(*v, "category")))
            .collect();
        Self {
            fragments: Arc::new(Mutex::new(fragments)),
            calls: Arc::new(Mutex::new(BTreeMap::new())),
            failing: Arc::new(Mutex::new(BTreeMap::new())),
            last_saved_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the fragment served for `view`.
    pub fn set_content(&self, view: ViewId, content: Vec<Node>) {
        self.fragments.lock().unwrap().insert(view, content);
    }

    /// Configure whether the producer for `view` should fail.
    pub fn set_should_fail(&self, view: ViewId, should_fail: bool) {
        self.failing.lock().unwrap().insert(view, should_fail);
    }

    /// Number of times the producer for `view` was called.
    pub fn calls(&self, view: ViewId) -> usize {
        self.calls.lock().unwrap().get(&view).copied().unwrap_or(0)
    }

    /// Arguments of the last saved-view call.
    pub fn last_saved_request(&self) -> Option<(String, bool)> {
        self.last_saved_request.lock().unwrap().clone()
    }

    fn serve(&self, view: ViewId) -> Result<Option<Vec<Node>>, RenderError> {
        *self.calls.lock().unwrap().entry(view).or_insert(0) += 1;
        if self.failing.lock().unwrap().get(&view).copied().unwrap_or(false) {
            return Err(RenderError::ContentFailed {
                view,
                message: "Mock content failure".to_string(),
            });
        }
        Ok(self.fragments.lock().unwrap().get(&view).cloned())
    }
}

impl Default for StaticContent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentSource for StaticContent {
    async fn produce_current_view_content(&self) -> Result<Vec<Node>, RenderError> {
        Ok(self.serve(ViewId::Categorize)?.unwrap_or_default())
    }

    async fn produce_saved_view_content(
        &self,
        group_by: &str,
        show_ignored: bool,
    ) -> Result<Vec<Node>, RenderError> {
        *self.last_saved_request.lock().unwrap() = Some((group_by.to_string(), show_ignored));
        Ok(self
            .serve(ViewId::Saved)?
            .unwrap_or_else(|| sample_fragment(ViewId::Saved, group_by)))
    }

    async fn produce_settings_content(&self) -> Result<Vec<Node>, RenderError> {
        Ok(self.serve(ViewId::Settings)?.unwrap_or_default())
    }
}

fn section(id: &str, items: &[&str]) -> Element {
    items.iter().fold(
        Element::new("section")
            .with_id(format!("section-{}", id))
            .with_attr(SECTION_ATTR, id)
            .with_class(COLLAPSED_CLASS)
            .with_child(Element::new("h3").with_text(id)),
        |sec, item| {
            sec.with_child(
                Element::new("li")
                    .with_id(format!("item-{}", item))
                    .with_attr(ITEM_ATTR, *item)
                    .with_text(*item),
            )
        },
    )
}

/// Content fragment for `view`, as a content producer would build it.
pub fn sample_fragment(view: ViewId, group_by: &str) -> Vec<Node> {
    match view {
        ViewId::Categorize => vec![
            section("work", &["docs.rs", "crates.io"]).into(),
            section("news", &["lwn.net"]).into(),
        ],
        ViewId::Saved => vec![
            section(&format!("{}-1", group_by), &["saved-a", "saved-b"]).into(),
            section(&format!("{}-2", group_by), &["saved-c"]).into(),
        ],
        ViewId::Settings => vec![Element::new("form")
            .with_id("settingsForm")
            .with_child(
                Element::new("input")
                    .with_id("autoCategorize")
                    .with_attr("type", "checkbox"),
            )
            .with_child(
                Element::new("select")
                    .with_id("themeSelect")
                    .with_child(Element::new("option").with_text("system"))
                    .with_child(Element::new("option").with_text("dark")),
            )
            .with_child(Element::new("input").with_id("apiKey"))
            .with_child(section("advanced", &[]))
            .into()],
    }
}

/// Visible skeleton for `view`: toolbar controls plus an empty content container.
pub fn sample_view_root(view: ViewId) -> Element {
    let spec = view.spec();
    let mut root = Element::new("div").with_id(format!("{}View", view.as_str()));
    if let Some(search) = spec.search_input_id {
        root = root.with_child(Element::new("input").with_id(search));
    }
    if let Some(select) = spec.group_select_id {
        root = root.with_child(
            Element::new("select")
                .with_id(select)
                .with_value(spec.default_group_by),
        );
    }
    root.with_child(Element::new("div").with_id(spec.content_id))
}

/// A document with one visible skeleton per view.
pub fn sample_presentation() -> Presentation {
    ViewId::ALL
        .iter()
        .fold(Presentation::new(), |p, view| {
            p.with_view(*view, sample_view_root(*view))
        })
}
