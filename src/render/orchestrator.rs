//! The render orchestrator.
//!
//! Turns "this view may have changed" into render tasks. Content is produced
//! up front, fingerprinted, and only queued when it differs from what was
//! last queued for the same `(view, key)`. Queued tasks are executed by the
//! shared drain loop, one task per view per pass.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;

use serde::Serialize;
use tokio::sync::oneshot;

use super::fingerprint::fingerprint;
use crate::error::RenderError;
use crate::surface::{Node, Presentation, Surface};
use crate::surfaces::{Priority, RenderFn, SurfaceManager, TaskId};
use crate::traits::{ContentRequest, ContentSource};
use crate::view::ViewId;

/// What [`RenderOrchestrator::render_view`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "task", rename_all = "lowercase")]
pub enum RenderOutcome {
    /// Content matched the last fingerprint; nothing was queued.
    Skipped,
    /// A render task was queued.
    Enqueued(TaskId),
    /// The view was never initialized.
    Dropped,
}

/// Awaitable completion of one queued task.
#[derive(Debug)]
pub struct RenderHandle {
    id: Option<TaskId>,
    rx: oneshot::Receiver<Result<(), RenderError>>,
}

impl RenderHandle {
    pub fn task_id(&self) -> Option<TaskId> {
        self.id
    }

    /// Resolves once the task has run, with its result. A task that was
    /// dropped before running resolves to [`RenderError::Discarded`].
    pub async fn wait(self) -> Result<(), RenderError> {
        let task_id = self.id.map_or(0, |id| id.0);
        self.rx
            .await
            .unwrap_or(Err(RenderError::Discarded { task_id }))
    }
}

/// Per-view render counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderCounters {
    pub enqueued: u64,
    pub skipped: u64,
}

#[derive(Debug, Default)]
pub struct RenderOrchestrator {
    fingerprints: HashMap<(ViewId, String), String>,
    counters: BTreeMap<ViewId, RenderCounters>,
}

/// A task that replaces the view's content container with `content`.
///
/// Falls back to the surface root when the container is missing.
pub fn populate(view: ViewId, content: Vec<Node>) -> RenderFn {
    Box::new(move |surface: &mut Surface| {
        let container_id = view.spec().content_id;
        match surface.root_mut().find_by_id_mut(container_id) {
            Some(container) => container.children = content,
            None => {
                tracing::debug!("No '{}' container in '{}', rendering into root", container_id, view);
                surface.replace_children(content);
            }
        }
        Ok(())
    })
}

impl RenderOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce content for `view` and queue a render if it changed.
    ///
    /// `force` queues even when the fingerprint matches. Nothing is drained
    /// here; see [`Self::drain_pass`] and [`SurfaceManager::force_sync`].
    pub async fn render_view<F>(
        &mut self,
        manager: &mut SurfaceManager,
        view: ViewId,
        producer: F,
        key: &str,
        force: bool,
        priority: Priority,
    ) -> Result<RenderOutcome, RenderError>
    where
        F: Future<Output = Result<Vec<Node>, RenderError>>,
    {
        if !manager.is_initialized(view) {
            tracing::warn!("Not rendering '{}': view was never initialized", view);
            return Ok(RenderOutcome::Dropped);
        }

        let content = producer.await?;
        let fp = fingerprint(&content).map_err(|err| RenderError::Fingerprint {
            view,
            message: err.to_string(),
        })?;

        let slot = (view, key.to_string());
        if !force && self.fingerprints.get(&slot) == Some(&fp) {
            tracing::debug!("Skipping render of '{}' [{}]: content unchanged", view, key);
            self.counters.entry(view).or_default().skipped += 1;
            return Ok(RenderOutcome::Skipped);
        }

        match manager.push_task(view, populate(view, content), priority, None) {
            Some(id) => {
                self.fingerprints.insert(slot, fp);
                self.counters.entry(view).or_default().enqueued += 1;
                tracing::debug!("Queued render {} of '{}' [{}] ({})", id, view, key, priority);
                Ok(RenderOutcome::Enqueued(id))
            }
            None => Ok(RenderOutcome::Dropped),
        }
    }

    /// Queue `render_fn` and get a handle that resolves when it has run.
    pub fn queue_render(
        &mut self,
        manager: &mut SurfaceManager,
        view: ViewId,
        render_fn: RenderFn,
        priority: Priority,
    ) -> RenderHandle {
        let (tx, rx) = oneshot::channel();
        let id = manager.push_task(view, render_fn, priority, Some(tx));
        RenderHandle { id, rx }
    }

    /// Re-render `view` from its registered producer.
    pub async fn mark_dirty(
        &mut self,
        manager: &mut SurfaceManager,
        source: &dyn ContentSource,
        view: ViewId,
        request: &ContentRequest,
        priority: Priority,
        force: bool,
    ) -> Result<RenderOutcome, RenderError> {
        let key = request.fingerprint_key(view);
        self.render_view(manager, view, source.produce(view, request), &key, force, priority)
            .await
    }

    /// Run at most one task per view with queued work. The active view is
    /// reconciled once its queue is empty. Returns the number of tasks run.
    pub fn drain_pass(&mut self, manager: &mut SurfaceManager, presentation: &mut Presentation) -> usize {
        let mut ran = 0;
        for view in manager.pending_views() {
            if manager.run_next(view).is_some() {
                ran += 1;
                if manager.queue_len(view) == 0 && manager.active() == Some(view) {
                    manager.reconcile(view, presentation);
                }
            }
        }
        ran
    }

    /// Drain every queue, yielding to the runtime between passes.
    pub async fn drain_all(
        &mut self,
        manager: &mut SurfaceManager,
        presentation: &mut Presentation,
    ) -> usize {
        let mut total = 0;
        loop {
            total += self.drain_pass(manager, presentation);
            if manager.pending_views().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        total
    }

    /// Forget every fingerprint recorded for `view`.
    pub fn invalidate(&mut self, view: ViewId) {
        self.fingerprints.retain(|(v, _), _| *v != view);
    }

    pub fn fingerprint_count(&self, view: ViewId) -> usize {
        self.fingerprints.keys().filter(|(v, _)| *v == view).count()
    }

    pub fn counters(&self, view: ViewId) -> RenderCounters {
        self.counters.get(&view).copied().unwrap_or_default()
    }
}
