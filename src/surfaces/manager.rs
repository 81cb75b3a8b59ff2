//! The dual-surface manager.
//!
//! Each initialized view owns a detached off-screen surface and a task
//! queue. Tasks only ever write the off-screen surface; the visible surface
//! in [`Presentation`] changes only through [`SurfaceManager::reconcile`].

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};

use super::hooks::ReconcileHooks;
use super::task::{Completion, Priority, RenderFn, RenderTask, TaskId};
use crate::error::{ErrorContext, RenderError};
use crate::surface::{patch_element, PatchStats, Presentation, Surface, ACTIVE_CLASS, HIDDEN_CLASS};
use crate::view::ViewId;

#[derive(Debug)]
struct ViewRecord {
    offscreen: Surface,
    queue: VecDeque<RenderTask>,
    processing: bool,
    executed: u64,
    failed: u64,
    last_reconciled: Option<DateTime<Utc>>,
}

impl ViewRecord {
    fn new(offscreen: Surface) -> Self {
        Self {
            offscreen,
            queue: VecDeque::new(),
            processing: false,
            executed: 0,
            failed: 0,
            last_reconciled: None,
        }
    }

    fn push(&mut self, task: RenderTask) {
        match task.priority {
            Priority::High => self.queue.push_front(task),
            Priority::Normal => self.queue.push_back(task),
        }
    }

    /// Run the task at the head of the queue. The `processing` flag is held
    /// for the duration of the task.
    fn run_next(&mut self) -> Option<Result<(), RenderError>> {
        let task = self.queue.pop_front()?;
        let id = task.id;
        let view = task.view;
        self.processing = true;
        let result = task.run(&mut self.offscreen);
        self.processing = false;
        self.executed += 1;
        if let Err(err) = &result {
            self.failed += 1;
            let ctx = ErrorContext::new("render_task").with_view(view).with_task_id(id.0);
            tracing::warn!("{} {}", err, ctx);
        } else {
            tracing::trace!("Render task {} for '{}' done", id, view);
        }
        Some(result)
    }
}

/// Per-view queue counters for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub queued: usize,
    pub processing: bool,
    pub executed: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
pub struct SurfaceManager {
    views: BTreeMap<ViewId, ViewRecord>,
    active: Option<ViewId>,
    next_task_id: u64,
}

impl SurfaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the off-screen surface of `view` as a detached copy of its
    /// visible surface. A previous off-screen surface and its queue are dropped.
    pub fn initialize_view(&mut self, view: ViewId, presentation: &Presentation) -> bool {
        let visible = match presentation.surface(view) {
            Some(visible) => visible,
            None => {
                tracing::warn!("Cannot initialize '{}': no visible surface", view);
                return false;
            }
        };

        let record = ViewRecord::new(Surface::detached_copy_of(visible));
        if let Some(stale) = self.views.insert(view, record) {
            tracing::debug!(
                "Discarded stale off-screen surface for '{}' ({} queued tasks)",
                view,
                stale.queue.len()
            );
        }
        tracing::debug!("Initialized off-screen surface for '{}'", view);
        true
    }

    pub fn is_initialized(&self, view: ViewId) -> bool {
        self.views.contains_key(&view)
    }

    pub fn initialized_views(&self) -> Vec<ViewId> {
        self.views.keys().copied().collect()
    }

    pub fn set_active(&mut self, view: ViewId) {
        self.active = Some(view);
    }

    pub fn active(&self) -> Option<ViewId> {
        self.active
    }

    /// The off-screen surface of `view`. Never shown to the user.
    pub fn offscreen(&self, view: ViewId) -> Option<&Surface> {
        self.views.get(&view).map(|r| &r.offscreen)
    }

    fn next_id(&mut self) -> TaskId {
        self.next_task_id += 1;
        TaskId(self.next_task_id)
    }

    /// Queue a task without draining.
    ///
    /// Returns `None` (and drops the completion) when `view` was never initialized.
    pub fn push_task(
        &mut self,
        view: ViewId,
        render_fn: RenderFn,
        priority: Priority,
        done: Option<Completion>,
    ) -> Option<TaskId> {
        if !self.views.contains_key(&view) {
            tracing::warn!("Dropping render task: view '{}' was never initialized", view);
            return None;
        }
        let id = self.next_id();
        let mut task = RenderTask::new(id, view, render_fn, priority);
        if let Some(done) = done {
            task = task.with_completion(done);
        }
        let record = self.views.get_mut(&view)?;
        record.push(task);
        tracing::trace!("Queued task {} for '{}' ({})", id, view, priority);
        Some(id)
    }

    /// Queue a task and drain the view's queue.
    pub fn enqueue_update(
        &mut self,
        view: ViewId,
        render_fn: RenderFn,
        priority: Priority,
        presentation: &mut Presentation,
    ) -> Option<TaskId> {
        let id = self.push_task(view, render_fn, priority, None)?;
        self.drain_queue(view, presentation);
        Some(id)
    }

    /// Run every queued task of `view`, then reconcile if it is the active view.
    ///
    /// Failed tasks are logged and do not stop the drain. Returns the number
    /// of tasks run.
    pub fn drain_queue(&mut self, view: ViewId, presentation: &mut Presentation) -> usize {
        let record = match self.views.get_mut(&view) {
            Some(record) => record,
            None => {
                tracing::warn!("Cannot drain '{}': view was never initialized", view);
                return 0;
            }
        };
        if record.processing {
            return 0;
        }

        let mut ran = 0;
        while record.run_next().is_some() {
            ran += 1;
        }

        if self.active == Some(view) {
            self.reconcile(view, presentation);
        }
        ran
    }

    /// Run only the next task of `view`, without reconciling.
    pub fn run_next(&mut self, view: ViewId) -> Option<Result<(), RenderError>> {
        let record = self.views.get_mut(&view)?;
        if record.processing {
            return None;
        }
        record.run_next()
    }

    /// Patch the visible surface of `view` to match its off-screen surface.
    ///
    /// Returns what the patch did, or `None` if either surface is missing.
    pub fn reconcile(&mut self, view: ViewId, presentation: &mut Presentation) -> Option<PatchStats> {
        let record = match self.views.get_mut(&view) {
            Some(record) => record,
            None => {
                tracing::warn!("Cannot reconcile '{}': view was never initialized", view);
                return None;
            }
        };
        let visible_hidden = match presentation.surface(view) {
            Some(visible) => !visible.is_computed_visible(),
            None => {
                tracing::warn!("Cannot reconcile '{}': no visible surface", view);
                return None;
            }
        };

        if visible_hidden && record.offscreen.is_computed_visible() {
            tracing::warn!("Surface identity mix-up on '{}', swapping back", view);
            presentation.swap_surface(view, &mut record.offscreen);
            record.offscreen.set_attached(false);
            record.offscreen.set_interactive(false);
            if let Some(visible) = presentation.surface_mut(view) {
                visible.set_attached(true);
                visible.set_interactive(true);
            }
        }

        let focus = presentation.take_focus();
        let visible = presentation.surface_mut(view)?;

        // Visibility classes belong to the presentation, not to rendered content.
        let root = visible.root();
        let (active, hidden) = (root.has_class(ACTIVE_CLASS), root.has_class(HIDDEN_CLASS));
        let source = record.offscreen.root_mut();
        source.set_class(ACTIVE_CLASS, active);
        source.set_class(HIDDEN_CLASS, hidden);

        let mut hooks = ReconcileHooks::new();
        let stats = patch_element(visible.root_mut(), record.offscreen.root(), &mut hooks);
        record.last_reconciled = Some(Utc::now());

        if let Some(target) = focus {
            if !presentation.restore_focus(target) {
                tracing::debug!("Focused node in '{}' did not survive reconciliation", target.view);
            }
        }

        tracing::debug!(
            "Reconciled '{}': {} updated, {} inserted, {} removed",
            view,
            stats.updated,
            stats.inserted,
            stats.removed
        );
        Some(stats)
    }

    /// Drain the queue if anything is pending, otherwise reconcile.
    ///
    /// Always reconciles, even when `view` is not the active view.
    pub fn force_sync(&mut self, view: ViewId, presentation: &mut Presentation) -> Option<PatchStats> {
        let record = match self.views.get_mut(&view) {
            Some(record) => record,
            None => {
                tracing::warn!("Cannot sync '{}': view was never initialized", view);
                return None;
            }
        };
        if !record.queue.is_empty() && !record.processing {
            while record.run_next().is_some() {}
        }
        self.reconcile(view, presentation)
    }

    pub fn queue_len(&self, view: ViewId) -> usize {
        self.views.get(&view).map_or(0, |r| r.queue.len())
    }

    pub fn is_processing(&self, view: ViewId) -> bool {
        self.views.get(&view).is_some_and(|r| r.processing)
    }

    /// Views with queued tasks, in view order.
    pub fn pending_views(&self) -> Vec<ViewId> {
        self.views
            .iter()
            .filter(|(_, r)| !r.queue.is_empty())
            .map(|(v, _)| *v)
            .collect()
    }

    /// Ids of the tasks queued for `view`, head first.
    pub fn queued_task_ids(&self, view: ViewId) -> Vec<TaskId> {
        self.views
            .get(&view)
            .map(|r| r.queue.iter().map(|t| t.id).collect())
            .unwrap_or_default()
    }

    pub fn stats(&self, view: ViewId) -> Option<QueueStats> {
        self.views.get(&view).map(|r| QueueStats {
            queued: r.queue.len(),
            processing: r.processing,
            executed: r.executed,
            failed: r.failed,
        })
    }

    pub fn last_reconciled(&self, view: ViewId) -> Option<DateTime<Utc>> {
        self.views.get(&view).and_then(|r| r.last_reconciled)
    }
}
