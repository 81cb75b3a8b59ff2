//! The coordinator context.
//!
//! [`Coordinator`] owns every component: the state store, the surface
//! manager, the render orchestrator, the visible presentation and the
//! scheduler. Components never reach each other through globals; the
//! coordinator passes the pieces each operation needs.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use super::data_change::DataChange;
use super::events::{CoreEvent, EventBus, EventKind, EventListener, EventListenerId};
use super::status::{CoreStatus, ViewStatus};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, ErrorContext, RenderError, ResultExt, SurfaceError};
use crate::render::{RenderOrchestrator, RenderOutcome};
use crate::scheduler::{Scheduler, TimerId};
use crate::state::{GlobalUpdate, PersistOutcome, StateStore};
use crate::surface::Presentation;
use crate::surfaces::{Priority, SurfaceManager};
use crate::traits::{ContentRequest, ContentSource, DurableStorage};
use crate::view::ViewId;

/// Work the coordinator defers to its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerJob {
    AutoSave,
    CaptureState(ViewId),
    DeferredRestore(ViewId),
    DrainQueues,
}

/// A tracked user interaction on a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    Scroll,
    Input,
    Change,
    Click,
    Focus,
}

/// What [`Coordinator::switch_view`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchOutcome {
    AlreadyActive,
    Switched,
    /// Visible classes and the active id changed, state was not preserved.
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingUpdate {
    pub view: ViewId,
    pub priority: Priority,
    pub arrival: u64,
}

/// One entry per view, keeping the highest priority and the earliest
/// arrival, ordered high priority first and then by arrival.
pub(crate) fn dedupe_pending(pending: Vec<PendingUpdate>) -> Vec<PendingUpdate> {
    let mut by_view: BTreeMap<ViewId, PendingUpdate> = BTreeMap::new();
    for update in pending {
        by_view
            .entry(update.view)
            .and_modify(|kept| {
                kept.priority = kept.priority.max(update.priority);
                kept.arrival = kept.arrival.min(update.arrival);
            })
            .or_insert(update);
    }
    let mut replays: Vec<PendingUpdate> = by_view.into_values().collect();
    replays.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.arrival.cmp(&b.arrival)));
    replays
}

pub struct Coordinator {
    config: CoreConfig,
    content: Arc<dyn ContentSource>,
    presentation: Presentation,
    store: StateStore,
    surfaces: SurfaceManager,
    renderer: RenderOrchestrator,
    scheduler: Scheduler<TimerJob>,
    events: EventBus,
    pending: Vec<PendingUpdate>,
    arrivals: u64,
    replayed: usize,
    pending_switch: Option<ViewId>,
    show_ignored: bool,
    auto_save: Option<TimerId>,
    initialized: bool,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("surfaces", &self.surfaces)
            .field("events", &self.events)
            .field("pending", &self.pending.len())
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl Coordinator {
    pub fn new(
        presentation: Presentation,
        storage: Arc<dyn DurableStorage>,
        content: Arc<dyn ContentSource>,
        config: CoreConfig,
    ) -> Self {
        Self {
            show_ignored: config.show_ignored,
            config,
            content,
            presentation,
            store: StateStore::new(storage),
            surfaces: SurfaceManager::new(),
            renderer: RenderOrchestrator::new(),
            scheduler: Scheduler::new(),
            events: EventBus::default(),
            pending: Vec::new(),
            arrivals: 0,
            replayed: 0,
            pending_switch: None,
            auto_save: None,
            initialized: false,
        }
    }

    /// Bring up the store, the surfaces and the renderer, preload every
    /// view, show the active one and replay updates that arrived early.
    ///
    /// Fails only when no view has a visible surface or the active view has
    /// none.
    pub async fn initialize(&mut self) -> CoreResult<()> {
        if self.initialized {
            tracing::debug!("Coordinator already initialized");
            return Ok(());
        }

        self.store.initialize().await;

        let mut ready = Vec::new();
        for view in ViewId::ALL {
            if self.surfaces.initialize_view(view, &self.presentation) {
                ready.push(view);
            }
        }
        if ready.is_empty() {
            return Err(CoreError::initialization("no view has a visible surface")
                .with_context(ErrorContext::new("initialize")));
        }

        let stored_active = self.store.active_view();
        let active = self.pending_switch.take().unwrap_or(stored_active);
        if !ready.contains(&active) {
            return Err(CoreError::initialization(format!(
                "active view '{}' has no visible surface",
                active
            ))
            .with_context(ErrorContext::new("initialize").with_view(active)));
        }

        for &view in &ready {
            if let Err(err) = self.render(view, Priority::Normal, true).await {
                tracing::warn!("Preloading '{}' failed: {}", view, err);
            }
        }
        self.renderer
            .drain_all(&mut self.surfaces, &mut self.presentation)
            .await;

        self.surfaces.set_active(active);
        self.presentation.show_only(active);
        self.surfaces.force_sync(active, &mut self.presentation);
        self.restore(active);

        if active != stored_active {
            let now = self.scheduler.now();
            self.store
                .update_global(GlobalUpdate::ActiveView(active), now)
                .await;
        }

        self.auto_save = Some(
            self.scheduler
                .schedule_repeating(self.config.auto_save_interval, TimerJob::AutoSave),
        );
        self.initialized = true;
        tracing::info!(
            "Initialized {} view(s), active view '{}'",
            ready.len(),
            active
        );

        self.replay_pending().await;
        Ok(())
    }

    async fn replay_pending(&mut self) {
        let replays = dedupe_pending(std::mem::take(&mut self.pending));
        self.replayed = replays.len();
        if !replays.is_empty() {
            tracing::debug!("Replaying {} early update(s)", replays.len());
        }
        for update in replays {
            self.update_content(update.view, update.priority).await;
        }
    }

    /// Make `target` the active view, preserving the outgoing view's state.
    ///
    /// Any failure on the way falls back to a direct switch, so the user
    /// always ends up on `target`.
    pub async fn switch_view(&mut self, target: ViewId) -> SwitchOutcome {
        if !self.initialized {
            tracing::warn!(
                "Switching to '{}' before initialization, state is not preserved",
                target
            );
            self.presentation.show_only(target);
            self.pending_switch = Some(target);
            return SwitchOutcome::Degraded;
        }

        let from = self.store.active_view();
        if from == target {
            tracing::debug!("'{}' is already active", target);
            return SwitchOutcome::AlreadyActive;
        }

        match self.try_switch(from, target).await {
            Ok(()) => {
                tracing::info!("Switched from '{}' to '{}'", from, target);
                SwitchOutcome::Switched
            }
            Err(cause) => {
                let err = CoreError::Switch {
                    from,
                    to: target,
                    message: cause.to_string(),
                };
                tracing::warn!(
                    "{}: {} [{}], switching directly",
                    err.category().description(),
                    err,
                    err.error_code()
                );
                if let Some(ctx) = cause.context() {
                    tracing::debug!("Switch failure context: {}", ctx.to_log_string());
                }
                self.degraded_switch(from, target).await;
                SwitchOutcome::Degraded
            }
        }
    }

    async fn try_switch(&mut self, from: ViewId, target: ViewId) -> CoreResult<()> {
        if !self.surfaces.is_initialized(target) {
            return Err(SurfaceError::ViewNotInitialized(target))
                .context(ErrorContext::new("switch_view").with_view(target));
        }
        if !self.store.capture_view_state(from, &self.presentation) {
            return Err(SurfaceError::MissingVisibleSurface(from))
                .context(ErrorContext::new("capture_view_state").with_view(from));
        }
        self.presentation.blur();

        if let Err(err) = self.render(target, Priority::High, false).await {
            tracing::warn!("Showing previous content of '{}': {}", target, err);
        }

        self.surfaces.set_active(target);
        self.presentation.show_only(target);
        self.surfaces
            .force_sync(target, &mut self.presentation)
            .ok_or(SurfaceError::MissingVisibleSurface(target))
            .context(ErrorContext::new("force_sync").with_view(target))?;
        self.restore(target);

        let now = self.scheduler.now();
        self.store
            .update_global(GlobalUpdate::ActiveView(target), now)
            .await;
        self.events.emit(&CoreEvent::ViewSwitched {
            from,
            to: target,
            timestamp: Utc::now(),
            degraded: false,
        });
        Ok(())
    }

    async fn degraded_switch(&mut self, from: ViewId, target: ViewId) {
        self.presentation.show_only(target);
        self.surfaces.set_active(target);
        let now = self.scheduler.now();
        self.store
            .update_global(GlobalUpdate::ActiveView(target), now)
            .await;
        self.events.emit(&CoreEvent::ViewSwitched {
            from,
            to: target,
            timestamp: Utc::now(),
            degraded: true,
        });
    }

    fn restore(&mut self, view: ViewId) {
        if self.store.restore_view_state(view, &mut self.presentation) {
            self.scheduler
                .debounce(self.config.restore_delay, TimerJob::DeferredRestore(view));
            self.events.emit(&CoreEvent::StateRestored { view });
        }
    }

    /// Refresh `view`'s content.
    ///
    /// Before initialization the request is held for replay and `None` is
    /// returned. A high priority update is drained and reconciled before
    /// this returns; a normal one waits for the next drain.
    pub async fn update_content(&mut self, view: ViewId, priority: Priority) -> Option<RenderOutcome> {
        if !self.initialized {
            self.arrivals += 1;
            self.pending.push(PendingUpdate {
                view,
                priority,
                arrival: self.arrivals,
            });
            tracing::debug!(
                "Holding {} update of '{}' until initialization finishes",
                priority,
                view
            );
            return None;
        }

        let outcome = match self.render(view, priority, false).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("Update of '{}' failed: {}", view, err);
                return None;
            }
        };

        match (priority, outcome) {
            (_, RenderOutcome::Dropped) => {}
            (Priority::High, _) => {
                self.surfaces.force_sync(view, &mut self.presentation);
            }
            (Priority::Normal, RenderOutcome::Enqueued(_)) => self.schedule_drain(),
            (Priority::Normal, RenderOutcome::Skipped) => {}
        }

        self.events.emit(&CoreEvent::ContentUpdated {
            view,
            priority,
            outcome,
        });
        Some(outcome)
    }

    async fn render(
        &mut self,
        view: ViewId,
        priority: Priority,
        force: bool,
    ) -> Result<RenderOutcome, RenderError> {
        let request = ContentRequest::new(
            self.store.snapshot(view).group_by.clone(),
            self.show_ignored,
        );
        self.renderer
            .mark_dirty(
                &mut self.surfaces,
                self.content.as_ref(),
                view,
                &request,
                priority,
                force,
            )
            .await
    }

    fn schedule_drain(&mut self) {
        if !self.scheduler.is_scheduled(&TimerJob::DrainQueues) {
            self.scheduler.schedule(Duration::ZERO, TimerJob::DrainQueues);
        }
    }

    /// Apply a data change and issue the updates it maps to. Returns the
    /// issued updates in order.
    pub async fn handle_data_change(&mut self, change: DataChange) -> Vec<(ViewId, Priority)> {
        tracing::debug!("Data change: {}", change.name());

        match &change {
            DataChange::GroupingChanged { view, group_by } => {
                self.store.set_group_by(*view, group_by.clone());
                if let Some(select_id) = view.spec().group_select_id {
                    if let Some(select) = self.presentation.element_by_id_mut(*view, select_id) {
                        select.live.value = Some(group_by.clone());
                    }
                }
            }
            DataChange::FilterChanged {
                search,
                show_ignored,
            } => {
                self.show_ignored = *show_ignored;
                if let Some(search) = search {
                    self.store.set_search_text(ViewId::Saved, search.clone());
                    if let Some(input_id) = ViewId::Saved.spec().search_input_id {
                        if let Some(input) =
                            self.presentation.element_by_id_mut(ViewId::Saved, input_id)
                        {
                            input.live.value = Some(search.clone());
                        }
                    }
                }
            }
            _ => {}
        }

        let updates = change.updates();
        for &(view, priority) in &updates {
            self.update_content(view, priority).await;
        }
        updates
    }

    /// Note an interaction on `view`; its state is captured once
    /// interactions stop for the capture debounce.
    pub fn record_interaction(&mut self, view: ViewId, interaction: Interaction) {
        tracing::trace!("{:?} on '{}'", interaction, view);
        self.scheduler
            .debounce(self.config.capture_debounce, TimerJob::CaptureState(view));
    }

    /// Capture every view now and persist.
    pub async fn handle_page_hide(&mut self) -> PersistOutcome {
        for view in self.surfaces.initialized_views() {
            self.store.capture_view_state(view, &self.presentation);
        }
        self.store.persist(self.scheduler.now()).await
    }

    /// Cancel the recurring auto-save. Returns false if it was not running.
    pub fn stop_auto_save(&mut self) -> bool {
        match self.auto_save.take() {
            Some(id) => self.scheduler.cancel(id),
            None => false,
        }
    }

    /// Mutate global state and persist it.
    pub async fn update_global(&mut self, update: GlobalUpdate) -> PersistOutcome {
        let now = self.scheduler.now();
        self.store.update_global(update, now).await
    }

    /// Move virtual time forward by `by`, running every job that falls due,
    /// including jobs scheduled by earlier jobs in the same window.
    pub async fn advance(&mut self, by: Duration) -> usize {
        let deadline = self.scheduler.now() + by;
        let mut ran = 0;
        while let Some(job) = self.scheduler.pop_due(deadline) {
            self.run_job(job).await;
            ran += 1;
        }
        self.scheduler.advance_to(deadline);
        ran
    }

    /// Run whatever is due without moving time.
    pub async fn tick(&mut self) -> usize {
        self.advance(Duration::ZERO).await
    }

    async fn run_job(&mut self, job: TimerJob) {
        match job {
            TimerJob::AutoSave => {
                let now = self.scheduler.now();
                if self.store.needs_auto_save(now, self.config.auto_save_interval) {
                    self.store.persist(now).await;
                } else {
                    tracing::trace!("Skipping auto-save, last save is recent");
                }
            }
            TimerJob::CaptureState(view) => {
                self.store.capture_view_state(view, &self.presentation);
            }
            TimerJob::DeferredRestore(view) => {
                self.store
                    .apply_deferred_restore(view, &mut self.presentation);
            }
            TimerJob::DrainQueues => {
                let ran = self
                    .renderer
                    .drain_all(&mut self.surfaces, &mut self.presentation)
                    .await;
                tracing::trace!("Drained {} render task(s)", ran);
            }
        }
    }

    pub fn add_listener(&mut self, kind: EventKind, listener: EventListener) -> EventListenerId {
        self.events.add(kind, listener)
    }

    pub fn remove_listener(&mut self, id: EventListenerId) -> bool {
        self.events.remove(id)
    }

    pub fn status(&self) -> CoreStatus {
        let views = ViewId::ALL
            .iter()
            .map(|&view| {
                let stats = self.surfaces.stats(view);
                ViewStatus {
                    view,
                    initialized: stats.is_some(),
                    queued: stats.map_or(0, |s| s.queued),
                    processing: stats.is_some_and(|s| s.processing),
                    executed: stats.map_or(0, |s| s.executed),
                    failed: stats.map_or(0, |s| s.failed),
                    fingerprints: self.renderer.fingerprint_count(view),
                    renders: self.renderer.counters(view),
                    last_update: self.store.snapshot(view).last_update,
                    last_reconciled: self.surfaces.last_reconciled(view),
                }
            })
            .collect();

        CoreStatus {
            initialized: self.initialized,
            active_view: self.active_view(),
            views,
            pending_replays: self.pending.len(),
            replayed: self.replayed,
            scheduled_timers: self.scheduler.pending(),
            persisting: self.store.is_persisting(),
            last_save: self.store.last_save_timestamp(),
            clock_ms: self.scheduler.now().as_millis() as u64,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn active_view(&self) -> ViewId {
        self.pending_switch
            .unwrap_or_else(|| self.store.active_view())
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Scheduler time.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// When the next scheduled job is due.
    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    pub fn is_scheduled(&self, job: TimerJob) -> bool {
        self.scheduler.is_scheduled(&job)
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// The visible document, for simulating user input.
    pub fn presentation_mut(&mut self) -> &mut Presentation {
        &mut self.presentation
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    pub fn surfaces(&self) -> &SurfaceManager {
        &self.surfaces
    }

    pub fn renderer(&self) -> &RenderOrchestrator {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{sample_presentation, InMemoryStorage, StaticContent};

    fn pending(view: ViewId, priority: Priority, arrival: u64) -> PendingUpdate {
        PendingUpdate {
            view,
            priority,
            arrival,
        }
    }

    fn coordinator() -> (Coordinator, Arc<InMemoryStorage>, Arc<StaticContent>) {
        let storage = Arc::new(InMemoryStorage::new());
        let content = Arc::new(StaticContent::new());
        let coordinator = Coordinator::new(
            sample_presentation(),
            storage.clone(),
            content.clone(),
            CoreConfig::default(),
        );
        (coordinator, storage, content)
    }

    #[test]
    fn test_dedupe_keeps_highest_priority_and_earliest_arrival() {
        let replays = dedupe_pending(vec![
            pending(ViewId::Categorize, Priority::Normal, 1),
            pending(ViewId::Saved, Priority::Normal, 2),
            pending(ViewId::Categorize, Priority::High, 3),
            pending(ViewId::Settings, Priority::High, 4),
        ]);

        assert_eq!(
            replays,
            vec![
                pending(ViewId::Categorize, Priority::High, 1),
                pending(ViewId::Settings, Priority::High, 4),
                pending(ViewId::Saved, Priority::Normal, 2),
            ]
        );
    }

    #[test]
    fn test_dedupe_empty() {
        assert!(dedupe_pending(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_updates_before_initialize_are_held() {
        let (mut coordinator, _, content) = coordinator();

        assert_eq!(
            coordinator
                .update_content(ViewId::Saved, Priority::High)
                .await,
            None
        );
        assert_eq!(coordinator.status().pending_replays, 1);
        assert_eq!(content.calls(ViewId::Saved), 0);

        coordinator.initialize().await.unwrap();

        let status = coordinator.status();
        assert_eq!(status.pending_replays, 0);
        assert_eq!(status.replayed, 1);
        // Preload plus the replay.
        assert_eq!(content.calls(ViewId::Saved), 2);
    }

    #[tokio::test]
    async fn test_initialize_twice_is_a_noop() {
        let (mut coordinator, _, content) = coordinator();
        coordinator.initialize().await.unwrap();
        coordinator.initialize().await.unwrap();
        assert_eq!(content.calls(ViewId::Categorize), 1);
    }

    #[tokio::test]
    async fn test_initialize_without_surfaces_fails() {
        let mut coordinator = Coordinator::new(
            Presentation::new(),
            Arc::new(InMemoryStorage::new()),
            Arc::new(StaticContent::new()),
            CoreConfig::default(),
        );

        let err = coordinator.initialize().await.unwrap_err();
        assert_eq!(err.error_code(), "E_INIT");
        assert!(!coordinator.is_initialized());
    }

    #[tokio::test]
    async fn test_initialize_schedules_auto_save() {
        let (mut coordinator, _, _) = coordinator();
        coordinator.initialize().await.unwrap();
        assert!(coordinator.is_scheduled(TimerJob::AutoSave));
        assert!(coordinator.is_scheduled(TimerJob::DeferredRestore(ViewId::Categorize)));
    }

    #[tokio::test]
    async fn test_stop_auto_save() {
        let (mut coordinator, storage, _) = coordinator();
        coordinator.initialize().await.unwrap();

        assert!(coordinator.stop_auto_save());
        assert!(!coordinator.stop_auto_save());
        coordinator.advance(Duration::from_secs(30)).await;
        assert_eq!(storage.save_count(), 0);
    }

    #[tokio::test]
    async fn test_record_interaction_debounces_capture() {
        let (mut coordinator, _, _) = coordinator();
        coordinator.initialize().await.unwrap();
        coordinator.tick().await;

        coordinator.record_interaction(ViewId::Categorize, Interaction::Scroll);
        coordinator.advance(Duration::from_millis(60)).await;
        coordinator.record_interaction(ViewId::Categorize, Interaction::Scroll);
        coordinator.advance(Duration::from_millis(60)).await;
        assert!(coordinator.is_scheduled(TimerJob::CaptureState(ViewId::Categorize)));

        coordinator.advance(Duration::from_millis(60)).await;
        assert!(!coordinator.is_scheduled(TimerJob::CaptureState(ViewId::Categorize)));
        assert!(coordinator
            .store()
            .snapshot(ViewId::Categorize)
            .last_update
            .is_some());
    }

    #[tokio::test]
    async fn test_switch_before_initialize_is_degraded_and_sticks() {
        let (mut coordinator, storage, _) = coordinator();

        assert_eq!(
            coordinator.switch_view(ViewId::Settings).await,
            SwitchOutcome::Degraded
        );
        assert_eq!(coordinator.active_view(), ViewId::Settings);
        assert_eq!(storage.save_count(), 0);

        coordinator.initialize().await.unwrap();
        assert_eq!(coordinator.active_view(), ViewId::Settings);
        assert_eq!(
            coordinator.presentation().displayed_view(),
            Some(ViewId::Settings)
        );
    }
}
