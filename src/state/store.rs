//! The state store: one snapshot per view plus global state.
//!
//! The store never touches a timer itself. The coordinator owns the
//! scheduler and calls [`StateStore::persist`] on auto-save ticks, passing
//! the scheduler's current time so "last save is older than the interval"
//! is measured in the same clock tests advance.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::capture;
use super::persisted::UiState;
use super::snapshot::{GlobalState, GlobalUpdate, ViewSnapshot};
use crate::error::CoreError;
use crate::surface::Presentation;
use crate::traits::DurableStorage;
use crate::view::ViewId;

/// Callback notified after a view's snapshot changes.
pub type StateListener = Box<dyn Fn(ViewId, &ViewSnapshot) -> color_eyre::Result<()> + Send + Sync>;

/// Handle returned by [`StateStore::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Result of a persist attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "lowercase")]
pub enum PersistOutcome {
    Saved,
    /// Another persist was already in flight; its write covers this one.
    Coalesced,
    /// Storage failed. In-memory state is unchanged.
    Failed(String),
}

impl PersistOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, PersistOutcome::Saved)
    }
}

/// When the last successful save happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveMark {
    /// Scheduler time.
    pub at: Duration,
    /// Wall clock time written into the persisted global state.
    pub timestamp: DateTime<Utc>,
}

/// Resets the in-flight flag even if the persist future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct StateStore {
    storage: Arc<dyn DurableStorage>,
    views: BTreeMap<ViewId, ViewSnapshot>,
    global: GlobalState,
    listeners: BTreeMap<ViewId, Vec<(ListenerId, StateListener)>>,
    next_listener_id: u64,
    persist_in_flight: AtomicBool,
    last_save: Mutex<Option<SaveMark>>,
    initialized: bool,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("views", &self.views)
            .field("global", &self.global)
            .field("listeners", &self.listener_count())
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl StateStore {
    /// A store holding defaults for every view.
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        let defaults = UiState::default();
        Self {
            storage,
            views: defaults.views,
            global: defaults.global,
            listeners: BTreeMap::new(),
            next_listener_id: 1,
            persist_in_flight: AtomicBool::new(false),
            last_save: Mutex::new(None),
            initialized: false,
        }
    }

    /// Load persisted state and merge it over the defaults.
    ///
    /// Returns true if persisted state was found. A storage failure is
    /// logged and leaves the defaults in place.
    pub async fn initialize(&mut self) -> bool {
        let loaded = match self.storage.load_settings().await {
            Ok(settings) => settings.ui_state,
            Err(err) => {
                tracing::error!("Failed to load persisted UI state: {}", err);
                None
            }
        };

        let found = loaded.is_some();
        if let Some(stored) = loaded {
            let state = UiState::from_stored(&stored);
            self.views = state.views;
            self.global = state.global;
            tracing::info!(
                "Restored UI state, active view '{}'",
                self.global.active_view_id
            );
        }

        self.initialized = true;
        found
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn snapshot(&self, view: ViewId) -> &ViewSnapshot {
        // Every view gets a snapshot at construction and none are removed.
        &self.views[&view]
    }

    pub fn snapshots(&self) -> &BTreeMap<ViewId, ViewSnapshot> {
        &self.views
    }

    pub fn global(&self) -> &GlobalState {
        &self.global
    }

    pub fn active_view(&self) -> ViewId {
        self.global.active_view_id
    }

    /// Record a grouping key chosen outside the view's own select.
    pub fn set_group_by(&mut self, view: ViewId, group_by: impl Into<String>) {
        self.edit(view, |snap| snap.group_by = group_by.into());
    }

    pub fn set_search_text(&mut self, view: ViewId, search: impl Into<String>) {
        self.edit(view, |snap| snap.search_text = search.into());
    }

    fn edit(&mut self, view: ViewId, f: impl FnOnce(&mut ViewSnapshot)) {
        if let Some(snap) = self.views.get_mut(&view) {
            f(snap);
            snap.last_update = Some(Utc::now());
        }
        self.notify(view);
    }

    /// Read the live state of `view` into its snapshot and notify listeners.
    pub fn capture_view_state(&mut self, view: ViewId, presentation: &Presentation) -> bool {
        let captured = match capture::read_view_state(view, presentation, self.snapshot(view)) {
            Some(snapshot) => snapshot,
            None => {
                tracing::warn!("Cannot capture '{}': no visible surface", view);
                return false;
            }
        };
        self.views.insert(view, captured);
        tracing::trace!("Captured state for '{}'", view);
        self.notify(view);
        true
    }

    /// Apply field values and focus of the snapshot to the visible surface.
    ///
    /// Scroll offsets and expanded sections need [`Self::apply_deferred_restore`]
    /// once the content has settled.
    pub fn restore_view_state(&self, view: ViewId, presentation: &mut Presentation) -> bool {
        let restored = capture::apply_immediate(view, self.snapshot(view), presentation);
        if !restored {
            tracing::warn!("Cannot restore '{}': no visible surface", view);
        }
        restored
    }

    pub fn apply_deferred_restore(&self, view: ViewId, presentation: &mut Presentation) -> bool {
        capture::apply_deferred(view, self.snapshot(view), presentation)
    }

    /// Everything that gets persisted.
    pub fn ui_state(&self) -> UiState {
        UiState {
            views: self.views.clone(),
            global: self.global.clone(),
        }
    }

    /// Write all snapshots and global state to durable storage.
    ///
    /// Concurrent calls collapse: while one write is in flight, others
    /// return [`PersistOutcome::Coalesced`] without touching storage.
    pub async fn persist(&self, now: Duration) -> PersistOutcome {
        let _guard = match InFlight::acquire(&self.persist_in_flight) {
            Some(guard) => guard,
            None => {
                tracing::debug!("Persist already in flight, coalescing");
                return PersistOutcome::Coalesced;
            }
        };

        let timestamp = Utc::now();
        let mut state = self.ui_state();
        state.global.last_save_timestamp = Some(timestamp);

        let value = match serde_json::to_value(&state) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!("Failed to serialize UI state: {}", err);
                return PersistOutcome::Failed(err.to_string());
            }
        };

        let mut settings = match self.storage.load_settings().await {
            Ok(settings) => settings,
            Err(err) => return persist_failed("read settings", err.into()),
        };
        settings.ui_state = Some(value);

        match self.storage.save_settings(&settings).await {
            Ok(()) => {
                *self.lock_last_save() = Some(SaveMark { at: now, timestamp });
                tracing::debug!("Persisted UI state");
                PersistOutcome::Saved
            }
            Err(err) => persist_failed("save UI state", err.into()),
        }
    }

    pub fn is_persisting(&self) -> bool {
        self.persist_in_flight.load(Ordering::Acquire)
    }

    pub fn last_save(&self) -> Option<SaveMark> {
        *self.lock_last_save()
    }

    /// Last successful save: this session's, else the one loaded from storage.
    pub fn last_save_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_save()
            .map(|mark| mark.timestamp)
            .or(self.global.last_save_timestamp)
    }

    /// Whether an auto-save at `now` should write.
    pub fn needs_auto_save(&self, now: Duration, interval: Duration) -> bool {
        match self.last_save() {
            Some(mark) => now.saturating_sub(mark.at) >= interval,
            None => true,
        }
    }

    fn lock_last_save(&self) -> MutexGuard<'_, Option<SaveMark>> {
        self.last_save.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate global state and persist immediately.
    pub async fn update_global(&mut self, update: GlobalUpdate, now: Duration) -> PersistOutcome {
        tracing::debug!("Global state update: {:?}", update);
        self.global.apply(update);
        self.persist(now).await
    }

    pub fn add_listener(&mut self, view: ViewId, listener: StateListener) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.entry(view).or_default().push((id, listener));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        for listeners in self.listeners.values_mut() {
            if let Some(pos) = listeners.iter().position(|(lid, _)| *lid == id) {
                listeners.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Call every listener of `view`. Listener errors are logged, never returned.
    pub fn notify(&self, view: ViewId) {
        let listeners = match self.listeners.get(&view) {
            Some(listeners) => listeners,
            None => return,
        };
        let snapshot = self.snapshot(view);
        for (id, listener) in listeners {
            if let Err(err) = listener(view, snapshot) {
                tracing::warn!("State listener {:?} for '{}' failed: {}", id, view, err);
            }
        }
    }
}

fn persist_failed(stage: &str, err: CoreError) -> PersistOutcome {
    let category = err.category();
    if err.is_retryable() {
        tracing::error!(
            "{} ({}): {} [{}], next auto-save retries",
            category.description(),
            stage,
            err,
            err.error_code()
        );
    } else {
        tracing::error!("{} ({}): {} [{}]", category.description(), stage, err, err.error_code());
    }
    PersistOutcome::Failed(err.to_string())
}
