//! Coordinator events and their listeners.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::render::RenderOutcome;
use crate::surfaces::Priority;
use crate::view::ViewId;

/// Something the coordinator did that collaborators may care about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoreEvent {
    /// The active view changed. `degraded` is set when state could not be
    /// preserved across the switch.
    ViewSwitched {
        from: ViewId,
        to: ViewId,
        timestamp: DateTime<Utc>,
        degraded: bool,
    },
    /// An update request for `view` was handled.
    ContentUpdated {
        view: ViewId,
        priority: Priority,
        outcome: RenderOutcome,
    },
    /// A snapshot was applied back onto `view`'s visible surface.
    StateRestored { view: ViewId },
}

impl CoreEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CoreEvent::ViewSwitched { .. } => EventKind::ViewSwitched,
            CoreEvent::ContentUpdated { .. } => EventKind::ContentUpdated,
            CoreEvent::StateRestored { .. } => EventKind::StateRestored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ViewSwitched,
    ContentUpdated,
    StateRestored,
}

/// Callback for one [`EventKind`].
pub type EventListener = Box<dyn Fn(&CoreEvent) -> color_eyre::Result<()> + Send + Sync>;

/// Handle returned when registering an [`EventListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventListenerId(u64);

#[derive(Default)]
pub(crate) struct EventBus {
    listeners: Vec<(EventListenerId, EventKind, EventListener)>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub(crate) fn add(&mut self, kind: EventKind, listener: EventListener) -> EventListenerId {
        self.next_id += 1;
        let id = EventListenerId(self.next_id);
        self.listeners.push((id, kind, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: EventListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _, _)| *lid != id);
        self.listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver `event` to every listener of its kind. Errors are logged.
    pub(crate) fn emit(&self, event: &CoreEvent) {
        let kind = event.kind();
        for (id, _, listener) in self.listeners.iter().filter(|(_, k, _)| *k == kind) {
            if let Err(err) = listener(event) {
                tracing::warn!("Event listener {:?} failed on {:?}: {}", id, kind, err);
            }
        }
    }
}
