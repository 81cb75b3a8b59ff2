//! Diagnostic snapshot of the core.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::render::RenderCounters;
use crate::view::ViewId;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStatus {
    pub view: ViewId,
    pub initialized: bool,
    pub queued: usize,
    pub processing: bool,
    pub executed: u64,
    pub failed: u64,
    pub fingerprints: usize,
    pub renders: RenderCounters,
    pub last_update: Option<DateTime<Utc>>,
    pub last_reconciled: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreStatus {
    pub initialized: bool,
    pub active_view: ViewId,
    pub views: Vec<ViewStatus>,
    /// Updates waiting for initialization to finish.
    pub pending_replays: usize,
    /// Updates replayed by the last initialization.
    pub replayed: usize,
    pub scheduled_timers: usize,
    pub persisting: bool,
    pub last_save: Option<DateTime<Utc>>,
    /// Scheduler time in milliseconds.
    pub clock_ms: u64,
}

impl CoreStatus {
    pub fn view(&self, view: ViewId) -> Option<&ViewStatus> {
        self.views.iter().find(|s| s.view == view)
    }
}
