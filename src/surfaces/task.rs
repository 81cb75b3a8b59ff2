//! Render tasks and their priorities.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::RenderError;
use crate::surface::Surface;
use crate::view::ViewId;

/// Queue position of a render task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Appended to the queue.
    #[default]
    Normal,
    /// Placed at the head of the queue.
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Normal => f.write_str("normal"),
            Priority::High => f.write_str("high"),
        }
    }
}

/// Monotonic render task identifier, used for logging and completion tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Writes new content into an off-screen surface.
pub type RenderFn = Box<dyn FnOnce(&mut Surface) -> Result<(), RenderError> + Send>;

/// Receives the outcome of one task.
pub type Completion = oneshot::Sender<Result<(), RenderError>>;

/// A queued unit of render work. Consumed exactly once by [`RenderTask::run`].
pub struct RenderTask {
    pub id: TaskId,
    pub view: ViewId,
    pub priority: Priority,
    pub enqueued_at: DateTime<Utc>,
    render_fn: RenderFn,
    done: Option<Completion>,
}

impl fmt::Debug for RenderTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTask")
            .field("id", &self.id)
            .field("view", &self.view)
            .field("priority", &self.priority)
            .field("enqueued_at", &self.enqueued_at)
            .field("has_completion", &self.done.is_some())
            .finish()
    }
}

impl RenderTask {
    pub fn new(id: TaskId, view: ViewId, render_fn: RenderFn, priority: Priority) -> Self {
        Self {
            id,
            view,
            priority,
            enqueued_at: Utc::now(),
            render_fn,
            done: None,
        }
    }

    pub fn with_completion(mut self, done: Completion) -> Self {
        self.done = Some(done);
        self
    }

    /// Run against `surface` and report the outcome to the completion, if any.
    pub fn run(self, surface: &mut Surface) -> Result<(), RenderError> {
        let result = (self.render_fn)(surface).map_err(|err| match err {
            RenderError::TaskFailed { .. } => err,
            other => RenderError::TaskFailed {
                view: self.view,
                task_id: self.id.0,
                message: other.to_string(),
            },
        });
        if let Some(done) = self.done {
            // The receiver may have been dropped; nobody is waiting then.
            let _ = done.send(result.clone());
        }
        result
    }
}
