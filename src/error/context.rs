//! Error context for enriched error information.

use chrono::{DateTime, Utc};

use crate::view::ViewId;

/// Where and when an error happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// View the operation was acting on, if any.
    pub view: Option<ViewId>,

    /// Render task the error came from, if any.
    pub task_id: Option<u64>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            view: None,
            task_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_view(mut self, view: ViewId) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_task_id(mut self, task_id: u64) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Get a formatted context string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];
        if let Some(view) = self.view {
            parts.push(format!("view={}", view));
        }
        if let Some(task_id) = self.task_id {
            parts.push(format!("task={}", task_id));
        }
        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));
        parts.join(" ")
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(view) = self.view {
            write!(f, " view={}", view)?;
        }

        if let Some(task_id) = self.task_id {
            write!(f, " task={}", task_id)?;
        }

        Ok(())
    }
}
