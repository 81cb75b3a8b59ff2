//! Error category classification.
//!
//! Every failure in the rendering core falls into one of these classes, and
//! the class alone decides how it is handled: logged and skipped, retried on
//! the next auto-save, downgraded to a fallback switch, or propagated.

use std::fmt;

/// High-level classification of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A view or surface that was never initialized.
    /// The operation becomes a no-op.
    MissingResource,

    /// A content producer or render task failed.
    /// The task is dropped and the queue continues.
    TaskExecution,

    /// Durable storage could not be read or written.
    /// In-memory state stays authoritative; the next auto-save retries.
    Persistence,

    /// A view switch could not complete with state preservation.
    /// The coordinator falls back to a direct switch.
    Switch,

    /// The core could not be brought up. The only fatal class.
    Initialization,
}

impl ErrorCategory {
    /// Whether the system keeps running after an error of this class.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ErrorCategory::Initialization)
    }

    /// Whether retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Persistence | ErrorCategory::TaskExecution)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::MissingResource => "missing_resource",
            ErrorCategory::TaskExecution => "task_execution",
            ErrorCategory::Persistence => "persistence",
            ErrorCategory::Switch => "switch",
            ErrorCategory::Initialization => "initialization",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::MissingResource => "Referenced view or surface does not exist",
            ErrorCategory::TaskExecution => "Render task failed",
            ErrorCategory::Persistence => "Durable storage failure",
            ErrorCategory::Switch => "View switch failed",
            ErrorCategory::Initialization => "Initialization failed",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
