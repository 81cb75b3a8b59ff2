//! Unified error type for the rendering core.

use std::fmt;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::kinds::{RenderError, StorageError, SurfaceError};
use crate::view::ViewId;

/// Unified error type for the rendering core.
///
/// Wraps each leaf error and adds the two failures that only exist at the
/// coordinator level: a switch that could not preserve state, and a failed
/// initialization.
#[derive(Debug)]
pub enum CoreError {
    /// Render task or content production failure.
    Render(RenderError),

    /// Durable storage failure.
    Storage(StorageError),

    /// Missing view or surface.
    Surface(SurfaceError),

    /// A view switch could not complete.
    Switch {
        from: ViewId,
        to: ViewId,
        message: String,
    },

    /// The core could not be initialized.
    Initialization { message: String },

    /// Wrapped error with additional context.
    WithContext {
        error: Box<CoreError>,
        context: ErrorContext,
    },
}

impl CoreError {
    pub fn initialization(message: impl Into<String>) -> Self {
        CoreError::Initialization {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::Render(_) => ErrorCategory::TaskExecution,
            CoreError::Storage(_) => ErrorCategory::Persistence,
            CoreError::Surface(_) => ErrorCategory::MissingResource,
            CoreError::Switch { .. } => ErrorCategory::Switch,
            CoreError::Initialization { .. } => ErrorCategory::Initialization,
            CoreError::WithContext { error, .. } => error.category(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.category().is_recoverable()
    }

    /// Whether the same operation may succeed if tried again later.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::Render(RenderError::ContentFailed { .. }) => "E_RENDER_CONTENT",
            CoreError::Render(RenderError::TaskFailed { .. }) => "E_RENDER_TASK",
            CoreError::Render(RenderError::Fingerprint { .. }) => "E_RENDER_FINGERPRINT",
            CoreError::Render(RenderError::Discarded { .. }) => "E_RENDER_DISCARDED",
            CoreError::Storage(StorageError::LoadFailed(_)) => "E_STORE_LOAD",
            CoreError::Storage(StorageError::SaveFailed(_)) => "E_STORE_SAVE",
            CoreError::Storage(StorageError::Corrupt { .. }) => "E_STORE_CORRUPT",
            CoreError::Storage(StorageError::Serialization(_)) => "E_STORE_SERDE",
            CoreError::Storage(StorageError::Io(_)) => "E_STORE_IO",
            CoreError::Storage(StorageError::NoDataDirectory) => "E_STORE_NO_DIR",
            CoreError::Surface(_) => "E_SURFACE_MISSING",
            CoreError::Switch { .. } => "E_SWITCH",
            CoreError::Initialization { .. } => "E_INIT",
            CoreError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        CoreError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            CoreError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &CoreError {
        match self {
            CoreError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Render(err) => write!(f, "{}", err),
            CoreError::Storage(err) => write!(f, "{}", err),
            CoreError::Surface(err) => write!(f, "{}", err),
            CoreError::Switch { from, to, message } => {
                write!(f, "switch from '{}' to '{}' failed: {}", from, to, message)
            }
            CoreError::Initialization { message } => {
                write!(f, "initialization failed: {}", message)
            }
            CoreError::WithContext { error, context } => {
                write!(f, "{} ({})", error, context)
            }
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Render(err) => Some(err),
            CoreError::Storage(err) => Some(err),
            CoreError::Surface(err) => Some(err),
            CoreError::Switch { .. } | CoreError::Initialization { .. } => None,
            CoreError::WithContext { error, .. } => error.source(),
        }
    }
}

impl From<RenderError> for CoreError {
    fn from(err: RenderError) -> Self {
        CoreError::Render(err)
    }
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        CoreError::Storage(err)
    }
}

impl From<SurfaceError> for CoreError {
    fn from(err: SurfaceError) -> Self {
        CoreError::Surface(err)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Storage(StorageError::Serialization(err))
    }
}
