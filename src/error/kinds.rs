//! Leaf error types, one per concern.

use std::path::PathBuf;

use thiserror::Error;

use crate::view::ViewId;

/// A render task or content producer failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The content producer could not build the view's content.
    #[error("content producer for '{view}' failed: {message}")]
    ContentFailed { view: ViewId, message: String },

    /// A render function failed while writing the off-screen surface.
    #[error("render task {task_id} for '{view}' failed: {message}")]
    TaskFailed {
        view: ViewId,
        task_id: u64,
        message: String,
    },

    /// Content could not be serialized for fingerprinting.
    #[error("could not fingerprint content for '{view}': {message}")]
    Fingerprint { view: ViewId, message: String },

    /// The task was dropped before it ran.
    #[error("render task {task_id} was discarded")]
    Discarded { task_id: u64 },
}

/// Durable storage failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to load settings: {0}")]
    LoadFailed(String),

    #[error("failed to save settings: {0}")]
    SaveFailed(String),

    #[error("settings at {path:?} are not valid: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not serialize settings: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no data directory available")]
    NoDataDirectory,
}

/// A view or surface lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("view '{0}' was never initialized")]
    ViewNotInitialized(ViewId),

    #[error("view '{0}' has no visible surface")]
    MissingVisibleSurface(ViewId),
}
