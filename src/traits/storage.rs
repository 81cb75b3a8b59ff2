//! Durable storage trait abstraction.
//!
//! The core persists its UI state inside the application's settings record
//! under the `uiState` key. Everything else in that record belongs to other
//! collaborators and must survive a save untouched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StorageError;

/// The settings record as stored.
///
/// `ui_state` is kept as raw JSON so a partially valid or older shape can be
/// merged field by field instead of failing as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_state: Option<Value>,

    /// Settings owned by other collaborators.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Trait for loading and saving the settings record.
///
/// Implementations include the file-based [`FileStorage`](crate::adapters::FileStorage)
/// and the in-memory mock used by tests.
///
/// # Example
///
/// ```ignore
/// use tabsurface::traits::DurableStorage;
///
/// async fn bump<S: DurableStorage>(storage: &S) -> Result<(), StorageError> {
///     let mut settings = storage.load_settings().await?;
///     settings.extra.insert("launches".into(), 1.into());
///     storage.save_settings(&settings).await
/// }
/// ```
#[async_trait]
pub trait DurableStorage: Send + Sync {
    /// Load the settings record.
    ///
    /// # Returns
    /// - `Ok(settings)`, defaulted if nothing was stored yet
    /// - `Err(error)` if the record exists but could not be read
    async fn load_settings(&self) -> Result<Settings, StorageError>;

    /// Replace the stored settings record.
    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError>;
}
