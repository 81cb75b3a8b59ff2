//! File-based durable storage adapter.
//!
//! Stores the settings record as pretty-printed JSON in the platform data
//! directory (`<data dir>/tabsurface/settings.json`). Writes go to a sibling
//! temporary file first and are renamed into place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::StorageError;
use crate::traits::{DurableStorage, Settings};

const APP_DIR: &str = "tabsurface";
const SETTINGS_FILE: &str = "settings.json";

/// File-based settings storage.
///
/// # Example
///
/// ```ignore
/// use tabsurface::adapters::FileStorage;
/// use tabsurface::traits::DurableStorage;
///
/// let storage = FileStorage::new()?;
/// let settings = storage.load_settings().await?;
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage in the platform data directory.
    ///
    /// # Returns
    /// The storage, or an error if no data directory can be determined.
    pub fn new() -> Result<Self, StorageError> {
        let base = dirs::data_dir().ok_or(StorageError::NoDataDirectory)?;
        Ok(Self {
            path: base.join(APP_DIR).join(SETTINGS_FILE),
        })
    }

    /// Storage at an explicit path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| SETTINGS_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DurableStorage for FileStorage {
    async fn load_settings(&self) -> Result<Settings, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("No settings at {:?}, using defaults", self.path);
                return Ok(Settings::default());
            }
            Err(err) => return Err(err.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Settings::default());
        }

        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(settings)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!("Saved settings to {:?}", self.path);
        Ok(())
    }
}
