//! In-memory durable storage for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;
use crate::traits::{DurableStorage, Settings};

/// In-memory settings storage for testing.
///
/// Clones share the same backing record, so a test can keep one handle and
/// give another to the core.
///
/// # Example
///
/// ```ignore
/// use tabsurface::adapters::mock::InMemoryStorage;
///
/// let storage = InMemoryStorage::new();
/// storage.set_save_should_fail(true);
/// // ... drive the core ...
/// assert_eq!(storage.save_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    /// Stored record
    settings: Arc<Mutex<Settings>>,
    /// Whether load should fail
    load_should_fail: Arc<Mutex<bool>>,
    /// Whether save should fail
    save_should_fail: Arc<Mutex<bool>>,
    /// Whether save yields to the runtime before writing
    yield_on_save: Arc<Mutex<bool>>,
    /// Successful saves
    save_count: Arc<Mutex<usize>>,
    /// Calls to load
    load_count: Arc<Mutex<usize>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Create a storage holding `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: Arc::new(Mutex::new(settings)),
            load_should_fail: Arc::new(Mutex::new(false)),
            save_should_fail: Arc::new(Mutex::new(false)),
            yield_on_save: Arc::new(Mutex::new(false)),
            save_count: Arc::new(Mutex::new(0)),
            load_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn set_load_should_fail(&self, should_fail: bool) {
        *self.load_should_fail.lock().unwrap() = should_fail;
    }

    pub fn set_save_should_fail(&self, should_fail: bool) {
        *self.save_should_fail.lock().unwrap() = should_fail;
    }

    /// Make every save suspend once before writing, so concurrent callers interleave.
    pub fn set_yield_on_save(&self, yield_on_save: bool) {
        *self.yield_on_save.lock().unwrap() = yield_on_save;
    }

    /// Get the stored record synchronously (for testing).
    pub fn settings(&self) -> Settings {
        self.settings.lock().unwrap().clone()
    }

    /// Replace the stored record synchronously (for testing).
    pub fn set_settings(&self, settings: Settings) {
        *self.settings.lock().unwrap() = settings;
    }

    pub fn save_count(&self) -> usize {
        *self.save_count.lock().unwrap()
    }

    pub fn load_count(&self) -> usize {
        *self.load_count.lock().unwrap()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableStorage for InMemoryStorage {
    async fn load_settings(&self) -> Result<Settings, StorageError> {
        *self.load_count.lock().unwrap() += 1;
        if *self.load_should_fail.lock().unwrap() {
            return Err(StorageError::LoadFailed("Mock load failure".to_string()));
        }

        Ok(self.settings.lock().unwrap().clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        let should_yield = *self.yield_on_save.lock().unwrap();
        if should_yield {
            tokio::task::yield_now().await;
        }

        if *self.save_should_fail.lock().unwrap() {
            return Err(StorageError::SaveFailed("Mock save failure".to_string()));
        }

        *self.settings.lock().unwrap() = settings.clone();
        *self.save_count.lock().unwrap() += 1;
        Ok(())
    }
}
