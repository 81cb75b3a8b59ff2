//! Core configuration.
//!
//! Use the builder methods to customize, or [`CoreConfig::from_env`] to read
//! overrides from the environment.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use tabsurface::config::CoreConfig;
//!
//! let config = CoreConfig::default()
//!     .with_auto_save_interval(Duration::from_secs(10))
//!     .with_show_ignored(true);
//! ```

use std::path::PathBuf;
use std::time::Duration;

pub const ENV_AUTOSAVE_SECS: &str = "TABSURFACE_AUTOSAVE_SECS";
pub const ENV_CAPTURE_DEBOUNCE_MS: &str = "TABSURFACE_CAPTURE_DEBOUNCE_MS";
pub const ENV_RESTORE_DELAY_MS: &str = "TABSURFACE_RESTORE_DELAY_MS";
pub const ENV_STATE_PATH: &str = "TABSURFACE_STATE_PATH";

#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    /// Interval of the recurring auto-save (default: 5s)
    pub auto_save_interval: Duration,
    /// Quiet period after an interaction before state is captured (default: 100ms)
    pub capture_debounce: Duration,
    /// Delay before scroll and expanded sections are restored (default: 50ms)
    pub restore_delay: Duration,
    /// Initial saved-view filter: include ignored tabs
    pub show_ignored: bool,
    /// Override for the settings file location
    pub storage_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            auto_save_interval: Duration::from_secs(5),
            capture_debounce: Duration::from_millis(100),
            restore_delay: Duration::from_millis(50),
            show_ignored: false,
            storage_path: None,
        }
    }
}

impl CoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_save_interval(mut self, interval: Duration) -> Self {
        self.auto_save_interval = interval;
        self
    }

    pub fn with_capture_debounce(mut self, debounce: Duration) -> Self {
        self.capture_debounce = debounce;
        self
    }

    pub fn with_restore_delay(mut self, delay: Duration) -> Self {
        self.restore_delay = delay;
        self
    }

    pub fn with_show_ignored(mut self, show_ignored: bool) -> Self {
        self.show_ignored = show_ignored;
        self
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    /// Defaults overridden by `TABSURFACE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Unparseable values
    /// are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(secs) = parse_number(&lookup, ENV_AUTOSAVE_SECS) {
            config.auto_save_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_number(&lookup, ENV_CAPTURE_DEBOUNCE_MS) {
            config.capture_debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_number(&lookup, ENV_RESTORE_DELAY_MS) {
            config.restore_delay = Duration::from_millis(ms);
        }
        if let Some(path) = lookup(ENV_STATE_PATH).filter(|p| !p.trim().is_empty()) {
            config.storage_path = Some(PathBuf::from(path));
        }

        config
    }
}

fn parse_number(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(0) if name == ENV_AUTOSAVE_SECS => {
            tracing::warn!("Ignoring {}=0, auto-save interval must be positive", name);
            None
        }
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", name, raw);
            None
        }
    }
}
