//! State store: per-view snapshots, global state and their persistence.
//!
//! - [`snapshot`]: the snapshot and global state types
//! - [`persisted`]: the stored `uiState` shape and merge-over-defaults
//! - [`capture`]: reading state off a surface and restoring it
//! - [`store`]: the [`StateStore`] itself

pub mod capture;
pub mod persisted;
pub mod snapshot;
pub mod store;

pub use persisted::UiState;
pub use snapshot::{FieldState, FocusDescriptor, GlobalState, GlobalUpdate, ViewSnapshot, WindowSize};
pub use store::{ListenerId, PersistOutcome, SaveMark, StateListener, StateStore};
