//! tabsurface - dual-surface rendering core for a tab-manager popup
//!
//! Every view renders into a detached off-screen surface and the visible
//! surface is only ever patched from it, so the user never sees an empty or
//! half-built view and interactive state survives re-renders.
//!
//! The entry point is [`coordinator::Coordinator`].

pub mod adapters;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod render;
pub mod scheduler;
pub mod state;
pub mod surface;
pub mod surfaces;
pub mod traits;
pub mod view;

pub use config::CoreConfig;
pub use coordinator::{Coordinator, CoreEvent, CoreStatus, DataChange, EventKind, SwitchOutcome};
pub use error::{CoreError, CoreResult};
pub use surfaces::Priority;
pub use view::ViewId;
