//! View-switch coordinator and the context that owns every component.
//!
//! - [`context`]: [`Coordinator`], initialization, switching, updates, timers
//! - [`data_change`]: semantic data changes and the updates they trigger
//! - [`events`]: switch/update/restore events and listeners
//! - [`status`]: the diagnostic [`CoreStatus`]

pub mod context;
pub mod data_change;
pub mod events;
pub mod status;

pub use context::{Coordinator, Interaction, SwitchOutcome, TimerJob};
pub use data_change::DataChange;
pub use events::{CoreEvent, EventKind, EventListener, EventListenerId};
pub use status::{CoreStatus, ViewStatus};
