//! Dual-surface manager: off-screen surfaces, render task queues and
//! reconciliation into the visible document.

pub mod hooks;
pub mod manager;
pub mod task;

pub use hooks::ReconcileHooks;
pub use manager::{QueueStats, SurfaceManager};
pub use task::{Completion, Priority, RenderFn, RenderTask, TaskId};
