//! Error handling for the rendering core.
//!
//! - **Error categories**: what the caller does about a failure
//!   (no-op, skip task, keep in-memory state, degrade switch, abort init)
//! - **Leaf errors**: [`RenderError`], [`StorageError`], [`SurfaceError`]
//! - **Unified error**: [`CoreError`] wraps them and carries the category
//! - **Error context**: [`ErrorContext`] attached via [`ResultExt`]
//!
//! # Error Categories
//!
//! | Category | Source | Handling |
//! |----------|--------|----------|
//! | MissingResource | view/surface never initialized | warn, no-op |
//! | TaskExecution | producer or render task failed | warn, next task |
//! | Persistence | storage read/write failed | error, retry on next auto-save |
//! | Switch | switch could not preserve state | warn, fallback switch |
//! | Initialization | core could not start | propagated |

mod category;
mod context;
mod core_error;
mod kinds;
mod result;

pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use core_error::CoreError;
pub use kinds::{RenderError, StorageError, SurfaceError};
pub use result::{CoreResult, ResultExt};
