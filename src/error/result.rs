//! Result type alias for core operations.

use super::context::ErrorContext;
use super::core_error::CoreError;

/// Type alias for Results using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: ErrorContext) -> CoreResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> CoreResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn context(self, ctx: ErrorContext) -> CoreResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> CoreResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
