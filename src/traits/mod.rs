//! Trait abstractions for dependency injection and testability.
//!
//! The rendering core reaches its two external collaborators only through
//! these traits, so tests can swap in the mocks from
//! [`crate::adapters::mock`].
//!
//! # Traits
//!
//! - [`DurableStorage`] - Settings record load/save
//! - [`ContentSource`] - Per-view content producers

pub mod content;
pub mod storage;

pub use content::{ContentRequest, ContentSource};
pub use storage::{DurableStorage, Settings};
