//! Mock implementations for testing.
//!
//! This module provides mock implementations of all trait abstractions,
//! enabling tests without file system access or real content producers.
//!
//! # Available Mocks
//!
//! - [`InMemoryStorage`] - In-memory settings storage with failure injection
//! - [`StaticContent`] - Fixed per-view content with call counters

pub mod content;
pub mod storage;

pub use content::{sample_fragment, sample_presentation, sample_view_root, StaticContent};
pub use storage::InMemoryStorage;
