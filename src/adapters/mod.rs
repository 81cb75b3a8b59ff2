//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`FileStorage`] - Settings record as a JSON file in the data directory
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::InMemoryStorage`] - In-memory settings storage
//! - [`mock::StaticContent`] - Fixed content per view

pub mod file_storage;
pub mod mock;

pub use file_storage::FileStorage;
pub use mock::{InMemoryStorage, StaticContent};
