//! Render orchestrator: content fingerprints, render task creation and the
//! shared fair drain loop.

pub mod fingerprint;
pub mod orchestrator;

pub use fingerprint::fingerprint;
pub use orchestrator::{populate, RenderCounters, RenderHandle, RenderOrchestrator, RenderOutcome};
