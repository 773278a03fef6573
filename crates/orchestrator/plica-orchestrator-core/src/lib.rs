//! plica-orchestrator
//!
//! Runs a scene script through the full preparation pass: validate, optionally
//! auto-repair and re-validate, then compile into a playable timeline.
//!
//! Retrying script generation with the remaining diagnostics is left to the host.

pub mod pipeline;

pub use crate::pipeline::{PipelineConfig, PipelineError, PreparedTimeline, ScenePipeline};
