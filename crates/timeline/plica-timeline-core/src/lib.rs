//! Plica Timeline Core
//!
//! Compiles a validated scene script against a geometric model into a keyframe
//! [`Timeline`] plus an [`ElementRegistry`], and samples that timeline into a
//! per-frame [`SceneState`].
//!
//! Both the [`Compiler`] and the [`player`] are pure: the same inputs always yield
//! structurally equal outputs, and neither mutates what it is given.

pub mod camera;
pub mod compiler;
pub mod config;
pub mod easing;
pub mod error;
pub mod player;
pub mod registry;
pub mod state;
pub mod timeline;

pub use camera::{spherical_to_cartesian, ResolvedCamera};
pub use compiler::{CompileOutput, Compiler, ContinuityState};
pub use config::CompileConfig;
pub use easing::Easing;
pub use error::{CompileError, PlayerError};
pub use player::{sample, sample_keyframes, TimelinePlayer};
pub use registry::{ElementDefinition, ElementRegistry};
pub use state::{CameraState, SceneState};
pub use timeline::{
    ActionTrack, CameraKeyframe, CompiledScene, Keyframe, KeyframeValue, Timeline, TrackProperty,
};
