//! Plica Script Core
//!
//! The scene script is the declarative input of the timeline compiler: narrated
//! scenes, each with a camera and an ordered list of actions that reference points
//! of a geometric model. This crate owns the script data model, the
//! [`Validator`] that checks a script against a model, and the [`AutoRepairer`]
//! that mechanically fixes a small set of defects.

pub mod action;
pub mod camera;
pub mod config;
pub mod diagnostics;
pub mod repair;
pub mod script;
pub mod validator;

pub use action::{
    Action, ActionKind, AnimatePointAction, DrawLineAction, FadeAction, FoldAction,
    HighlightAction, LineStyle, PulseAction, RawAction, RawIssue, ShowPathAction,
    ShowPlaneAction, ShowTetrahedronAction, TargetAction, TogetherAction, WaitAction,
};
pub use camera::{CameraConfig, CameraFull, CameraPreset, Spherical, Transition};
pub use config::ValidatorConfig;
pub use diagnostics::{
    ErrorKind, ValidationError, ValidationReport, ValidationWarning, WarningKind,
};
pub use repair::{AutoRepairer, FixApplied, RepairOutcome};
pub use script::{Scene, SceneScript};
pub use validator::{ActionScope, References, Validator, BUILTIN_TARGETS};
