use plica_geometry_core::GeometryError;
use thiserror::Error;

/// Script defects that reached the compiler without being caught by validation.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CompileError {
    #[error("{action} in scene '{scene}' has no element id")]
    MissingElementId { scene: String, action: &'static str },
    #[error("animatePoint in scene '{scene}' targets '{point}', which has no driving parameter")]
    MissingDrivingParameter { scene: String, point: String },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum PlayerError {
    #[error("timeline has no scenes")]
    EmptyTimeline,
}
