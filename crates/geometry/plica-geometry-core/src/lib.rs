//! Plica Geometry Core
//!
//! Evaluates parametric solid models: base solids (cube, cuboid, regular
//! tetrahedron, square), derived points (midpoint, ratio, on-segment, centroid),
//! hinge folds and measurements (distance, angle, area, volume).
//!
//! The evaluator is pure and read-only; a single [`GeometryEvaluator`] can serve any
//! number of queries with different [`EvalContext`]s.

pub mod error;
pub mod evaluator;
pub mod model;
pub mod snapshot;
pub mod solid;
pub mod vec3;

pub use error::GeometryError;
pub use evaluator::{snap_ratio, GeometryEvaluator};
pub use model::{
    BaseSolid, EvalContext, FoldDefinition, GeometricModel, MeasurementDefinition,
    MeasurementKind, ParamDefinition, PointDefinition, PointKind, SolidKind, CENTER,
    DEFAULT_FOLD_ANGLE,
};
pub use snapshot::{GeometrySnapshot, ResolvedPoint};
pub use vec3::Vec3;
