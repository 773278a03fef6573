//! Resolved geometry for a renderer: every vertex, point, fold target and
//! measurement of a model evaluated under one context.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::evaluator::GeometryEvaluator;
use crate::model::{EvalContext, GeometricModel};
use crate::vec3::Vec3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPoint {
    pub position: Vec3,
    /// True when the position depends on a parameter or a fold angle.
    pub dynamic: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometrySnapshot {
    pub vertices: IndexMap<String, Vec3>,
    pub points: IndexMap<String, ResolvedPoint>,
    pub measurements: IndexMap<String, f64>,
    pub edges: Vec<(String, String)>,
    pub faces: Vec<Vec<String>>,
}

impl GeometrySnapshot {
    pub fn build(model: &GeometricModel, ctx: Option<&EvalContext>) -> Result<Self, GeometryError> {
        let eval = GeometryEvaluator::new(model)?;
        Self::from_evaluator(&eval, model, ctx)
    }

    pub fn from_evaluator(
        eval: &GeometryEvaluator,
        model: &GeometricModel,
        ctx: Option<&EvalContext>,
    ) -> Result<Self, GeometryError> {
        let mut snap = GeometrySnapshot::default();
        for id in eval.vertex_ids() {
            snap.vertices.insert(id.to_string(), eval.vertex_coord(id)?);
        }

        let declared = model.points.iter().map(|p| p.id.as_str());
        let folded = model
            .folds
            .iter()
            .flat_map(|f| f.folded_points.iter().map(String::as_str));
        for id in declared.chain(folded) {
            if snap.points.contains_key(id) {
                continue;
            }
            let point = ResolvedPoint {
                position: eval.point_coord(id, ctx)?,
                dynamic: eval.is_dynamic(id)?,
            };
            snap.points.insert(id.to_string(), point);
        }

        for m in &model.measurements {
            snap.measurements
                .insert(m.id.clone(), eval.measurement(&m.id, ctx)?);
        }

        snap.edges = eval
            .base_edges()
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        snap.faces = eval
            .base_faces()
            .iter()
            .map(|f| f.iter().map(|v| v.to_string()).collect())
            .collect();
        log::debug!(
            "geometry snapshot: {} vertices, {} points, {} measurements",
            snap.vertices.len(),
            snap.points.len(),
            snap.measurements.len()
        );
        Ok(snap)
    }
}
