//! Geometric model evaluator.
//!
//! Resolves symbolic point ids and measurements of a [`GeometricModel`] into
//! coordinates/numbers for a given [`EvalContext`].
//!
//! Resolution order for a point id:
//! 1. the `center` sentinel (origin),
//! 2. fold targets (`foldedPoints[k]` is `movingPoints[k]` rotated about the hinge),
//! 3. base-solid vertices,
//! 4. declared point definitions, recursing into the points they reference.
//!
//! Recursion carries the chain of definitions currently being resolved, so a
//! definition that (directly or through folds) refers back to itself fails with
//! [`GeometryError::CyclicDefinition`] instead of overflowing the stack.

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::error::GeometryError;
use crate::model::{
    EvalContext, FoldDefinition, GeometricModel, MeasurementDefinition, MeasurementKind,
    PointDefinition, PointKind, SolidKind, CENTER, DEFAULT_FOLD_ANGLE,
};
use crate::solid::build_vertices;
use crate::vec3::{rotate_about_axis, safe_acos, safe_asin, Vec3};

/// Fractions that generated ratios are snapped to when within [`RATIO_SNAP_EPS`].
const COMMON_RATIOS: [f64; 5] = [1.0 / 2.0, 1.0 / 3.0, 2.0 / 3.0, 1.0 / 4.0, 3.0 / 4.0];
const RATIO_SNAP_EPS: f64 = 5e-4;

/// Snap a ratio to the nearby common fraction, if any (0.333 -> 1/3).
pub fn snap_ratio(value: f64) -> f64 {
    COMMON_RATIOS
        .iter()
        .copied()
        .find(|r| (value - r).abs() <= RATIO_SNAP_EPS)
        .unwrap_or(value)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Folds {
    Apply,
    Ignore,
}

/// Read-only evaluator built once per model.
#[derive(Debug, Clone)]
pub struct GeometryEvaluator {
    kind: SolidKind,
    vertices: IndexMap<String, Vec3>,
    points: HashMap<String, PointDefinition>,
    folds: Vec<FoldDefinition>,
    measurements: HashMap<String, MeasurementDefinition>,
    defaults: HashMap<String, f64>,
}

impl GeometryEvaluator {
    /// Build an evaluator; fails for solid types without a canonical shape.
    pub fn new(model: &GeometricModel) -> Result<Self, GeometryError> {
        let vertices = build_vertices(&model.base)?;
        Ok(Self {
            kind: model.base.kind,
            vertices,
            points: model
                .points
                .iter()
                .map(|p| (p.id.clone(), p.clone()))
                .collect(),
            folds: model.folds.clone(),
            measurements: model
                .measurements
                .iter()
                .map(|m| (m.id.clone(), m.clone()))
                .collect(),
            defaults: model
                .params
                .iter()
                .map(|p| (p.id.clone(), p.default_value))
                .collect(),
        })
    }

    pub fn solid_kind(&self) -> SolidKind {
        self.kind
    }

    /// Base vertex ids in canonical order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = &str> {
        self.vertices.keys().map(String::as_str)
    }

    pub fn vertex_coord(&self, id: &str) -> Result<Vec3, GeometryError> {
        self.vertices
            .get(id)
            .copied()
            .ok_or_else(|| GeometryError::UnknownVertex { id: id.to_string() })
    }

    /// Resolve a point id under `ctx` (model defaults when `None`).
    pub fn point_coord(&self, id: &str, ctx: Option<&EvalContext>) -> Result<Vec3, GeometryError> {
        let ctx = self.merged(ctx);
        Resolver::new(self, &ctx).resolve(id, Folds::Apply)
    }

    /// Resolve both endpoints of a segment.
    pub fn segment(
        &self,
        from: &str,
        to: &str,
        ctx: Option<&EvalContext>,
    ) -> Result<(Vec3, Vec3), GeometryError> {
        let ctx = self.merged(ctx);
        let mut resolver = Resolver::new(self, &ctx);
        Ok((
            resolver.resolve(from, Folds::Apply)?,
            resolver.resolve(to, Folds::Apply)?,
        ))
    }

    /// Evaluate a declared measurement. Angles are reported in degrees.
    pub fn measurement(&self, id: &str, ctx: Option<&EvalContext>) -> Result<f64, GeometryError> {
        let def = self
            .measurements
            .get(id)
            .ok_or_else(|| GeometryError::UnknownMeasurement { id: id.to_string() })?;
        let ctx = self.merged(ctx);
        let mut resolver = Resolver::new(self, &ctx);
        let pts = def
            .points
            .iter()
            .map(|p| resolver.resolve(p, Folds::Apply))
            .collect::<Result<Vec<_>, _>>()?;
        measure(def, &pts)
    }

    pub fn base_edges(&self) -> &'static [(&'static str, &'static str)] {
        self.kind.edges()
    }

    pub fn base_faces(&self) -> &'static [&'static [&'static str]] {
        self.kind.faces()
    }

    /// Whether `id` names a fold target (an entry of some fold's `foldedPoints`).
    pub fn is_fold_target(&self, id: &str) -> bool {
        self.folds
            .iter()
            .any(|f| f.folded_points.iter().any(|p| p == id))
    }

    /// Whether the position of `id` can change with parameters or fold angles.
    pub fn is_dynamic(&self, id: &str) -> Result<bool, GeometryError> {
        let mut chain = Vec::new();
        self.is_dynamic_inner(id, &mut chain)
    }

    fn is_dynamic_inner(&self, id: &str, chain: &mut Vec<String>) -> Result<bool, GeometryError> {
        if id == CENTER || self.vertices.contains_key(id) && !self.is_fold_target(id) {
            return Ok(false);
        }
        if self.is_fold_target(id) {
            return Ok(true);
        }
        let def = self
            .points
            .get(id)
            .ok_or_else(|| GeometryError::UnknownPoint { id: id.to_string() })?;
        if def.kind == PointKind::OnSegment {
            return Ok(true);
        }
        if chain.iter().any(|c| c == id) {
            chain.push(id.to_string());
            return Err(GeometryError::CyclicDefinition {
                chain: std::mem::take(chain),
            });
        }
        chain.push(id.to_string());
        let mut dynamic = false;
        for r in def.references() {
            if self.is_dynamic_inner(r, chain)? {
                dynamic = true;
                break;
            }
        }
        chain.pop();
        Ok(dynamic)
    }

    fn merged(&self, ctx: Option<&EvalContext>) -> EvalContext {
        let mut merged = EvalContext {
            params: self.defaults.clone(),
            fold_angles: HashMap::new(),
        };
        if let Some(ctx) = ctx {
            merged
                .params
                .extend(ctx.params.iter().map(|(k, v)| (k.clone(), *v)));
            merged
                .fold_angles
                .extend(ctx.fold_angles.iter().map(|(k, v)| (k.clone(), *v)));
        }
        merged
    }
}

/// One resolution pass; owns the chain of definitions being expanded.
struct Resolver<'a> {
    eval: &'a GeometryEvaluator,
    ctx: &'a EvalContext,
    chain: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(eval: &'a GeometryEvaluator, ctx: &'a EvalContext) -> Self {
        Self {
            eval,
            ctx,
            chain: Vec::new(),
        }
    }

    fn resolve(&mut self, id: &str, folds: Folds) -> Result<Vec3, GeometryError> {
        if id == CENTER {
            return Ok(Vec3::ZERO);
        }
        if folds == Folds::Apply {
            if let Some(p) = self.try_fold(id)? {
                return Ok(p);
            }
        }
        if let Some(v) = self.eval.vertices.get(id) {
            return Ok(*v);
        }
        let eval = self.eval;
        let def = eval
            .points
            .get(id)
            .ok_or_else(|| GeometryError::UnknownPoint { id: id.to_string() })?;

        if self.chain.iter().any(|c| c == id) {
            let mut chain = std::mem::take(&mut self.chain);
            chain.push(id.to_string());
            return Err(GeometryError::CyclicDefinition { chain });
        }
        self.chain.push(id.to_string());
        let out = self.resolve_definition(def);
        self.chain.pop();
        out
    }

    fn resolve_definition(&mut self, def: &PointDefinition) -> Result<Vec3, GeometryError> {
        let id = def.id.as_str();
        match def.kind {
            PointKind::Vertex => {
                let alias = def
                    .from
                    .as_deref()
                    .or_else(|| def.of.as_ref().and_then(|of| of.first()).map(String::as_str))
                    .unwrap_or(id);
                self.eval.vertex_coord(alias)
            }
            PointKind::Midpoint => {
                let (a, b) = match def.of.as_deref() {
                    Some([a, b]) => (a, b),
                    _ => return Err(GeometryError::malformed(id, "midpoint needs exactly two `of` points")),
                };
                let p1 = self.resolve(a, Folds::Apply)?;
                let p2 = self.resolve(b, Folds::Apply)?;
                Ok((p1 + p2) * 0.5)
            }
            PointKind::Ratio => {
                let (from, to, ratio) = match (&def.from, &def.to, def.ratio) {
                    (Some(f), Some(t), Some(r)) => (f, t, r),
                    _ => return Err(GeometryError::malformed(id, "ratio needs `from`, `to` and `ratio`")),
                };
                let p1 = self.resolve(from, Folds::Apply)?;
                let p2 = self.resolve(to, Folds::Apply)?;
                Ok(p1 + (p2 - p1) * snap_ratio(ratio))
            }
            PointKind::OnSegment => {
                let (from, to, param) = match (&def.from, &def.to, &def.param) {
                    (Some(f), Some(t), Some(p)) => (f, t, p),
                    _ => {
                        return Err(GeometryError::malformed(
                            id,
                            "onSegment needs `from`, `to` and `param`",
                        ))
                    }
                };
                let t = self
                    .ctx
                    .params
                    .get(param.as_str())
                    .copied()
                    .ok_or_else(|| GeometryError::UnknownParameter { id: param.clone() })?;
                let p1 = self.resolve(from, Folds::Apply)?;
                let p2 = self.resolve(to, Folds::Apply)?;
                Ok(p1 + (p2 - p1) * t)
            }
            PointKind::Center => {
                let ids = match def.points.as_deref() {
                    Some(ids) if !ids.is_empty() => ids,
                    _ => return Err(GeometryError::malformed(id, "center needs at least one point")),
                };
                let pts = ids
                    .iter()
                    .map(|p| self.resolve(p, Folds::Apply))
                    .collect::<Result<Vec<_>, _>>()?;
                Vec3::centroid(&pts)
                    .ok_or_else(|| GeometryError::malformed(id, "center needs at least one point"))
            }
        }
    }

    fn try_fold(&mut self, id: &str) -> Result<Option<Vec3>, GeometryError> {
        let eval = self.eval;
        let Some((fold, k)) = eval.folds.iter().find_map(|f| {
            f.folded_points
                .iter()
                .position(|p| p == id)
                .map(|k| (f, k))
        }) else {
            return Ok(None);
        };

        let moving = fold.moving_points.get(k).ok_or_else(|| {
            GeometryError::malformed(&fold.id, "movingPoints and foldedPoints differ in length")
        })?;
        let angle = self.fold_angle(fold);

        // Fold substitution stays off for the source and hinge, otherwise the
        // same fold would be re-entered.
        let p = self.resolve(moving, Folds::Ignore)?;
        let a = self.resolve(&fold.hinge[0], Folds::Ignore)?;
        let b = self.resolve(&fold.hinge[1], Folds::Ignore)?;

        rotate_about_axis(p, a, b, angle.to_radians())
            .map(Some)
            .ok_or_else(|| GeometryError::malformed(&fold.id, "hinge endpoints coincide"))
    }

    fn fold_angle(&self, fold: &FoldDefinition) -> f64 {
        self.ctx
            .fold_angles
            .get(fold.id.as_str())
            .copied()
            .or_else(|| {
                fold.angle_param
                    .as_deref()
                    .and_then(|p| self.ctx.params.get(p).copied())
            })
            .or(fold.default_angle)
            .unwrap_or(DEFAULT_FOLD_ANGLE)
    }
}

fn measure(def: &MeasurementDefinition, pts: &[Vec3]) -> Result<f64, GeometryError> {
    let arity = |reason: &str| GeometryError::malformed(&def.id, format!("{reason}, got {} points", pts.len()));
    match def.kind {
        MeasurementKind::Distance => match pts {
            [a, b] => Ok(a.distance(*b)),
            _ => Err(arity("distance needs 2 points")),
        },
        MeasurementKind::Angle => match pts {
            [p, o, q] => {
                let v1 = *p - *o;
                let v2 = *q - *o;
                let denom = v1.length() * v2.length();
                if denom == 0.0 {
                    return Ok(0.0);
                }
                Ok(safe_acos(v1.dot(v2) / denom).to_degrees())
            }
            [l1, l2, a, b, c] => {
                let line = *l2 - *l1;
                let normal = (*b - *a).cross(*c - *a);
                let denom = line.length() * normal.length();
                if denom == 0.0 {
                    return Ok(0.0);
                }
                Ok(safe_asin(line.dot(normal).abs() / denom).to_degrees())
            }
            _ => Err(arity("angle needs 3 or 5 points")),
        },
        MeasurementKind::Area => match pts {
            [a, b, c] => Ok(triangle_area(*a, *b, *c)),
            [a, b, c, d] => Ok(triangle_area(*a, *b, *c) + triangle_area(*a, *c, *d)),
            _ => Err(arity("area needs 3 or 4 points")),
        },
        MeasurementKind::Volume => match pts {
            [a, b, c, d] => {
                let triple = (*b - *a).dot((*c - *a).cross(*d - *a));
                Ok(triple.abs() / 6.0)
            }
            _ => Err(arity("volume needs 4 points")),
        },
    }
}

#[inline]
fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f64 {
    (b - a).cross(c - a).length() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_common_fractions_only() {
        assert_eq!(snap_ratio(0.3333), 1.0 / 3.0);
        assert_eq!(snap_ratio(0.667), 2.0 / 3.0);
        assert_eq!(snap_ratio(0.3), 0.3);
    }

    #[test]
    fn degenerate_angle_is_zero() {
        let def = MeasurementDefinition {
            id: "m".into(),
            kind: MeasurementKind::Angle,
            points: vec!["A".into(), "A".into(), "B".into()],
        };
        let a = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(measure(&def, &[a, a, Vec3::ZERO]).unwrap(), 0.0);
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let def = MeasurementDefinition {
            id: "m".into(),
            kind: MeasurementKind::Volume,
            points: vec!["A".into(), "B".into(), "C".into()],
        };
        let err = measure(&def, &[Vec3::ZERO; 3]).unwrap_err();
        assert!(matches!(err, GeometryError::MalformedDefinition { .. }));
    }
}
