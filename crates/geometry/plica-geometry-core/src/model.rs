//! Geometric model data (the externally produced, read-only description of a solid).
//!
//! Field names follow the upstream JSON payload (camelCase). Point definitions keep
//! their references optional so an incomplete definition survives parsing and is
//! reported by the evaluator as [`GeometryError::MalformedDefinition`](crate::GeometryError).

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Sentinel point id that always resolves to the origin.
pub const CENTER: &str = "center";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolidKind {
    Cube,
    Cuboid,
    Tetrahedron,
    Square,
    // Declared by the upstream vocabulary but not evaluable.
    Prism,
    Pyramid,
    #[serde(other)]
    Other,
}

impl SolidKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SolidKind::Cube => "cube",
            SolidKind::Cuboid => "cuboid",
            SolidKind::Tetrahedron => "tetrahedron",
            SolidKind::Square => "square",
            SolidKind::Prism => "prism",
            SolidKind::Pyramid => "pyramid",
            SolidKind::Other => "other",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseSolid {
    #[serde(rename = "type")]
    pub kind: SolidKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<[f64; 3]>,
}

impl BaseSolid {
    pub fn cube(size: f64) -> Self {
        Self {
            kind: SolidKind::Cube,
            size: Some(size),
            dimensions: None,
        }
    }

    pub fn cuboid(a: f64, b: f64, c: f64) -> Self {
        Self {
            kind: SolidKind::Cuboid,
            size: None,
            dimensions: Some([a, b, c]),
        }
    }

    pub fn tetrahedron(edge: f64) -> Self {
        Self {
            kind: SolidKind::Tetrahedron,
            size: Some(edge),
            dimensions: None,
        }
    }

    pub fn square(size: f64) -> Self {
        Self {
            kind: SolidKind::Square,
            size: Some(size),
            dimensions: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointKind {
    Vertex,
    Midpoint,
    Ratio,
    OnSegment,
    Center,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PointKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub of: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<String>>,
}

impl PointDefinition {
    fn bare(id: &str, kind: PointKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            of: None,
            from: None,
            to: None,
            ratio: None,
            param: None,
            points: None,
        }
    }

    pub fn midpoint(id: &str, a: &str, b: &str) -> Self {
        Self {
            of: Some(vec![a.to_string(), b.to_string()]),
            ..Self::bare(id, PointKind::Midpoint)
        }
    }

    pub fn ratio(id: &str, from: &str, to: &str, ratio: f64) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            ratio: Some(ratio),
            ..Self::bare(id, PointKind::Ratio)
        }
    }

    pub fn on_segment(id: &str, from: &str, to: &str, param: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            param: Some(param.to_string()),
            ..Self::bare(id, PointKind::OnSegment)
        }
    }

    pub fn center(id: &str, points: &[&str]) -> Self {
        Self {
            points: Some(points.iter().map(|p| p.to_string()).collect()),
            ..Self::bare(id, PointKind::Center)
        }
    }

    pub fn vertex(id: &str, alias_of: &str) -> Self {
        Self {
            from: Some(alias_of.to_string()),
            ..Self::bare(id, PointKind::Vertex)
        }
    }

    /// Every point id this definition refers to, in declaration order.
    pub fn references(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        if let Some(of) = &self.of {
            out.extend(of.iter().map(String::as_str));
        }
        out.extend(self.from.as_deref());
        out.extend(self.to.as_deref());
        if let Some(points) = &self.points {
            out.extend(points.iter().map(String::as_str));
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldDefinition {
    pub id: String,
    pub hinge: [String; 2],
    pub moving_points: Vec<String>,
    pub folded_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_angle: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    Distance,
    Angle,
    Area,
    Volume,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MeasurementKind,
    pub points: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamDefinition {
    pub id: String,
    pub min: f64,
    pub max: f64,
    #[serde(rename = "default")]
    pub default_value: f64,
}

/// Parametric description of a solid: base shape plus named points, folds,
/// measurements and adjustable parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometricModel {
    #[serde(rename = "baseGeometry")]
    pub base: BaseSolid,
    #[serde(default)]
    pub points: Vec<PointDefinition>,
    #[serde(default)]
    pub folds: Vec<FoldDefinition>,
    #[serde(default)]
    pub measurements: Vec<MeasurementDefinition>,
    #[serde(default)]
    pub params: Vec<ParamDefinition>,
}

impl GeometricModel {
    pub fn new(base: BaseSolid) -> Self {
        Self {
            base,
            points: Vec::new(),
            folds: Vec::new(),
            measurements: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn point(&self, id: &str) -> Option<&PointDefinition> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn fold(&self, id: &str) -> Option<&FoldDefinition> {
        self.folds.iter().find(|f| f.id == id)
    }

    pub fn param(&self, id: &str) -> Option<&ParamDefinition> {
        self.params.iter().find(|p| p.id == id)
    }

    /// Parameter that drives an `onSegment` point, if `point_id` is one.
    pub fn driving_param(&self, point_id: &str) -> Option<&str> {
        self.point(point_id)
            .filter(|p| p.kind == PointKind::OnSegment)
            .and_then(|p| p.param.as_deref())
    }

    /// Initial angle of a fold: its driving parameter's default, else its own
    /// default, else 180°.
    pub fn initial_fold_angle(&self, fold: &FoldDefinition) -> f64 {
        fold.angle_param
            .as_deref()
            .and_then(|pid| self.param(pid))
            .map(|p| p.default_value)
            .or(fold.default_angle)
            .unwrap_or(DEFAULT_FOLD_ANGLE)
    }
}

/// Angle used when a fold carries neither a parameter nor a default.
pub const DEFAULT_FOLD_ANGLE: f64 = 180.0;

/// Per-query parameter values and fold angles (degrees), merged over model defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalContext {
    #[serde(default)]
    pub params: HashMap<String, f64>,
    #[serde(default)]
    pub fold_angles: HashMap<String, f64>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, id: impl Into<String>, value: f64) -> Self {
        self.params.insert(id.into(), value);
        self
    }

    pub fn with_fold_angle(mut self, id: impl Into<String>, degrees: f64) -> Self {
        self.fold_angles.insert(id.into(), degrees);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upstream_payload() {
        let json = r#"{
            "problemId": "p1",
            "baseGeometry": { "type": "cube", "size": 2 },
            "points": [
                { "id": "E", "type": "midpoint", "of": ["A", "B"] },
                { "id": "P", "type": "onSegment", "from": "A", "to": "C1", "param": "t" }
            ],
            "folds": [
                { "id": "f", "hinge": ["B", "D"], "movingPoints": ["A"], "foldedPoints": ["A'"], "angleParam": "theta" }
            ],
            "measurements": [ { "id": "m", "type": "distance", "points": ["A", "E"] } ],
            "params": [ { "id": "t", "min": 0, "max": 1, "default": 0.25 } ]
        }"#;
        let model: GeometricModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.base.kind, SolidKind::Cube);
        assert_eq!(model.driving_param("P"), Some("t"));
        assert_eq!(model.driving_param("E"), None);
        assert_eq!(model.folds[0].folded_points, vec!["A'".to_string()]);
        assert_eq!(model.param("t").map(|p| p.default_value), Some(0.25));
    }

    #[test]
    fn unknown_solid_kind_survives_parsing() {
        let base: BaseSolid = serde_json::from_str(r#"{ "type": "dodecahedron" }"#).unwrap();
        assert_eq!(base.kind, SolidKind::Other);
    }

    #[test]
    fn fold_angle_prefers_parameter_default() {
        let mut model = GeometricModel::new(BaseSolid::square(2.0));
        model.params.push(ParamDefinition {
            id: "a".into(),
            min: 0.0,
            max: 180.0,
            default_value: 30.0,
        });
        let fold = FoldDefinition {
            id: "f".into(),
            hinge: ["B".into(), "D".into()],
            moving_points: vec!["A".into()],
            folded_points: vec!["A'".into()],
            angle_param: Some("a".into()),
            default_angle: Some(90.0),
        };
        assert_eq!(model.initial_fold_angle(&fold), 30.0);
        let unparameterised = FoldDefinition {
            angle_param: None,
            default_angle: None,
            ..fold
        };
        assert_eq!(model.initial_fold_angle(&unparameterised), DEFAULT_FOLD_ANGLE);
    }
}
