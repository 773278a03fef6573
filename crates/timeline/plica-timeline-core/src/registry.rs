//! Elements created by script actions (lines, paths, planes, tetrahedra).

use indexmap::IndexMap;
use plica_geometry_core::{EvalContext, GeometryError, GeometryEvaluator, Vec3};
use plica_script_core::LineStyle;
use serde::{Deserialize, Serialize};

/// Colors and opacities used when an action does not specify them.
pub mod defaults {
    pub const HIGHLIGHT_COLOR: &str = "#ff0000";
    pub const LINE_COLOR: &str = "#888888";
    pub const PATH_COLOR: &str = "#ffaa00";
    pub const PLANE_COLOR: &str = "#3b82f6";
    pub const PLANE_OPACITY: f64 = 0.2;
    pub const TETRAHEDRON_COLOR: &str = "#ff6666";
    pub const TETRAHEDRON_OPACITY: f64 = 0.3;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementDefinition {
    Line {
        id: String,
        from: String,
        to: String,
        style: LineStyle,
        color: String,
    },
    Path {
        id: String,
        from: String,
        to: String,
        color: String,
    },
    Plane {
        id: String,
        points: Vec<String>,
        color: String,
        opacity: f64,
    },
    Tetrahedron {
        id: String,
        vertices: Vec<String>,
        color: String,
        opacity: f64,
    },
}

impl ElementDefinition {
    pub fn id(&self) -> &str {
        match self {
            ElementDefinition::Line { id, .. }
            | ElementDefinition::Path { id, .. }
            | ElementDefinition::Plane { id, .. }
            | ElementDefinition::Tetrahedron { id, .. } => id,
        }
    }

    pub fn color(&self) -> &str {
        match self {
            ElementDefinition::Line { color, .. }
            | ElementDefinition::Path { color, .. }
            | ElementDefinition::Plane { color, .. }
            | ElementDefinition::Tetrahedron { color, .. } => color,
        }
    }

    /// Point ids the element is built from.
    pub fn anchor_points(&self) -> Vec<&str> {
        match self {
            ElementDefinition::Line { from, to, .. } | ElementDefinition::Path { from, to, .. } => {
                vec![from.as_str(), to.as_str()]
            }
            ElementDefinition::Plane { points, .. } => points.iter().map(String::as_str).collect(),
            ElementDefinition::Tetrahedron { vertices, .. } => {
                vertices.iter().map(String::as_str).collect()
            }
        }
    }

    /// Coordinates of the anchor points under `ctx`.
    pub fn resolve(
        &self,
        evaluator: &GeometryEvaluator,
        ctx: Option<&EvalContext>,
    ) -> Result<Vec<Vec3>, GeometryError> {
        self.anchor_points()
            .into_iter()
            .map(|p| evaluator.point_coord(p, ctx))
            .collect()
    }
}

/// Created elements keyed by id, in creation order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementRegistry {
    pub elements: IndexMap<String, ElementDefinition>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element; a later definition with the same id replaces the earlier one.
    pub fn insert(&mut self, element: ElementDefinition) {
        self.elements.insert(element.id().to_string(), element);
    }

    pub fn get(&self, id: &str) -> Option<&ElementDefinition> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementDefinition> {
        self.elements.values()
    }
}
