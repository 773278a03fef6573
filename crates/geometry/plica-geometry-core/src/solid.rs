//! Base solids: canonical vertex placement and wireframe/face topology.
//!
//! All solids are centered at the origin. Coordinates are in the units of the
//! declared size, with no normalization layer.

use indexmap::IndexMap;

use crate::error::GeometryError;
use crate::model::{BaseSolid, SolidKind};
use crate::vec3::Vec3;

const BOX_VERTICES: &[&str] = &["A", "B", "C", "D", "A1", "B1", "C1", "D1"];
const FOUR_VERTICES: &[&str] = &["A", "B", "C", "D"];

const BOX_EDGES: &[(&str, &str)] = &[
    ("A", "B"),
    ("B", "C"),
    ("C", "D"),
    ("D", "A"),
    ("A1", "B1"),
    ("B1", "C1"),
    ("C1", "D1"),
    ("D1", "A1"),
    ("A", "A1"),
    ("B", "B1"),
    ("C", "C1"),
    ("D", "D1"),
];

// Counter-clockwise seen from outside, so face normals point outward.
const BOX_FACES: &[&[&str]] = &[
    &["A", "D", "C", "B"],
    &["A1", "B1", "C1", "D1"],
    &["A", "B", "B1", "A1"],
    &["B", "C", "C1", "B1"],
    &["C", "D", "D1", "C1"],
    &["D", "A", "A1", "D1"],
];

const TETRA_EDGES: &[(&str, &str)] = &[
    ("A", "B"),
    ("B", "C"),
    ("C", "A"),
    ("A", "D"),
    ("B", "D"),
    ("C", "D"),
];

const TETRA_FACES: &[&[&str]] = &[
    &["A", "B", "C"],
    &["A", "D", "B"],
    &["B", "D", "C"],
    &["C", "D", "A"],
];

const SQUARE_EDGES: &[(&str, &str)] = &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")];

// Split along BD so ABD can be swapped for its folded image A'BD.
const SQUARE_FACES: &[&[&str]] = &[&["A", "B", "D"], &["B", "C", "D"]];

impl SolidKind {
    /// Vertex ids of the base solid, empty for unsupported kinds.
    pub fn vertex_ids(self) -> &'static [&'static str] {
        match self {
            SolidKind::Cube | SolidKind::Cuboid => BOX_VERTICES,
            SolidKind::Tetrahedron | SolidKind::Square => FOUR_VERTICES,
            SolidKind::Prism | SolidKind::Pyramid | SolidKind::Other => &[],
        }
    }

    pub fn edges(self) -> &'static [(&'static str, &'static str)] {
        match self {
            SolidKind::Cube | SolidKind::Cuboid => BOX_EDGES,
            SolidKind::Tetrahedron => TETRA_EDGES,
            SolidKind::Square => SQUARE_EDGES,
            SolidKind::Prism | SolidKind::Pyramid | SolidKind::Other => &[],
        }
    }

    pub fn faces(self) -> &'static [&'static [&'static str]] {
        match self {
            SolidKind::Cube | SolidKind::Cuboid => BOX_FACES,
            SolidKind::Tetrahedron => TETRA_FACES,
            SolidKind::Square => SQUARE_FACES,
            SolidKind::Prism | SolidKind::Pyramid | SolidKind::Other => &[],
        }
    }
}

/// Zero, negative-zero, non-finite or missing sizes fall back to 1 so the solid
/// never collapses.
fn usable(size: Option<f64>) -> f64 {
    match size {
        Some(s) if s.is_finite() && s != 0.0 => s,
        _ => 1.0,
    }
}

/// Place the base vertices of `base`, keyed by vertex id in canonical order.
pub fn build_vertices(base: &BaseSolid) -> Result<IndexMap<String, Vec3>, GeometryError> {
    let coords: Vec<Vec3> = match base.kind {
        SolidKind::Cube => {
            let h = usable(base.size) / 2.0;
            box_corners(h, h, h)
        }
        SolidKind::Cuboid => {
            let [a, b, c] = base.dimensions.unwrap_or([1.0, 1.0, 1.0]);
            box_corners(
                usable(Some(a)) / 2.0,
                usable(Some(b)) / 2.0,
                usable(Some(c)) / 2.0,
            )
        }
        SolidKind::Tetrahedron => {
            let a = usable(base.size);
            let sqrt3 = 3f64.sqrt();
            let sqrt6 = 6f64.sqrt();
            vec![
                Vec3::new(0.0, 0.0, sqrt6 / 4.0 * a),
                Vec3::new(-a / 2.0, -sqrt3 / 6.0 * a, -sqrt6 / 12.0 * a),
                Vec3::new(a / 2.0, -sqrt3 / 6.0 * a, -sqrt6 / 12.0 * a),
                Vec3::new(0.0, sqrt3 / 3.0 * a, -sqrt6 / 12.0 * a),
            ]
        }
        SolidKind::Square => {
            let h = usable(base.size) / 2.0;
            vec![
                Vec3::new(-h, -h, 0.0),
                Vec3::new(h, -h, 0.0),
                Vec3::new(h, h, 0.0),
                Vec3::new(-h, h, 0.0),
            ]
        }
        SolidKind::Prism | SolidKind::Pyramid | SolidKind::Other => {
            return Err(GeometryError::UnsupportedSolidType {
                kind: base.kind.as_str().to_string(),
            })
        }
    };

    Ok(base
        .kind
        .vertex_ids()
        .iter()
        .map(|id| id.to_string())
        .zip(coords)
        .collect())
}

fn box_corners(hx: f64, hy: f64, hz: f64) -> Vec<Vec3> {
    vec![
        Vec3::new(-hx, -hy, -hz),
        Vec3::new(hx, -hy, -hz),
        Vec3::new(hx, hy, -hz),
        Vec3::new(-hx, hy, -hz),
        Vec3::new(-hx, -hy, hz),
        Vec3::new(hx, -hy, hz),
        Vec3::new(hx, hy, hz),
        Vec3::new(-hx, hy, hz),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_size_falls_back_to_unit() {
        let v = build_vertices(&BaseSolid::cube(0.0)).unwrap();
        assert_relative_eq!(v["A"].distance(v["B"]), 1.0);
    }

    #[test]
    fn cuboid_uses_independent_dimensions() {
        let v = build_vertices(&BaseSolid::cuboid(2.0, 3.0, 4.0)).unwrap();
        assert_relative_eq!(v["A"].distance(v["B"]), 2.0);
        assert_relative_eq!(v["B"].distance(v["C"]), 3.0);
        assert_relative_eq!(v["A"].distance(v["A1"]), 4.0);
    }

    #[test]
    fn prism_is_unsupported() {
        let base = BaseSolid {
            kind: SolidKind::Prism,
            size: Some(1.0),
            dimensions: None,
        };
        assert!(matches!(
            build_vertices(&base),
            Err(GeometryError::UnsupportedSolidType { .. })
        ));
        assert!(SolidKind::Prism.vertex_ids().is_empty());
    }

    #[test]
    fn box_faces_point_outward() {
        let v = build_vertices(&BaseSolid::cube(2.0)).unwrap();
        for face in SolidKind::Cube.faces() {
            let a = v[face[0]];
            let b = v[face[1]];
            let c = v[face[2]];
            let normal = (b - a).cross(c - a);
            let centroid = Vec3::centroid(&face.iter().map(|id| v[*id]).collect::<Vec<_>>())
                .unwrap();
            assert!(normal.dot(centroid) > 0.0, "face {face:?} winds inward");
        }
    }
}
