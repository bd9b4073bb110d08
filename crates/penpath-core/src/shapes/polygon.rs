//! Closed polygon shape created by the polygon and star tools.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{regular_polygon_points, star_points};
use crate::hit_test::{StrokedPath, hit_test_path};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a polygon's vertices were generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonKind {
    Regular { sides: usize },
    Star { points: usize },
}

/// A closed ring of vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub(crate) id: ShapeId,
    /// Vertices in drawing order.
    pub vertices: Vec<Point>,
    /// Generator the vertices came from.
    pub kind: PolygonKind,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Polygon {
    /// Create a regular polygon centered on `center`.
    pub fn regular(center: Point, sides: usize, radius: f64) -> Self {
        let vertices = regular_polygon_points(center, sides, radius);
        Self {
            id: Uuid::new_v4(),
            kind: PolygonKind::Regular {
                sides: vertices.len(),
            },
            vertices,
            style: ShapeStyle::default(),
        }
    }

    /// Create a star centered on `center`.
    pub fn star(center: Point, points: usize, outer_radius: f64, inner_radius: f64) -> Self {
        let vertices = star_points(center, points, outer_radius, inner_radius);
        Self {
            id: Uuid::new_v4(),
            kind: PolygonKind::Star {
                points: vertices.len() / 2,
            },
            vertices,
            style: ShapeStyle::default(),
        }
    }

    /// Move one vertex. Returns false if `index` is out of range.
    pub fn move_vertex(&mut self, index: usize, position: Point) -> bool {
        match self.vertices.get_mut(index) {
            Some(v) => {
                *v = position;
                true
            }
            None => false,
        }
    }
}

impl ShapeTrait for Polygon {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let Some(&first) = self.vertices.first() else {
            return Rect::ZERO;
        };
        self.vertices
            .iter()
            .fold(Rect::from_points(first, first), |r, &p| r.union_pt(p))
    }

    fn hit_test(&self, point: Point) -> bool {
        let path = self.to_path();
        if self.style.fill_color.is_some() && path.contains(point) {
            return true;
        }
        hit_test_path(&StrokedPath::new(path), point, self.style.stroke_width)
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some((&first, rest)) = self.vertices.split_first() else {
            return path;
        };
        path.move_to(first);
        for &p in rest {
            path.line_to(p);
        }
        path.close_path();
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn transform(&mut self, affine: Affine) {
        for v in &mut self.vertices {
            *v = affine * *v;
        }
    }
}
