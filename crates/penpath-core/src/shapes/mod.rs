//! Shape definitions for the document.

mod path;
mod polygon;

pub use path::PathShape;
pub use polygon::{Polygon, PolygonKind};

use kurbo::{Affine, BezPath, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    #[serde(default)]
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Color {
        with_opacity(self.stroke_color, self.opacity)
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill_color.map(|c| with_opacity(c, self.opacity))
    }
}

fn with_opacity(color: SerializableColor, opacity: f64) -> Color {
    let alpha = (color.a as f64 * opacity.clamp(0.0, 1.0)) as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
        }
    }
}

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in world coordinates) hits this shape.
    fn hit_test(&self, point: Point) -> bool;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Apply a transform to this shape.
    fn transform(&mut self, affine: Affine);
}

/// Enum wrapper for all shape types (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    Path(PathShape),
    Polygon(Polygon),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Path(s) => s.id(),
            Shape::Polygon(s) => s.id(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Path(s) => s.bounds(),
            Shape::Polygon(s) => s.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point) -> bool {
        match self {
            Shape::Path(s) => s.hit_test(point),
            Shape::Polygon(s) => s.hit_test(point),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Shape::Path(s) => s.to_path(),
            Shape::Polygon(s) => s.to_path(),
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Path(s) => s.style(),
            Shape::Polygon(s) => s.style(),
        }
    }

    /// Get the path shape if this shape is a path.
    pub fn as_path(&self) -> Option<&PathShape> {
        match self {
            Shape::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Get the mutable path shape if this shape is a path.
    pub fn as_path_mut(&mut self) -> Option<&mut PathShape> {
        match self {
            Shape::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Get the polygon if this shape is a polygon.
    pub fn as_polygon(&self) -> Option<&Polygon> {
        match self {
            Shape::Polygon(p) => Some(p),
            _ => None,
        }
    }

    /// Get the mutable polygon if this shape is a polygon.
    pub fn as_polygon_mut(&mut self) -> Option<&mut Polygon> {
        match self {
            Shape::Polygon(p) => Some(p),
            _ => None,
        }
    }
}
