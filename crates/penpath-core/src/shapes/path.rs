//! Editable Bezier path shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::hit_test::{StrokedPath, hit_test_path};
use crate::path::{Command, ParseError, Path};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A path built with the pen tool or entered as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathShape {
    pub(crate) id: ShapeId,
    /// Commands and their text form.
    pub path: Path,
    /// Style properties.
    pub style: ShapeStyle,
}

impl PathShape {
    /// Create an empty path shape.
    pub fn new() -> Self {
        Self::from_path(Path::new())
    }

    /// Create a path shape around an existing path.
    pub fn from_path(path: Path) -> Self {
        Self {
            id: Uuid::new_v4(),
            path,
            style: ShapeStyle::default(),
        }
    }

    /// Create a path shape from path text.
    pub fn from_data(text: &str) -> Result<Self, ParseError> {
        Ok(Self::from_path(text.parse()?))
    }

    pub fn commands(&self) -> &[Command] {
        self.path.commands()
    }

    pub fn data(&self) -> &str {
        self.path.data()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

impl Default for PathShape {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeTrait for PathShape {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let anchors: Vec<Point> = self
            .commands()
            .iter()
            .filter_map(Command::anchor)
            .collect();
        let Some(&first) = anchors.first() else {
            return Rect::ZERO;
        };
        // Lone move points are not segments, so kurbo's box misses them.
        let rect = anchors
            .iter()
            .fold(Rect::from_points(first, first), |r, &p| r.union_pt(p));
        let bez = self.to_path();
        if bez.segments().next().is_some() {
            rect.union(bez.bounding_box())
        } else {
            rect
        }
    }

    fn hit_test(&self, point: Point) -> bool {
        if self.is_empty() {
            return false;
        }
        hit_test_path(&StrokedPath::new(self.to_path()), point, self.style.stroke_width)
    }

    fn to_path(&self) -> BezPath {
        self.path.to_bez_path()
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn transform(&mut self, affine: Affine) {
        let apply = |x: f64, y: f64| {
            let p = affine * Point::new(x, y);
            (p.x, p.y)
        };
        self.path.edit(|cmds| {
            for cmd in cmds.iter_mut() {
                *cmd = match *cmd {
                    Command::MoveTo { x, y } => {
                        let (x, y) = apply(x, y);
                        Command::move_to(x, y)
                    }
                    Command::LineTo { x, y } => {
                        let (x, y) = apply(x, y);
                        Command::line_to(x, y)
                    }
                    Command::CurveTo {
                        x1,
                        y1,
                        x2,
                        y2,
                        x,
                        y,
                    } => {
                        let (x1, y1) = apply(x1, y1);
                        let (x2, y2) = apply(x2, y2);
                        let (x, y) = apply(x, y);
                        Command::curve_to(x1, y1, x2, y2, x, y)
                    }
                    Command::Close => Command::Close,
                };
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    #[test]
    fn test_from_data() {
        let shape = PathShape::from_data("M 0 0 L 100 0").unwrap();
        assert_eq!(shape.commands().len(), 2);
        assert!(PathShape::from_data("nothing here").is_err());
    }

    #[test]
    fn test_hit_test() {
        let shape = PathShape::from_data("M 0 0 L 100 0").unwrap();
        assert!(shape.hit_test(Point::new(50.0, 1.0)));
        assert!(!shape.hit_test(Point::new(50.0, 20.0)));
        assert!(!PathShape::new().hit_test(Point::ZERO));
    }

    #[test]
    fn test_lone_point_hit() {
        let shape = PathShape::from_data("M 10 10").unwrap();
        assert!(shape.hit_test(Point::new(13.0, 10.0)));
        assert!(!shape.hit_test(Point::new(30.0, 10.0)));
    }

    #[test]
    fn test_bounds() {
        let shape = PathShape::from_data("M 10 20 L 50 80 M 0 100").unwrap();
        let bounds = shape.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 50.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
        assert_eq!(PathShape::new().bounds(), Rect::ZERO);
    }

    #[test]
    fn test_transform_keeps_text_in_sync() {
        let mut shape = PathShape::from_data("M 0 0 C 1 1 2 2 3 3 Z").unwrap();
        shape.transform(Affine::translate(Vec2::new(10.0, 5.0)));
        assert_eq!(shape.data(), "M 10 5 C 11 6 12 7 13 8 Z");
    }
}
