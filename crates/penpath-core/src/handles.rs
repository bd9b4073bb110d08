//! Editing handles for paths and polygons.
//!
//! Handles are derived from the command list on demand; nothing here is
//! stored in the document.

use crate::geometry::effective_start_point;
use crate::path::Command;
use crate::shapes::{Polygon, Shape};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Which point of a command a handle controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// On-curve end point of a `MoveTo`, `LineTo` or `CurveTo`.
    Anchor,
    /// First control point of a `CurveTo`.
    Control1,
    /// Second control point of a `CurveTo`.
    Control2,
    /// Midpoint affordance of a `LineTo`; clicking it promotes the line to a curve.
    Midpoint,
}

/// A handle on the command at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathHandle {
    pub index: usize,
    pub kind: HandleKind,
}

impl PathHandle {
    pub fn new(index: usize, kind: HandleKind) -> Self {
        Self { index, kind }
    }
}

/// A handle together with its world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub handle: PathHandle,
    pub position: Point,
}

impl Handle {
    /// Check if a point (in world coordinates) hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance(point) <= tolerance
    }
}

/// Midpoint of the `LineTo` at `index`, measured from its effective start.
pub fn line_midpoint(commands: &[Command], index: usize) -> Option<Point> {
    let Some(&Command::LineTo { x, y }) = commands.get(index) else {
        return None;
    };
    effective_start_point(commands, index).map(|start| start.midpoint(Point::new(x, y)))
}

/// All handles of a path: anchors, curve controls and line midpoints.
pub fn path_handles(commands: &[Command]) -> Vec<Handle> {
    let mut handles = Vec::new();
    for (index, cmd) in commands.iter().enumerate() {
        if let Some(position) = cmd.anchor() {
            handles.push(Handle {
                handle: PathHandle::new(index, HandleKind::Anchor),
                position,
            });
        }
        if let Some((c1, c2)) = cmd.controls() {
            handles.push(Handle {
                handle: PathHandle::new(index, HandleKind::Control1),
                position: c1,
            });
            handles.push(Handle {
                handle: PathHandle::new(index, HandleKind::Control2),
                position: c2,
            });
        }
        if let Some(position) = line_midpoint(commands, index) {
            handles.push(Handle {
                handle: PathHandle::new(index, HandleKind::Midpoint),
                position,
            });
        }
    }
    handles
}

/// Nearest handle within `tolerance` whose kind passes `accept`.
pub fn hit_test_handles(
    commands: &[Command],
    point: Point,
    tolerance: f64,
    accept: impl Fn(&Command, HandleKind) -> bool,
) -> Option<Handle> {
    path_handles(commands)
        .into_iter()
        .filter(|h| accept(&commands[h.handle.index], h.handle.kind))
        .filter(|h| h.hit_test(point, tolerance))
        .min_by(|a, b| a.position.distance(point).total_cmp(&b.position.distance(point)))
}

/// Nearest `MoveTo` anchor within `radius`, skipping `exclude`.
pub fn hit_test_move_anchor(
    commands: &[Command],
    point: Point,
    radius: f64,
    exclude: Option<usize>,
) -> Option<(usize, Point)> {
    commands
        .iter()
        .enumerate()
        .filter(|&(i, cmd)| cmd.is_move_to() && Some(i) != exclude)
        .filter_map(|(i, cmd)| cmd.anchor().map(|p| (i, p)))
        .filter(|(_, p)| p.distance(point) <= radius)
        .min_by(|a, b| a.1.distance(point).total_cmp(&b.1.distance(point)))
}

/// Position of a draggable handle.
pub fn handle_position(commands: &[Command], handle: PathHandle) -> Option<Point> {
    let cmd = commands.get(handle.index)?;
    match handle.kind {
        HandleKind::Anchor => cmd.anchor(),
        HandleKind::Control1 => cmd.controls().map(|(c1, _)| c1),
        HandleKind::Control2 => cmd.controls().map(|(_, c2)| c2),
        HandleKind::Midpoint => line_midpoint(commands, handle.index),
    }
}

/// Indices of the other anchors sitting exactly on the anchor at `index`.
///
/// Taken once when an anchor drag starts, so the drag carries snapped
/// connections along without picking up anchors it passes over.
pub fn coincident_anchors(commands: &[Command], index: usize) -> Vec<usize> {
    let Some(anchor) = commands.get(index).and_then(Command::anchor) else {
        return Vec::new();
    };
    commands
        .iter()
        .enumerate()
        .filter(|&(i, cmd)| i != index && cmd.anchor() == Some(anchor))
        .map(|(i, _)| i)
        .collect()
}

/// Move a handle to `position`.
///
/// Moving an anchor also moves the anchors listed in `linked`. Returns
/// false when the handle does not exist or cannot be dragged.
pub fn move_handle(
    commands: &mut [Command],
    handle: PathHandle,
    linked: &[usize],
    position: Point,
) -> bool {
    let Some(&cmd) = commands.get(handle.index) else {
        return false;
    };
    match (handle.kind, cmd) {
        (HandleKind::Anchor, Command::Close) => false,
        (HandleKind::Anchor, _) => {
            set_anchor(&mut commands[handle.index], position);
            for &i in linked {
                if let Some(other) = commands.get_mut(i) {
                    set_anchor(other, position);
                }
            }
            true
        }
        (HandleKind::Control1, Command::CurveTo { x2, y2, x, y, .. }) => {
            commands[handle.index] = Command::curve_to(position.x, position.y, x2, y2, x, y);
            true
        }
        (HandleKind::Control2, Command::CurveTo { x1, y1, x, y, .. }) => {
            commands[handle.index] = Command::curve_to(x1, y1, position.x, position.y, x, y);
            true
        }
        _ => false,
    }
}

fn set_anchor(cmd: &mut Command, p: Point) {
    match cmd {
        Command::MoveTo { x, y } | Command::LineTo { x, y } | Command::CurveTo { x, y, .. } => {
            *x = p.x;
            *y = p.y;
        }
        Command::Close => {}
    }
}

/// Index of the polygon vertex within `tolerance` of `point`.
pub fn hit_test_vertex(polygon: &Polygon, point: Point, tolerance: f64) -> Option<usize> {
    polygon
        .vertices
        .iter()
        .enumerate()
        .filter(|(_, v)| v.distance(point) <= tolerance)
        .min_by(|a, b| a.1.distance(point).total_cmp(&b.1.distance(point)))
        .map(|(i, _)| i)
}

/// Handle positions shown for a selected shape.
pub fn shape_handle_positions(shape: &Shape) -> Vec<Point> {
    match shape {
        Shape::Path(p) => path_handles(p.commands())
            .into_iter()
            .map(|h| h.position)
            .collect(),
        Shape::Polygon(p) => p.vertices.clone(),
    }
}
