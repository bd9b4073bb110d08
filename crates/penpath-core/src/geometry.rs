//! Geometric derivations used by the editing tools.
//!
//! These functions operate on plain command slices and points. Operations
//! that cannot apply (wrong index, wrong command kind) leave the input
//! untouched and report it through their return value.

use crate::path::Command;
use kurbo::{Point, Vec2};
use std::f64::consts::{PI, TAU};

/// Fraction of the span at which the first promoted control point sits.
pub const PROMOTE_FIRST_CONTROL: f64 = 0.33;
/// Fraction of the span at which the second promoted control point sits.
pub const PROMOTE_SECOND_CONTROL: f64 = 0.67;

/// Minimum vertex count for polygons and stars.
pub const MIN_POLYGON_SIDES: usize = 3;

/// The start point of the segment at `index`.
///
/// Scans backward for the nearest `MoveTo` or `CurveTo`; `LineTo` and `Close`
/// are skipped.
pub fn effective_start_point(commands: &[Command], index: usize) -> Option<Point> {
    commands
        .get(..index.min(commands.len()))?
        .iter()
        .rev()
        .find_map(|cmd| match cmd {
            Command::MoveTo { .. } | Command::CurveTo { .. } => cmd.anchor(),
            _ => None,
        })
}

/// Replace the `LineTo` at `index` with a `CurveTo` that draws the same line.
///
/// Returns `false` and leaves `commands` unchanged when `index` does not
/// name a `LineTo` with a start point.
pub fn promote_line_to_curve(commands: &mut [Command], index: usize) -> bool {
    let Some(&Command::LineTo { x, y }) = commands.get(index) else {
        log::debug!("Ignoring curve promotion at {index}: not a line segment");
        return false;
    };
    let Some(start) = effective_start_point(commands, index) else {
        log::debug!("Ignoring curve promotion at {index}: no start point");
        return false;
    };

    let end = Point::new(x, y);
    let span = end - start;
    let c1 = start + span * PROMOTE_FIRST_CONTROL;
    let c2 = start + span * PROMOTE_SECOND_CONTROL;
    commands[index] = Command::curve_through(c1, c2, end);
    true
}

/// Build the segment connecting `from` to `to`.
///
/// A curve uses `waypoint` to shape both controls: the first sits halfway
/// between `from` and the waypoint, the second halfway between the waypoint
/// and `to`.
pub fn derive_connection(from: Point, to: Point, waypoint: Point, as_curve: bool) -> Command {
    if !as_curve {
        return Command::line_to(to.x, to.y);
    }
    let c1 = from.midpoint(waypoint);
    let c2 = to - (to - waypoint) * 0.5;
    Command::curve_through(c1, c2, to)
}

/// Index of the connector owned by the `MoveTo` at `from_index`, if any.
pub fn connector_index(commands: &[Command], from_index: usize) -> Option<usize> {
    if !commands.get(from_index)?.is_move_to() {
        return None;
    }
    let next = from_index + 1;
    commands
        .get(next)
        .filter(|cmd| cmd.is_connector())
        .map(|_| next)
}

/// Set the outgoing connector of the `MoveTo` at `from_index`.
///
/// An existing connector is replaced in place; otherwise `segment` is
/// inserted right after the `MoveTo`. Returns the connector's index, or
/// `None` when `from_index` is not a `MoveTo`.
pub fn connect(commands: &mut Vec<Command>, from_index: usize, segment: Command) -> Option<usize> {
    if !commands.get(from_index).is_some_and(Command::is_move_to) {
        log::debug!("Ignoring connection from {from_index}: not a move command");
        return None;
    }
    match connector_index(commands, from_index) {
        Some(existing) => {
            commands[existing] = segment;
            Some(existing)
        }
        None => {
            commands.insert(from_index + 1, segment);
            Some(from_index + 1)
        }
    }
}

/// Vertex on a circle, with angle 0 at 12 o'clock turning clockwise on screen.
fn clock_point(center: Point, radius: f64, angle: f64) -> Point {
    center + Vec2::new(angle.sin(), -angle.cos()) * radius
}

/// Vertices of a regular polygon, starting at the top and going clockwise.
pub fn regular_polygon_points(center: Point, sides: usize, radius: f64) -> Vec<Point> {
    let sides = sides.max(MIN_POLYGON_SIDES);
    let step = TAU / sides as f64;
    (0..sides)
        .map(|i| clock_point(center, radius, step * i as f64))
        .collect()
}

/// Vertices of a star, alternating outer and inner radius.
///
/// Produces `2 * points` vertices starting with the outer tip at the top.
pub fn star_points(center: Point, points: usize, outer_radius: f64, inner_radius: f64) -> Vec<Point> {
    let points = points.max(MIN_POLYGON_SIDES);
    let step = PI / points as f64;
    (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer_radius } else { inner_radius };
            clock_point(center, radius, step * i as f64)
        })
        .collect()
}
