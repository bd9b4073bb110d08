//! Pen tool gestures: placing points, connecting anchors and shaping curves.

use super::{EditSession, Editor};
use crate::geometry::{connect, derive_connection, promote_line_to_curve};
use crate::handles::{HandleKind, PathHandle, hit_test_handles, hit_test_move_anchor};
use crate::path::{Command, Path};
use crate::shapes::{PathShape, Shape, ShapeId};
use kurbo::Point;

/// A connector being dragged out of a `MoveTo` anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Path that owns the anchor.
    pub path_id: ShapeId,
    /// Index of the `MoveTo` the connector leaves from.
    pub index: usize,
    /// The anchor's coordinate when the gesture started.
    pub origin: Point,
    /// First pointer position past the drag threshold; shapes curves.
    pub waypoint: Option<Point>,
    /// Whether the pointer has left the origin.
    pub has_moved: bool,
    /// Index of the `MoveTo` the connector would snap to.
    pub hovered: Option<usize>,
    /// Where the connector currently ends.
    pub preview: Point,
}

impl Connection {
    fn new(path_id: ShapeId, index: usize, origin: Point) -> Self {
        Self {
            path_id,
            index,
            origin,
            waypoint: None,
            has_moved: false,
            hovered: None,
            preview: origin,
        }
    }
}

/// What a press on the in-progress path landed on.
enum PenTarget {
    MoveAnchor(usize, Point),
    Control(PathHandle),
    Midpoint(usize),
}

impl Editor {
    pub(super) fn pen_down(&mut self, position: Point) {
        let Some(path_id) = self.session.in_progress_path() else {
            return;
        };
        let Ok(path) = self.document.get_path(path_id) else {
            log::debug!("Path {path_id} vanished; leaving pen session");
            self.session = EditSession::Idle;
            return;
        };

        // Clicks that hit nothing place a point on release.
        let Some(target) = self.pen_target(path.commands(), position) else {
            return;
        };
        self.input.consume_press();
        match target {
            PenTarget::MoveAnchor(index, origin) => {
                log::debug!("Connecting from anchor {index} of {path_id}");
                self.session = EditSession::ConnectingFrom(Connection::new(path_id, index, origin));
            }
            PenTarget::Control(handle) => {
                log::debug!("Dragging {:?} of command {}", handle.kind, handle.index);
                self.session = EditSession::DraggingHandle {
                    shape_id: path_id,
                    handle,
                    linked: Vec::new(),
                    resume: Some(path_id),
                };
            }
            PenTarget::Midpoint(index) => {
                self.promote_segment(path_id, index);
            }
        }
    }

    /// Turn the line at `index` into a curve. History is only touched when
    /// the promotion applies.
    pub(super) fn promote_segment(&mut self, path_id: ShapeId, index: usize) -> bool {
        let Ok(path) = self.document.get_path(path_id) else {
            return false;
        };
        let mut commands = path.commands().to_vec();
        if !promote_line_to_curve(&mut commands, index) {
            return false;
        }
        self.begin_edit();
        self.document
            .update_path(path_id, |cmds| *cmds = commands)
            .is_ok()
    }

    /// Anchors win over control handles, which win over line midpoints.
    fn pen_target(&self, commands: &[Command], position: Point) -> Option<PenTarget> {
        let radius = self.config.anchor_hit_radius;
        if let Some((index, origin)) = hit_test_move_anchor(commands, position, radius, None) {
            return Some(PenTarget::MoveAnchor(index, origin));
        }
        if let Some(hit) = hit_test_handles(commands, position, radius, |_, kind| {
            matches!(kind, HandleKind::Control1 | HandleKind::Control2)
        }) {
            return Some(PenTarget::Control(hit.handle));
        }
        hit_test_handles(commands, position, radius, |_, kind| kind == HandleKind::Midpoint)
            .map(|hit| PenTarget::Midpoint(hit.handle.index))
    }

    /// Append a `MoveTo`, starting a new path when none is in progress.
    pub(super) fn place_point(&mut self, position: Point) {
        let point = Command::move_to(position.x, position.y);
        self.begin_edit();
        if let Some(path_id) = self.session.in_progress_path() {
            if self.document.update_path(path_id, |cmds| cmds.push(point)).is_ok() {
                return;
            }
            log::debug!("Path {path_id} is gone; starting a new one");
        }

        let mut shape = PathShape::from_path(Path::from_commands(vec![point]));
        shape.style = self.config.default_style.clone();
        let path_id = self.document.add_shape(Shape::Path(shape));
        self.document.select(path_id);
        self.session = EditSession::PathInProgress { path_id };
        log::debug!("Started path {path_id}");
    }

    /// Track the pointer while connecting.
    pub(super) fn update_connection(&mut self, position: Point, as_curve: bool) {
        let EditSession::ConnectingFrom(mut conn) = self.session else {
            return;
        };
        let Ok(path) = self.document.get_path(conn.path_id) else {
            self.session = EditSession::Idle;
            return;
        };

        let target = hit_test_move_anchor(path.commands(), position, self.config.snap_radius, Some(conn.index));
        conn.hovered = target.map(|(index, _)| index);
        conn.preview = target.map_or(position, |(_, p)| p);

        if !conn.has_moved && position.distance(conn.origin) > self.config.drag_threshold {
            conn.has_moved = true;
            conn.waypoint = Some(position);
        }
        if conn.has_moved {
            let waypoint = conn.waypoint.unwrap_or(conn.origin);
            let segment = derive_connection(conn.origin, conn.preview, waypoint, as_curve);
            if self.apply_connector(conn, segment) {
                // Anchors after the origin shifted by the inserted connector.
                conn.hovered = conn.hovered.map(|i| if i > conn.index { i + 1 } else { i });
            }
        }
        self.session = EditSession::ConnectingFrom(conn);
    }

    /// Commit the connector on release and return to drawing.
    pub(super) fn finish_connection(&mut self, conn: Connection, position: Point, as_curve: bool) {
        if conn.has_moved {
            self.session = EditSession::ConnectingFrom(conn);
            self.update_connection(position, as_curve);
        } else if position.distance(conn.origin) > self.config.drag_threshold {
            self.apply_connector(conn, Command::line_to(position.x, position.y));
        } else {
            log::debug!("Released on the origin anchor; nothing to connect");
        }
        self.session = EditSession::PathInProgress {
            path_id: conn.path_id,
        };
    }

    /// Set the connector of the origin anchor. Returns true if it was inserted
    /// rather than replaced.
    fn apply_connector(&mut self, conn: Connection, segment: Command) -> bool {
        self.begin_edit();
        let result = self.document.update_path(conn.path_id, |cmds| {
            let before = cmds.len();
            connect(cmds, conn.index, segment).map(|_| cmds.len() > before)
        });
        match result {
            Ok(Some(inserted)) => inserted,
            Ok(None) => {
                log::debug!("Anchor {} is no longer a move command", conn.index);
                false
            }
            Err(e) => {
                log::debug!("Connection failed: {e}");
                false
            }
        }
    }
}
