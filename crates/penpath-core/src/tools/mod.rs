//! Tool system and the editing session state machine.

mod pen;
mod select;

pub use pen::Connection;

use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::DocumentResult;
use crate::handles::{PathHandle, shape_handle_positions};
use crate::input::{EditorEvent, InputState, KeyEvent, Modifiers, PointerEvent, Release};
use crate::shapes::{Polygon, Shape, ShapeId};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Polygon,
    Star,
}

impl ToolKind {
    /// Whether the tool creates a polygon on release.
    pub fn is_polygon_tool(&self) -> bool {
        matches!(self, ToolKind::Polygon | ToolKind::Star)
    }
}

/// What the editor is in the middle of.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditSession {
    /// Nothing in progress.
    #[default]
    Idle,
    /// The pen is adding points to a path.
    PathInProgress { path_id: ShapeId },
    /// A path handle follows the pointer.
    DraggingHandle {
        shape_id: ShapeId,
        handle: PathHandle,
        /// Anchors that sat on the dragged anchor when the drag started.
        linked: Vec<usize>,
        /// Path to resume drawing once the drag ends.
        resume: Option<ShapeId>,
    },
    /// A polygon vertex follows the pointer.
    DraggingVertex { shape_id: ShapeId, vertex: usize },
    /// The pen is dragging a connector out of a `MoveTo` anchor.
    ConnectingFrom(Connection),
}

impl EditSession {
    /// The path the pen is drawing, including during a pen gesture.
    pub fn in_progress_path(&self) -> Option<ShapeId> {
        match self {
            EditSession::PathInProgress { path_id } => Some(*path_id),
            EditSession::DraggingHandle { resume, .. } => *resume,
            EditSession::ConnectingFrom(conn) => Some(conn.path_id),
            EditSession::Idle | EditSession::DraggingVertex { .. } => None,
        }
    }

    /// Whether a pointer gesture is in flight.
    pub fn is_gesture_active(&self) -> bool {
        matches!(
            self,
            EditSession::DraggingHandle { .. }
                | EditSession::DraggingVertex { .. }
                | EditSession::ConnectingFrom(_)
        )
    }

    /// The state to fall back to when the current gesture ends.
    fn settled(&self) -> EditSession {
        match self.in_progress_path() {
            Some(path_id) => EditSession::PathInProgress { path_id },
            None => EditSession::Idle,
        }
    }
}

/// Drives a [`Document`] from pointer and key events.
#[derive(Debug, Clone)]
pub struct Editor {
    /// The document being edited.
    pub document: Document,
    config: EditorConfig,
    tool: ToolKind,
    session: EditSession,
    input: InputState,
    /// Whether the current gesture has pushed its undo snapshot.
    gesture_edited: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an editor on an empty document with default settings.
    pub fn new() -> Self {
        Self::with_document(Document::new(), EditorConfig::default())
    }

    /// Create an editor on an empty document.
    pub fn with_config(config: EditorConfig) -> Self {
        Self::with_document(Document::new(), config)
    }

    /// Create an editor on an existing document.
    pub fn with_document(document: Document, config: EditorConfig) -> Self {
        let input = InputState::new(
            config.double_click_ms,
            config.double_click_distance,
            config.drag_threshold,
        );
        Self {
            document,
            config,
            tool: ToolKind::default(),
            session: EditSession::Idle,
            input,
            gesture_edited: false,
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// The path the pen is drawing, if any.
    pub fn in_progress_path(&self) -> Option<ShapeId> {
        self.session.in_progress_path()
    }

    /// Live connector endpoints `(origin, preview)` while connecting.
    pub fn connection_preview(&self) -> Option<(Point, Point)> {
        match &self.session {
            EditSession::ConnectingFrom(conn) => Some((conn.origin, conn.preview)),
            _ => None,
        }
    }

    /// Handle positions of the selected shape, for display.
    pub fn selected_handles(&self) -> Vec<Point> {
        self.document
            .selected()
            .and_then(|id| self.document.get_shape(id))
            .map(shape_handle_positions)
            .unwrap_or_default()
    }

    /// Switch tools. Leaving the pen, or picking Select, finalizes the
    /// path in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.session.is_gesture_active() {
            self.session = self.session.settled();
        }
        if tool != ToolKind::Pen {
            self.finalize_path();
        }
        if tool != self.tool {
            log::debug!("Tool changed: {:?} -> {:?}", self.tool, tool);
            self.tool = tool;
        }
    }

    /// Dispatch a raw event.
    pub fn handle_event(&mut self, event: impl Into<EditorEvent>) {
        match event.into() {
            EditorEvent::Pointer(PointerEvent::Down {
                position,
                modifiers,
                time_ms,
            }) => self.pointer_down(position, modifiers, time_ms),
            EditorEvent::Pointer(PointerEvent::Move {
                position,
                modifiers,
            }) => self.pointer_move(position, modifiers),
            EditorEvent::Pointer(PointerEvent::Up {
                position,
                modifiers,
            }) => self.pointer_up(position, modifiers),
            EditorEvent::Key(KeyEvent::Pressed { key, modifiers }) => {
                self.key_pressed(&key, modifiers)
            }
            EditorEvent::Key(KeyEvent::Released { .. }) => {}
        }
    }

    /// Primary button pressed.
    pub fn pointer_down(&mut self, position: Point, modifiers: Modifiers, time_ms: u64) {
        // A press without a matching release ends whatever it left behind.
        if self.session.is_gesture_active() {
            self.session = self.session.settled();
        }
        self.input.press(position, modifiers, time_ms);
        self.gesture_edited = false;

        match self.tool {
            ToolKind::Pen => self.pen_down(position),
            ToolKind::Select => self.select_down(position),
            ToolKind::Polygon | ToolKind::Star => {}
        }
    }

    /// Pointer moved, with or without the button down.
    pub fn pointer_move(&mut self, position: Point, modifiers: Modifiers) {
        self.input.pointer_moved(position, modifiers);
        match &self.session {
            EditSession::ConnectingFrom(_) => self.update_connection(position, modifiers.shift),
            EditSession::DraggingHandle {
                shape_id,
                handle,
                linked,
                ..
            } => {
                let (shape_id, handle, linked) = (*shape_id, *handle, linked.clone());
                self.drag_handle(shape_id, handle, &linked, position)
            }
            EditSession::DraggingVertex { shape_id, vertex } => {
                let (shape_id, vertex) = (*shape_id, *vertex);
                self.drag_vertex(shape_id, vertex, position)
            }
            EditSession::Idle | EditSession::PathInProgress { .. } => {}
        }
    }

    /// Primary button released.
    pub fn pointer_up(&mut self, position: Point, modifiers: Modifiers) {
        let release = self.input.release(position, modifiers);
        match std::mem::take(&mut self.session) {
            EditSession::ConnectingFrom(conn) => {
                self.finish_connection(conn, position, modifiers.shift)
            }
            session @ (EditSession::DraggingHandle { .. } | EditSession::DraggingVertex { .. }) => {
                self.session = session.settled();
                log::debug!("Drag ended at ({}, {})", position.x, position.y);
            }
            session => {
                self.session = session;
                self.handle_release(release, position);
            }
        }
        if self.tool == ToolKind::Pen && matches!(release, Release::DoubleClick(_)) {
            self.finalize_path();
        }
    }

    fn handle_release(&mut self, release: Release, position: Point) {
        match (release, self.tool) {
            (Release::Click(origin), ToolKind::Pen) => self.place_point(origin),
            (Release::Click(origin) | Release::DoubleClick(origin), tool) if tool.is_polygon_tool() => {
                self.create_polygon(origin, self.config.default_radius)
            }
            (Release::Drag { origin }, tool) if tool.is_polygon_tool() => {
                let radius = origin.distance(position);
                if radius < self.config.drag_threshold {
                    self.create_polygon(origin, self.config.default_radius)
                } else {
                    self.create_polygon(origin, radius)
                }
            }
            _ => {}
        }
    }

    /// Key pressed.
    pub fn key_pressed(&mut self, key: &str, modifiers: Modifiers) {
        match key {
            "Enter" => self.finalize_path(),
            "Escape" => self.cancel(),
            "Delete" | "Backspace" => self.delete_selected(),
            "z" | "Z" if modifiers.command() && modifiers.shift => {
                self.redo();
            }
            "z" | "Z" if modifiers.command() => {
                self.undo();
            }
            "y" | "Y" if modifiers.command() => {
                self.redo();
            }
            _ => {}
        }
    }

    /// Stop drawing the path in progress. The path is kept as drawn.
    pub fn finalize_path(&mut self) {
        let Some(path_id) = self.session.in_progress_path() else {
            return;
        };
        if self.document.get_path(path_id).is_ok_and(|p| p.is_empty()) {
            self.document.remove_shape(path_id);
        }
        self.session = EditSession::Idle;
        log::debug!("Finalized path {path_id}");
    }

    /// Abandon the current gesture, or finalize the path when none is active.
    pub fn cancel(&mut self) {
        if self.session.is_gesture_active() {
            if self.gesture_edited {
                self.document.rollback();
                self.gesture_edited = false;
            }
            self.input.consume_press();
            self.session = self.session.settled();
            log::debug!("Gesture cancelled");
        } else if self.session.in_progress_path().is_some() {
            self.finalize_path();
        } else {
            self.document.clear_selection();
        }
    }

    /// Undo the last change.
    pub fn undo(&mut self) -> bool {
        self.settle_for_history();
        self.document.undo()
    }

    /// Redo the last undone change.
    pub fn redo(&mut self) -> bool {
        self.settle_for_history();
        self.document.redo()
    }

    fn settle_for_history(&mut self) {
        self.input.consume_press();
        self.finalize_path();
        self.session = EditSession::Idle;
    }

    /// Replace a path's text. A rejected text leaves the path unchanged.
    pub fn set_path_text(&mut self, id: ShapeId, text: &str) -> DocumentResult<()> {
        if self.session.is_gesture_active() {
            self.session = self.session.settled();
        }
        self.document.set_path_data(id, text)
    }

    fn delete_selected(&mut self) {
        if self.tool != ToolKind::Select || self.session.is_gesture_active() {
            return;
        }
        let Some(id) = self.document.selected() else {
            return;
        };
        self.document.push_undo();
        self.document.remove_shape(id);
        log::debug!("Deleted shape {id}");
    }

    /// Push the undo snapshot for the current gesture, once.
    fn begin_edit(&mut self) {
        if !self.gesture_edited {
            self.document.push_undo();
            self.gesture_edited = true;
        }
    }

    fn create_polygon(&mut self, center: Point, radius: f64) {
        let mut polygon = match self.tool {
            ToolKind::Polygon => Polygon::regular(center, self.config.polygon_sides, radius),
            ToolKind::Star => Polygon::star(
                center,
                self.config.star_points,
                radius,
                radius * self.config.star_inner_ratio,
            ),
            ToolKind::Select | ToolKind::Pen => return,
        };
        polygon.style = self.config.default_style.clone();

        self.begin_edit();
        let id = self.document.add_shape(Shape::Polygon(polygon));
        self.document.select(id);
        log::debug!("Created {:?} {id} with radius {radius}", self.tool);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Command;
    use crate::shapes::{PolygonKind, SerializableColor, ShapeStyle};

    const EPS: f64 = 1e-9;

    pub(super) fn click(editor: &mut Editor, x: f64, y: f64, time_ms: u64) {
        let p = Point::new(x, y);
        editor.pointer_down(p, Modifiers::NONE, time_ms);
        editor.pointer_up(p, Modifiers::NONE);
    }

    pub(super) fn pen_editor() -> Editor {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::Pen);
        editor
    }

    #[test]
    fn test_default_tool() {
        let editor = Editor::new();
        assert_eq!(editor.tool(), ToolKind::Select);
        assert_eq!(editor.session(), &EditSession::Idle);
    }

    #[test]
    fn test_first_click_creates_selected_path() {
        let mut editor = pen_editor();
        click(&mut editor, 10.0, 10.0, 0);

        let id = editor.in_progress_path().unwrap();
        assert_eq!(editor.document.selected(), Some(id));
        assert_eq!(editor.document.get_path(id).unwrap().commands(), &[Command::move_to(10.0, 10.0)]);
        assert_eq!(editor.document.len(), 1);
    }

    #[test]
    fn test_clicks_append_move_points() {
        let mut editor = pen_editor();
        click(&mut editor, 10.0, 10.0, 0);
        click(&mut editor, 100.0, 10.0, 1000);
        let id = editor.in_progress_path().unwrap();
        assert_eq!(editor.document.get_path(id).unwrap().data(), "M 10 10 M 100 10");
        assert_eq!(editor.document.len(), 1);
    }

    #[test]
    fn test_enter_finalizes_without_closing() {
        let mut editor = pen_editor();
        click(&mut editor, 10.0, 10.0, 0);
        click(&mut editor, 100.0, 10.0, 1000);
        let id = editor.in_progress_path().unwrap();

        editor.key_pressed("Enter", Modifiers::NONE);
        assert_eq!(editor.session(), &EditSession::Idle);
        assert_eq!(editor.document.get_path(id).unwrap().data(), "M 10 10 M 100 10");

        // The next click starts a new path.
        click(&mut editor, 50.0, 50.0, 2000);
        assert_ne!(editor.in_progress_path(), Some(id));
        assert_eq!(editor.document.len(), 2);
    }

    #[test]
    fn test_double_click_finalizes() {
        let mut editor = pen_editor();
        click(&mut editor, 10.0, 10.0, 0);
        click(&mut editor, 100.0, 10.0, 1000);
        click(&mut editor, 100.0, 10.0, 1200);

        assert_eq!(editor.session(), &EditSession::Idle);
        let path = &editor.document.shapes()[0];
        assert_eq!(path.as_path().unwrap().data(), "M 10 10 M 100 10");
    }

    #[test]
    fn test_escape_finalizes_path() {
        let mut editor = pen_editor();
        click(&mut editor, 10.0, 10.0, 0);
        editor.handle_event(KeyEvent::pressed("Escape"));
        assert_eq!(editor.session(), &EditSession::Idle);
        assert_eq!(editor.document.len(), 1);
    }

    #[test]
    fn test_tool_switch_finalizes() {
        let mut editor = pen_editor();
        click(&mut editor, 10.0, 10.0, 0);
        editor.set_tool(ToolKind::Select);
        assert_eq!(editor.session(), &EditSession::Idle);
        assert_eq!(editor.tool(), ToolKind::Select);

        editor.set_tool(ToolKind::Pen);
        click(&mut editor, 10.0, 10.0, 1000);
        assert!(editor.in_progress_path().is_some());
        editor.set_tool(ToolKind::Star);
        assert_eq!(editor.in_progress_path(), None);
    }

    #[test]
    fn test_polygon_click_uses_default_radius() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::Polygon);
        click(&mut editor, 100.0, 100.0, 0);

        let polygon = editor.document.shapes()[0].as_polygon().unwrap();
        assert_eq!(polygon.kind, PolygonKind::Regular { sides: 6 });
        assert_eq!(polygon.vertices.len(), 6);
        assert!((polygon.vertices[0].y - 50.0).abs() < EPS);
        assert_eq!(editor.document.selected(), Some(polygon.id));
    }

    #[test]
    fn test_new_shapes_use_configured_style() {
        let style = ShapeStyle {
            stroke_width: 6.0,
            fill_color: Some(SerializableColor::white()),
            ..ShapeStyle::default()
        };
        let config = EditorConfig {
            default_style: style.clone(),
            ..EditorConfig::default()
        };
        let mut editor = Editor::with_config(config);
        editor.set_tool(ToolKind::Pen);
        click(&mut editor, 10.0, 10.0, 0);
        editor.set_tool(ToolKind::Star);
        click(&mut editor, 200.0, 200.0, 1000);

        assert_eq!(editor.document.len(), 2);
        for shape in editor.document.shapes().iter() {
            assert_eq!(shape.style(), &style);
        }
    }

    #[test]
    fn test_star_drag_sets_radius() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::Star);
        editor.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE, 0);
        editor.pointer_move(Point::new(0.0, 20.0), Modifiers::NONE);
        editor.pointer_up(Point::new(0.0, 20.0), Modifiers::NONE);

        let star = editor.document.shapes()[0].as_polygon().unwrap();
        assert_eq!(star.kind, PolygonKind::Star { points: 5 });
        assert_eq!(star.vertices.len(), 10);
        assert!((star.vertices[0].y + 20.0).abs() < EPS);
        assert!((star.vertices[1].distance(Point::ZERO) - 10.0).abs() < EPS);
    }

    #[test]
    fn test_undo_reverts_each_gesture() {
        let mut editor = pen_editor();
        click(&mut editor, 10.0, 10.0, 0);
        click(&mut editor, 100.0, 10.0, 1000);
        let id = editor.in_progress_path().unwrap();

        assert!(editor.undo());
        assert_eq!(editor.session(), &EditSession::Idle);
        assert_eq!(editor.document.get_path(id).unwrap().data(), "M 10 10");
        assert!(editor.undo());
        assert!(editor.document.is_empty());
        assert!(!editor.undo());

        editor.key_pressed("z", Modifiers { ctrl: true, shift: true, ..Modifiers::NONE });
        assert_eq!(editor.document.len(), 1);
    }

    #[test]
    fn test_delete_selected() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::Polygon);
        click(&mut editor, 100.0, 100.0, 0);
        editor.set_tool(ToolKind::Select);

        editor.key_pressed("Delete", Modifiers::NONE);
        assert!(editor.document.is_empty());
        assert!(editor.undo());
        assert_eq!(editor.document.len(), 1);
    }

    #[test]
    fn test_set_path_text() {
        let mut editor = pen_editor();
        click(&mut editor, 10.0, 10.0, 0);
        let id = editor.in_progress_path().unwrap();

        assert!(editor.set_path_text(id, "nonsense").is_err());
        assert_eq!(editor.document.get_path(id).unwrap().data(), "M 10 10");

        editor.set_path_text(id, "M 0 0 L 5 5").unwrap();
        assert_eq!(editor.document.get_path(id).unwrap().data(), "M 0 0 L 5 5");
    }

    #[test]
    fn test_selected_handles() {
        let mut editor = pen_editor();
        click(&mut editor, 10.0, 10.0, 0);
        assert_eq!(editor.selected_handles(), vec![Point::new(10.0, 10.0)]);
    }
}
