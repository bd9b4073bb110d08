//! Select tool: picking shapes and dragging their handles.

use super::{EditSession, Editor};
use crate::handles::{
    HandleKind, PathHandle, coincident_anchors, hit_test_handles, hit_test_vertex, move_handle,
};
use crate::shapes::{Shape, ShapeId};
use kurbo::Point;

impl Editor {
    pub(super) fn select_down(&mut self, position: Point) {
        self.input.consume_press();
        if let Some(session) = self.handle_under(position) {
            log::debug!("Select drag started: {session:?}");
            self.session = session;
            return;
        }
        match self.document.shape_at(position) {
            Some(id) => self.document.select(id),
            None => self.document.clear_selection(),
        }
    }

    /// A drag session for the selected shape's handle at `position`.
    fn handle_under(&self, position: Point) -> Option<EditSession> {
        let shape_id = self.document.selected()?;
        let radius = self.config.anchor_hit_radius;
        match self.document.get_shape(shape_id)? {
            Shape::Path(path) => hit_test_handles(path.commands(), position, radius, |_, kind| {
                kind != HandleKind::Midpoint
            })
            .map(|hit| EditSession::DraggingHandle {
                shape_id,
                handle: hit.handle,
                linked: match hit.handle.kind {
                    HandleKind::Anchor => coincident_anchors(path.commands(), hit.handle.index),
                    _ => Vec::new(),
                },
                resume: None,
            }),
            Shape::Polygon(polygon) => hit_test_vertex(polygon, position, radius)
                .map(|vertex| EditSession::DraggingVertex { shape_id, vertex }),
        }
    }

    pub(super) fn drag_handle(
        &mut self,
        shape_id: ShapeId,
        handle: PathHandle,
        linked: &[usize],
        position: Point,
    ) {
        self.begin_edit();
        match self
            .document
            .update_path(shape_id, |cmds| move_handle(cmds, handle, linked, position))
        {
            Ok(true) => {}
            Ok(false) => log::debug!("Handle {handle:?} cannot be moved"),
            Err(e) => log::debug!("Handle drag failed: {e}"),
        }
    }

    pub(super) fn drag_vertex(&mut self, shape_id: ShapeId, vertex: usize, position: Point) {
        self.begin_edit();
        let moved = self.document.update_shape(shape_id, |shape| {
            shape
                .as_polygon_mut()
                .is_some_and(|polygon| polygon.move_vertex(vertex, position))
        });
        if !matches!(moved, Ok(true)) {
            log::debug!("Vertex {vertex} of {shape_id} cannot be moved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::ToolKind;
    use super::super::tests::{click, pen_editor};
    use super::*;
    use crate::input::Modifiers;
    use crate::path::Command;

    fn drag(editor: &mut Editor, from: Point, to: Point, time_ms: u64) {
        editor.pointer_down(from, Modifiers::NONE, time_ms);
        editor.pointer_move(to, Modifiers::NONE);
        editor.pointer_up(to, Modifiers::NONE);
    }

    fn connected_path() -> (Editor, ShapeId) {
        let mut editor = pen_editor();
        click(&mut editor, 0.0, 0.0, 0);
        let id = editor.in_progress_path().unwrap();
        editor.set_path_text(id, "M 0 0 L 100 0 M 100 0").unwrap();
        editor.set_tool(ToolKind::Select);
        (editor, id)
    }

    #[test]
    fn test_click_selects_topmost() {
        let (mut editor, id) = connected_path();
        click(&mut editor, 50.0, 200.0, 1000);
        assert_eq!(editor.document.selected(), None);
        click(&mut editor, 50.0, 1.0, 2000);
        assert_eq!(editor.document.selected(), Some(id));
    }

    #[test]
    fn test_anchor_drag_moves_coincident_anchors() {
        let (mut editor, id) = connected_path();
        drag(&mut editor, Point::new(100.0, 0.0), Point::new(100.0, 50.0), 1000);

        let path = editor.document.get_path(id).unwrap();
        assert_eq!(
            path.commands(),
            &[
                Command::move_to(0.0, 0.0),
                Command::line_to(100.0, 50.0),
                Command::move_to(100.0, 50.0),
            ]
        );
        assert_eq!(editor.session(), &EditSession::Idle);
        assert!(editor.undo());
        assert_eq!(editor.document.get_path(id).unwrap().data(), "M 0 0 L 100 0 M 100 0");
    }

    #[test]
    fn test_anchor_drag_over_another_anchor_leaves_it() {
        let (mut editor, id) = connected_path();
        editor.set_path_text(id, "M 0 0 M 50 0 M 100 0").unwrap();

        editor.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE, 1000);
        editor.pointer_move(Point::new(50.0, 0.0), Modifiers::NONE);
        editor.pointer_move(Point::new(0.0, 50.0), Modifiers::NONE);
        editor.pointer_up(Point::new(0.0, 50.0), Modifiers::NONE);

        assert_eq!(editor.document.get_path(id).unwrap().data(), "M 0 50 M 50 0 M 100 0");
    }

    #[test]
    fn test_midpoint_is_not_draggable() {
        let (mut editor, id) = connected_path();
        drag(&mut editor, Point::new(50.0, 0.0), Point::new(50.0, 40.0), 1000);
        assert_eq!(editor.document.get_path(id).unwrap().data(), "M 0 0 L 100 0 M 100 0");
        assert_eq!(editor.document.selected(), Some(id));
    }

    #[test]
    fn test_vertex_drag() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::Polygon);
        click(&mut editor, 0.0, 0.0, 0);
        editor.set_tool(ToolKind::Select);

        drag(&mut editor, Point::new(0.0, -50.0), Point::new(0.0, -80.0), 1000);
        let polygon = editor.document.shapes()[0].as_polygon().unwrap();
        assert_eq!(polygon.vertices[0], Point::new(0.0, -80.0));
        assert_eq!(editor.session(), &EditSession::Idle);
    }

    #[test]
    fn test_escape_reverts_drag() {
        let (mut editor, id) = connected_path();
        editor.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE, 1000);
        editor.pointer_move(Point::new(-30.0, 0.0), Modifiers::NONE);
        assert_eq!(editor.document.get_path(id).unwrap().data(), "M -30 0 L 100 0 M 100 0");

        editor.key_pressed("Escape", Modifiers::NONE);
        assert_eq!(editor.document.get_path(id).unwrap().data(), "M 0 0 L 100 0 M 100 0");
        assert_eq!(editor.session(), &EditSession::Idle);
    }
}
