//! Document state: the shape collection, selection and undo history.
//!
//! The shape list lives behind an `Arc` and is replaced copy-on-write:
//! undo snapshots share the list until the next mutation clones it, so a
//! snapshot never observes a partial edit.

use crate::error::{DocumentError, DocumentResult};
use crate::path::{Command, Path};
use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Maximum number of undo states to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// Shared, immutable view of the shape list.
pub type ShapeList = Arc<Vec<Shape>>;

/// A document containing all shapes and editing history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "DocumentRecord", into = "DocumentRecord")]
pub struct Document {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// Shapes in z-order (back to front).
    shapes: ShapeList,
    /// Currently selected shape.
    selected: Option<ShapeId>,
    undo_stack: Vec<ShapeList>,
    redo_stack: Vec<ShapeList>,
}

/// On-disk form of a [`Document`].
#[derive(Serialize, Deserialize)]
struct DocumentRecord {
    id: String,
    #[serde(default)]
    name: String,
    shapes: Vec<Shape>,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            shapes: Arc::new(record.shapes),
            selected: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }
}

impl From<Document> for DocumentRecord {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            shapes: Arc::unwrap_or_clone(doc.shapes),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            shapes: Arc::new(Vec::new()),
            selected: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Shapes in z-order (back to front).
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// A cheap handle on the current shape list.
    pub fn snapshot(&self) -> ShapeList {
        Arc::clone(&self.shapes)
    }

    /// Push current state to undo stack (call before making changes).
    pub fn push_undo(&mut self) {
        self.undo_stack.push(self.snapshot());
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                let current = std::mem::replace(&mut self.shapes, snapshot);
                self.redo_stack.push(current);
                self.drop_stale_selection();
                true
            }
            None => false,
        }
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(snapshot) => {
                let current = std::mem::replace(&mut self.shapes, snapshot);
                self.undo_stack.push(current);
                self.drop_stale_selection();
                true
            }
            None => false,
        }
    }

    /// Restore the last undo snapshot without making it redoable.
    ///
    /// Used to abandon an edit that was started but not committed.
    pub fn rollback(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                self.shapes = snapshot;
                self.drop_stale_selection();
                true
            }
            None => false,
        }
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = self.selected {
            if self.index_of(id).is_none() {
                self.selected = None;
            }
        }
    }

    /// Add a shape on top of the others.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        Arc::make_mut(&mut self.shapes).push(shape);
        id
    }

    /// Remove a shape from the document.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.index_of(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(Arc::make_mut(&mut self.shapes).remove(index))
    }

    fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id() == id)
    }

    /// Get a shape by ID.
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    /// Get a path by shape ID.
    pub fn get_path(&self, id: ShapeId) -> DocumentResult<&Path> {
        self.get_shape(id)
            .ok_or(DocumentError::ShapeNotFound(id))?
            .as_path()
            .map(|p| &p.path)
            .ok_or(DocumentError::NotAPath(id))
    }

    /// Mutate one shape. The shape list is cloned first if a snapshot shares it.
    pub fn update_shape<R>(&mut self, id: ShapeId, f: impl FnOnce(&mut Shape) -> R) -> DocumentResult<R> {
        let index = self.index_of(id).ok_or(DocumentError::ShapeNotFound(id))?;
        Ok(f(&mut Arc::make_mut(&mut self.shapes)[index]))
    }

    /// Mutate the commands of a path shape. Its text is regenerated afterwards.
    pub fn update_path<R>(
        &mut self,
        id: ShapeId,
        f: impl FnOnce(&mut Vec<Command>) -> R,
    ) -> DocumentResult<R> {
        let index = self.index_of(id).ok_or(DocumentError::ShapeNotFound(id))?;
        if self.shapes[index].as_path().is_none() {
            return Err(DocumentError::NotAPath(id));
        }
        Arc::make_mut(&mut self.shapes)[index]
            .as_path_mut()
            .map(|p| p.path.edit(f))
            .ok_or(DocumentError::NotAPath(id))
    }

    /// Replace a path's commands by parsing `text`.
    ///
    /// A rejected text leaves the document and its history untouched.
    pub fn set_path_data(&mut self, id: ShapeId, text: &str) -> DocumentResult<()> {
        self.get_path(id)?;
        let path = text.parse::<Path>().inspect_err(|e| {
            log::warn!("Rejected path edit for {id}: {e}");
        })?;
        self.push_undo();
        self.update_shape(id, |shape| {
            if let Some(p) = shape.as_path_mut() {
                p.path = path;
            }
        })
    }

    /// Select a shape.
    pub fn select(&mut self, id: ShapeId) {
        if self.index_of(id).is_some() {
            self.selected = Some(id);
        }
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The selected shape ID, if any.
    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    /// Find shapes at a point, front to back.
    pub fn shapes_at_point(&self, point: Point) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .filter(|s| s.hit_test(point))
            .map(Shape::id)
            .collect()
    }

    /// The topmost shape at a point.
    pub fn shape_at(&self, point: Point) -> Option<ShapeId> {
        self.shapes.iter().rev().find(|s| s.hit_test(point)).map(Shape::id)
    }

    /// Get the bounding box of all shapes.
    pub fn bounds(&self) -> Option<Rect> {
        self.shapes
            .iter()
            .map(Shape::bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a document from JSON. Path text is rebuilt from the commands.
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{PathShape, Polygon};

    fn doc_with_line() -> (Document, ShapeId) {
        let mut doc = Document::new();
        let id = doc.add_shape(Shape::Path(PathShape::from_data("M 0 0 L 100 0").unwrap()));
        (doc, id)
    }

    #[test]
    fn test_add_remove() {
        let (mut doc, id) = doc_with_line();
        assert_eq!(doc.len(), 1);
        doc.select(id);
        assert!(doc.remove_shape(id).is_some());
        assert!(doc.is_empty());
        assert_eq!(doc.selected(), None);
        assert!(doc.remove_shape(id).is_none());
    }

    #[test]
    fn test_copy_on_write_snapshot() {
        let (mut doc, id) = doc_with_line();
        let before = doc.snapshot();
        doc.update_path(id, |cmds| cmds.push(Command::line_to(100.0, 100.0))).unwrap();

        assert_eq!(before[0].as_path().unwrap().data(), "M 0 0 L 100 0");
        assert_eq!(doc.get_path(id).unwrap().data(), "M 0 0 L 100 0 L 100 100");
        assert!(!Arc::ptr_eq(&before, &doc.snapshot()));
    }

    #[test]
    fn test_undo_redo() {
        let (mut doc, id) = doc_with_line();
        doc.push_undo();
        doc.update_path(id, |cmds| cmds.push(Command::Close)).unwrap();
        assert!(doc.can_undo());

        assert!(doc.undo());
        assert_eq!(doc.get_path(id).unwrap().data(), "M 0 0 L 100 0");
        assert!(doc.redo());
        assert_eq!(doc.get_path(id).unwrap().data(), "M 0 0 L 100 0 Z");
        assert!(!doc.redo());
    }

    #[test]
    fn test_undo_history_limit() {
        let (mut doc, _) = doc_with_line();
        for _ in 0..(MAX_UNDO_HISTORY + 10) {
            doc.push_undo();
        }
        let mut count = 0;
        while doc.undo() {
            count += 1;
        }
        assert_eq!(count, MAX_UNDO_HISTORY);
    }

    #[test]
    fn test_set_path_data() {
        let (mut doc, id) = doc_with_line();

        let err = doc.set_path_data(id, "hello").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
        assert_eq!(doc.get_path(id).unwrap().data(), "M 0 0 L 100 0");
        assert!(!doc.can_undo());

        doc.set_path_data(id, "M 5,5 L 6 6 junk").unwrap();
        assert_eq!(doc.get_path(id).unwrap().data(), "M 5 5 L 6 6");
        assert!(doc.undo());
        assert_eq!(doc.get_path(id).unwrap().data(), "M 0 0 L 100 0");
    }

    #[test]
    fn test_path_errors() {
        let mut doc = Document::new();
        let poly = doc.add_shape(Shape::Polygon(Polygon::regular(Point::ZERO, 3, 10.0)));
        assert!(matches!(doc.get_path(poly), Err(DocumentError::NotAPath(_))));
        assert!(matches!(
            doc.update_path(Uuid::new_v4(), |_| ()),
            Err(DocumentError::ShapeNotFound(_))
        ));
    }

    #[test]
    fn test_shape_at_prefers_front() {
        let (mut doc, back) = doc_with_line();
        let front = doc.add_shape(Shape::Path(PathShape::from_data("M 50 -50 L 50 50").unwrap()));
        assert_eq!(doc.shape_at(Point::new(50.0, 0.0)), Some(front));
        assert_eq!(doc.shapes_at_point(Point::new(50.0, 0.0)), vec![front, back]);
        assert_eq!(doc.shape_at(Point::new(10.0, 1.0)), Some(back));
        assert_eq!(doc.shape_at(Point::new(10.0, 40.0)), None);
    }

    #[test]
    fn test_json_round_trip_regenerates_text() {
        let (doc, id) = doc_with_line();
        let json = doc.to_json().unwrap();
        let tampered = json.replace("M 0 0 L 100 0", "M 9 9");
        let loaded = Document::from_json(&tampered).unwrap();
        assert_eq!(loaded.id, doc.id);
        assert_eq!(loaded.get_path(id).unwrap().data(), "M 0 0 L 100 0");
        assert_eq!(loaded.shapes(), doc.shapes());
    }
}
