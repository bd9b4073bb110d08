//! penpath Core Library
//!
//! Vector path editing: the path command model and its text form, geometry
//! derivations, hit testing, and the pen interaction state machine.

pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod handles;
pub mod input;
pub mod path;
pub mod shapes;
pub mod tools;

pub use config::EditorConfig;
pub use document::Document;
pub use error::{DocumentError, DocumentResult};
pub use handles::{Handle, HandleKind, PathHandle};
pub use hit_test::{RenderablePath, StrokedPath, hit_test_path};
pub use input::{EditorEvent, InputState, KeyEvent, Modifiers, PointerEvent};
pub use path::{Command, ParseError, Path};
pub use shapes::{PathShape, Polygon, PolygonKind, Shape, ShapeId, ShapeStyle, ShapeTrait};
pub use tools::{Connection, EditSession, Editor, ToolKind};
