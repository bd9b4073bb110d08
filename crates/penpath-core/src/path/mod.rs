//! Path command model.
//!
//! A [`Path`] keeps the structured command list and its text form side by
//! side. Every mutation goes through a method that regenerates the text, so
//! `path.data()` always equals `serialize(path.commands())`.

mod syntax;

pub use syntax::{ParseError, format_number, parse, serialize};

use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One segment of a path. Coordinates are absolute, in pointer space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Start a new disconnected point/sub-figure.
    MoveTo { x: f64, y: f64 },
    /// Straight segment ending at `(x, y)`.
    LineTo { x: f64, y: f64 },
    /// Cubic Bezier segment with controls `(x1, y1)`, `(x2, y2)` and end anchor `(x, y)`.
    CurveTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    /// Close the current sub-figure.
    Close,
}

impl Command {
    pub fn move_to(x: f64, y: f64) -> Self {
        Command::MoveTo { x, y }
    }

    pub fn line_to(x: f64, y: f64) -> Self {
        Command::LineTo { x, y }
    }

    pub fn curve_to(x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> Self {
        Command::CurveTo {
            x1,
            y1,
            x2,
            y2,
            x,
            y,
        }
    }

    /// Build a `CurveTo` from kurbo points.
    pub fn curve_through(c1: Point, c2: Point, end: Point) -> Self {
        Command::curve_to(c1.x, c1.y, c2.x, c2.y, end.x, end.y)
    }

    /// The on-curve end point, if this command has one.
    pub fn anchor(&self) -> Option<Point> {
        match *self {
            Command::MoveTo { x, y } | Command::LineTo { x, y } | Command::CurveTo { x, y, .. } => {
                Some(Point::new(x, y))
            }
            Command::Close => None,
        }
    }

    /// Both control points of a `CurveTo`.
    pub fn controls(&self) -> Option<(Point, Point)> {
        match *self {
            Command::CurveTo { x1, y1, x2, y2, .. } => {
                Some((Point::new(x1, y1), Point::new(x2, y2)))
            }
            _ => None,
        }
    }

    /// The command letter used in path text.
    pub fn letter(&self) -> char {
        match self {
            Command::MoveTo { .. } => 'M',
            Command::LineTo { .. } => 'L',
            Command::CurveTo { .. } => 'C',
            Command::Close => 'Z',
        }
    }

    pub fn is_move_to(&self) -> bool {
        matches!(self, Command::MoveTo { .. })
    }

    /// Whether this command is a segment that can act as a connector.
    pub fn is_connector(&self) -> bool {
        matches!(self, Command::LineTo { .. } | Command::CurveTo { .. })
    }
}

/// An ordered command list with its cached path text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PathRecord", into = "PathRecord")]
pub struct Path {
    commands: Vec<Command>,
    data: String,
}

/// Wire form of a [`Path`]. `d` is informational; `commands` is authoritative.
#[derive(Serialize, Deserialize)]
struct PathRecord {
    #[serde(default)]
    d: String,
    commands: Vec<Command>,
}

impl From<PathRecord> for Path {
    fn from(record: PathRecord) -> Self {
        let path = Path::from_commands(record.commands);
        if !record.d.is_empty() && record.d != path.data {
            log::warn!(
                "Path text {:?} does not match its commands; regenerated as {:?}",
                record.d,
                path.data
            );
        }
        path
    }
}

impl From<Path> for PathRecord {
    fn from(path: Path) -> Self {
        Self {
            d: path.data,
            commands: path.commands,
        }
    }
}

impl Path {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a path from a command list.
    pub fn from_commands(commands: Vec<Command>) -> Self {
        let data = serialize(&commands);
        Self { commands, data }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The path text. Always equal to `serialize(self.commands())`.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// An empty path has nothing to render.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Append a command.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
        self.regenerate();
    }

    /// Replace the command list wholesale.
    pub fn set_commands(&mut self, commands: Vec<Command>) {
        self.commands = commands;
        self.regenerate();
    }

    /// Mutate the command list in place and regenerate the text afterwards.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut Vec<Command>) -> R) -> R {
        let result = f(&mut self.commands);
        self.regenerate();
        result
    }

    /// Replace the commands with the result of parsing `text`.
    ///
    /// On failure the path is left untouched.
    pub fn set_data(&mut self, text: &str) -> Result<(), ParseError> {
        let commands = parse(text)?;
        self.set_commands(commands);
        Ok(())
    }

    fn regenerate(&mut self) {
        self.data = serialize(&self.commands);
    }

    /// Indices and positions of every `MoveTo` anchor.
    pub fn move_anchors(&self) -> impl Iterator<Item = (usize, Point)> + '_ {
        self.commands
            .iter()
            .enumerate()
            .filter(|(_, cmd)| cmd.is_move_to())
            .filter_map(|(i, cmd)| cmd.anchor().map(|p| (i, p)))
    }

    /// Convert to a kurbo path for rendering and measurement.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for cmd in &self.commands {
            // kurbo requires a current point before drawing.
            if path.elements().is_empty() && !cmd.is_move_to() {
                if matches!(cmd, Command::Close) {
                    continue;
                }
                path.move_to(Point::ZERO);
            }
            match *cmd {
                Command::MoveTo { x, y } => path.move_to((x, y)),
                Command::LineTo { x, y } => path.line_to((x, y)),
                Command::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => path.curve_to((x1, y1), (x2, y2), (x, y)),
                Command::Close => path.close_path(),
            }
        }
        path
    }
}

impl FromStr for Path {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s).map(Path::from_commands)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}
