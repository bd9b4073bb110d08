//! Input event types and press tracking.
//!
//! Hosts deliver raw pointer and key events with a millisecond timestamp.
//! [`InputState`] turns press/release pairs into clicks and detects double
//! clicks, so the editor sees one consistent stream regardless of platform.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event for the primary button.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        time_ms: u64,
    },
    Move {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed { key: String, modifiers: Modifiers },
    Released { key: String },
}

impl KeyEvent {
    pub fn pressed(key: &str) -> Self {
        KeyEvent::Pressed {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }
}

/// Any event the editor consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

impl From<PointerEvent> for EditorEvent {
    fn from(event: PointerEvent) -> Self {
        EditorEvent::Pointer(event)
    }
}

impl From<KeyEvent> for EditorEvent {
    fn from(event: KeyEvent) -> Self {
        EditorEvent::Key(event)
    }
}

/// A press of the primary button that has not been released yet.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    /// Where the button went down.
    origin: Point,
    time_ms: u64,
    /// Whether the pointer has travelled past the drag threshold.
    dragged: bool,
    /// Whether a tool already acted on this press.
    consumed: bool,
    /// Close enough in time and space to the previous click to pair with it.
    follows_click: bool,
}

/// Outcome of releasing the primary button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// Press and release without travel; carries the press position.
    Click(Point),
    /// A click that completes a double click, whether or not a tool
    /// consumed its press.
    DoubleClick(Point),
    /// The pointer travelled from `origin` before release.
    Drag { origin: Point },
    /// A tool already handled the press, or there was no press.
    Consumed,
}

/// Tracks pointer state between events.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Last known pointer position.
    pub pointer_position: Point,
    /// Last known modifier state.
    pub modifiers: Modifiers,
    press: Option<Press>,
    /// Press time and position of the last plain click.
    last_click: Option<(u64, Point)>,
    double_click_ms: u64,
    double_click_distance: f64,
    drag_threshold: f64,
}

impl InputState {
    /// Create an input tracker with the given thresholds.
    pub fn new(double_click_ms: u64, double_click_distance: f64, drag_threshold: f64) -> Self {
        Self {
            pointer_position: Point::ZERO,
            modifiers: Modifiers::NONE,
            press: None,
            last_click: None,
            double_click_ms,
            double_click_distance,
            drag_threshold,
        }
    }

    /// Record a press.
    ///
    /// Whether it forms a double click is only known on release: a press
    /// that turns into a drag never does.
    pub fn press(&mut self, position: Point, modifiers: Modifiers, time_ms: u64) {
        self.pointer_position = position;
        self.modifiers = modifiers;
        let follows_click = self.last_click.is_some_and(|(t, p)| {
            time_ms.saturating_sub(t) < self.double_click_ms
                && p.distance(position) < self.double_click_distance
        });
        self.press = Some(Press {
            origin: position,
            time_ms,
            dragged: false,
            consumed: false,
            follows_click,
        });
    }

    /// Record pointer movement.
    pub fn pointer_moved(&mut self, position: Point, modifiers: Modifiers) {
        self.pointer_position = position;
        self.modifiers = modifiers;
        if let Some(press) = &mut self.press {
            if press.origin.distance(position) > self.drag_threshold {
                press.dragged = true;
            }
        }
    }

    /// Mark the current press as handled so its release is not a click.
    pub fn consume_press(&mut self) {
        if let Some(press) = &mut self.press {
            press.consumed = true;
        }
    }

    /// Record a release and classify the gesture.
    pub fn release(&mut self, position: Point, modifiers: Modifiers) -> Release {
        self.pointer_moved(position, modifiers);
        let Some(press) = self.press.take() else {
            return Release::Consumed;
        };

        if press.dragged {
            self.last_click = None;
            return if press.consumed {
                Release::Consumed
            } else {
                Release::Drag {
                    origin: press.origin,
                }
            };
        }
        if press.follows_click {
            // A third click starts over rather than forming another pair.
            self.last_click = None;
            return Release::DoubleClick(press.origin);
        }
        self.last_click = Some((press.time_ms, press.origin));
        if press.consumed {
            Release::Consumed
        } else {
            Release::Click(press.origin)
        }
    }

    /// Whether the primary button is down.
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }
}
