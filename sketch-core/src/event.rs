//! Input events for canvas interaction.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A pointer sample in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Position relative to the canvas's top-left.
    pub point: Point,
    /// Timestamp in milliseconds (host clock).
    pub timestamp_ms: u64,
}

impl PointerEvent {
    /// Create a pointer sample.
    #[must_use]
    pub const fn new(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self {
            point: Point::new(x, y),
            timestamp_ms,
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Ctrl on Windows/Linux or Cmd on macOS.
    #[must_use]
    pub const fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press, named like DOM `KeyboardEvent.key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key name ("a", "Enter", "Escape", "Backspace", ...).
    pub key: String,
    /// Active modifier keys.
    #[serde(default)]
    pub modifiers: KeyModifiers,
    /// Timestamp in milliseconds (host clock).
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl KeyEvent {
    /// A key press without modifiers.
    #[must_use]
    pub fn plain(key: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            key: key.into(),
            modifiers: KeyModifiers::default(),
            timestamp_ms,
        }
    }

    /// A key press with modifiers.
    #[must_use]
    pub fn with_modifiers(key: impl Into<String>, modifiers: KeyModifiers, timestamp_ms: u64) -> Self {
        Self {
            key: key.into(),
            modifiers,
            timestamp_ms,
        }
    }

    /// The single printable character this key produces, if any.
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        if self.modifiers.command() {
            return None;
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// All input events the canvas can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown(PointerEvent),
    /// Pointer moved (button state irrelevant).
    PointerMove(PointerEvent),
    /// Primary button released.
    PointerUp(PointerEvent),
    /// Pointer left the canvas.
    PointerLeave(PointerEvent),
    /// Double click.
    DoubleClick(PointerEvent),
    /// Key pressed.
    Key(KeyEvent),
}

impl InputEvent {
    /// Host timestamp of the event.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            Self::PointerDown(p)
            | Self::PointerMove(p)
            | Self::PointerUp(p)
            | Self::PointerLeave(p)
            | Self::DoubleClick(p) => p.timestamp_ms,
            Self::Key(k) => k.timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_keys() {
        assert_eq!(KeyEvent::plain("a", 0).printable(), Some('a'));
        assert_eq!(KeyEvent::plain(" ", 0).printable(), Some(' '));
        assert_eq!(KeyEvent::plain("Enter", 0).printable(), None);
        let ctrl = KeyModifiers {
            ctrl: true,
            ..KeyModifiers::default()
        };
        assert_eq!(KeyEvent::with_modifiers("z", ctrl, 0).printable(), None);
    }

    #[test]
    fn event_json_is_tagged() {
        let event = InputEvent::PointerDown(PointerEvent::new(1.0, 2.0, 3));
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "PointerDown");
        assert_eq!(json["data"]["timestamp_ms"], 3);
        assert_eq!(event.timestamp_ms(), 3);
    }
}
