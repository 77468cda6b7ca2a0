//! Input events delivered to the canvas controller.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// The platform command key: meta on macOS, ctrl elsewhere. Either counts.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }

    pub fn with_command() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    pub fn with_command_shift() -> Self {
        Self {
            meta: true,
            shift: true,
            ..Self::NONE
        }
    }
}

/// A pointer press, move or release in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub position: Point,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }
}

/// A wheel or trackpad scroll. Pinch gestures arrive with ctrl held.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelInput {
    pub position: Point,
    pub delta: Vec2,
    #[serde(default)]
    pub modifiers: Modifiers,
}

/// Logical keys the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    Escape,
    Delete,
    Backspace,
    Enter,
    /// A printable character, compared case-insensitively.
    Character(char),
}

impl Key {
    /// The lowercase character for printable keys.
    pub fn char(&self) -> Option<char> {
        match self {
            Key::Character(c) => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }

    /// Parse a DOM-style key name ("Space", " ", "Escape", "z", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            " " | "Space" => Some(Key::Space),
            "Escape" | "Esc" => Some(Key::Escape),
            "Delete" => Some(Key::Delete),
            "Backspace" => Some(Key::Backspace),
            "Enter" => Some(Key::Enter),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Character(c)),
                    _ => None,
                }
            }
        }
    }
}

/// A key press or release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Auto-repeat of a held key.
    #[serde(default)]
    pub repeat: bool,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            repeat: false,
        }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// A command-modified character, e.g. `KeyInput::command('z')`.
    pub fn command(c: char) -> Self {
        Self::new(Key::Character(c), Modifiers::with_command())
    }
}
