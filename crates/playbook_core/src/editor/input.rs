//! Input values fed to the editor by the UI adapter.

use crate::field::PixelPos;
use crate::models::FieldPos;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

/// What the pointer went down on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum PointerTarget {
    #[default]
    Field,
    /// A player glyph; `origin` is the player's field position at grab time.
    Player { id: String, origin: FieldPos },
}

/// Pointer event in page (screen) pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub target: PointerTarget,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn on_field(x: f64, y: f64) -> Self {
        Self { x, y, ..Default::default() }
    }

    pub fn on_player(x: f64, y: f64, id: impl Into<String>, origin: FieldPos) -> Self {
        Self { x, y, target: PointerTarget::Player { id: id.into(), origin }, ..Default::default() }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn screen(&self) -> PixelPos {
        PixelPos::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorKey {
    /// Cancel the current drag or drawing.
    Escape,
    /// Finish the route being drawn.
    Enter,
    /// ctrl+g
    ToggleGrid,
    /// Remove the active route.
    Delete,
}
