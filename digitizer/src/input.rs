//! Input model: tools, keys, mouse buttons, and the pan gesture state.
//!
//! `Tool` decides what a click means. `InputState` tracks the one drag
//! gesture the engine supports (panning) between pointer-down and pointer-up.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::areas::AreaId;
use crate::camera::Point;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Drag to pan; click an area to select it and open its editor (default).
    #[default]
    Pan,
    /// Click to place polygon points.
    Draw,
    /// Click an area to delete it.
    Erase,
}

impl Tool {
    /// CSS cursor shown while the tool is active.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Pan => "default",
            Self::Draw => "crosshair",
            Self::Erase => "pointer",
        }
    }

    /// Whether dragging with this tool pans the view.
    #[must_use]
    pub fn pans(self) -> bool {
        self == Self::Pan
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down, zooms out).
    pub dy: f64,
}

/// UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tool: Tool,
    /// Area highlighted by the last pan-tool click.
    pub selected_id: Option<AreaId>,
}

/// Drag gesture state.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging the view.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
}
