//! Input model: modes, tools, pointer records, and the typed events fed to the engine.
//!
//! `Mode` and `Tool` capture what the user is doing at the time of an event.
//! `InputEvent` is what the host produces from raw DOM pointer, wheel, and
//! asset-load callbacks; `UiCommand` is a discrete parameter change from a
//! settings widget. Both are serde-friendly so sessions can be recorded and
//! replayed.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::grid::GridKind;

/// Top-level interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Running a session: pan the map, reveal and hide fog, draw.
    #[default]
    Play,
    /// Fitting the grid to the map: drags move the grid, pinches resize cells.
    Align,
}

/// Which play-mode tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Drag to pan, pinch to zoom (default).
    #[default]
    Pan,
    /// Paint revealed cells.
    Reveal,
    /// Paint hidden cells.
    Hide,
    /// Freehand strokes on the drawing layer.
    Pen,
    /// Erase freehand strokes.
    Eraser,
}

impl Tool {
    /// Whether this tool paints fog cells.
    #[must_use]
    pub fn is_fog_brush(self) -> bool {
        matches!(self, Self::Reveal | Self::Hide)
    }

    /// Whether this tool draws on the drawing layer.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Pen | Self::Eraser)
    }
}

/// Browser pointer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerId(pub i32);

/// One active touch or mouse contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRecord {
    pub id: PointerId,
    /// Latest screen position.
    pub current: Point,
    /// Screen position at the start of the current one-pointer gesture.
    pub start: Point,
}

impl PointerRecord {
    #[must_use]
    pub fn new(id: PointerId, at: Point) -> Self {
        Self { id, current: at, start: at }
    }

    /// Screen delta since the gesture baseline.
    #[must_use]
    pub fn delta(&self) -> Point {
        Point::new(self.current.x - self.start.x, self.current.y - self.start.y)
    }
}

/// Asset whose load just completed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "asset", rename_all = "snake_case")]
pub enum Asset {
    /// Base map image; its natural size becomes the world bounds.
    BaseMap { width: u32, height: u32 },
    /// Fog texture image.
    FogTexture,
}

/// A raw input event. Screen positions are CSS pixels relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { id: PointerId, x: f64, y: f64 },
    PointerMove { id: PointerId, x: f64, y: f64 },
    PointerUp { id: PointerId },
    /// The browser cancelled the pointer (e.g. a system gesture took over).
    PointerCancel { id: PointerId },
    /// One wheel notch; only the sign of `delta_y` matters (positive = zoom out).
    Wheel { x: f64, y: f64, delta_y: f64 },
    AssetLoaded(Asset),
}

impl InputEvent {
    #[must_use]
    pub fn down(id: i32, x: f64, y: f64) -> Self {
        Self::PointerDown { id: PointerId(id), x, y }
    }

    #[must_use]
    pub fn moved(id: i32, x: f64, y: f64) -> Self {
        Self::PointerMove { id: PointerId(id), x, y }
    }

    #[must_use]
    pub fn up(id: i32) -> Self {
        Self::PointerUp { id: PointerId(id) }
    }
}

/// A discrete parameter change from the settings UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum UiCommand {
    SetMode(Mode),
    SetTool(Tool),
    SetGridKind(GridKind),
    SetCellSize(f64),
    SetAspectRatio(f64),
    SetGridOpacity(f64),
    SetFogOpacity(f64),
    SetPenSize(f64),
    SetEraserSize(f64),
    SetPenColor(String),
    SetPenOpacity(f64),
    Rename(String),
    /// Hide every cell.
    ResetFog,
    /// Fit the map back into the viewport.
    ResetView,
}
