//! Freehand drawing layer: pen strokes and eraser strokes in world coordinates.

#[cfg(test)]
#[path = "draw_test.rs"]
mod draw_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Point, clamp_finite};
use crate::consts::{MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
use crate::input::Tool;
use crate::surface::{Composite, RenderError, Surface};

/// Pen and eraser settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    /// Pen color as a CSS color string.
    pub color: String,
    /// Pen opacity in [0, 1].
    pub opacity: f64,
    /// Pen diameter in world pixels.
    pub pen_size: f64,
    /// Eraser diameter in world pixels.
    pub eraser_size: f64,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self { color: "#f44336".to_owned(), opacity: 1.0, pen_size: 5.0, eraser_size: 30.0 }
    }
}

impl BrushSettings {
    pub fn set_pen_size(&mut self, size: f64) {
        self.pen_size = clamp_finite(size, self.pen_size, MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn set_eraser_size(&mut self, size: f64) {
        self.eraser_size = clamp_finite(size, self.eraser_size, MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = clamp_finite(opacity, self.opacity, 0.0, 1.0);
    }

    /// Copy with sizes and opacity forced into range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            opacity: clamp_finite(self.opacity, defaults.opacity, 0.0, 1.0),
            pen_size: clamp_finite(self.pen_size, defaults.pen_size, MIN_BRUSH_SIZE, MAX_BRUSH_SIZE),
            eraser_size: clamp_finite(self.eraser_size, defaults.eraser_size, MIN_BRUSH_SIZE, MAX_BRUSH_SIZE),
            color: self.color,
        }
    }

    /// Diameter of the brush used by `tool`, or `None` for non-drawing tools.
    #[must_use]
    pub fn size_for(&self, tool: Tool) -> Option<f64> {
        match tool {
            Tool::Pen => Some(self.pen_size),
            Tool::Eraser => Some(self.eraser_size),
            Tool::Pan | Tool::Reveal | Tool::Hide => None,
        }
    }
}

/// Resolved style for one stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub composite: Composite,
    pub color: String,
    pub alpha: f64,
    pub width: f64,
}

impl StrokeStyle {
    /// Style for `tool`, or `None` for non-drawing tools.
    #[must_use]
    pub fn for_tool(tool: Tool, brush: &BrushSettings) -> Option<Self> {
        match tool {
            Tool::Pen => Some(Self {
                composite: Composite::SourceOver,
                color: brush.color.clone(),
                alpha: brush.opacity,
                width: brush.pen_size,
            }),
            // Color is irrelevant under destination-out; only coverage matters.
            Tool::Eraser => Some(Self {
                composite: Composite::DestinationOut,
                color: "#000".to_owned(),
                alpha: 1.0,
                width: brush.eraser_size,
            }),
            Tool::Pan | Tool::Reveal | Tool::Hide => None,
        }
    }
}

/// Stroke a straight segment from `from` to `to` in world coordinates.
///
/// A zero-length segment leaves a round dot, which is how a stroke starts.
///
/// # Errors
///
/// Returns `Err` if the surface rejects the composite mode.
pub fn stroke_segment<S: Surface>(surface: &mut S, from: Point, to: Point, style: &StrokeStyle) -> Result<(), RenderError> {
    surface.save();
    let result = surface.set_composite(style.composite);
    if result.is_ok() {
        surface.set_alpha(style.alpha);
        surface.set_stroke(&style.color, style.width);
        surface.begin_path();
        surface.move_to(from.x, from.y);
        surface.line_to(to.x, to.y);
        surface.stroke();
    }
    surface.restore();
    result
}
