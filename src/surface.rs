//! Drawing surfaces: the 2D context the render pipeline paints through.
//!
//! [`Surface`] mirrors the subset of the `Canvas2D` API the pipeline needs.
//! The browser implementation lives in [`crate::web`]; [`DisplayList`] records
//! every call instead of rasterizing, which keeps rendering testable off the
//! browser and lets the CLI report what a redraw would cost.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use wasm_bindgen::JsValue;

use crate::grid::CellOutline;

/// Error raised by a drawing surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The canvas element did not provide a 2D context.
    #[error("canvas has no 2d context")]
    MissingContext,
    /// A `Canvas2D` call failed.
    #[error("canvas call failed: {0}")]
    Canvas(String),
    /// A required DOM element is missing.
    #[error("missing DOM element: {0}")]
    MissingElement(&'static str),
}

impl From<JsValue> for RenderError {
    fn from(value: JsValue) -> Self {
        Self::Canvas(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Compositing mode for subsequent fills and strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Paint over existing pixels.
    #[default]
    SourceOver,
    /// Erase existing pixels wherever the new shape is drawn.
    DestinationOut,
}

impl Composite {
    /// The `globalCompositeOperation` name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::DestinationOut => "destination-out",
        }
    }
}

/// A raster layer that can be painted with 2D path operations.
pub trait Surface {
    /// Image type that can be stamped onto this surface.
    type Image;

    /// Backing-store size in pixels.
    fn size(&self) -> (u32, u32);
    /// Resize the backing store. Existing pixels are discarded.
    fn resize(&mut self, width: u32, height: u32);
    /// Erase every pixel.
    fn clear(&mut self);

    fn save(&mut self);
    fn restore(&mut self);
    fn set_alpha(&mut self, alpha: f64);
    fn set_composite(&mut self, op: Composite) -> Result<(), RenderError>;
    fn set_fill(&mut self, color: &str);
    /// Stroke color and width; strokes use round caps and joins.
    fn set_stroke(&mut self, color: &str, width: f64);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64, width: f64, height: f64)
    -> Result<(), RenderError>;
    /// Stamp another surface of the same kind, stretched into the given rectangle.
    fn draw_surface(&mut self, source: &Self, x: f64, y: f64, width: f64, height: f64) -> Result<(), RenderError>;

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill(&mut self);
    fn stroke(&mut self);

    /// Append a cell outline to the current path.
    fn trace_outline(&mut self, outline: &CellOutline) {
        match *outline {
            CellOutline::Rect { x, y, width, height } => self.rect(x, y, width, height),
            CellOutline::Hex(vertices) => {
                let [first, rest @ ..] = vertices;
                self.move_to(first.x, first.y);
                for v in rest {
                    self.line_to(v.x, v.y);
                }
                self.close_path();
            }
        }
    }
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Resize { width: u32, height: u32 },
    Clear,
    Save,
    Restore,
    Alpha(f64),
    Composite(Composite),
    Fill(String),
    Stroke { color: String, width: f64 },
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    DrawImage { image: String, width: f64, height: f64 },
    DrawSurface { ops: usize, width: f64, height: f64 },
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    ClosePath,
    Rect { x: f64, y: f64, width: f64, height: f64 },
    FillPath,
    StrokePath,
}

/// Headless surface that records calls instead of drawing.
///
/// Clearing or resizing discards the recording, so [`Self::ops`] always
/// describes the current contents. Images are identified by name.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    width: u32,
    height: u32,
    ops: Vec<Op>,
}

impl DisplayList {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, ops: Vec::new() }
    }

    /// Calls recorded since the last clear, resize, or [`Self::take_ops`].
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Drain the recorded calls.
    pub fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }

    /// Number of recorded calls matching `pred`.
    pub fn count<F>(&self, pred: F) -> usize
    where
        F: Fn(&Op) -> bool,
    {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl Surface for DisplayList {
    type Image = String;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.ops.clear();
        self.ops.push(Op::Resize { width, height });
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(Op::Clear);
    }

    fn save(&mut self) {
        self.ops.push(Op::Save);
    }

    fn restore(&mut self) {
        self.ops.push(Op::Restore);
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.ops.push(Op::Alpha(alpha));
    }

    fn set_composite(&mut self, op: Composite) -> Result<(), RenderError> {
        self.ops.push(Op::Composite(op));
        Ok(())
    }

    fn set_fill(&mut self, color: &str) {
        self.ops.push(Op::Fill(color.to_owned()));
    }

    fn set_stroke(&mut self, color: &str, width: f64) {
        self.ops.push(Op::Stroke { color: color.to_owned(), width });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::FillRect { x, y, width, height });
    }

    fn draw_image(&mut self, image: &String, _x: f64, _y: f64, width: f64, height: f64) -> Result<(), RenderError> {
        self.ops.push(Op::DrawImage { image: image.clone(), width, height });
        Ok(())
    }

    fn draw_surface(&mut self, source: &Self, _x: f64, _y: f64, width: f64, height: f64) -> Result<(), RenderError> {
        self.ops.push(Op::DrawSurface { ops: source.ops.len(), width, height });
        Ok(())
    }

    fn begin_path(&mut self) {
        self.ops.push(Op::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(Op::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(Op::LineTo(x, y));
    }

    fn close_path(&mut self) {
        self.ops.push(Op::ClosePath);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::Rect { x, y, width, height });
    }

    fn fill(&mut self) {
        self.ops.push(Op::FillPath);
    }

    fn stroke(&mut self) {
        self.ops.push(Op::StrokePath);
    }
}
