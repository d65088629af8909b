//! Browser bindings: canvas-backed surfaces and the world container element.
//!
//! The page provides a `#world` element holding the base map image and the
//! layer canvases (`#layer-fog`, `#layer-grid`, and optionally `#layer-draw`).
//! All of them are world-sized; the camera moves them together with one CSS
//! transform on `#world`.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlImageElement};

use crate::render::{LayerTransform, Layers};
use crate::surface::{Composite, RenderError, Surface};

pub const WORLD_ID: &str = "world";
pub const FOG_LAYER_ID: &str = "layer-fog";
pub const GRID_LAYER_ID: &str = "layer-grid";
pub const DRAW_LAYER_ID: &str = "layer-draw";

/// An image source a [`WebSurface`] can stamp.
#[derive(Debug, Clone)]
pub enum WebImage {
    Image(HtmlImageElement),
    Canvas(HtmlCanvasElement),
}

/// A `<canvas>` element and its 2D context.
#[derive(Debug, Clone)]
pub struct WebSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl WebSurface {
    /// Wrap `canvas`, acquiring its 2D context.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingContext`] if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(RenderError::MissingContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::MissingContext)?;
        Ok(Self { canvas, ctx })
    }

    /// Wrap the canvas with element id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingElement`] if no canvas has that id.
    pub fn from_id(document: &Document, id: &'static str) -> Result<Self, RenderError> {
        let canvas = document
            .get_element_by_id(id)
            .ok_or(RenderError::MissingElement(id))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RenderError::MissingElement(id))?;
        Self::new(canvas)
    }

    /// An offscreen canvas, e.g. an export target.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the element cannot be created.
    pub fn offscreen(document: &Document) -> Result<Self, RenderError> {
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RenderError::MissingElement("canvas"))?;
        Self::new(canvas)
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for WebSurface {
    type Image = WebImage;

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, f64::from(w), f64::from(h));
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_composite(&mut self, op: Composite) -> Result<(), RenderError> {
        self.ctx.set_global_composite_operation(op.as_str())?;
        Ok(())
    }

    fn set_fill(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_stroke(&mut self, color: &str, width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.fill_rect(x, y, width, height);
    }

    fn draw_image(&mut self, image: &WebImage, x: f64, y: f64, width: f64, height: f64) -> Result<(), RenderError> {
        match image {
            WebImage::Image(img) => {
                self.ctx.draw_image_with_html_image_element_and_dw_and_dh(img, x, y, width, height)?;
            }
            WebImage::Canvas(canvas) => {
                self.ctx.draw_image_with_html_canvas_element_and_dw_and_dh(canvas, x, y, width, height)?;
            }
        }
        Ok(())
    }

    fn draw_surface(&mut self, source: &Self, x: f64, y: f64, width: f64, height: f64) -> Result<(), RenderError> {
        self.ctx.draw_image_with_html_canvas_element_and_dw_and_dh(&source.canvas, x, y, width, height)?;
        Ok(())
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.rect(x, y, width, height);
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }
}

/// Look up the layer canvases. The drawing layer is optional.
///
/// # Errors
///
/// Returns [`RenderError::MissingElement`] if the fog or grid canvas is missing.
pub fn layers_from_document(document: &Document) -> Result<Layers<WebSurface>, RenderError> {
    let drawing = match document.get_element_by_id(DRAW_LAYER_ID) {
        Some(_) => Some(WebSurface::from_id(document, DRAW_LAYER_ID)?),
        None => None,
    };
    Ok(Layers {
        fog: WebSurface::from_id(document, FOG_LAYER_ID)?,
        grid: WebSurface::from_id(document, GRID_LAYER_ID)?,
        drawing,
    })
}

/// The `#world` container element.
///
/// # Errors
///
/// Returns [`RenderError::MissingElement`] if it is missing.
pub fn world_element(document: &Document) -> Result<HtmlElement, RenderError> {
    document
        .get_element_by_id(WORLD_ID)
        .ok_or(RenderError::MissingElement(WORLD_ID))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| RenderError::MissingElement(WORLD_ID))
}

/// Position the world container on screen.
///
/// # Errors
///
/// Returns `Err` if the style cannot be set.
pub fn apply_transform(world: &HtmlElement, transform: &LayerTransform) -> Result<(), RenderError> {
    world.style().set_property("transform", &transform.css())?;
    Ok(())
}

/// Size the world container to the world bounds in CSS pixels.
///
/// # Errors
///
/// Returns `Err` if the style cannot be set.
pub fn size_world(world: &HtmlElement, width: u32, height: u32) -> Result<(), RenderError> {
    let style = world.style();
    style.set_property("width", &format!("{width}px"))?;
    style.set_property("height", &format!("{height}px"))?;
    Ok(())
}

/// Download name for an export taken now.
#[must_use]
pub fn export_file_name_now(name: &str) -> String {
    let now: String = js_sys::Date::new_0().to_iso_string().into();
    crate::export::export_file_name(name, &now)
}
