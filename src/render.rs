//! Rendering: composites the fog and grid layers.
//!
//! The world is drawn as a stack of same-sized layers (base image, fog, grid,
//! optional drawing layer) positioned together by one camera transform. This
//! module paints the fog and grid layers from a read-only [`Scene`] and never
//! mutates application state.
//!
//! Revealing a cell is cheap: one more hole is erased out of the fog layer.
//! Hiding a cell is not: erased fog pixels cannot be restored selectively, so
//! [`RenderPipeline::render_patch`] falls back to a full redraw.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::ViewTransform;
use crate::consts::{
    ALIGN_GRID_OPACITY, FALLBACK_FOG_FILL, GRID_LINE_INSET, GRID_MARGIN_CELLS, HOLE_INFLATE,
};
use crate::fog::FogState;
use crate::grid::{CellKey, GridConfig};
use crate::input::Mode;
use crate::surface::{Composite, RenderError, Surface};

/// Align-mode grid stroke color.
const ALIGN_GRID_COLOR: &str = "#00e5ff";
/// Align-mode grid stroke width in world pixels.
const ALIGN_GRID_WIDTH: f64 = 2.0;
/// Play-mode grid stroke width in world pixels.
const PLAY_GRID_WIDTH: f64 = 1.5;

/// Read-only snapshot of everything a redraw depends on.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub grid: &'a GridConfig,
    pub fog: &'a FogState,
    pub mode: Mode,
    pub fog_opacity: f64,
    pub width: f64,
    pub height: f64,
}

/// The world-sized layers the pipeline paints.
#[derive(Debug)]
pub struct Layers<S: Surface> {
    pub fog: S,
    pub grid: S,
    /// Freehand drawing layer; absent when the host does not offer drawing.
    pub drawing: Option<S>,
}

impl<S: Surface> Layers<S> {
    /// Resize every layer to the world bounds. Layer contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.fog.resize(width, height);
        self.grid.resize(width, height);
        if let Some(drawing) = self.drawing.as_mut() {
            drawing.resize(width, height);
        }
    }
}

/// How a patch request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repaint {
    /// One hole was punched incrementally.
    Patch,
    /// The fog and grid layers were redrawn from scratch.
    Full,
}

/// Screen placement of the world layer stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self { translate_x: 0.0, translate_y: 0.0, scale: 1.0 }
    }
}

impl LayerTransform {
    /// CSS `transform` value for the world container element.
    #[must_use]
    pub fn css(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.translate_x, self.translate_y, self.scale)
    }
}

/// Running counters of render work, for tracing and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub full: u64,
    pub patches: u64,
    pub grid: u64,
}

/// Paints fog and grid layers and tracks the world-layer transform.
pub struct RenderPipeline<S: Surface> {
    fog_texture: Option<S::Image>,
    transform: LayerTransform,
    stats: RenderStats,
}

impl<S: Surface> Default for RenderPipeline<S> {
    fn default() -> Self {
        Self { fog_texture: None, transform: LayerTransform::default(), stats: RenderStats::default() }
    }
}

impl<S: Surface> RenderPipeline<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fog texture. `None` falls back to a flat translucent fill.
    pub fn set_fog_texture(&mut self, texture: Option<S::Image>) {
        self.fog_texture = texture;
    }

    #[must_use]
    pub fn has_fog_texture(&self) -> bool {
        self.fog_texture.is_some()
    }

    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    #[must_use]
    pub fn transform(&self) -> LayerTransform {
        self.transform
    }

    /// Redraw the fog layer (base fill, then every revealed hole) and the grid layer.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a surface call fails.
    pub fn render_full(&mut self, layers: &mut Layers<S>, scene: &Scene<'_>) -> Result<(), RenderError> {
        let fog = &mut layers.fog;

        // Layer 1: fog base.
        fog.clear();
        fog.save();
        fog.set_alpha(scene.fog_opacity);
        let base = fog.set_composite(Composite::SourceOver).and_then(|()| match &self.fog_texture {
            Some(texture) => fog.draw_image(texture, 0.0, 0.0, scene.width, scene.height),
            None => {
                fog.set_fill(FALLBACK_FOG_FILL);
                fog.fill_rect(0.0, 0.0, scene.width, scene.height);
                Ok(())
            }
        });
        fog.restore();
        base?;

        // Layer 2: one subtractive path for all revealed cells.
        if !scene.fog.is_empty() {
            punch_holes(fog, scene.grid, scene.fog.iter())?;
        }

        self.stats.full += 1;
        tracing::trace!(revealed = scene.fog.len(), full = self.stats.full, "fog layer redrawn");

        // Layer 3: grid lines.
        self.render_grid_only(&mut layers.grid, scene)
    }

    /// Redraw only the grid layer.
    ///
    /// Align mode always shows the grid at high contrast; play mode follows
    /// the configured opacity and skips stroking entirely at zero.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a surface call fails.
    pub fn render_grid_only(&mut self, grid_layer: &mut S, scene: &Scene<'_>) -> Result<(), RenderError> {
        grid_layer.clear();
        self.stats.grid += 1;

        let aligning = scene.mode == Mode::Align;
        let opacity = if aligning { ALIGN_GRID_OPACITY } else { scene.grid.opacity };
        if opacity <= 0.0 {
            return Ok(());
        }

        grid_layer.save();
        if aligning {
            grid_layer.set_stroke(ALIGN_GRID_COLOR, ALIGN_GRID_WIDTH);
        } else {
            grid_layer.set_stroke(&format!("rgba(255, 0, 0, {opacity})"), PLAY_GRID_WIDTH);
        }
        grid_layer.begin_path();
        let size = scene.grid.size - GRID_LINE_INSET;
        for key in scene.grid.cells_covering(scene.width, scene.height, GRID_MARGIN_CELLS) {
            grid_layer.trace_outline(&scene.grid.cell_outline(key, size));
        }
        grid_layer.stroke();
        grid_layer.restore();
        Ok(())
    }

    /// Bring the layers up to date after one cell changed.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a surface call fails.
    pub fn render_patch(
        &mut self,
        layers: &mut Layers<S>,
        scene: &Scene<'_>,
        key: CellKey,
        revealing: bool,
    ) -> Result<Repaint, RenderError> {
        if revealing {
            punch_holes(&mut layers.fog, scene.grid, std::iter::once(key))?;
            self.stats.patches += 1;
            Ok(Repaint::Patch)
        } else {
            self.render_full(layers, scene)?;
            Ok(Repaint::Full)
        }
    }

    /// Recompute the world-layer transform from the camera. Touches no pixels.
    pub fn update_transform(&mut self, view: &ViewTransform) -> LayerTransform {
        self.transform = LayerTransform { translate_x: view.offset_x, translate_y: view.offset_y, scale: view.scale };
        self.transform
    }
}

/// Erase the inflated outline of every `key` from `fog` with a single fill.
fn punch_holes<S, I>(fog: &mut S, grid: &GridConfig, keys: I) -> Result<(), RenderError>
where
    S: Surface,
    I: Iterator<Item = CellKey>,
{
    fog.save();
    let result = fog.set_composite(Composite::DestinationOut);
    if result.is_ok() {
        fog.set_fill("#000");
        fog.begin_path();
        let size = grid.size + HOLE_INFLATE;
        for key in keys {
            fog.trace_outline(&grid.cell_outline(key, size));
        }
        fog.fill();
    }
    fog.restore();
    result
}
