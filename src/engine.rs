use crate::camera::{Point, ViewTransform, clamp_finite};
use crate::config::EditorConfig;
use crate::draw::{self, BrushSettings, StrokeStyle};
use crate::export;
use crate::fog::FogState;
use crate::gesture::GestureController;
use crate::grid::{CellKey, GridConfig, GridKind};
use crate::input::{InputEvent, Mode, Tool, UiCommand};
use crate::project::{ProjectData, RestoreReport};
use crate::render::{LayerTransform, Layers, RenderPipeline, RenderStats, Repaint, Scene};
use crate::surface::{RenderError, Surface};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Side effects returned from event handlers for the engine or host to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// State changed; the next scheduled frame must redraw.
    RenderNeeded,
    /// The camera moved; reposition the world layer.
    TransformChanged(ViewTransform),
    /// One cell changed and should be patched into the fog layer now.
    PatchCell { key: CellKey, revealing: bool },
    /// Stroke a segment on the drawing layer.
    Draw { from: Point, to: Point, style: StrokeStyle },
    /// Redraw everything immediately rather than on the next frame.
    FullRender,
    /// The cell size changed from a gesture; mirror it in the settings UI.
    GridResized { size: f64 },
    /// World bounds changed; resize the layer stack.
    WorldResized { width: u32, height: u32 },
    /// Show the brush outline at a screen position with an on-screen diameter.
    BrushCursor { screen: Point, diameter: f64 },
    HideBrushCursor,
}

/// Core editing state: everything that doesn't depend on a drawing surface.
///
/// This is the single owned context shared by the gesture controller (the
/// writer) and the render pipeline (the reader). Every mutation that affects
/// pixels sets the dirty flag; a completed full redraw clears it.
#[derive(Debug, Clone)]
pub struct EngineCore {
    pub name: String,
    pub view: ViewTransform,
    pub grid: GridConfig,
    pub fog: FogState,
    pub fog_opacity: f64,
    pub brush: BrushSettings,
    pub mode: Mode,
    pub tool: Tool,
    pub world_width: f64,
    pub world_height: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Whether a drawing layer exists for the pen and eraser tools.
    pub drawing_enabled: bool,
    dirty: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(&EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Core seeded from `config`. Out-of-range config values are clamped.
    #[must_use]
    pub fn with_config(config: &EditorConfig) -> Self {
        let config = config.clone().sanitized();
        Self {
            name: config.project_name,
            view: ViewTransform::default(),
            grid: config.grid,
            fog: FogState::new(),
            fog_opacity: config.fog_opacity,
            brush: config.brush,
            mode: Mode::default(),
            tool: Tool::default(),
            world_width: config.world_width,
            world_height: config.world_height,
            viewport_width: 0.0,
            viewport_height: 0.0,
            drawing_enabled: false,
            dirty: true,
        }
    }

    // --- Dirty flag ---

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Called after a completed full redraw.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Read-only snapshot for the render pipeline.
    #[must_use]
    pub fn scene(&self) -> Scene<'_> {
        Scene {
            grid: &self.grid,
            fog: &self.fog,
            mode: self.mode,
            fog_opacity: self.fog_opacity,
            width: self.world_width,
            height: self.world_height,
        }
    }

    // --- Queries ---

    /// Whether a world point lies within the map bounds (edges inclusive).
    #[must_use]
    pub fn in_world(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.world_width && p.y <= self.world_height
    }

    /// The cell under a screen point, if it lies on the map.
    #[must_use]
    pub fn cell_at_screen(&self, screen: Point) -> Option<CellKey> {
        let world = self.view.screen_to_world(screen);
        self.in_world(world).then(|| self.grid.world_to_cell(world))
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> ViewTransform {
        self.view
    }

    /// World bounds as whole pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn world_size_px(&self) -> (u32, u32) {
        (self.world_width.max(1.0) as u32, self.world_height.max(1.0) as u32)
    }

    // --- Fog ---

    pub fn reveal_cell(&mut self, key: CellKey) -> bool {
        let changed = self.fog.reveal(key);
        if changed {
            self.mark_dirty();
        }
        changed
    }

    pub fn hide_cell(&mut self, key: CellKey) -> bool {
        let changed = self.fog.hide(key);
        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// Hide every cell.
    pub fn reset_fog(&mut self) {
        self.fog.clear();
        self.mark_dirty();
    }

    // --- Camera ---

    /// Replace the camera. Rejects non-finite offsets; the scale is clamped.
    pub fn set_view(&mut self, view: ViewTransform) -> bool {
        let mut next = self.view;
        if !next.set_offset(view.offset_x, view.offset_y) {
            return false;
        }
        next.set_scale(view.scale);
        self.view = next;
        self.mark_dirty();
        true
    }

    /// Update the viewport size in CSS pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() {
            self.viewport_width = width.max(0.0);
            self.viewport_height = height.max(0.0);
        }
    }

    /// Center the whole map in the viewport.
    pub fn fit_to_window(&mut self) {
        self.view = ViewTransform::fit(self.viewport_width, self.viewport_height, self.world_width, self.world_height);
        self.mark_dirty();
    }

    /// Set the world bounds, normally from a loaded base map.
    pub fn set_world_size(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width >= 1.0 && height >= 1.0 {
            self.world_width = width;
            self.world_height = height;
            self.mark_dirty();
        }
    }

    // --- Grid ---

    pub fn set_grid_kind(&mut self, kind: GridKind) {
        self.grid.kind = kind;
        self.mark_dirty();
    }

    pub fn set_cell_size(&mut self, size: f64) {
        self.grid.set_size(size);
        self.mark_dirty();
    }

    pub fn set_aspect_ratio(&mut self, ratio: f64) {
        self.grid.set_ratio(ratio);
        self.mark_dirty();
    }

    pub fn set_grid_opacity(&mut self, opacity: f64) {
        self.grid.set_opacity(opacity);
        self.mark_dirty();
    }

    pub fn set_grid_origin(&mut self, x: f64, y: f64) -> bool {
        let moved = self.grid.set_origin(x, y);
        if moved {
            self.mark_dirty();
        }
        moved
    }

    pub fn set_fog_opacity(&mut self, opacity: f64) {
        self.fog_opacity = clamp_finite(opacity, self.fog_opacity, 0.0, 1.0);
        self.mark_dirty();
    }

    // --- Mode / tool ---

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::debug!(?mode, "mode changed");
        }
        self.mode = mode;
        self.mark_dirty();
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            tracing::debug!(?tool, "tool changed");
        }
        self.tool = tool;
    }

    /// Apply a settings change from the UI.
    pub fn apply_ui(&mut self, command: &UiCommand) -> Vec<Action> {
        match command {
            UiCommand::SetMode(mode) => self.set_mode(*mode),
            UiCommand::SetTool(tool) => {
                self.set_tool(*tool);
                return if tool.is_drawing() { Vec::new() } else { vec![Action::HideBrushCursor] };
            }
            UiCommand::SetGridKind(kind) => self.set_grid_kind(*kind),
            UiCommand::SetCellSize(size) => self.set_cell_size(*size),
            UiCommand::SetAspectRatio(ratio) => self.set_aspect_ratio(*ratio),
            UiCommand::SetGridOpacity(opacity) => self.set_grid_opacity(*opacity),
            UiCommand::SetFogOpacity(opacity) => self.set_fog_opacity(*opacity),
            UiCommand::SetPenSize(size) => {
                self.brush.set_pen_size(*size);
                return Vec::new();
            }
            UiCommand::SetEraserSize(size) => {
                self.brush.set_eraser_size(*size);
                return Vec::new();
            }
            UiCommand::SetPenColor(color) => {
                self.brush.color.clone_from(color);
                return Vec::new();
            }
            UiCommand::SetPenOpacity(opacity) => {
                self.brush.set_opacity(*opacity);
                return Vec::new();
            }
            UiCommand::Rename(name) => {
                self.name = if name.trim().is_empty() { "New Project".to_owned() } else { name.clone() };
                return Vec::new();
            }
            UiCommand::ResetFog => {
                self.reset_fog();
                return vec![Action::FullRender];
            }
            UiCommand::ResetView => {
                self.fit_to_window();
                return vec![Action::TransformChanged(self.view)];
            }
        }
        vec![Action::RenderNeeded]
    }

    // --- Persistence ---

    /// Serializable project state.
    #[must_use]
    pub fn snapshot(&self) -> ProjectData {
        ProjectData { name: self.name.clone(), grid: self.grid, revealed: self.fog.serialize(), dropped: 0 }
    }

    /// Replace name, grid, and revealed cells from a loaded project.
    pub fn restore(&mut self, data: &ProjectData) -> RestoreReport {
        if !data.name.is_empty() {
            self.name.clone_from(&data.name);
        }
        self.grid = data.grid.sanitized();
        let skipped = self.fog.restore(&data.revealed) + data.dropped;
        self.mark_dirty();
        let report = RestoreReport { revealed: self.fog.len(), skipped };
        tracing::debug!(name = %self.name, revealed = report.revealed, skipped, "project restored");
        report
    }
}

/// The full editor engine: core state, gesture controller, and the layer stack.
///
/// Generic over the drawing surface so the same engine runs against browser
/// canvases ([`crate::web::WebSurface`]) or a headless
/// [`crate::surface::DisplayList`].
pub struct Engine<S: Surface> {
    pub core: EngineCore,
    gestures: GestureController,
    layers: Layers<S>,
    pipeline: RenderPipeline<S>,
}

impl<S: Surface> Engine<S> {
    /// Engine with default settings drawing into `layers`.
    #[must_use]
    pub fn new(layers: Layers<S>) -> Self {
        Self::with_config(layers, &EditorConfig::default())
    }

    /// Engine seeded from `config`. Layers are sized to the starting world bounds.
    #[must_use]
    pub fn with_config(mut layers: Layers<S>, config: &EditorConfig) -> Self {
        let mut core = EngineCore::with_config(config);
        core.drawing_enabled = layers.drawing.is_some();
        let (w, h) = core.world_size_px();
        layers.resize(w, h);
        let mut pipeline = RenderPipeline::new();
        pipeline.update_transform(&core.view);
        Self { core, gestures: GestureController::with_wheel_step(config.wheel_step), layers, pipeline }
    }

    // --- Events ---

    /// Feed one input event through the gesture controller and apply its
    /// immediate effects (patches, strokes, resizes, transform).
    ///
    /// The returned actions are also meant for the host, e.g. to move the
    /// world element or show the brush cursor.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an immediate render fails.
    pub fn dispatch(&mut self, event: &InputEvent) -> Result<Vec<Action>, RenderError> {
        let actions = self.gestures.handle(&mut self.core, event);
        self.apply(&actions)?;
        Ok(actions)
    }

    /// Apply a settings change from the UI.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an immediate render fails.
    pub fn apply_ui(&mut self, command: &UiCommand) -> Result<Vec<Action>, RenderError> {
        let actions = self.core.apply_ui(command);
        self.apply(&actions)?;
        Ok(actions)
    }

    fn apply(&mut self, actions: &[Action]) -> Result<(), RenderError> {
        for action in actions {
            match action {
                Action::PatchCell { key, revealing } => {
                    let scene = self.core.scene();
                    let repaint = self.pipeline.render_patch(&mut self.layers, &scene, *key, *revealing)?;
                    if repaint == Repaint::Full {
                        self.core.clear_dirty();
                    }
                }
                Action::Draw { from, to, style } => {
                    if let Some(drawing) = self.layers.drawing.as_mut() {
                        draw::stroke_segment(drawing, *from, *to, style)?;
                    }
                }
                Action::TransformChanged(view) => {
                    self.pipeline.update_transform(view);
                }
                Action::WorldResized { width, height } => self.layers.resize(*width, *height),
                Action::FullRender => self.render_full()?,
                Action::RenderNeeded
                | Action::GridResized { .. }
                | Action::BrushCursor { .. }
                | Action::HideBrushCursor => {}
            }
        }
        Ok(())
    }

    // --- Render ---

    /// Scheduled redraw: repaint if anything changed since the last full redraw.
    ///
    /// Returns whether a redraw happened.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a surface call fails; the dirty flag stays set.
    pub fn tick(&mut self) -> Result<bool, RenderError> {
        if !self.core.is_dirty() {
            return Ok(false);
        }
        self.render_full()?;
        Ok(true)
    }

    /// Redraw fog and grid now and clear the dirty flag.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a surface call fails.
    pub fn render_full(&mut self) -> Result<(), RenderError> {
        let scene = self.core.scene();
        self.pipeline.render_full(&mut self.layers, &scene)?;
        self.core.clear_dirty();
        Ok(())
    }

    /// Replace the fog texture (`None` restores the flat fog fill).
    pub fn set_fog_texture(&mut self, texture: Option<S::Image>) {
        self.pipeline.set_fog_texture(texture);
        self.core.mark_dirty();
    }

    /// Update the viewport size in CSS pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.core.set_viewport(width, height);
    }

    /// Fit the map into the viewport and recompute the layer transform.
    pub fn fit_to_window(&mut self) -> LayerTransform {
        self.core.fit_to_window();
        self.pipeline.update_transform(&self.core.view)
    }

    /// Load a project and schedule a redraw.
    pub fn restore(&mut self, data: &ProjectData) -> RestoreReport {
        self.core.restore(data)
    }

    #[must_use]
    pub fn snapshot(&self) -> ProjectData {
        self.core.snapshot()
    }

    /// Composite base, fog, grid, and drawing layers into `target` at `scale` times world size.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a surface call fails.
    pub fn export(&self, target: &mut S, base: Option<&S::Image>, scale: f64) -> Result<(), RenderError> {
        export::compose(target, base, &self.layers, self.core.world_width, self.core.world_height, scale)
    }

    // --- Queries ---

    #[must_use]
    pub fn layers(&self) -> &Layers<S> {
        &self.layers
    }

    #[must_use]
    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.pipeline.stats()
    }

    #[must_use]
    pub fn transform(&self) -> LayerTransform {
        self.pipeline.transform()
    }

    #[must_use]
    pub fn has_fog_texture(&self) -> bool {
        self.pipeline.has_fog_texture()
    }
}
