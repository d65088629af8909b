//! Gesture state machine: turns pointer, wheel, and asset events into state mutations.
//!
//! The controller tracks every active pointer by id. What a gesture does
//! depends on how many pointers are down and on the current [`Mode`] and
//! [`Tool`]:
//!
//! | Pointers | Mode / Tool | Effect |
//! |----------|-------------|--------|
//! | 1 | Play / Pan | Drag the camera |
//! | 1 | Play / Reveal, Hide | Paint fog cells under the pointer |
//! | 1 | Play / Pen, Eraser | Stroke the drawing layer |
//! | 1 | Align | Drag the grid origin |
//! | 2 | Play / Pan | Pinch-zoom the camera about the centroid |
//! | 2 | Align | Pinch-resize the grid cells |
//!
//! Every drag is computed from a baseline captured when the gesture started
//! (pointer start position, camera, grid), never by accumulating per-event
//! deltas, so dropped or coalesced move events cannot cause drift.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::collections::HashMap;

use crate::camera::{Point, ViewTransform};
use crate::consts::WHEEL_ZOOM_STEP;
use crate::draw::StrokeStyle;
use crate::engine::{Action, EngineCore};
use crate::grid::GridConfig;
use crate::input::{Asset, InputEvent, Mode, PointerId, PointerRecord, Tool};

/// Zoom factor of a pinch whose pointers started `start` apart and are now `current` apart.
///
/// Degenerate input (zero start distance, non-finite ratio) yields the neutral factor 1.
#[must_use]
pub fn pinch_factor(start: f64, current: f64) -> f64 {
    if start <= 0.0 {
        return 1.0;
    }
    let factor = current / start;
    if factor.is_finite() { factor } else { 1.0 }
}

/// Zoom factor for one wheel notch: `1 - sign(delta_y) * step`.
#[must_use]
pub fn wheel_factor(delta_y: f64, step: f64) -> f64 {
    let sign = if delta_y > 0.0 {
        1.0
    } else if delta_y < 0.0 {
        -1.0
    } else {
        0.0
    };
    1.0 - sign * step
}

/// Multi-pointer gesture tracker.
#[derive(Debug, Clone)]
pub struct GestureController {
    pointers: HashMap<PointerId, PointerRecord>,
    /// Camera when the current gesture started.
    start_view: ViewTransform,
    /// Grid when the current gesture started.
    start_grid: GridConfig,
    /// Pointer distance when the current pinch started.
    start_distance: f64,
    /// Pointer centroid when the current pinch started.
    start_centroid: Point,
    /// Last world position stroked on the drawing layer.
    last_draw: Option<Point>,
    wheel_step: f64,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureController {
    #[must_use]
    pub fn new() -> Self {
        Self::with_wheel_step(WHEEL_ZOOM_STEP)
    }

    /// Controller whose wheel notches scale by `1 ± step`.
    #[must_use]
    pub fn with_wheel_step(step: f64) -> Self {
        Self {
            pointers: HashMap::new(),
            start_view: ViewTransform::default(),
            start_grid: GridConfig::default(),
            start_distance: 0.0,
            start_centroid: Point::default(),
            last_draw: None,
            wheel_step: if step.is_finite() { step.clamp(0.0, 0.9) } else { WHEEL_ZOOM_STEP },
        }
    }

    /// Number of pointers currently down.
    #[must_use]
    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    /// The record for pointer `id`, if it is down.
    #[must_use]
    pub fn pointer(&self, id: PointerId) -> Option<&PointerRecord> {
        self.pointers.get(&id)
    }

    /// Whether no gesture is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pointers.is_empty()
    }

    /// Apply one input event to `core`, returning the side effects the host must carry out.
    pub fn handle(&mut self, core: &mut EngineCore, event: &InputEvent) -> Vec<Action> {
        let mut actions = Vec::new();
        match *event {
            InputEvent::PointerDown { id, x, y } => self.pointer_down(core, id, Point::new(x, y), &mut actions),
            InputEvent::PointerMove { id, x, y } => self.pointer_move(core, id, Point::new(x, y), &mut actions),
            InputEvent::PointerUp { id } | InputEvent::PointerCancel { id } => {
                self.pointer_up(core, id, &mut actions);
            }
            InputEvent::Wheel { x, y, delta_y } => self.wheel(core, Point::new(x, y), delta_y, &mut actions),
            InputEvent::AssetLoaded(asset) => asset_loaded(core, asset, &mut actions),
        }
        actions
    }

    // --- Pointer lifecycle ---

    fn pointer_down(&mut self, core: &mut EngineCore, id: PointerId, at: Point, actions: &mut Vec<Action>) {
        if !at.is_finite() {
            return;
        }
        self.pointers.insert(id, PointerRecord::new(id, at));
        self.capture_baseline(core);

        if core.mode == Mode::Play && self.pointers.len() == 1 {
            if core.tool.is_fog_brush() {
                hit(core, at, actions);
            } else if core.tool.is_drawing() && core.drawing_enabled {
                let world = core.view.screen_to_world(at);
                // A zero-length segment leaves a dot where the stroke starts.
                self.stroke_to(core, world, world, actions);
                self.last_draw = Some(world);
                push_brush_cursor(core, at, actions);
            }
        }

        if self.pointers.len() == 2 {
            self.capture_pinch_baseline(core);
        }
    }

    fn pointer_move(&mut self, core: &mut EngineCore, id: PointerId, at: Point, actions: &mut Vec<Action>) {
        if !at.is_finite() {
            return;
        }
        let Some(record) = self.pointers.get_mut(&id) else {
            return;
        };
        record.current = at;
        let record = *record;

        match self.pointers.len() {
            1 => self.single_pointer_drag(core, &record, actions),
            2 => {
                if let Some((a, b)) = self.pinch_pair() {
                    let factor = pinch_factor(self.start_distance, a.distance(b));
                    self.pinch(core, factor, self.start_centroid, a.midpoint(b), actions);
                }
            }
            _ => {}
        }

        if core.tool.is_drawing() && core.drawing_enabled {
            push_brush_cursor(core, at, actions);
        } else {
            actions.push(Action::HideBrushCursor);
        }
    }

    fn pointer_up(&mut self, core: &mut EngineCore, id: PointerId, actions: &mut Vec<Action>) {
        if self.pointers.remove(&id).is_none() {
            return;
        }

        match self.pointers.len() {
            // Re-baseline the survivor so a pinch → pan transition does not jump.
            1 => {
                for record in self.pointers.values_mut() {
                    record.start = record.current;
                }
                self.capture_baseline(core);
            }
            2 => self.capture_pinch_baseline(core),
            _ => {}
        }

        self.last_draw = None;

        if core.mode == Mode::Align {
            actions.push(Action::FullRender);
        }
    }

    fn wheel(&mut self, core: &mut EngineCore, at: Point, delta_y: f64, actions: &mut Vec<Action>) {
        if !at.is_finite() {
            return;
        }
        self.capture_baseline(core);
        let factor = wheel_factor(delta_y, self.wheel_step);
        self.pinch(core, factor, at, at, actions);
    }

    // --- Gestures ---

    fn single_pointer_drag(&mut self, core: &mut EngineCore, record: &PointerRecord, actions: &mut Vec<Action>) {
        let delta = record.delta();
        match core.mode {
            Mode::Play => match core.tool {
                Tool::Pan => {
                    let view = ViewTransform {
                        offset_x: self.start_view.offset_x + delta.x,
                        offset_y: self.start_view.offset_y + delta.y,
                        scale: core.view.scale,
                    };
                    if core.set_view(view) {
                        actions.push(Action::TransformChanged(core.view));
                    }
                }
                Tool::Reveal | Tool::Hide => hit(core, record.current, actions),
                Tool::Pen | Tool::Eraser => {
                    if !core.drawing_enabled {
                        return;
                    }
                    let world = core.view.screen_to_world(record.current);
                    if let Some(last) = self.last_draw {
                        self.stroke_to(core, last, world, actions);
                    }
                    self.last_draw = Some(world);
                }
            },
            Mode::Align => {
                // Grid origin is in world units; convert the screen delta.
                let x = self.start_grid.x + delta.x / core.view.scale;
                let y = self.start_grid.y + delta.y / core.view.scale;
                if core.set_grid_origin(x, y) {
                    actions.push(Action::RenderNeeded);
                }
            }
        }
    }

    /// Scale about a screen anchor (pan tool) or resize the grid (align mode).
    fn pinch(&mut self, core: &mut EngineCore, factor: f64, start_centroid: Point, centroid: Point, actions: &mut Vec<Action>) {
        match (core.mode, core.tool) {
            (Mode::Play, Tool::Pan) => {
                let view = ViewTransform::zoomed(&self.start_view, factor, start_centroid, centroid);
                if core.set_view(view) {
                    actions.push(Action::TransformChanged(core.view));
                }
            }
            (Mode::Align, _) => {
                // Only the distance ratio matters; the origin stays where it is.
                core.set_cell_size(self.start_grid.size * factor);
                actions.push(Action::GridResized { size: core.grid.size });
                actions.push(Action::RenderNeeded);
            }
            (Mode::Play, _) => {}
        }
    }

    fn stroke_to(&self, core: &EngineCore, from: Point, to: Point, actions: &mut Vec<Action>) {
        if let Some(style) = StrokeStyle::for_tool(core.tool, &core.brush) {
            actions.push(Action::Draw { from, to, style });
        }
    }

    // --- Baselines ---

    fn capture_baseline(&mut self, core: &EngineCore) {
        self.start_view = core.view;
        self.start_grid = core.grid;
    }

    fn capture_pinch_baseline(&mut self, core: &EngineCore) {
        if let Some((a, b)) = self.pinch_pair() {
            self.start_distance = a.distance(b);
            self.start_centroid = a.midpoint(b);
        }
        self.capture_baseline(core);
    }

    /// Current positions of the two pinch pointers; `None` unless exactly two are down.
    fn pinch_pair(&self) -> Option<(Point, Point)> {
        if self.pointers.len() != 2 {
            return None;
        }
        let mut it = self.pointers.values();
        match (it.next(), it.next()) {
            (Some(a), Some(b)) => Some((a.current, b.current)),
            _ => None,
        }
    }
}

/// Reveal or hide the cell under a screen point. Hits outside the world are ignored.
fn hit(core: &mut EngineCore, screen: Point, actions: &mut Vec<Action>) {
    let world = core.view.screen_to_world(screen);
    if !core.in_world(world) {
        return;
    }
    let key = core.grid.world_to_cell(world);
    let revealing = core.tool == Tool::Reveal;
    let changed = if revealing { core.reveal_cell(key) } else { core.hide_cell(key) };
    if changed {
        actions.push(Action::PatchCell { key, revealing });
    }
}

fn push_brush_cursor(core: &EngineCore, screen: Point, actions: &mut Vec<Action>) {
    if let Some(size) = core.brush.size_for(core.tool) {
        actions.push(Action::BrushCursor { screen, diameter: size * core.view.scale });
    }
}

fn asset_loaded(core: &mut EngineCore, asset: Asset, actions: &mut Vec<Action>) {
    match asset {
        Asset::BaseMap { width, height } => {
            if width == 0 || height == 0 {
                tracing::warn!(width, height, "ignoring empty base map");
                return;
            }
            core.set_world_size(f64::from(width), f64::from(height));
            core.fit_to_window();
            tracing::debug!(width, height, "base map loaded");
            actions.push(Action::WorldResized { width, height });
            actions.push(Action::TransformChanged(core.view));
            actions.push(Action::FullRender);
        }
        Asset::FogTexture => {
            core.mark_dirty();
            tracing::debug!("fog texture loaded");
            actions.push(Action::FullRender);
        }
    }
}
