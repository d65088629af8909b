#![allow(clippy::float_cmp)]

use super::*;
use crate::grid::{CellKey, GridKind};
use crate::input::UiCommand;

// =============================================================
// Helpers
// =============================================================

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn setup() -> (GestureController, EngineCore) {
    let mut core = EngineCore::new();
    core.set_viewport(1000.0, 800.0);
    (GestureController::new(), core)
}

fn with_tool(tool: Tool) -> (GestureController, EngineCore) {
    let (gc, mut core) = setup();
    core.apply_ui(&UiCommand::SetTool(tool));
    (gc, core)
}

fn send(gc: &mut GestureController, core: &mut EngineCore, event: InputEvent) -> Vec<Action> {
    gc.handle(core, &event)
}

fn has_transform(actions: &[Action]) -> bool {
    actions.iter().any(|a| matches!(a, Action::TransformChanged(_)))
}

fn patches(actions: &[Action]) -> Vec<(CellKey, bool)> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::PatchCell { key, revealing } => Some((*key, *revealing)),
            _ => None,
        })
        .collect()
}

fn draws(actions: &[Action]) -> Vec<(Point, Point)> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Draw { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

// =============================================================
// Factors
// =============================================================

#[test]
fn pinch_factor_is_distance_ratio() {
    assert_eq!(pinch_factor(100.0, 150.0), 1.5);
}

#[test]
fn pinch_factor_degenerate_start_is_neutral() {
    assert_eq!(pinch_factor(0.0, 150.0), 1.0);
    assert_eq!(pinch_factor(-5.0, 150.0), 1.0);
    assert_eq!(pinch_factor(100.0, f64::NAN), 1.0);
}

#[test]
fn wheel_factor_uses_sign_only() {
    assert!(approx_eq(wheel_factor(120.0, 0.1), 0.9));
    assert!(approx_eq(wheel_factor(-3.0, 0.1), 1.1));
    assert_eq!(wheel_factor(0.0, 0.1), 1.0);
    assert_eq!(wheel_factor(f64::NAN, 0.1), 1.0);
}

// =============================================================
// Pointer bookkeeping
// =============================================================

#[test]
fn pointers_are_tracked_by_id() {
    let (mut gc, mut core) = setup();
    send(&mut gc, &mut core, InputEvent::down(1, 10.0, 10.0));
    send(&mut gc, &mut core, InputEvent::down(2, 20.0, 20.0));
    assert_eq!(gc.active_pointers(), 2);
    assert_eq!(gc.pointer(PointerId(2)).map(|p| p.start), Some(pt(20.0, 20.0)));

    send(&mut gc, &mut core, InputEvent::up(1));
    send(&mut gc, &mut core, InputEvent::PointerCancel { id: PointerId(2) });
    assert!(gc.is_idle());
}

#[test]
fn unknown_pointer_events_are_ignored() {
    let (mut gc, mut core) = setup();
    let before = core.view;
    assert!(send(&mut gc, &mut core, InputEvent::moved(7, 50.0, 50.0)).is_empty());
    assert!(send(&mut gc, &mut core, InputEvent::up(7)).is_empty());
    assert_eq!(core.view, before);
}

#[test]
fn non_finite_positions_are_ignored() {
    let (mut gc, mut core) = setup();
    send(&mut gc, &mut core, InputEvent::down(1, f64::NAN, 0.0));
    assert!(gc.is_idle());
}

// =============================================================
// Pan
// =============================================================

#[test]
fn drag_pans_camera() {
    let (mut gc, mut core) = setup();
    send(&mut gc, &mut core, InputEvent::down(1, 100.0, 100.0));
    let actions = send(&mut gc, &mut core, InputEvent::moved(1, 130.0, 80.0));
    assert!(has_transform(&actions));
    assert_eq!(core.view.offset_x, 30.0);
    assert_eq!(core.view.offset_y, -20.0);
}

#[test]
fn drag_is_relative_to_gesture_start() {
    let (mut gc, mut core) = setup();
    core.set_view(ViewTransform { offset_x: 5.0, offset_y: 5.0, scale: 1.0 });
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    for i in 1..=10 {
        send(&mut gc, &mut core, InputEvent::moved(1, f64::from(i) * 3.0, 0.0));
    }
    assert_eq!(core.view.offset_x, 35.0);
    assert_eq!(core.view.offset_y, 5.0);
}

#[test]
fn pan_marks_dirty() {
    let (mut gc, mut core) = setup();
    core.clear_dirty();
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    send(&mut gc, &mut core, InputEvent::moved(1, 10.0, 0.0));
    assert!(core.is_dirty());
}

// =============================================================
// Pinch
// =============================================================

#[test]
fn pinch_scales_by_distance_ratio() {
    let (mut gc, mut core) = setup();
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    send(&mut gc, &mut core, InputEvent::down(2, 100.0, 0.0));
    let actions = send(&mut gc, &mut core, InputEvent::moved(2, 150.0, 0.0));
    assert!(has_transform(&actions));
    assert!(approx_eq(core.view.scale, 1.5));
}

#[test]
fn pinch_keeps_start_centroid_under_current_centroid() {
    let (mut gc, mut core) = setup();
    core.set_view(ViewTransform { offset_x: 40.0, offset_y: 10.0, scale: 1.2 });
    let start = core.view;
    send(&mut gc, &mut core, InputEvent::down(1, 200.0, 200.0));
    send(&mut gc, &mut core, InputEvent::down(2, 400.0, 200.0));
    let anchor_world = start.screen_to_world(pt(300.0, 200.0));

    send(&mut gc, &mut core, InputEvent::moved(2, 500.0, 260.0));

    let centroid = pt(350.0, 230.0);
    let now = core.view.world_to_screen(anchor_world);
    assert!(approx_eq(now.x, centroid.x));
    assert!(approx_eq(now.y, centroid.y));
}

#[test]
fn pinch_scale_is_clamped() {
    let (mut gc, mut core) = setup();
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    send(&mut gc, &mut core, InputEvent::down(2, 1.0, 0.0));
    send(&mut gc, &mut core, InputEvent::moved(2, 10_000.0, 0.0));
    assert_eq!(core.view.scale, crate::consts::MAX_SCALE);
}

#[test]
fn coincident_pinch_start_is_neutral() {
    let (mut gc, mut core) = setup();
    send(&mut gc, &mut core, InputEvent::down(1, 50.0, 50.0));
    send(&mut gc, &mut core, InputEvent::down(2, 50.0, 50.0));
    send(&mut gc, &mut core, InputEvent::moved(2, 150.0, 50.0));
    assert_eq!(core.view.scale, 1.0);
}

#[test]
fn pinch_with_fog_brush_does_not_zoom() {
    let (mut gc, mut core) = with_tool(Tool::Reveal);
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    send(&mut gc, &mut core, InputEvent::down(2, 100.0, 0.0));
    send(&mut gc, &mut core, InputEvent::moved(2, 200.0, 0.0));
    assert_eq!(core.view.scale, 1.0);
}

#[test]
fn third_pointer_suspends_gesture() {
    let (mut gc, mut core) = setup();
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    send(&mut gc, &mut core, InputEvent::down(2, 100.0, 0.0));
    send(&mut gc, &mut core, InputEvent::down(3, 50.0, 50.0));
    let before = core.view;
    send(&mut gc, &mut core, InputEvent::moved(3, 300.0, 300.0));
    assert_eq!(core.view, before);
}

#[test]
fn lifting_one_pinch_finger_does_not_jump() {
    let (mut gc, mut core) = setup();
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    send(&mut gc, &mut core, InputEvent::down(2, 100.0, 0.0));
    send(&mut gc, &mut core, InputEvent::moved(1, -50.0, 0.0));
    send(&mut gc, &mut core, InputEvent::up(2));
    let after_pinch = core.view;

    send(&mut gc, &mut core, InputEvent::moved(1, -40.0, 5.0));

    assert!(approx_eq(core.view.offset_x, after_pinch.offset_x + 10.0));
    assert!(approx_eq(core.view.offset_y, after_pinch.offset_y + 5.0));
    assert_eq!(core.view.scale, after_pinch.scale);
}

#[test]
fn three_to_two_pointers_rebaselines_pinch() {
    let (mut gc, mut core) = setup();
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    send(&mut gc, &mut core, InputEvent::down(2, 100.0, 0.0));
    send(&mut gc, &mut core, InputEvent::down(3, 500.0, 500.0));
    send(&mut gc, &mut core, InputEvent::up(3));
    let before = core.view;

    // Same distance, same centroid: nothing changes.
    send(&mut gc, &mut core, InputEvent::moved(2, 100.0, 0.0));
    assert!(approx_eq(core.view.scale, before.scale));
    assert!(approx_eq(core.view.offset_x, before.offset_x));
}

// =============================================================
// Wheel
// =============================================================

#[test]
fn wheel_zooms_about_cursor() {
    let (mut gc, mut core) = setup();
    let anchor = pt(300.0, 200.0);
    let world = core.view.screen_to_world(anchor);

    send(&mut gc, &mut core, InputEvent::Wheel { x: anchor.x, y: anchor.y, delta_y: 120.0 });
    assert!(approx_eq(core.view.scale, 0.9));
    let now = core.view.world_to_screen(world);
    assert!(approx_eq(now.x, anchor.x));
    assert!(approx_eq(now.y, anchor.y));

    send(&mut gc, &mut core, InputEvent::Wheel { x: anchor.x, y: anchor.y, delta_y: -1.0 });
    assert!(approx_eq(core.view.scale, 0.99));
}

#[test]
fn wheel_respects_configured_step() {
    let mut core = EngineCore::new();
    let mut gc = GestureController::with_wheel_step(0.25);
    gc.handle(&mut core, &InputEvent::Wheel { x: 0.0, y: 0.0, delta_y: -10.0 });
    assert!(approx_eq(core.view.scale, 1.25));
}

// =============================================================
// Fog brushes
// =============================================================

#[test]
fn reveal_tool_reveals_cell_under_pointer() {
    let (mut gc, mut core) = with_tool(Tool::Reveal);
    let actions = send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    assert_eq!(patches(&actions), vec![(CellKey::new(0, 0), true)]);
    assert!(core.fog.contains(CellKey::new(0, 0)));
}

#[test]
fn reveal_then_hide_square_cell() {
    let (mut gc, mut core) = with_tool(Tool::Reveal);
    core.set_grid_kind(GridKind::Square);
    // Center of square cell (2, 3) at size 30.
    send(&mut gc, &mut core, InputEvent::down(1, 120.0, 180.0));
    send(&mut gc, &mut core, InputEvent::up(1));
    assert!(core.fog.contains(CellKey::new(2, 3)));

    core.apply_ui(&UiCommand::SetTool(Tool::Hide));
    let actions = send(&mut gc, &mut core, InputEvent::down(1, 120.0, 180.0));
    assert_eq!(patches(&actions), vec![(CellKey::new(2, 3), false)]);
    assert!(core.fog.is_empty());
}

#[test]
fn dragging_within_one_cell_patches_once() {
    let (mut gc, mut core) = with_tool(Tool::Reveal);
    core.set_grid_kind(GridKind::Square);
    send(&mut gc, &mut core, InputEvent::down(1, 100.0, 100.0));
    let actions = send(&mut gc, &mut core, InputEvent::moved(1, 105.0, 102.0));
    assert!(patches(&actions).is_empty());
    let actions = send(&mut gc, &mut core, InputEvent::moved(1, 160.0, 100.0));
    assert_eq!(patches(&actions), vec![(CellKey::new(3, 2), true)]);
}

#[test]
fn hits_outside_world_are_ignored() {
    let (mut gc, mut core) = with_tool(Tool::Reveal);
    core.clear_dirty();
    let actions = send(&mut gc, &mut core, InputEvent::down(1, -10.0, 50.0));
    assert!(patches(&actions).is_empty());
    send(&mut gc, &mut core, InputEvent::moved(1, 5000.0, 50.0));
    assert!(core.fog.is_empty());
    assert!(!core.is_dirty());
}

#[test]
fn hits_use_camera_transform() {
    let (mut gc, mut core) = with_tool(Tool::Reveal);
    core.set_grid_kind(GridKind::Square);
    core.set_view(ViewTransform { offset_x: 100.0, offset_y: 100.0, scale: 2.0 });
    // Screen (340, 460) is world (120, 180), the center of cell (2, 3).
    send(&mut gc, &mut core, InputEvent::down(1, 340.0, 460.0));
    assert!(core.fog.contains(CellKey::new(2, 3)));
}

#[test]
fn second_finger_does_not_paint() {
    let (mut gc, mut core) = with_tool(Tool::Reveal);
    core.set_grid_kind(GridKind::Square);
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    let actions = send(&mut gc, &mut core, InputEvent::down(2, 200.0, 200.0));
    assert!(patches(&actions).is_empty());
    assert_eq!(core.fog.len(), 1);
}

// =============================================================
// Align mode
// =============================================================

#[test]
fn align_drag_moves_grid_in_world_units() {
    let (mut gc, mut core) = setup();
    core.set_view(ViewTransform { offset_x: 0.0, offset_y: 0.0, scale: 2.0 });
    core.apply_ui(&UiCommand::SetMode(Mode::Align));
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    let actions = send(&mut gc, &mut core, InputEvent::moved(1, 20.0, 10.0));
    assert!(actions.contains(&Action::RenderNeeded));
    assert_eq!((core.grid.x, core.grid.y), (10.0, 5.0));
    // The camera does not move while aligning.
    assert_eq!(core.view.offset_x, 0.0);
}

#[test]
fn align_release_requests_full_render() {
    let (mut gc, mut core) = setup();
    core.apply_ui(&UiCommand::SetMode(Mode::Align));
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    let actions = send(&mut gc, &mut core, InputEvent::up(1));
    assert_eq!(actions, vec![Action::FullRender]);
}

#[test]
fn align_pinch_resizes_cells() {
    let (mut gc, mut core) = setup();
    core.apply_ui(&UiCommand::SetMode(Mode::Align));
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    send(&mut gc, &mut core, InputEvent::down(2, 100.0, 0.0));
    let actions = send(&mut gc, &mut core, InputEvent::moved(2, 150.0, 0.0));
    assert!(approx_eq(core.grid.size, 45.0));
    assert!(actions.iter().any(|a| matches!(a, Action::GridResized { size } if approx_eq(*size, 45.0))));
    assert_eq!(core.view.scale, 1.0);
}

#[test]
fn align_pinch_clamps_cell_size() {
    let (mut gc, mut core) = setup();
    core.apply_ui(&UiCommand::SetMode(Mode::Align));
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    send(&mut gc, &mut core, InputEvent::down(2, 10.0, 0.0));
    send(&mut gc, &mut core, InputEvent::moved(2, 1000.0, 0.0));
    assert_eq!(core.grid.size, crate::consts::MAX_CELL_SIZE);
    send(&mut gc, &mut core, InputEvent::moved(2, 0.1, 0.0));
    assert_eq!(core.grid.size, crate::consts::MIN_CELL_SIZE);
}

#[test]
fn align_wheel_resizes_cells() {
    let (mut gc, mut core) = setup();
    core.apply_ui(&UiCommand::SetMode(Mode::Align));
    send(&mut gc, &mut core, InputEvent::Wheel { x: 0.0, y: 0.0, delta_y: -1.0 });
    assert!(approx_eq(core.grid.size, 33.0));
}

// =============================================================
// Drawing
// =============================================================

#[test]
fn pen_down_leaves_a_dot_and_shows_cursor() {
    let (mut gc, mut core) = with_tool(Tool::Pen);
    core.drawing_enabled = true;
    let actions = send(&mut gc, &mut core, InputEvent::down(1, 10.0, 20.0));
    assert_eq!(draws(&actions), vec![(pt(10.0, 20.0), pt(10.0, 20.0))]);
    assert!(actions.iter().any(|a| matches!(a, Action::BrushCursor { diameter, .. } if *diameter == 5.0)));
}

#[test]
fn pen_drag_connects_segments() {
    let (mut gc, mut core) = with_tool(Tool::Pen);
    core.drawing_enabled = true;
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    let a = send(&mut gc, &mut core, InputEvent::moved(1, 10.0, 0.0));
    let b = send(&mut gc, &mut core, InputEvent::moved(1, 10.0, 10.0));
    assert_eq!(draws(&a), vec![(pt(0.0, 0.0), pt(10.0, 0.0))]);
    assert_eq!(draws(&b), vec![(pt(10.0, 0.0), pt(10.0, 10.0))]);
}

#[test]
fn pen_strokes_in_world_space() {
    let (mut gc, mut core) = with_tool(Tool::Pen);
    core.drawing_enabled = true;
    core.set_view(ViewTransform { offset_x: 100.0, offset_y: 0.0, scale: 2.0 });
    let actions = send(&mut gc, &mut core, InputEvent::down(1, 120.0, 40.0));
    assert_eq!(draws(&actions), vec![(pt(10.0, 20.0), pt(10.0, 20.0))]);
    // The cursor scales with the camera.
    assert!(actions.iter().any(|a| matches!(a, Action::BrushCursor { diameter, .. } if *diameter == 10.0)));
}

#[test]
fn new_stroke_does_not_connect_to_previous() {
    let (mut gc, mut core) = with_tool(Tool::Eraser);
    core.drawing_enabled = true;
    send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    send(&mut gc, &mut core, InputEvent::up(1));
    let actions = send(&mut gc, &mut core, InputEvent::down(1, 50.0, 50.0));
    assert_eq!(draws(&actions), vec![(pt(50.0, 50.0), pt(50.0, 50.0))]);
}

#[test]
fn drawing_without_layer_is_inert() {
    let (mut gc, mut core) = with_tool(Tool::Pen);
    let mut actions = send(&mut gc, &mut core, InputEvent::down(1, 0.0, 0.0));
    actions.extend(send(&mut gc, &mut core, InputEvent::moved(1, 10.0, 0.0)));
    assert!(draws(&actions).is_empty());
    assert!(actions.contains(&Action::HideBrushCursor));
}

// =============================================================
// Assets
// =============================================================

#[test]
fn base_map_resizes_world_and_fits() {
    let (mut gc, mut core) = setup();
    let actions = send(&mut gc, &mut core, InputEvent::AssetLoaded(Asset::BaseMap { width: 2000, height: 1000 }));
    assert_eq!(core.world_width, 2000.0);
    assert_eq!(core.world_height, 1000.0);
    assert_eq!(actions[0], Action::WorldResized { width: 2000, height: 1000 });
    assert!(has_transform(&actions));
    assert_eq!(actions.last(), Some(&Action::FullRender));
    assert!(approx_eq(core.view.scale, 0.5 * crate::consts::FIT_MARGIN));
}

#[test]
fn empty_base_map_is_ignored() {
    let (mut gc, mut core) = setup();
    let actions = send(&mut gc, &mut core, InputEvent::AssetLoaded(Asset::BaseMap { width: 0, height: 600 }));
    assert!(actions.is_empty());
    assert_eq!(core.world_width, crate::consts::DEFAULT_WORLD_WIDTH);
}

#[test]
fn fog_texture_requests_full_render() {
    let (mut gc, mut core) = setup();
    core.clear_dirty();
    let actions = send(&mut gc, &mut core, InputEvent::AssetLoaded(Asset::FogTexture));
    assert_eq!(actions, vec![Action::FullRender]);
    assert!(core.is_dirty());
}
