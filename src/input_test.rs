use serde_json::json;

use super::*;

#[test]
fn defaults_are_play_and_pan() {
    assert_eq!(Mode::default(), Mode::Play);
    assert_eq!(Tool::default(), Tool::Pan);
}

#[test]
fn tool_categories() {
    assert!(Tool::Reveal.is_fog_brush());
    assert!(Tool::Hide.is_fog_brush());
    assert!(!Tool::Pan.is_fog_brush());
    assert!(Tool::Pen.is_drawing());
    assert!(Tool::Eraser.is_drawing());
    assert!(!Tool::Reveal.is_drawing());
}

#[test]
fn pointer_record_delta_is_relative_to_start() {
    let mut rec = PointerRecord::new(PointerId(1), Point::new(10.0, 10.0));
    rec.current = Point::new(25.0, 5.0);
    assert_eq!(rec.delta(), Point::new(15.0, -5.0));
}

#[test]
fn pointer_event_json_shape() {
    let event = InputEvent::down(3, 10.5, 20.0);
    let value = serde_json::to_value(event).unwrap();
    assert_eq!(value, json!({ "type": "pointer_down", "id": 3, "x": 10.5, "y": 20.0 }));
}

#[test]
fn wheel_event_parses() {
    let event: InputEvent = serde_json::from_value(json!({ "type": "wheel", "x": 1.0, "y": 2.0, "delta_y": -120.0 })).unwrap();
    assert_eq!(event, InputEvent::Wheel { x: 1.0, y: 2.0, delta_y: -120.0 });
}

#[test]
fn asset_loaded_parses() {
    let event: InputEvent =
        serde_json::from_value(json!({ "type": "asset_loaded", "asset": "base_map", "width": 800, "height": 600 }))
            .unwrap();
    assert_eq!(event, InputEvent::AssetLoaded(Asset::BaseMap { width: 800, height: 600 }));

    let event: InputEvent = serde_json::from_value(json!({ "type": "asset_loaded", "asset": "fog_texture" })).unwrap();
    assert_eq!(event, InputEvent::AssetLoaded(Asset::FogTexture));
}

#[test]
fn ui_command_json_shape() {
    let value = serde_json::to_value(UiCommand::SetTool(Tool::Reveal)).unwrap();
    assert_eq!(value, json!({ "command": "set_tool", "value": "reveal" }));

    let cmd: UiCommand = serde_json::from_value(json!({ "command": "set_grid_kind", "value": "flat" })).unwrap();
    assert_eq!(cmd, UiCommand::SetGridKind(GridKind::Flat));
}

#[test]
fn unit_ui_commands_need_no_value() {
    let cmd: UiCommand = serde_json::from_value(json!({ "command": "reset_fog" })).unwrap();
    assert_eq!(cmd, UiCommand::ResetFog);
}

#[test]
fn unknown_event_type_is_rejected() {
    let result = serde_json::from_value::<InputEvent>(json!({ "type": "key_down", "key": "a" }));
    assert!(result.is_err());
}
