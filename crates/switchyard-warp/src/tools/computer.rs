//! Computer-use action conversion.
//!
//! Accepts both the batched shape (`{"actions": [{"type": "click", ...}]}`) and
//! the single-action shape (`{"action": "left_click", "coordinate": [x, y]}`).

use crate::wire::{
    duration_from_secs, duration_secs, ComputerAction, Coordinates, Key, KeyPress, MouseButton,
    MouseDown, MouseMove, MouseUp, MouseWheel, ScreenshotParams, ScrollDirection, TypeText, Wait,
};
use serde_json::{json, Map, Value};
use tracing::debug;

pub(crate) const DEFAULT_SCREENSHOT: ScreenshotParams = ScreenshotParams {
    max_long_edge_px: 1280,
    max_total_px: 1_048_576,
};

const DEFAULT_SCROLL_PIXELS: i32 = 100;
const DEFAULT_WAIT_SECS: u64 = 1;

/// Screenshot limits from `input.screenshot_params`, falling back to defaults.
pub(crate) fn screenshot_params(input: &Value) -> ScreenshotParams {
    input
        .get("screenshot_params")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or(DEFAULT_SCREENSHOT)
}

pub(crate) fn to_wire_actions(input: &Value) -> Vec<ComputerAction> {
    let single;
    let actions: &[Value] = match input.get("actions") {
        Some(Value::Array(actions)) => actions,
        _ if input.get("action").is_some() => {
            single = [input.clone()];
            &single
        }
        _ => &[],
    };
    actions.iter().filter_map(to_wire_action).collect()
}

fn to_wire_action(action: &Value) -> Option<ComputerAction> {
    let kind = action
        .get("type")
        .or_else(|| action.get("action"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let converted = match kind {
        "mouse_move" => ComputerAction::MouseMove(MouseMove {
            to: Some(coordinates(action, "to")),
        }),
        "click" | "mouse_down" | "left_click" | "right_click" | "middle_click" => {
            let button = match kind {
                "right_click" => MouseButton::Right,
                "middle_click" => MouseButton::Middle,
                _ => mouse_button(action),
            };
            ComputerAction::MouseDown(MouseDown {
                button,
                at: Some(coordinates(action, "at")),
            })
        }
        "mouse_up" | "left_mouse_up" => ComputerAction::MouseUp(MouseUp {
            button: mouse_button(action),
        }),
        "scroll" | "mouse_wheel" => {
            let direction = action
                .get("direction")
                .or_else(|| action.get("scroll_direction"))
                .and_then(Value::as_str);
            let pixels = ["pixels", "amount", "scroll_amount"]
                .iter()
                .find_map(|key| action.get(*key).and_then(Value::as_i64))
                .and_then(|n| i32::try_from(n).ok())
                .unwrap_or(DEFAULT_SCROLL_PIXELS);
            ComputerAction::MouseWheel(MouseWheel {
                at: Some(coordinates(action, "at")),
                direction: match direction {
                    Some("up") => ScrollDirection::Up,
                    Some("left") => ScrollDirection::ScrollLeft,
                    Some("right") => ScrollDirection::ScrollRight,
                    _ => ScrollDirection::Down,
                },
                pixels,
            })
        }
        "type" | "type_text" => ComputerAction::TypeText(TypeText {
            text: action
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        "key" | "key_down" => ComputerAction::KeyDown(key_press(action)),
        "key_up" => ComputerAction::KeyUp(key_press(action)),
        "wait" => {
            let secs = action
                .get("duration")
                .or_else(|| action.get("seconds"))
                .and_then(Value::as_f64)
                .filter(|secs| *secs > 0.0)
                .map(|secs| secs.ceil() as u64)
                .unwrap_or(DEFAULT_WAIT_SECS);
            ComputerAction::Wait(Wait {
                duration: Some(duration_from_secs(secs)),
            })
        }
        other => {
            debug!(action = other, "skipping unsupported computer action");
            return None;
        }
    };
    Some(converted)
}

fn coordinates(action: &Value, nested: &str) -> Coordinates {
    let axis = |value: Option<&Value>| {
        value
            .and_then(Value::as_i64)
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(0)
    };

    if let Some(Value::Array(pair)) = action.get("coordinate") {
        return Coordinates {
            x: axis(pair.first()),
            y: axis(pair.get(1)),
        };
    }
    if let Some(inner) = action.get(nested).filter(|v| v.is_object()) {
        return Coordinates {
            x: axis(inner.get("x")),
            y: axis(inner.get("y")),
        };
    }
    Coordinates {
        x: axis(action.get("x")),
        y: axis(action.get("y")),
    }
}

fn mouse_button(action: &Value) -> MouseButton {
    match action.get("button").and_then(Value::as_str) {
        Some("right") => MouseButton::Right,
        Some("middle") => MouseButton::Middle,
        _ => MouseButton::Left,
    }
}

fn key_press(action: &Value) -> KeyPress {
    let key = match action.get("key").or_else(|| action.get("text")) {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).map(Key::Keycode),
        Some(Value::String(s)) => Some(Key::Char(s.clone())),
        _ => None,
    };
    KeyPress {
        key: Some(key.unwrap_or_else(|| Key::Char(String::new()))),
    }
}

pub(crate) fn from_wire_actions(actions: &[ComputerAction]) -> Vec<Value> {
    actions.iter().map(from_wire_action).collect()
}

fn from_wire_action(action: &ComputerAction) -> Value {
    match action {
        ComputerAction::MouseMove(m) => {
            let to = m.to.unwrap_or_default();
            json!({"type": "mouse_move", "x": to.x, "y": to.y})
        }
        ComputerAction::MouseDown(m) => {
            let at = m.at.unwrap_or_default();
            json!({"type": "click", "button": button_name(m.button), "x": at.x, "y": at.y})
        }
        ComputerAction::MouseUp(m) => json!({"type": "mouse_up", "button": button_name(m.button)}),
        ComputerAction::MouseWheel(m) => {
            let at = m.at.unwrap_or_default();
            let direction = match m.direction {
                ScrollDirection::Up => "up",
                ScrollDirection::Down => "down",
                ScrollDirection::ScrollLeft => "left",
                ScrollDirection::ScrollRight => "right",
            };
            json!({
                "type": "scroll",
                "direction": direction,
                "x": at.x,
                "y": at.y,
                "amount": if m.pixels > 0 { m.pixels } else { DEFAULT_SCROLL_PIXELS },
            })
        }
        ComputerAction::TypeText(t) => json!({"type": "type", "text": t.text}),
        ComputerAction::KeyDown(k) => json!({"type": "key", "key": key_value(k)}),
        ComputerAction::KeyUp(k) => json!({"type": "key_up", "key": key_value(k)}),
        ComputerAction::Wait(w) => {
            let secs = w
                .duration
                .as_deref()
                .and_then(duration_secs)
                .filter(|secs| *secs > 0.0)
                .unwrap_or(DEFAULT_WAIT_SECS as f64);
            let mut map = Map::new();
            map.insert("type".into(), json!("wait"));
            map.insert(
                "duration".into(),
                if secs.fract() == 0.0 {
                    json!(secs as u64)
                } else {
                    json!(secs)
                },
            );
            Value::Object(map)
        }
    }
}

fn button_name(button: MouseButton) -> &'static str {
    match button {
        MouseButton::Left => "left",
        MouseButton::Right => "right",
        MouseButton::Middle => "middle",
    }
}

fn key_value(press: &KeyPress) -> Value {
    match &press.key {
        Some(Key::Keycode(code)) => json!(code),
        Some(Key::Char(c)) => json!(c),
        None => json!(""),
    }
}
