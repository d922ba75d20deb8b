//! Input (mouse and keyboard) operations for CDP page session.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{KeyDefinition, KeyEventType, MouseButton, MouseEventType};

use super::core::PageSession;

impl PageSession {
    /// Click at coordinates.
    pub async fn click(&self, x: f64, y: f64) -> Result<(), CdpError> {
        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({
                "type": MouseEventType::MouseMoved,
                "x": x,
                "y": y,
                "button": MouseButton::None,
            })),
        )
        .await?;

        for event_type in [MouseEventType::MousePressed, MouseEventType::MouseReleased] {
            self.call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": event_type,
                    "x": x,
                    "y": y,
                    "button": MouseButton::Left,
                    "clickCount": 1,
                })),
            )
            .await?;
        }

        debug!("Clicked at ({}, {})", x, y);
        Ok(())
    }

    /// Insert text in one shot at the focused element.
    pub async fn type_text(&self, text: &str) -> Result<(), CdpError> {
        self.call("Input.insertText", Some(json!({"text": text})))
            .await?;
        debug!("Typed {} characters", text.chars().count());
        Ok(())
    }

    /// Type text one character at a time with a pause after each key.
    ///
    /// Each character is a real keyDown/keyUp pair, so page keystroke
    /// handlers see it the way they would a person typing.
    pub async fn type_text_with_delay(&self, text: &str, delay: Duration) -> Result<(), CdpError> {
        for ch in text.chars() {
            let key = ch.to_string();
            self.call(
                "Input.dispatchKeyEvent",
                Some(json!({
                    "type": KeyEventType::KeyDown,
                    "key": key,
                    "text": key,
                    "unmodifiedText": key,
                })),
            )
            .await?;
            self.call(
                "Input.dispatchKeyEvent",
                Some(json!({
                    "type": KeyEventType::KeyUp,
                    "key": key,
                })),
            )
            .await?;

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        debug!("Typed {} characters with {:?} delay", text.chars().count(), delay);
        Ok(())
    }

    /// Press a named key ("Enter", "Backspace", "Escape", ...).
    pub async fn press_key(&self, key: &str) -> Result<(), CdpError> {
        let (down, up) = Self::key_events(key, 0, None);
        self.call("Input.dispatchKeyEvent", Some(down)).await?;
        self.call("Input.dispatchKeyEvent", Some(up)).await?;
        Ok(())
    }

    /// Press key combination (e.g., "Control+a").
    pub async fn press_key_combo(&self, combo: &str) -> Result<(), CdpError> {
        let parts: Vec<&str> = combo.split('+').collect();
        let modifiers = Self::get_modifiers(&parts[..parts.len() - 1]);
        let key = parts.last().copied().unwrap_or("");

        // Chrome only runs editing commands for synthetic shortcuts when told to.
        let command = (modifiers & 2 != 0 && key.eq_ignore_ascii_case("a")).then_some("selectAll");

        let (down, up) = Self::key_events(key, modifiers, command);
        self.call("Input.dispatchKeyEvent", Some(down)).await?;
        self.call("Input.dispatchKeyEvent", Some(up)).await?;
        Ok(())
    }

    /// Build keyDown/keyUp payloads for a key.
    pub(super) fn key_events(key: &str, modifiers: i32, command: Option<&str>) -> (Value, Value) {
        let mut down = json!({
            "type": KeyEventType::KeyDown,
            "key": key,
            "modifiers": modifiers,
        });
        let mut up = json!({
            "type": KeyEventType::KeyUp,
            "key": key,
            "modifiers": modifiers,
        });

        if let Some(def) = KeyDefinition::lookup(key) {
            for event in [&mut down, &mut up] {
                event["key"] = json!(def.key);
                event["code"] = json!(def.code);
                event["windowsVirtualKeyCode"] = json!(def.key_code);
            }
            // Text only makes sense for an unmodified keystroke.
            if let (Some(text), 0) = (def.text, modifiers) {
                down["text"] = json!(text);
            }
        }

        if let Some(cmd) = command {
            down["commands"] = json!([cmd]);
        }

        (down, up)
    }

    /// Get modifier flags from modifier names.
    pub(super) fn get_modifiers(modifiers: &[&str]) -> i32 {
        let mut flags = 0;
        for m in modifiers {
            match m.to_lowercase().as_str() {
                "alt" => flags |= 1,
                "control" | "ctrl" => flags |= 2,
                "meta" | "command" | "cmd" => flags |= 4,
                "shift" => flags |= 8,
                _ => {}
            }
        }
        flags
    }
}
