//! Keyboard and mouse event parameters for the `Input` domain

use std::ops::BitOr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Modifier bit set as `Input.dispatchKeyEvent` expects it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const ALT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const META: Modifiers = Modifiers(4);
    pub const SHIFT: Modifiers = Modifiers(8);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// Key identity sent with a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    pub key: String,
    pub code: &'static str,
    pub virtual_key: u32,
    /// Text produced on key down, if any
    pub text: Option<String>,
}

const KEY_TABLE: &[(&str, &str, &str, u32, Option<&str>)] = &[
    ("S", "s", "KeyS", 83, Some("s")),
    ("J", "j", "KeyJ", 74, Some("j")),
    ("W", "w", "KeyW", 87, Some("w")),
    ("Enter", "Enter", "Enter", 13, Some("\r")),
    ("Tab", "Tab", "Tab", 9, Some("\t")),
    ("Escape", "Escape", "Escape", 27, None),
    ("Backspace", "Backspace", "Backspace", 8, None),
];

impl KeySpec {
    /// Table lookup; anything else is sent as its lowercased literal with
    /// no code and virtual key 0
    pub fn lookup(name: &str) -> Self {
        match KEY_TABLE.iter().find(|(n, ..)| *n == name) {
            Some(&(_, key, code, virtual_key, text)) => Self {
                key: key.to_string(),
                code,
                virtual_key,
                text: text.map(String::from),
            },
            None => {
                let key = name.to_lowercase();
                Self {
                    text: Some(key.clone()),
                    key,
                    code: "",
                    virtual_key: 0,
                }
            }
        }
    }

    pub fn key_down(&self, modifiers: Modifiers) -> Value {
        let mut params = json!({
            "type": "keyDown",
            "modifiers": modifiers.bits(),
            "key": self.key,
            "code": self.code,
            "windowsVirtualKeyCode": self.virtual_key,
        });
        if let Some(text) = &self.text {
            params["text"] = json!(text);
            params["unmodifiedText"] = json!(text);
        }
        params
    }

    pub fn key_up(&self, modifiers: Modifiers) -> Value {
        json!({
            "type": "keyUp",
            "modifiers": modifiers.bits(),
            "key": self.key,
            "code": self.code,
            "windowsVirtualKeyCode": self.virtual_key,
        })
    }
}

/// Left-button mouse event at a point
pub fn mouse_event(kind: &str, x: f64, y: f64) -> Value {
    json!({
        "type": kind,
        "x": x,
        "y": y,
        "button": "left",
        "clickCount": 1,
    })
}
