//! Page - DOM and input helpers for the connected target
//!
//! Design: Lightweight wrapper around a shared CDPClient. Every helper is
//! one or a few `execute` calls; nothing is cached between calls.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use devpilot_dom::{DomNode, NodeId};
use serde_json::{json, Value};

use super::client::{CDPClient, CDPError, Result};
use super::input::{mouse_event, KeySpec, Modifiers};
use super::protocol::{BoxModel, Quad};

/// Gap between mouse press and release
pub const CLICK_HOLD: Duration = Duration::from_millis(50);

/// Page bound to the client's current target
#[derive(Clone)]
pub struct Page {
    client: Arc<CDPClient>,
}

impl Page {
    pub fn new(client: Arc<CDPClient>) -> Self {
        Self { client }
    }

    /// Send a raw command
    pub fn execute(&self, method: &str, params: Option<Value>) -> Result<Value> {
        self.client.execute(method, params)
    }

    /// Evaluate JavaScript and return its value.
    ///
    /// `Null` when the expression yields nothing or the command went out
    /// unconfirmed. A thrown exception is reported as `JsException`.
    pub fn evaluate(&self, expression: &str) -> Result<Value> {
        let outcome = self.client.call(
            "Runtime.evaluate",
            Some(json!({
                "expression": expression,
                "returnByValue": true,
            })),
        )?;
        let Some(result) = outcome.into_response() else {
            return Ok(Value::Null);
        };

        if let Some(details) = result.get("exceptionDetails") {
            let message = details
                .pointer("/exception/description")
                .or_else(|| details.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("uncaught exception");
            return Err(CDPError::JsException(message.to_string()));
        }

        Ok(result.pointer("/result/value").cloned().unwrap_or(Value::Null))
    }

    /// Full document, piercing shadow roots and frames
    pub fn document(&self) -> Result<DomNode> {
        let result = self
            .client
            .call("DOM.getDocument", Some(json!({ "depth": -1, "pierce": true })))?
            .into_response()
            .ok_or_else(|| CDPError::NoResponse("DOM.getDocument".to_string()))?;
        Ok(devpilot_dom::parse_document(&result)?)
    }

    /// Content quad of a node, `None` when the node has no layout box
    pub fn box_model(&self, node_id: NodeId) -> Result<Option<Quad>> {
        let params = json!({ "nodeId": node_id });
        let outcome = match self.client.call("DOM.getBoxModel", Some(params)) {
            Ok(outcome) => outcome,
            Err(CDPError::Protocol { code, message }) => {
                tracing::debug!(node_id, code, %message, "No box model");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let model = outcome
            .into_response()
            .and_then(|mut result| result.get_mut("model").map(Value::take))
            .and_then(|model| serde_json::from_value::<BoxModel>(model).ok());
        Ok(model.map(|m| m.content))
    }

    /// Left-click the centre of a node's content box.
    ///
    /// Returns `false` without sending any input when the node has no box.
    pub fn click_node(&self, node_id: NodeId) -> Result<bool> {
        let Some(quad) = self.box_model(node_id)? else {
            tracing::debug!(node_id, "Click skipped, node has no box model");
            return Ok(false);
        };
        let (x, y) = quad.centroid();
        tracing::debug!(node_id, x, y, "Clicking node");
        self.click_at(x, y)?;
        Ok(true)
    }

    pub fn click_at(&self, x: f64, y: f64) -> Result<()> {
        self.execute("Input.dispatchMouseEvent", Some(mouse_event("mousePressed", x, y)))?;
        thread::sleep(CLICK_HOLD);
        self.execute("Input.dispatchMouseEvent", Some(mouse_event("mouseReleased", x, y)))?;
        Ok(())
    }

    /// Insert text at the focused element
    pub fn insert_text(&self, text: &str) -> Result<()> {
        self.execute("Input.insertText", Some(json!({ "text": text })))?;
        Ok(())
    }

    /// Key down then key up, with the same modifiers on both
    pub fn dispatch_key(&self, key: &str, modifiers: Modifiers) -> Result<()> {
        let spec = KeySpec::lookup(key);
        self.execute("Input.dispatchKeyEvent", Some(spec.key_down(modifiers)))?;
        self.execute("Input.dispatchKeyEvent", Some(spec.key_up(modifiers)))?;
        Ok(())
    }

    /// Enter as a raw key down, a `char` carrying `\r`, and a key up.
    /// Editors that ignore synthetic `keyDown` still see the `char`.
    pub fn press_enter(&self) -> Result<()> {
        self.execute(
            "Input.dispatchKeyEvent",
            Some(json!({
                "type": "rawKeyDown",
                "windowsVirtualKeyCode": 13,
                "code": "Enter",
                "key": "Enter",
                "text": "\r",
                "unmodifiedText": "\r",
            })),
        )?;
        self.execute("Input.dispatchKeyEvent", Some(json!({ "type": "char", "text": "\r" })))?;
        self.execute(
            "Input.dispatchKeyEvent",
            Some(json!({
                "type": "keyUp",
                "windowsVirtualKeyCode": 13,
                "code": "Enter",
                "key": "Enter",
            })),
        )?;
        Ok(())
    }
}
