//! Chat pane actions driven by in-page scripts
//!
//! Unlike [`crate::prompt`], these never take a DOM snapshot. Each step is
//! a script that finds its element by selector, acts on it and returns
//! whether it did.

use std::thread;
use std::time::Duration;

use devpilot_browser::{Page, Result};
use serde::{Deserialize, Serialize};

use crate::workbench::{bind_argument, evaluate_flag, toggle_panel, PanelConfig};

const NEW_CONVERSATION_SCRIPT: &str = r#"(function() {
    const button = document.querySelector('.new-agent-sidebar-new-button');
    if (!button || button.offsetParent === null) return false;
    button.click();
    return true;
})()"#;

const TYPE_MESSAGE_SCRIPT: &str = r#"(function(text) {
    const input = document.querySelector('.aislash-editor-input');
    if (!input || input.offsetParent === null) return false;
    input.focus();
    input.textContent = '';
    document.execCommand('insertText', false, text);
    return true;
})(__ARG__)"#;

const SEND_MESSAGE_SCRIPT: &str = r#"(function() {
    const container = document.querySelector('.send-with-mode');
    const button = container && container.querySelector('.anysphere-icon-button');
    if (button) { button.click(); return true; }
    const arrow = document.querySelector('.codicon-arrow-up-two');
    if (arrow && arrow.parentElement) { arrow.parentElement.click(); return true; }
    return false;
})()"#;

const MODEL_DROPDOWN_SCRIPT: &str = r#"(function() {
    const dropdown = document.querySelector('.composer-unified-dropdown-model');
    if (!dropdown || dropdown.offsetParent === null) return false;
    dropdown.click();
    return true;
})()"#;

const MODEL_SEARCH_SCRIPT: &str = r#"(function(name) {
    const input = document.querySelector('input[placeholder="Search models"]');
    if (!input || input.offsetParent === null) return false;
    input.focus();
    input.value = '';
    document.execCommand('insertText', false, name);
    return true;
})(__ARG__)"#;

const FIRST_MODEL_RESULT_SCRIPT: &str = r#"(function() {
    const item = document.querySelector('.composer-unified-context-menu-item');
    if (!item) return false;
    item.click();
    return true;
})()"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Pause between typing a message and sending it
    pub typing_settle: Duration,
    /// Wait for the model list to render
    pub dropdown_settle: Duration,
    /// Wait for search results in the model list
    pub search_settle: Duration,
    pub panel: PanelConfig,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            typing_settle: Duration::from_millis(500),
            dropdown_settle: Duration::from_secs(3),
            search_settle: Duration::from_secs(2),
            panel: PanelConfig::default(),
        }
    }
}

/// Start a new agent conversation, opening the panel first if needed
pub fn new_conversation(page: &Page, config: &ComposerConfig) -> Result<bool> {
    toggle_panel(page, Some(true), &config.panel)?;
    let clicked = evaluate_flag(page, NEW_CONVERSATION_SCRIPT)?;
    tracing::info!(clicked, "New conversation");
    Ok(clicked)
}

/// Replace the chat input's content with `message` and press send.
///
/// `Ok(false)` when the input or the send button is missing. The text is
/// left in place when only the button is missing.
pub fn send_chat_message(page: &Page, message: &str, config: &ComposerConfig) -> Result<bool> {
    if !evaluate_flag(page, &bind_argument(TYPE_MESSAGE_SCRIPT, message)?)? {
        tracing::info!("Chat input not found");
        return Ok(false);
    }
    thread::sleep(config.typing_settle);

    if !evaluate_flag(page, SEND_MESSAGE_SCRIPT)? {
        tracing::info!("Send button not found");
        return Ok(false);
    }
    tracing::info!(chars = message.chars().count(), "Chat message sent");
    Ok(true)
}

/// Pick a model through the dropdown's search box.
///
/// Types `name` into the search field and takes the first result, so a
/// partial name selects the best match the app offers.
pub fn change_model(page: &Page, name: &str, config: &ComposerConfig) -> Result<bool> {
    if !evaluate_flag(page, MODEL_DROPDOWN_SCRIPT)? {
        tracing::info!("Model dropdown not found");
        return Ok(false);
    }
    thread::sleep(config.dropdown_settle);

    if !evaluate_flag(page, &bind_argument(MODEL_SEARCH_SCRIPT, name)?)? {
        tracing::info!("Model search input not found");
        return Ok(false);
    }
    thread::sleep(config.search_settle);

    let selected = evaluate_flag(page, FIRST_MODEL_RESULT_SCRIPT)?;
    if selected {
        tracing::info!(model = %name, "Model changed");
    } else {
        tracing::info!(model = %name, "No model matched the search");
    }
    Ok(selected)
}
