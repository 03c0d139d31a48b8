//! Prompt submission and model selection

use std::thread;
use std::time::Duration;

use devpilot_browser::{CDPClient, Page, Result};
use devpilot_dom::{find_by_attribute, find_by_text, TextMatch};
use serde::{Deserialize, Serialize};

use crate::pages::on_first_page;

/// Where the chat editor, the submit control and the model picker live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub editor_attribute: String,
    pub editor_value: String,
    /// Text inside the submit control; its parent gets clicked
    pub submit_text: String,
    pub dropdown_attribute: String,
    pub dropdown_value: String,
    /// Pause after typing, and after opening the model picker
    pub settle: Duration,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            editor_attribute: "data-lexical-editor".to_string(),
            editor_value: "true".to_string(),
            submit_text: "Submit".to_string(),
            dropdown_attribute: "id".to_string(),
            dropdown_value: "headlessui-popover-button".to_string(),
            settle: Duration::from_secs(1),
        }
    }
}

/// Type `text` into the editor and submit it.
///
/// Submits by clicking the control around `submit_text`, or with Enter when
/// that control is missing or has no box. `Ok(false)` when there is no
/// editor.
pub fn submit_prompt(page: &Page, text: &str, config: &PromptConfig) -> Result<bool> {
    let root = page.document()?;
    let Some(editor) = find_by_attribute(&root, &config.editor_attribute, &config.editor_value)
    else {
        tracing::info!(attribute = %config.editor_attribute, "Editor not found");
        return Ok(false);
    };

    page.click_node(editor.node_id)?;
    page.insert_text(text)?;
    thread::sleep(config.settle);

    // The submit control exists before typing, so the first snapshot is enough
    let clicked = match find_by_text(&root, &config.submit_text, true) {
        Some(TextMatch {
            parent: Some(parent), ..
        }) => page.click_node(parent.node_id)?,
        _ => false,
    };
    if !clicked {
        tracing::debug!("Submit control not clickable, pressing Enter");
        page.press_enter()?;
    }

    tracing::info!(chars = text.chars().count(), via_click = clicked, "Prompt submitted");
    Ok(true)
}

/// Open the model picker and click the entry labelled `name`.
///
/// `Ok(false)` when the picker, or the entry inside it, cannot be found or
/// clicked.
pub fn select_model(page: &Page, name: &str, config: &PromptConfig) -> Result<bool> {
    let root = page.document()?;
    let Some(dropdown) =
        find_by_attribute(&root, &config.dropdown_attribute, &config.dropdown_value)
    else {
        tracing::info!(value = %config.dropdown_value, "Model dropdown not found");
        return Ok(false);
    };
    if !page.click_node(dropdown.node_id)? {
        return Ok(false);
    }
    thread::sleep(config.settle);

    // The option list only exists once the picker is open
    let root = page.document()?;
    let Some(TextMatch {
        parent: Some(option), ..
    }) = find_by_text(&root, name, true)
    else {
        tracing::info!(model = %name, "Model entry not found");
        return Ok(false);
    };

    let clicked = page.click_node(option.node_id)?;
    if clicked {
        tracing::info!(model = %name, "Model selected");
    }
    Ok(clicked)
}

/// [`submit_prompt`] on each page target until one has an editor
pub fn submit_prompt_any(client: &CDPClient, text: &str, config: &PromptConfig) -> Result<bool> {
    on_first_page(client, |page| submit_prompt(page, text, config))
}

/// [`select_model`] on each page target until one selects the model
pub fn select_model_any(client: &CDPClient, name: &str, config: &PromptConfig) -> Result<bool> {
    on_first_page(client, |page| select_model(page, name, config))
}
