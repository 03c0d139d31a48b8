//! Workbench chrome: labelled buttons, the side panel and settings

use std::thread;
use std::time::Duration;

use devpilot_browser::{Modifiers, Page, Result};
use serde::{Deserialize, Serialize};

/// Stands in for a JSON string literal in parameterized scripts
const ARGUMENT: &str = "__ARG__";

const CLICK_LABELED_SCRIPT: &str = r#"(function(label) {
    const selectors = ['button', 'a', 'div[role="button"]', '.monaco-button'].join(',');
    const match = Array.from(document.querySelectorAll(selectors)).find(el => {
        const text = el.innerText || el.title || "";
        return text.trim().toLowerCase() === label;
    });
    if (!match) return false;
    match.click();
    return true;
})(__ARG__)"#;

/// Visible AI side panel, falling back to the standard side bar
pub const DEFAULT_PANEL_SCRIPT: &str = r#"(function() {
    const panel = document.getElementById('workbench.parts.unifiedsidebar');
    if (panel && panel.offsetParent !== null) return true;
    const sidebar = document.getElementById('workbench.parts.sidebar');
    return !!(sidebar && sidebar.offsetParent !== null);
})()"#;

const AGENTS_SECTION_SCRIPT: &str = r#"(function() {
    const toc = document.querySelector('.settings-toc-wrapper');
    if (toc) {
        const row = Array.from(toc.querySelectorAll('.monaco-list-row'))
            .find(el => el.innerText.includes('Agents') || el.title.includes('Agents'));
        if (row) { row.click(); return true; }
    }
    const exact = Array.from(document.querySelectorAll('.item-label, .monaco-list-row, span'))
        .find(el => (el.innerText.trim() === 'Agents' || el.title === 'Agents')
            && el.offsetParent !== null);
    if (!exact) return false;
    exact.click();
    return true;
})()"#;

const APPROACH_DROPDOWN_SCRIPT: &str = r#"(function() {
    const trigger = Array.from(document.querySelectorAll('div[role="button"], .monaco-select-box'))
        .find(el => el.innerText.includes('Quick'));
    if (!trigger) return false;
    trigger.click();
    return true;
})()"#;

const SCROLL_SETTINGS_SCRIPT: &str = r#"(function() {
    const body = document.querySelector('.settings-body, .monaco-scrollable-element');
    if (body) body.scrollTop = 1000;
    return !!body;
})()"#;

const DEEP_OPTION_SCRIPT: &str = r#"(function() {
    const selectors = '.monaco-list-row, .action-item, .monaco-select-box-dropdown-container span';
    const option = Array.from(document.querySelectorAll(selectors))
        .find(el => el.innerText.trim() === 'Deep');
    if (!option) return false;
    option.click();
    return true;
})()"#;

/// Substitute `value`, as a JSON string literal, for the script's argument
pub(crate) fn bind_argument(script: &str, value: &str) -> Result<String> {
    Ok(script.replace(ARGUMENT, &serde_json::to_string(value)?))
}

/// Evaluate a script that reports success as a boolean
pub(crate) fn evaluate_flag(page: &Page, script: &str) -> Result<bool> {
    Ok(page.evaluate(script)?.as_bool().unwrap_or(false))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Boolean expression: is the panel open
    pub open_script: String,
    pub toggle_key: String,
    pub toggle_modifiers: Modifiers,
    /// Wait for the open/close animation
    pub settle: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            open_script: DEFAULT_PANEL_SCRIPT.to_string(),
            toggle_key: "S".to_string(),
            toggle_modifiers: Modifiers::CTRL | Modifiers::ALT,
            settle: Duration::from_secs(1),
        }
    }
}

/// Click the first button-like element whose text or title is `label`,
/// ignoring case and surrounding whitespace
pub fn click_labeled_button(page: &Page, label: &str) -> Result<bool> {
    let script = bind_argument(CLICK_LABELED_SCRIPT, &label.trim().to_lowercase())?;
    let clicked = evaluate_flag(page, &script)?;
    tracing::debug!(%label, clicked, "Labelled button");
    Ok(clicked)
}

pub fn is_panel_open(page: &Page, config: &PanelConfig) -> Result<bool> {
    evaluate_flag(page, &config.open_script)
}

/// Toggle the panel and return its state afterwards.
///
/// With `desired` set, nothing is sent when the panel is already in that
/// state.
pub fn toggle_panel(page: &Page, desired: Option<bool>, config: &PanelConfig) -> Result<bool> {
    let current = is_panel_open(page, config)?;
    if desired == Some(current) {
        return Ok(current);
    }

    page.dispatch_key(&config.toggle_key, config.toggle_modifiers)?;
    thread::sleep(config.settle);

    let open = is_panel_open(page, config)?;
    tracing::info!(was_open = current, open, "Panel toggled");
    Ok(open)
}

/// Pauses between the steps of [`set_deep_mode`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Wait for the settings editor to open
    pub open_settle: Duration,
    pub step_settle: Duration,
    /// Tries at the Agents section; the table of contents renders late
    pub section_attempts: u32,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            open_settle: Duration::from_secs(2),
            step_settle: Duration::from_secs(1),
            section_attempts: 3,
        }
    }
}

/// Switch the default agent approach from Quick to Deep in the settings UI.
///
/// Opens settings with Ctrl+Shift+J, picks the Agents section, opens the
/// approach dropdown (scrolling once if it is off screen), clicks Deep and
/// closes the tab with Ctrl+W. The tab is closed whatever happened; the
/// return value says whether Deep was clicked.
pub fn set_deep_mode(page: &Page, config: &SettingsConfig) -> Result<bool> {
    page.dispatch_key("J", Modifiers::CTRL | Modifiers::SHIFT)?;
    thread::sleep(config.open_settle);

    let mut section = false;
    for attempt in 1..=config.section_attempts.max(1) {
        section = evaluate_flag(page, AGENTS_SECTION_SCRIPT)?;
        if section {
            break;
        }
        tracing::debug!(attempt, "Agents section not ready");
        thread::sleep(config.step_settle);
    }
    thread::sleep(config.step_settle);

    let mut dropdown = evaluate_flag(page, APPROACH_DROPDOWN_SCRIPT)?;
    if !dropdown {
        page.evaluate(SCROLL_SETTINGS_SCRIPT)?;
        thread::sleep(config.step_settle);
        dropdown = evaluate_flag(page, APPROACH_DROPDOWN_SCRIPT)?;
    }
    thread::sleep(config.step_settle);

    let deep = evaluate_flag(page, DEEP_OPTION_SCRIPT)?;
    thread::sleep(config.step_settle);
    page.dispatch_key("W", Modifiers::CTRL)?;

    tracing::info!(section, dropdown, deep, "Deep mode");
    Ok(deep)
}
