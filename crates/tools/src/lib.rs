//! Automation actions built on a `Page`
//!
//! Each action is a short, blocking sequence of snapshot, search, click and
//! type steps. Actions report `Ok(false)` when the element they need is not
//! on screen and reserve errors for transport and protocol failures.

pub mod composer;
pub mod pages;
pub mod prompt;
pub mod workbench;

pub use composer::{change_model, new_conversation, send_chat_message, ComposerConfig};
pub use pages::on_first_page;
pub use prompt::{select_model, select_model_any, submit_prompt, submit_prompt_any, PromptConfig};
pub use workbench::{
    click_labeled_button, is_panel_open, set_deep_mode, toggle_panel, PanelConfig, SettingsConfig,
};
