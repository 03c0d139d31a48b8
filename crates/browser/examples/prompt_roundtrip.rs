//! Type a prompt into the chat editor, submit it and wait for the answer
//!
//! Usage: prompt_roundtrip "<prompt>" [title hint]

use devpilot_browser::{CDPClient, ClientConfig, GenerationMonitor, MonitorConfig, Page};
use devpilot_dom::find_by_attribute;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let prompt = args.next().unwrap_or_else(|| "Say hello".to_string());
    let config = ClientConfig {
        title_hint: args.next(),
        ..Default::default()
    };

    let page = Page::new(Arc::new(CDPClient::new(config)));
    let root = page.document()?;

    let Some(editor) = find_by_attribute(&root, "data-lexical-editor", "true") else {
        println!("No editor found");
        return Ok(());
    };
    page.click_node(editor.node_id)?;
    page.insert_text(&prompt)?;
    page.press_enter()?;

    let monitor = GenerationMonitor::new(MonitorConfig::default());
    let outcome = monitor.wait_for_page(&page);
    println!("Generation finished: {:?}", outcome);

    Ok(())
}
