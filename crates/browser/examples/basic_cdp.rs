//! Basic CDP example - connecting and evaluating an expression
//!
//! Start the target application with `--remote-debugging-port=9222` first.

use devpilot_browser::{CDPClient, CallOutcome, ClientConfig, Page};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = ClientConfig {
        title_hint: std::env::args().nth(1),
        ..Default::default()
    };
    println!("Connecting to {}:{}", config.host, config.port);

    let client = Arc::new(CDPClient::new(config));
    client.connect()?;
    println!("Connected to target {:?}", client.target_id());

    let page = Page::new(client.clone());
    println!("Title: {}", page.evaluate("document.title")?);

    // Raw call, keeping the "no response" case distinct
    let params = serde_json::json!({ "expression": "navigator.userAgent", "returnByValue": true });
    match client.call("Runtime.evaluate", Some(params))? {
        CallOutcome::Response(result) => println!("User agent: {}", result["result"]["value"]),
        CallOutcome::Unconfirmed => println!("No response before the command timeout"),
    }

    client.disconnect();
    println!("Disconnected");

    Ok(())
}
