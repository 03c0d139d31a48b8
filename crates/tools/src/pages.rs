//! Running an action against every page target
//!
//! Desktop apps often expose several windows as separate pages (a
//! launcher next to the editor, for instance). Actions that look for one
//! element try each page in turn over its own connection.

use std::sync::Arc;

use devpilot_browser::{CDPClient, Page, Result};

/// Run `action` on each `page` target until one returns `Ok(true)`.
///
/// Every page gets a fresh connection that is closed before the next page
/// is tried. A page whose connection or action fails is logged and
/// skipped. `Ok(false)` when no page accepted the action.
pub fn on_first_page<F>(client: &CDPClient, mut action: F) -> Result<bool>
where
    F: FnMut(&Page) -> Result<bool>,
{
    let pages: Vec<_> = client.targets().into_iter().filter(|t| t.is_page()).collect();
    tracing::debug!(count = pages.len(), "Trying page targets");

    for target in pages {
        let id = target.id.clone();
        let title = target.title.clone();
        let page = Page::new(Arc::new(client.pinned(target)));
        match action(&page) {
            Ok(true) => {
                tracing::info!(target = %id, %title, "Action succeeded on page");
                return Ok(true);
            }
            Ok(false) => tracing::debug!(target = %id, %title, "Nothing to act on"),
            Err(e) => tracing::warn!(target = %id, %title, error = %e, "Page skipped"),
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use devpilot_browser::testing::{FakeDevtools, Reply};
    use devpilot_browser::ClientConfig;
    use serde_json::json;
    use std::time::Duration;

    fn client_for(server: &FakeDevtools) -> CDPClient {
        CDPClient::new(ClientConfig {
            port: server.port(),
            command_timeout: Duration::from_millis(500),
            ..Default::default()
        })
    }

    fn evaluate_title(page: &Page) -> Result<bool> {
        Ok(page.evaluate("document.title")?.as_str() == Some("Agent"))
    }

    #[test]
    fn test_stops_at_first_accepting_page() {
        let mut calls = 0;
        let server = FakeDevtools::builder()
            .on_request(move |request| {
                calls += 1;
                let title = if calls == 1 { "Launchpad" } else { "Agent" };
                let result = json!({ "result": { "type": "string", "value": title } });
                vec![Reply::result(&request["id"], result)]
            })
            .spawn();
        server.set_targets(vec![
            json!({ "id": "W", "type": "service_worker", "title": "worker" }),
            server.page_target("A", "Launchpad"),
            server.page_target("B", "Agent"),
            server.page_target("C", "Settings"),
        ]);
        let client = client_for(&server);

        assert!(on_first_page(&client, evaluate_title).unwrap());
        assert_eq!(
            server.upgrade_paths(),
            vec!["/devtools/page/A".to_string(), "/devtools/page/B".to_string()]
        );
        assert!(server.wait_for_disconnects(2, Duration::from_secs(2)));
        assert!(!client.is_connected());
    }

    #[test]
    fn test_failing_page_is_skipped() {
        let server = FakeDevtools::builder()
            .on_request(|request| {
                vec![Reply::error(&request["id"], -32000, "Target closed")]
            })
            .spawn();
        server.set_targets(vec![server.page_target("A", "Launchpad")]);

        assert!(!on_first_page(&client_for(&server), evaluate_title).unwrap());
        assert_eq!(server.methods(), vec!["Runtime.evaluate"]);
    }

    #[test]
    fn test_no_pages() {
        let server = FakeDevtools::builder()
            .targets(vec![json!({ "id": "W", "type": "worker", "title": "worker" })])
            .spawn();

        assert!(!on_first_page(&client_for(&server), evaluate_title).unwrap());
        assert!(server.upgrade_paths().is_empty());
    }
}
