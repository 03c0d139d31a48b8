//! Target discovery
//!
//! The remote application lists its debuggable targets at
//! `http://{host}:{port}/json/list`. Discovery never fails loudly: an
//! unreachable endpoint or a malformed body yields an empty list and the
//! caller reports `NoTargets`.

use std::time::Duration;

use url::Url;

use super::client::ClientConfig;
use super::protocol::Target;
use crate::ws::Endpoint;

pub trait TargetSource: Send + Sync {
    fn targets(&self) -> Vec<Target>;
}

/// Fetches `/json/list` over HTTP
#[derive(Debug, Clone)]
pub struct HttpTargetSource {
    url: String,
    timeout: Duration,
}

impl HttpTargetSource {
    pub fn new(host: &str, port: u16, timeout: Duration) -> Self {
        Self {
            url: format!("http://{host}:{port}/json/list"),
            timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.host, config.port, config.discovery_timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> reqwest::Result<Vec<Target>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .no_proxy()
            .build()?;
        client.get(&self.url).send()?.error_for_status()?.json()
    }
}

impl TargetSource for HttpTargetSource {
    fn targets(&self) -> Vec<Target> {
        match self.fetch() {
            Ok(targets) => {
                tracing::debug!(url = %self.url, count = targets.len(), "Discovered targets");
                targets
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Target discovery failed");
                Vec::new()
            }
        }
    }
}

/// Fixed target list
#[derive(Debug, Clone, Default)]
pub struct StaticTargets(pub Vec<Target>);

impl TargetSource for StaticTargets {
    fn targets(&self) -> Vec<Target> {
        self.0.clone()
    }
}

/// Pick the target to attach to.
///
/// First page whose title contains `title_hint`, else the first page,
/// else whatever comes first.
pub fn select_target<'a>(targets: &'a [Target], title_hint: Option<&str>) -> Option<&'a Target> {
    title_hint
        .and_then(|hint| targets.iter().find(|t| t.is_page() && t.title.contains(hint)))
        .or_else(|| targets.iter().find(|t| t.is_page()))
        .or_else(|| targets.first())
}

/// Socket endpoint for `target`.
///
/// Host and port always come from configuration; the advertised WebSocket
/// URL only contributes its path.
pub fn endpoint_for(target: &Target, host: &str, port: u16) -> Endpoint {
    let path = target
        .web_socket_url
        .as_deref()
        .and_then(|raw| Url::parse(raw).ok())
        .map(|url| match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        })
        .filter(|path| path.len() > 1)
        .unwrap_or_else(|| format!("/devtools/page/{}", target.id));
    Endpoint::new(host, port, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDevtools;

    fn target(id: &str, kind: &str, title: &str) -> Target {
        Target {
            id: id.to_string(),
            target_type: kind.to_string(),
            title: title.to_string(),
            url: String::new(),
            web_socket_url: None,
        }
    }

    #[test]
    fn test_select_prefers_hinted_page() {
        let targets = vec![
            target("w", "service_worker", "Composer"),
            target("a", "page", "Welcome"),
            target("b", "page", "Composer - project"),
        ];
        assert_eq!(select_target(&targets, Some("Composer")).unwrap().id, "b");
    }

    #[test]
    fn test_select_falls_back_to_first_page() {
        let targets = vec![target("w", "worker", "x"), target("a", "page", "Welcome")];
        assert_eq!(select_target(&targets, Some("Missing")).unwrap().id, "a");
        assert_eq!(select_target(&targets, None).unwrap().id, "a");
    }

    #[test]
    fn test_select_falls_back_to_first_entry() {
        let targets = vec![target("w", "worker", "x"), target("s", "service_worker", "y")];
        assert_eq!(select_target(&targets, None).unwrap().id, "w");
        assert!(select_target(&[], None).is_none());
    }

    #[test]
    fn test_endpoint_uses_configured_host_and_advertised_path() {
        let mut t = target("ABC", "page", "x");
        t.web_socket_url = Some("ws://10.0.0.5:9333/devtools/page/ABC".to_string());
        let endpoint = endpoint_for(&t, "127.0.0.1", 9222);
        assert_eq!(endpoint, Endpoint::new("127.0.0.1", 9222, "/devtools/page/ABC"));
    }

    #[test]
    fn test_endpoint_without_socket_url() {
        let endpoint = endpoint_for(&target("XYZ", "page", "x"), "localhost", 9222);
        assert_eq!(endpoint.path, "/devtools/page/XYZ");

        let mut t = target("Q", "page", "x");
        t.web_socket_url = Some("not a url".to_string());
        assert_eq!(endpoint_for(&t, "localhost", 9222).path, "/devtools/page/Q");
    }

    #[test]
    fn test_http_discovery() {
        let server = FakeDevtools::builder()
            .targets(vec![serde_json::json!({
                "id": "T1",
                "type": "page",
                "title": "Workbench",
                "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/page/T1"
            })])
            .spawn();
        let source = HttpTargetSource::new("127.0.0.1", server.port(), Duration::from_secs(2));
        assert_eq!(source.url(), format!("http://127.0.0.1:{}/json/list", server.port()));
        let targets = source.targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, "T1");
        assert_eq!(targets[0].title, "Workbench");
    }

    #[test]
    fn test_http_discovery_unreachable_is_empty() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let source = HttpTargetSource::new("127.0.0.1", port, Duration::from_millis(500));
        assert!(source.targets().is_empty());
    }
}
