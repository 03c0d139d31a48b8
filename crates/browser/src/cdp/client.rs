//! CDP Client - The Core Communication Layer
//!
//! Design decisions:
//! 1. One WebSocket per client, opened lazily on the first command
//! 2. One command in flight: the connection mutex is held for the whole
//!    round trip (connect-if-needed, send, wait for the matching id)
//! 3. Responses are matched by id; events and stray responses are dropped
//! 4. Fail fast - no retries. Any I/O error tears the connection down and
//!    the next command reconnects.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use super::discovery::{endpoint_for, select_target, HttpTargetSource, StaticTargets, TargetSource};
use super::ids::{ClockIds, IdAllocator};
use super::protocol::*;
use crate::ws::Transport;

#[derive(Error, Debug)]
pub enum CDPError {
    #[error("No debuggable targets found")]
    NoTargets,

    #[error("WebSocket upgrade rejected: {status}")]
    HandshakeRejected { status: String },

    #[error("Connect failed: {0}")]
    Connect(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CDP protocol error: {code} - {message}")]
    Protocol { code: i32, message: String },

    #[error("No response to {0}")]
    NoResponse(String),

    #[error("JavaScript exception: {0}")]
    JsException(String),

    #[error("Missing field `{0}` in response")]
    MissingField(&'static str),

    #[error("DOM error: {0}")]
    Dom(#[from] devpilot_dom::DomError),
}

/// Result type for CDP operations
pub type Result<T> = std::result::Result<T, CDPError>;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Prefer the page whose title contains this
    pub title_hint: Option<String>,
    pub connect_timeout: Duration,
    pub discovery_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9222,
            title_hint: None,
            connect_timeout: Duration::from_secs(10),
            discovery_timeout: Duration::from_secs(2),
            command_timeout: Duration::from_secs(5),
        }
    }
}

struct Connection {
    transport: Transport,
    target_id: TargetId,
}

/// CDP Client - owns at most one WebSocket to the selected target
pub struct CDPClient {
    config: ClientConfig,
    ids: Arc<dyn IdAllocator>,
    targets: Box<dyn TargetSource>,
    connection: Mutex<Option<Connection>>,
}

impl CDPClient {
    /// Client discovering targets over HTTP at the configured host/port
    pub fn new(config: ClientConfig) -> Self {
        let targets = HttpTargetSource::from_config(&config);
        Self {
            config,
            ids: Arc::new(ClockIds),
            targets: Box::new(targets),
            connection: Mutex::new(None),
        }
    }

    pub fn with_ids(mut self, ids: impl IdAllocator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn with_targets(mut self, targets: impl TargetSource + 'static) -> Self {
        self.targets = Box::new(targets);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Targets currently advertised by the target source
    pub fn targets(&self) -> Vec<Target> {
        self.targets.targets()
    }

    /// New client bound to `target` only, sharing this client's
    /// configuration and id allocator. It opens its own connection.
    pub fn pinned(&self, target: Target) -> CDPClient {
        CDPClient {
            config: self.config.clone(),
            ids: self.ids.clone(),
            targets: Box::new(StaticTargets(vec![target])),
            connection: Mutex::new(None),
        }
    }

    /// Open the connection now instead of on the first command
    pub fn connect(&self) -> Result<()> {
        let mut connection = self.lock();
        if connection.is_none() {
            *connection = Some(self.establish()?);
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.lock().is_some()
    }

    /// Target of the live connection, if any
    pub fn target_id(&self) -> Option<TargetId> {
        self.lock().as_ref().map(|c| c.target_id.clone())
    }

    pub fn disconnect(&self) {
        if let Some(connection) = self.lock().take() {
            tracing::info!(
                connection = %connection.transport.id(),
                target = %connection.target_id,
                "Disconnecting"
            );
        }
    }

    /// Send one command and wait for its response.
    ///
    /// Frames that are not JSON or carry another id are skipped. The
    /// deadline passing without a matching frame yields
    /// [`CallOutcome::Unconfirmed`]; the connection stays up.
    pub fn call(&self, method: &str, params: Option<Value>) -> Result<CallOutcome> {
        let mut slot = self.lock();
        let mut connection = match slot.take() {
            Some(connection) => connection,
            None => self.establish()?,
        };

        let id = self.ids.next_id();
        let result = self.round_trip(&mut connection, id, method, params);

        match &result {
            Err(CDPError::Io(e)) => {
                tracing::warn!(
                    connection = %connection.transport.id(),
                    target = %connection.target_id,
                    %method,
                    error = %e,
                    "Connection invalidated"
                );
            }
            _ => *slot = Some(connection),
        }
        result
    }

    /// Caller-facing contract: the response's `result`, or
    /// `{"status": "sent"}` when the command went out unconfirmed
    pub fn execute(&self, method: &str, params: Option<Value>) -> Result<Value> {
        match self.call(method, params)? {
            CallOutcome::Response(result) => Ok(result),
            CallOutcome::Unconfirmed => Ok(json!({ "status": "sent" })),
        }
    }

    fn round_trip(
        &self,
        connection: &mut Connection,
        id: RequestId,
        method: &str,
        params: Option<Value>,
    ) -> Result<CallOutcome> {
        let request = CDPRequest {
            id,
            method: method.to_string(),
            params,
        };
        let text = serde_json::to_string(&request)?;

        tracing::debug!(id, %method, "Sending command");
        connection.transport.send_text(&text)?;

        let deadline = Instant::now() + self.config.command_timeout;
        loop {
            let Some(frame) = connection.transport.read_text(deadline)? else {
                tracing::debug!(id, %method, "No response before deadline");
                return Ok(CallOutcome::Unconfirmed);
            };

            let Ok(message) = parse_frame(&frame) else {
                tracing::trace!(len = frame.len(), "Skipping non-JSON frame");
                continue;
            };
            if message.get("id").and_then(Value::as_u64) != Some(id) {
                continue;
            }

            let response: CDPResponse = serde_json::from_value(message)?;
            if let Some(error) = response.error {
                return Err(CDPError::Protocol {
                    code: error.code,
                    message: error.message,
                });
            }
            return Ok(CallOutcome::Response(response.result.unwrap_or_else(|| json!({}))));
        }
    }

    fn establish(&self) -> Result<Connection> {
        let targets = self.targets.targets();
        let target = select_target(&targets, self.config.title_hint.as_deref())
            .ok_or(CDPError::NoTargets)?;
        let endpoint = endpoint_for(target, &self.config.host, self.config.port);

        tracing::info!(target = %target.id, title = %target.title, "Connecting to target");
        let transport = Transport::open(&endpoint, self.config.connect_timeout)?;
        Ok(Connection {
            transport,
            target_id: target.id.clone(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.connection.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Parse a frame without serde_json's recursion limit; pierced documents
/// nest deeper than it allows
fn parse_frame(text: &str) -> serde_json::Result<Value> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}
