//! One live WebSocket over a TCP stream
//!
//! The transport itself is not synchronized; `CDPClient` keeps it behind a
//! mutex for the full duration of a round trip.

use std::io::{self, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::frame::{encode_text_frame, read_frame};
use super::handshake::{self, Endpoint};
use crate::cdp::client::Result;

pub struct Transport {
    stream: TcpStream,
    /// Identifies this connection in logs
    id: Uuid,
}

impl Transport {
    /// Connect and upgrade
    pub fn open(endpoint: &Endpoint, connect_timeout: Duration) -> Result<Self> {
        let stream = handshake::connect(endpoint, connect_timeout)?;
        let id = Uuid::now_v7();
        tracing::info!(
            connection = %id,
            host = %endpoint.host,
            port = endpoint.port,
            path = %endpoint.path,
            "WebSocket connected"
        );
        Ok(Self { stream, id })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Send `text` as one masked frame
    pub fn send_text(&mut self, text: &str) -> io::Result<()> {
        self.stream.write_all(&encode_text_frame(text, true))?;
        self.stream.flush()
    }

    /// Next frame's text, or `None` once `deadline` passes with no frame
    /// started.
    pub fn read_text(&mut self, deadline: Instant) -> io::Result<Option<String>> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        self.stream.set_read_timeout(Some(remaining))?;
        read_frame(&mut self.stream)
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        let _ = self.stream.shutdown(std::net::Shutdown::Both);
        tracing::debug!(connection = %self.id, "WebSocket closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDevtools, Reply};

    fn open(server: &FakeDevtools) -> Transport {
        Transport::open(&server.endpoint("/devtools/page/T1"), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_send_and_read() {
        let server = FakeDevtools::builder()
            .on_request(|request| {
                let method = request["method"].as_str().unwrap_or("");
                vec![Reply::text(format!("echo:{method}"))]
            })
            .spawn();
        let mut transport = open(&server);

        transport.send_text(r#"{"id":1,"method":"Ping"}"#).unwrap();
        let text = transport
            .read_text(Instant::now() + Duration::from_secs(2))
            .unwrap();
        assert_eq!(text.as_deref(), Some("echo:Ping"));
    }

    #[test]
    fn test_read_deadline_without_frame() {
        let server = FakeDevtools::builder().on_request(|_| Vec::new()).spawn();
        let mut transport = open(&server);

        transport.send_text(r#"{"id":1,"method":"Silent"}"#).unwrap();
        let started = Instant::now();
        let text = transport
            .read_text(Instant::now() + Duration::from_millis(100))
            .unwrap();
        assert!(text.is_none());
        assert!(started.elapsed() >= Duration::from_millis(90));
    }

    #[test]
    fn test_read_after_server_hangup_is_error() {
        let server = FakeDevtools::builder().on_request(|_| vec![Reply::Hangup]).spawn();
        let mut transport = open(&server);

        transport.send_text(r#"{"id":1,"method":"Bye"}"#).unwrap();
        let err = transport
            .read_text(Instant::now() + Duration::from_secs(2))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
