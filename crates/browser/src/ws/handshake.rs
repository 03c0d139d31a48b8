//! HTTP Upgrade exchange that turns a TCP stream into a WebSocket
//!
//! The server's `Sec-WebSocket-Accept` value is not checked; a status line
//! containing `101` is the only acceptance criterion.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::cdp::client::{CDPError, Result};

/// Response heads longer than this are rejected
const MAX_RESPONSE_HEAD: usize = 8 * 1024;

/// Where to upgrade: socket address plus request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
        }
    }
}

/// Open a TCP connection to `endpoint` and perform the upgrade.
///
/// On rejection the stream is dropped before returning.
pub fn connect(endpoint: &Endpoint, timeout: Duration) -> Result<TcpStream> {
    let addr = (endpoint.host.as_str(), endpoint.port)
        .to_socket_addrs()
        .map_err(CDPError::Connect)?
        .next()
        .ok_or_else(|| {
            CDPError::Connect(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no address for {}", endpoint.host),
            ))
        })?;

    let mut stream = TcpStream::connect_timeout(&addr, timeout).map_err(CDPError::Connect)?;
    stream.set_read_timeout(Some(timeout)).map_err(CDPError::Connect)?;
    stream.set_nodelay(true).map_err(CDPError::Connect)?;

    upgrade(&mut stream, endpoint)?;
    Ok(stream)
}

/// Run the upgrade exchange over an already connected stream
pub fn upgrade<S: Read + Write>(stream: &mut S, endpoint: &Endpoint) -> Result<()> {
    let request = upgrade_request(endpoint, &new_key());
    stream.write_all(request.as_bytes())?;
    stream.flush()?;

    let head = read_response_head(stream)?;
    let status = head.lines().next().unwrap_or_default().to_string();
    if !status.contains("101") {
        return Err(CDPError::HandshakeRejected { status });
    }

    tracing::debug!(path = %endpoint.path, %status, "WebSocket upgrade accepted");
    Ok(())
}

/// 16 random bytes, base64 encoded
pub fn new_key() -> String {
    STANDARD.encode(rand::random::<[u8; 16]>())
}

pub fn upgrade_request(endpoint: &Endpoint, key: &str) -> String {
    format!(
        "GET {path} HTTP/1.1\r\n\
         Host: {host}:{port}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: {key}\r\n\
         Sec-WebSocket-Version: 13\r\n\
         \r\n",
        path = endpoint.path,
        host = endpoint.host,
        port = endpoint.port,
    )
}

/// Read up to and including the blank line that ends the response head.
///
/// Reads byte by byte so nothing past the head is consumed: the first
/// WebSocket frame may follow immediately.
fn read_response_head<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut head = Vec::with_capacity(256);
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        if head.len() >= MAX_RESPONSE_HEAD {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "upgrade response head too large",
            ));
        }
        match reader.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => head.push(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(String::from_utf8_lossy(&head).into_owned())
}
