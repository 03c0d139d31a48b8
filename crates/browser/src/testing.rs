//! Fake DevTools endpoint for tests
//!
//! Listens on an ephemeral localhost port and speaks just enough of the
//! real thing: `GET /json/list` returns the configured targets, upgrade
//! requests get a `101` (or a rejection), client frames are unmasked and
//! handed to a reply script, replies go back as unmasked server frames.
//! `Reply::Raw` bypasses framing to produce broken streams.
//! Every connection runs on its own thread.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use crate::ws::frame::{apply_mask, encode_with_key};
use crate::ws::handshake::Endpoint;

type Script = Box<dyn FnMut(&Value) -> Vec<Reply> + Send>;

/// How upgrade requests are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upgrade {
    Accept,
    Reject,
}

/// One scripted action after a request frame
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    /// Bytes written as-is, without a frame around them
    Raw(Vec<u8>),
    Delay(Duration),
    Hangup,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    pub fn result(id: &Value, result: Value) -> Self {
        Reply::Text(json!({ "id": id, "result": result }).to_string())
    }

    pub fn error(id: &Value, code: i32, message: &str) -> Self {
        let error = json!({ "code": code, "message": message });
        Reply::Text(json!({ "id": id, "error": error }).to_string())
    }

    pub fn event(method: &str) -> Self {
        Reply::Text(json!({ "method": method, "params": {} }).to_string())
    }
}

#[derive(Default)]
struct State {
    targets: Vec<Value>,
    requests: Vec<Value>,
    upgrade_paths: Vec<String>,
    disconnects: usize,
}

pub struct FakeDevtoolsBuilder {
    targets: Vec<Value>,
    upgrade: Upgrade,
    script: Option<Script>,
}

impl FakeDevtoolsBuilder {
    /// Entries served from `/json/list`
    pub fn targets(mut self, targets: Vec<Value>) -> Self {
        self.targets = targets;
        self
    }

    pub fn upgrade(mut self, upgrade: Upgrade) -> Self {
        self.upgrade = upgrade;
        self
    }

    /// Reply script; defaults to `{"id": <id>, "result": {}}` for everything
    pub fn on_request<F>(mut self, script: F) -> Self
    where
        F: FnMut(&Value) -> Vec<Reply> + Send + 'static,
    {
        self.script = Some(Box::new(script));
        self
    }

    pub fn spawn(self) -> FakeDevtools {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake devtools");
        let port = listener.local_addr().expect("local addr").port();
        let state = Arc::new(Mutex::new(State {
            targets: self.targets,
            ..Default::default()
        }));
        let stop = Arc::new(AtomicBool::new(false));
        let script: Script = match self.script {
            Some(script) => script,
            None => Box::new(|request: &Value| vec![Reply::result(&request["id"], json!({}))]),
        };
        let script = Arc::new(Mutex::new(script));
        let upgrade = self.upgrade;

        let accept_state = state.clone();
        let accept_stop = stop.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                if accept_stop.load(Ordering::SeqCst) {
                    break;
                }
                let Ok(stream) = stream else { continue };
                let state = accept_state.clone();
                let script = script.clone();
                thread::spawn(move || {
                    let _ = serve(stream, upgrade, &script, &state);
                });
            }
        });

        FakeDevtools { port, state, stop }
    }
}

pub struct FakeDevtools {
    port: u16,
    state: Arc<Mutex<State>>,
    stop: Arc<AtomicBool>,
}

impl FakeDevtools {
    pub fn builder() -> FakeDevtoolsBuilder {
        FakeDevtoolsBuilder {
            targets: Vec::new(),
            upgrade: Upgrade::Accept,
            script: None,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn endpoint(&self, path: &str) -> Endpoint {
        Endpoint::new("127.0.0.1", self.port, path)
    }

    /// Replace the entries served from `/json/list`
    pub fn set_targets(&self, targets: Vec<Value>) {
        self.lock().targets = targets;
    }

    /// A `page` target entry pointing back at this server
    pub fn page_target(&self, id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "type": "page",
            "title": title,
            "url": "app://workbench",
            "webSocketDebuggerUrl": format!("ws://127.0.0.1:{}/devtools/page/{}", self.port, id),
        })
    }

    /// Decoded request frames received so far, across all connections
    pub fn requests(&self) -> Vec<Value> {
        self.lock().requests.clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r["method"].as_str().map(String::from))
            .collect()
    }

    pub fn upgrade_paths(&self) -> Vec<String> {
        self.lock().upgrade_paths.clone()
    }

    /// Poll until `count` upgraded connections have ended
    pub fn wait_for_disconnects(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.lock().disconnects >= count {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for FakeDevtools {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        // Wake the accept loop so it sees the flag
        let _ = TcpStream::connect(("127.0.0.1", self.port));
    }
}

fn serve(
    mut stream: TcpStream,
    upgrade: Upgrade,
    script: &Mutex<Script>,
    state: &Mutex<State>,
) -> io::Result<()> {
    let head = read_head(&mut stream)?;
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();

    if !head.to_ascii_lowercase().contains("upgrade: websocket") {
        let targets = lock(state).targets.clone();
        return serve_http(&mut stream, &path, &targets);
    }

    lock(state).upgrade_paths.push(path);

    if upgrade == Upgrade::Reject {
        stream.write_all(b"HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\n\r\n")?;
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink);
        lock(state).disconnects += 1;
        return Ok(());
    }

    stream.write_all(
        b"HTTP/1.1 101 Switching Protocols\r\n\
          Upgrade: websocket\r\n\
          Connection: Upgrade\r\n\
          Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n\r\n",
    )?;

    'frames: while let Ok(payload) = read_client_frame(&mut stream) {
        let Ok(request) = serde_json::from_slice::<Value>(&payload) else {
            continue;
        };
        lock(state).requests.push(request.clone());

        let replies = {
            let mut guard = script.lock().unwrap_or_else(|e| e.into_inner());
            let reply_for = &mut *guard;
            reply_for(&request)
        };
        for reply in replies {
            match reply {
                Reply::Text(text) => stream.write_all(&encode_with_key(text.as_bytes(), None))?,
                Reply::Raw(bytes) => stream.write_all(&bytes)?,
                Reply::Delay(delay) => thread::sleep(delay),
                Reply::Hangup => {
                    let _ = stream.shutdown(Shutdown::Both);
                    break 'frames;
                }
            }
        }
    }

    lock(state).disconnects += 1;
    Ok(())
}

fn serve_http(stream: &mut TcpStream, path: &str, targets: &[Value]) -> io::Result<()> {
    if path.starts_with("/json") {
        let body = Value::Array(targets.to_vec()).to_string();
        write!(
            stream,
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            body.len(),
            body
        )?;
    } else {
        stream.write_all(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )?;
    }
    stream.flush()
}

fn read_head(stream: &mut TcpStream) -> io::Result<String> {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        if stream.read(&mut byte)? == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        head.push(byte[0]);
    }
    Ok(String::from_utf8_lossy(&head).into_owned())
}

/// Read one client frame and return its unmasked payload
fn read_client_frame(stream: &mut TcpStream) -> io::Result<Vec<u8>> {
    let mut head = [0u8; 2];
    stream.read_exact(&mut head)?;
    let len = match head[1] & 0x7F {
        126 => {
            let mut ext = [0u8; 2];
            stream.read_exact(&mut ext)?;
            u16::from_be_bytes(ext) as usize
        }
        127 => {
            let mut ext = [0u8; 8];
            stream.read_exact(&mut ext)?;
            u64::from_be_bytes(ext) as usize
        }
        short => short as usize,
    };
    let key = if head[1] & 0x80 != 0 {
        let mut key = [0u8; 4];
        stream.read_exact(&mut key)?;
        Some(key)
    } else {
        None
    };
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload)?;
    if let Some(key) = key {
        apply_mask(&mut payload, key);
    }
    Ok(payload)
}

fn lock(state: &Mutex<State>) -> std::sync::MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
