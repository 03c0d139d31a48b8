//! Minimal WebSocket client over `std::net::TcpStream`
//!
//! Handshake, frame codec and a blocking transport. No TLS, no
//! extensions, one text message per frame.

pub mod frame;
pub mod handshake;
pub mod transport;

pub use handshake::Endpoint;
pub use transport::Transport;
