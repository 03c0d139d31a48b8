//! Remote-debugging automation over a hand-rolled WebSocket
//!
//! This crate drives a graphical application through its DevTools
//! endpoint: target discovery, a blocking command channel, DOM snapshots,
//! synthetic input and a generation monitor.
//!
//! # Architecture
//!
//! 1. **Wire first**: `ws` owns the socket, the upgrade and the frame codec
//! 2. **One command at a time**: `CDPClient` holds its connection lock for
//!    the whole round trip
//! 3. **Lazy recovery**: a broken connection is dropped and the next
//!    command reconnects

pub mod cdp;
pub mod generation;
pub mod ws;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use cdp::{CDPClient, CDPError, CallOutcome, ClientConfig, Modifiers, Page, Result};
pub use generation::{
    GenerationMonitor, GenerationProbe, GenerationState, MonitorConfig, WaitOutcome,
};
