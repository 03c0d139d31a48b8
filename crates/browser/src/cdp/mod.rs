//! CDP (Chrome DevTools Protocol) Client Implementation
//!
//! Core principle: one blocking WebSocket, one command in flight.
//! Callers share a `CDPClient` through `Arc` and the connection mutex
//! serializes their round trips.

pub mod client;
pub mod discovery;
pub mod ids;
pub mod input;
pub mod page;
pub mod protocol;

pub use client::{CDPClient, CDPError, ClientConfig, Result};
pub use discovery::{select_target, HttpTargetSource, StaticTargets, TargetSource};
pub use ids::{ClockIds, IdAllocator, SequentialIds};
pub use input::Modifiers;
pub use page::Page;
pub use protocol::{CDPRequest, CDPResponse, CallOutcome, Quad, Target};
