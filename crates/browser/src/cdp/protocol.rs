//! CDP Protocol Types
//!
//! These are the fundamental types for CDP communication.
//! Keep them minimal - add domain-specific types only when needed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request ID, unique among in-flight commands on one connection
pub type RequestId = u64;

/// Target ID from the discovery feed
pub type TargetId = String;

/// CDP Request sent to the remote application
#[derive(Debug, Clone, Serialize)]
pub struct CDPRequest {
    pub id: RequestId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// CDP Response from the remote application
#[derive(Debug, Clone, Deserialize)]
pub struct CDPResponse {
    pub id: RequestId,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ResponseError>,
}

/// Error object carried by a response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseError {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Outcome of one command round trip.
///
/// `Unconfirmed` means the command went out but no response with its id
/// arrived before the deadline. That covers both "lost" and "accepted
/// without reply"; the two cannot be told apart on this wire.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Response(Value),
    Unconfirmed,
}

impl CallOutcome {
    pub fn into_response(self) -> Option<Value> {
        match self {
            CallOutcome::Response(value) => Some(value),
            CallOutcome::Unconfirmed => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, CallOutcome::Response(_))
    }
}

/// One entry of the `/json/list` discovery feed
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Target {
    pub id: TargetId,
    #[serde(rename = "type", default)]
    pub target_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(
        rename = "webSocketDebuggerUrl",
        alias = "webSocketUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub web_socket_url: Option<String>,
}

impl Target {
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }
}

/// Content quad of a node: four corner x/y pairs
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Quad(pub [f64; 8]);

impl Quad {
    /// Mean of the four corners
    pub fn centroid(&self) -> (f64, f64) {
        let q = &self.0;
        ((q[0] + q[2] + q[4] + q[6]) / 4.0, (q[1] + q[3] + q[5] + q[7]) / 4.0)
    }
}

/// Subset of `DOM.getBoxModel`'s `model`
#[derive(Debug, Clone, Deserialize)]
pub struct BoxModel {
    pub content: Quad,
}
