//! DOM snapshot model and node location.
//!
//! ## Core Design
//!
//! ```text
//! DOM.getDocument JSON → DomNode tree (owned) → Bfs iterator → first match
//!                              ↓
//!           children / shadowRoots / contentDocument edges
//! ```
//!
//! The tree mirrors the wire format so a search can hand back the node and
//! its parent by reference; clicking the parent of a matched text node is
//! the usual way to hit a button.

pub mod error;
pub mod search;
pub mod snapshot;
pub mod types;

pub use error::{DomError, Result};
pub use search::{
    bfs, find_by_attribute, find_by_exact_text, find_by_node_id, find_by_text, text_content,
    TextMatch, Visit,
};
pub use snapshot::{parse_document, parse_document_str};
pub use types::*;
