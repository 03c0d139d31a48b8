//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. A node that cannot be found is not an
//! error: searches return `Option`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Missing 'root' in DOM.getDocument result")]
    MissingRoot,

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}
