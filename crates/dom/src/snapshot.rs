//! Snapshot parsing - turn a `DOM.getDocument` result into a [`DomNode`] tree
//!
//! Input format matches the `DOM.getDocument` result with `pierce: true`:
//! ```json
//! {
//!   "root": {
//!     "nodeId": 1,
//!     "nodeType": 9,
//!     "nodeName": "#document",
//!     "children": [...],
//!     "shadowRoots": [...],
//!     "contentDocument": {...}
//!   }
//! }
//! ```

use crate::error::{DomError, Result};
use crate::types::DomNode;
use serde::Deserialize;
use serde_json::Value;

/// Extract and parse the root node from a `DOM.getDocument` result
pub fn parse_document(result: &Value) -> Result<DomNode> {
    let root = result.get("root").ok_or(DomError::MissingRoot)?;
    Ok(DomNode::deserialize(root)?)
}

/// Parse a snapshot straight from response text.
///
/// Real documents nest far deeper than serde_json's default recursion
/// limit allows, so the limit is lifted here.
pub fn parse_document_str(text: &str) -> Result<DomNode> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)?;
    parse_document(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeType;

    #[test]
    fn test_parse_simple_dom() {
        let cdp_json = serde_json::json!({
            "root": {
                "nodeId": 1,
                "backendNodeId": 1,
                "nodeType": 9,
                "nodeName": "#document",
                "nodeValue": "",
                "children": [{
                    "nodeId": 2,
                    "backendNodeId": 2,
                    "nodeType": 1,
                    "nodeName": "HTML",
                    "nodeValue": "",
                    "attributes": []
                }]
            }
        });

        let root = parse_document(&cdp_json).unwrap();

        assert_eq!(root.kind(), Some(NodeType::Document));
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].tag_name(), Some("HTML"));
    }

    #[test]
    fn test_parse_missing_root() {
        let err = parse_document(&serde_json::json!({ "status": "sent" })).unwrap_err();
        assert!(matches!(err, DomError::MissingRoot));
    }

    #[test]
    fn test_parse_malformed_root() {
        let err = parse_document(&serde_json::json!({ "root": { "nodeType": 9 } })).unwrap_err();
        assert!(matches!(err, DomError::ParseError(_)));
    }

    #[test]
    fn test_parse_deeply_nested_text() {
        // 400 nested elements is past serde_json's default limit of 128
        let mut node = serde_json::json!({ "nodeId": 1000, "nodeType": 3, "nodeValue": "leaf" });
        for id in (0..400).rev() {
            node = serde_json::json!({
                "nodeId": id, "nodeType": 1, "nodeName": "DIV", "children": [node]
            });
        }
        let text = serde_json::json!({ "root": node }).to_string();

        let mut current = parse_document_str(&text).unwrap();
        let mut depth = 0;
        while let Some(child) = current.children.pop() {
            current = child;
            depth += 1;
        }
        assert_eq!(depth, 400);
        assert_eq!(current.node_value, "leaf");
    }
}
