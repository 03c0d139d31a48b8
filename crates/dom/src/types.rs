//! Core type definitions for DOM snapshots returned by `DOM.getDocument`
//!
//! Key design principles:
//! 1. Mirror the wire shape: a node owns its children, shadow roots and
//!    embedded document, so the three edge kinds stay explicit
//! 2. Attributes keep the flat `[name, value, name, value, ...]` order
//! 3. Use SmallVec for attributes (most elements carry only a few)

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier assigned by the remote DOM agent
pub type NodeId = i64;

/// Node type matching DOM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            2 => Some(NodeType::Attribute),
            3 => Some(NodeType::Text),
            4 => Some(NodeType::CdataSection),
            5 => Some(NodeType::EntityReference),
            6 => Some(NodeType::Entity),
            7 => Some(NodeType::ProcessingInstruction),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            10 => Some(NodeType::DocumentType),
            11 => Some(NodeType::DocumentFragment),
            12 => Some(NodeType::Notation),
            _ => None,
        }
    }
}

/// Which edge led from a parent to a node during traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Child,
    ShadowRoot,
    ContentDocument,
}

/// One node of a pierced DOM snapshot.
///
/// Unknown wire fields are ignored; missing collections default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    pub node_id: NodeId,

    /// Raw `nodeType`; see [`DomNode::kind`]
    #[serde(default)]
    pub node_type: u8,

    #[serde(default)]
    pub node_name: String,

    #[serde(default)]
    pub node_value: String,

    /// Alternating name/value strings, in document order
    #[serde(default)]
    pub attributes: SmallVec<[String; 8]>,

    #[serde(default)]
    pub children: Vec<DomNode>,

    #[serde(default)]
    pub shadow_roots: Vec<DomNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_document: Option<Box<DomNode>>,
}

impl DomNode {
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: impl Into<String>) -> Self {
        Self {
            node_id,
            node_type: node_type as u8,
            node_name: node_name.into(),
            ..Self::default()
        }
    }

    /// Convenience constructor for `#text` nodes
    pub fn text(node_id: NodeId, value: impl Into<String>) -> Self {
        Self {
            node_value: value.into(),
            ..Self::new(node_id, NodeType::Text, "#text")
        }
    }

    pub fn kind(&self) -> Option<NodeType> {
        NodeType::from_u8(self.node_type)
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.kind() == Some(NodeType::Element)
    }

    /// Check if node is text
    pub fn is_text(&self) -> bool {
        self.kind() == Some(NodeType::Text)
    }

    /// Tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        self.is_element().then_some(self.node_name.as_str())
    }

    /// Name/value pairs; a trailing unpaired name is dropped
    pub fn attribute_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .chunks_exact(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attribute_pairs()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self.attributes.push(value.into());
        self
    }

    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_shadow_root(mut self, root: DomNode) -> Self {
        self.shadow_roots.push(root);
        self
    }

    pub fn with_content_document(mut self, document: DomNode) -> Self {
        self.content_document = Some(Box::new(document));
        self
    }

    /// Outgoing edges in traversal order: children, shadow roots, content document
    pub fn edges(&self) -> impl Iterator<Item = (Edge, &DomNode)> {
        self.children
            .iter()
            .map(|n| (Edge::Child, n))
            .chain(self.shadow_roots.iter().map(|n| (Edge::ShadowRoot, n)))
            .chain(
                self.content_document
                    .as_deref()
                    .map(|n| (Edge::ContentDocument, n)),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_node() {
        let node: DomNode = serde_json::from_value(serde_json::json!({
            "nodeId": 4,
            "backendNodeId": 40,
            "nodeType": 1,
            "nodeName": "BUTTON",
            "localName": "button",
            "attributes": ["class", "primary", "title", "Send"],
            "childNodeCount": 1,
            "children": [{ "nodeId": 5, "nodeType": 3, "nodeName": "#text", "nodeValue": "Send" }]
        }))
        .unwrap();

        assert_eq!(node.node_id, 4);
        assert_eq!(node.tag_name(), Some("BUTTON"));
        assert_eq!(node.attr("title"), Some("Send"));
        assert!(node.children[0].is_text());
        assert!(node.shadow_roots.is_empty());
        assert!(node.content_document.is_none());
    }

    #[test]
    fn test_attribute_pairs_drop_unpaired_tail() {
        let mut node = DomNode::new(1, NodeType::Element, "DIV").with_attr("id", "main");
        node.attributes.push("dangling".to_string());

        let pairs: Vec<_> = node.attribute_pairs().collect();
        assert_eq!(pairs, vec![("id", "main")]);
        assert_eq!(node.attr("dangling"), None);
    }

    #[test]
    fn test_edges_order() {
        let node = DomNode::new(1, NodeType::Element, "IFRAME")
            .with_content_document(DomNode::new(4, NodeType::Document, "#document"))
            .with_shadow_root(DomNode::new(3, NodeType::DocumentFragment, "#document-fragment"))
            .with_child(DomNode::text(2, "a"));

        let order: Vec<_> = node.edges().map(|(edge, n)| (edge, n.node_id)).collect();
        assert_eq!(
            order,
            vec![
                (Edge::Child, 2),
                (Edge::ShadowRoot, 3),
                (Edge::ContentDocument, 4)
            ]
        );
    }

    #[test]
    fn test_unknown_node_type() {
        let node = DomNode {
            node_type: 42,
            ..DomNode::default()
        };
        assert_eq!(node.kind(), None);
        assert!(!node.is_text());
    }
}
