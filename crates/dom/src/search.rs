//! Node location over a pierced snapshot
//!
//! Every search is a breadth-first walk that crosses all three edge kinds
//! (children, shadow roots, content documents), so elements inside web
//! components and iframes are reachable. The first match in level order
//! wins. There is no depth or node-count cap.

use std::collections::VecDeque;

use crate::types::{DomNode, Edge, NodeId};

/// A node reached during traversal, with the node it was reached from
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a DomNode,
    pub parent: Option<&'a DomNode>,
    pub edge: Option<Edge>,
}

/// Result of a text search: the text node and the element that holds it
#[derive(Debug, Clone, Copy)]
pub struct TextMatch<'a> {
    pub node: &'a DomNode,
    pub parent: Option<&'a DomNode>,
}

/// Level-order iterator over a snapshot
pub struct Bfs<'a> {
    queue: VecDeque<Visit<'a>>,
}

impl<'a> Iterator for Bfs<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.queue.pop_front()?;
        for (edge, next) in visit.node.edges() {
            self.queue.push_back(Visit {
                node: next,
                parent: Some(visit.node),
                edge: Some(edge),
            });
        }
        Some(visit)
    }
}

/// Traverse breadth-first from `root`
pub fn bfs(root: &DomNode) -> Bfs<'_> {
    let mut queue = VecDeque::new();
    queue.push_back(Visit {
        node: root,
        parent: None,
        edge: None,
    });
    Bfs { queue }
}

/// First text node whose value contains `needle`
pub fn find_by_text<'a>(
    root: &'a DomNode,
    needle: &str,
    case_insensitive: bool,
) -> Option<TextMatch<'a>> {
    let needle_lower = needle.to_lowercase();
    find_text_node(root, |value| {
        if case_insensitive {
            value.to_lowercase().contains(&needle_lower)
        } else {
            value.contains(needle)
        }
    })
}

/// First text node whose trimmed value equals `text`, ignoring case
pub fn find_by_exact_text<'a>(root: &'a DomNode, text: &str) -> Option<TextMatch<'a>> {
    let wanted = text.trim().to_lowercase();
    find_text_node(root, |value| value.trim().to_lowercase() == wanted)
}

fn find_text_node<'a, F>(root: &'a DomNode, matches: F) -> Option<TextMatch<'a>>
where
    F: Fn(&str) -> bool,
{
    bfs(root)
        .find(|visit| visit.node.is_text() && matches(&visit.node.node_value))
        .map(|visit| TextMatch {
            node: visit.node,
            parent: visit.parent,
        })
}

/// First node carrying attribute `name` whose value contains `value_part`
/// (case-insensitive on the value, exact on the name)
pub fn find_by_attribute<'a>(
    root: &'a DomNode,
    name: &str,
    value_part: &str,
) -> Option<&'a DomNode> {
    let value_part = value_part.to_lowercase();
    bfs(root)
        .map(|visit| visit.node)
        .find(|node| {
            node.attribute_pairs()
                .any(|(key, value)| key == name && value.to_lowercase().contains(&value_part))
        })
}

pub fn find_by_node_id(root: &DomNode, node_id: NodeId) -> Option<&DomNode> {
    bfs(root).map(|visit| visit.node).find(|node| node.node_id == node_id)
}

/// Concatenated text beneath `node`, in traversal order, trimmed
pub fn text_content(node: &DomNode) -> String {
    let text: String = bfs(node)
        .filter(|visit| visit.node.is_text())
        .map(|visit| visit.node.node_value.as_str())
        .collect();
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeType;

    fn element(id: NodeId, name: &str) -> DomNode {
        DomNode::new(id, NodeType::Element, name)
    }

    /// document
    ///   HTML
    ///     BODY
    ///       APP-SHELL
    ///         #shadow-root
    ///           DIV
    ///             BUTTON
    ///               "Stop generating"
    ///       IFRAME
    ///         #document
    ///           DIV contenteditable data-lexical-editor=true
    fn sample() -> DomNode {
        let shadow = DomNode::new(10, NodeType::DocumentFragment, "#document-fragment").with_child(
            element(11, "DIV")
                .with_child(element(12, "BUTTON").with_child(DomNode::text(13, "Stop generating"))),
        );
        let frame_doc = DomNode::new(20, NodeType::Document, "#document").with_child(
            element(21, "DIV")
                .with_attr("contenteditable", "true")
                .with_attr("data-lexical-editor", "TRUE"),
        );
        DomNode::new(1, NodeType::Document, "#document").with_child(
            element(2, "HTML").with_child(
                element(3, "BODY")
                    .with_child(element(4, "APP-SHELL").with_shadow_root(shadow))
                    .with_child(element(5, "IFRAME").with_content_document(frame_doc)),
            ),
        )
    }

    #[test]
    fn test_find_text_inside_shadow_root() {
        let root = sample();
        let hit = find_by_text(&root, "stop GENERATING", true).unwrap();

        assert_eq!(hit.node.node_id, 13);
        assert_eq!(hit.parent.map(|p| p.node_id), Some(12));
    }

    #[test]
    fn test_find_text_case_sensitive() {
        let root = sample();
        assert!(find_by_text(&root, "stop generating", false).is_none());
        assert!(find_by_text(&root, "Stop gen", false).is_some());
    }

    #[test]
    fn test_find_attribute_inside_content_document() {
        let root = sample();
        let node = find_by_attribute(&root, "data-lexical-editor", "true").unwrap();
        assert_eq!(node.node_id, 21);
    }

    #[test]
    fn test_attribute_name_is_exact() {
        let root = sample();
        assert!(find_by_attribute(&root, "DATA-LEXICAL-EDITOR", "true").is_none());
        assert!(find_by_attribute(&root, "data-lexical-editor", "false").is_none());
    }

    #[test]
    fn test_text_search_ignores_attributes_and_elements() {
        let root = element(1, "DIV")
            .with_attr("title", "Submit")
            .with_child(element(2, "SPAN"));
        assert!(find_by_text(&root, "Submit", true).is_none());
    }

    #[test]
    fn test_first_match_is_level_order() {
        // The shallow match sits under the content document, the deep one
        // under a child; level order must still prefer the shallower node.
        let deep = element(2, "DIV")
            .with_child(element(3, "DIV").with_child(DomNode::text(4, "Submit")));
        let frame = DomNode::new(5, NodeType::Document, "#document")
            .with_child(DomNode::text(6, "Submit"));
        let root = element(1, "DIV").with_child(deep).with_content_document(frame);

        let hit = find_by_text(&root, "submit", true).unwrap();
        assert_eq!(hit.node.node_id, 6);
    }

    #[test]
    fn test_shadow_roots_before_content_document_at_same_level() {
        let frame =
            DomNode::new(2, NodeType::Document, "#document").with_child(DomNode::text(3, "Go"));
        let shadow = DomNode::new(4, NodeType::DocumentFragment, "#document-fragment")
            .with_child(DomNode::text(5, "Go"));
        let root = element(1, "X-HOST")
            .with_content_document(frame)
            .with_shadow_root(shadow);

        let hit = find_by_text(&root, "go", true).unwrap();
        assert_eq!(hit.node.node_id, 5);
    }

    #[test]
    fn test_bfs_visits_every_edge_kind() {
        let root = sample();
        let ids: Vec<_> = bfs(&root).map(|v| v.node.node_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 10, 20, 11, 21, 12, 13]);
    }

    #[test]
    fn test_exact_text() {
        let root = element(1, "DIV")
            .with_child(element(2, "BUTTON").with_child(DomNode::text(3, "Log in with SSO")))
            .with_child(element(4, "BUTTON").with_child(DomNode::text(5, "  Log In ")));

        let hit = find_by_exact_text(&root, "log in").unwrap();
        assert_eq!(hit.parent.map(|p| p.node_id), Some(4));
    }

    #[test]
    fn test_find_by_node_id_and_text_content() {
        let root = sample();
        let button = find_by_node_id(&root, 12).unwrap();
        assert_eq!(button.tag_name(), Some("BUTTON"));
        assert_eq!(text_content(find_by_node_id(&root, 4).unwrap()), "Stop generating");
        assert!(find_by_node_id(&root, 999).is_none());
    }
}
