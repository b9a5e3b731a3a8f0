//! Indexed view over one fetched accessibility tree.
//!
//! The tree is owned by a single extraction call and rebuilt from scratch
//! every time; node ids carry no identity across calls.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Deserialize;
use viewdriver_core_types::Rect;

use cdp_session::AxNodeRecord;

pub struct AxTree {
    nodes: Vec<AxNodeRecord>,
    index: HashMap<String, usize>,
}

impl AxTree {
    pub fn new(nodes: Vec<AxNodeRecord>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.node_id.clone(), position))
            .collect();
        Self { nodes, index }
    }

    pub fn nodes(&self) -> &[AxNodeRecord] {
        &self.nodes
    }

    pub fn get(&self, node_id: &str) -> Option<&AxNodeRecord> {
        self.index.get(node_id).map(|position| &self.nodes[*position])
    }

    /// First node without a parent, else the first node in protocol order.
    pub fn root(&self) -> Option<&AxNodeRecord> {
        self.nodes
            .iter()
            .find(|node| node.parent_id.is_none())
            .or_else(|| self.nodes.first())
    }

    /// The node and its whole subtree, by `child_ids` traversal.
    pub fn subtree_ids(&self, node_id: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([node_id.to_string()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(node) = self.get(&current) {
                for child in &node.child_ids {
                    queue.push_back(child.clone());
                }
            }
        }
        seen
    }

    /// Every ancestor up to the root, nearest first.
    pub fn ancestor_ids(&self, node_id: &str) -> Vec<String> {
        let mut ancestors = Vec::new();
        let mut current = self.get(node_id).and_then(|node| node.parent_id.clone());
        while let Some(parent_id) = current {
            if ancestors.contains(&parent_id) {
                break;
            }
            current = self.get(&parent_id).and_then(|node| node.parent_id.clone());
            ancestors.push(parent_id);
        }
        ancestors
    }
}

/// Page viewport geometry at extraction time.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
}

impl Viewport {
    pub fn fallback() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }
}

/// Computed once per extraction, consumed read-only during filtering.
pub struct VisibilityContext {
    pub has_active_modal: bool,
    pub modal_node_ids: HashSet<String>,
    pub aria_hidden_ids: HashSet<String>,
    pub viewport: Rect,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, parent: Option<&str>, children: &[&str]) -> AxNodeRecord {
        AxNodeRecord {
            node_id: id.to_string(),
            parent_id: parent.map(|p| p.to_string()),
            child_ids: children.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn subtree_collects_descendants() {
        let tree = AxTree::new(vec![
            node("1", None, &["2", "3"]),
            node("2", Some("1"), &["4"]),
            node("3", Some("1"), &[]),
            node("4", Some("2"), &[]),
        ]);
        let subtree = tree.subtree_ids("2");
        assert_eq!(subtree.len(), 2);
        assert!(subtree.contains("2") && subtree.contains("4"));
    }

    #[test]
    fn ancestors_walk_to_the_root() {
        let tree = AxTree::new(vec![
            node("1", None, &["2"]),
            node("2", Some("1"), &["3"]),
            node("3", Some("2"), &[]),
        ]);
        assert_eq!(tree.ancestor_ids("3"), vec!["2".to_string(), "1".to_string()]);
        assert_eq!(tree.root().unwrap().node_id, "1");
    }
}
