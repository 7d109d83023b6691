//! NodeTable: layered node list with one row per key

use super::key::RecordKey;
use super::node::{Layer, Node};
use std::collections::HashMap;

/// Node list that holds each key at most once.
///
/// Rows keep insertion order. Offering a key that is already present only
/// replaces the row when the new layer has higher priority.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: Vec<Node>,
    index: HashMap<RecordKey, usize>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a node to the table.
    ///
    /// Returns `true` if the table changed.
    pub fn offer(&mut self, node: Node) -> bool {
        match self.index.get(&node.id) {
            Some(&pos) => {
                if node.layer < self.nodes[pos].layer {
                    self.nodes[pos] = node;
                    true
                } else {
                    false
                }
            }
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
                true
            }
        }
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Node> {
        self.index.get(key).map(|&pos| &self.nodes[pos])
    }

    pub fn layer_of(&self, key: &RecordKey) -> Option<Layer> {
        self.get(key).map(|n| n.layer)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Number of rows in the given layer
    pub fn count_in(&self, layer: Layer) -> usize {
        self.nodes.iter().filter(|n| n.layer == layer).count()
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}
