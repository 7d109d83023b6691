//! Node table assembly from the handoff values of the three passes

use super::diffusion::{HopOne, Weights};
use crate::graph::{KeySet, Layer, Node, NodeTable};

/// Build the layered node table.
///
/// Rows are offered core first, then direct citers in discovery order, then
/// layer-3 keys in key order. [`NodeTable::offer`] keeps the highest-priority
/// layer for a key, so a seed that also cites itself stays `Core` and no key
/// appears twice.
pub fn assemble(hop: &HopOne, weights: &Weights, layer3: &KeySet) -> NodeTable {
    let mut nodes = NodeTable::new();
    nodes.offer(Node::new(hop.seed.clone(), Layer::Core, hop.seed_citations));

    for key in &hop.order {
        let layer = if weights.is_giant(key) {
            Layer::Awakener
        } else {
            Layer::CitingL2
        };
        nodes.offer(Node::new(key.clone(), layer, weights.weight_of(key)));
    }

    for key in layer3.sorted() {
        nodes.offer(Node::diffusion(key));
    }
    nodes
}
