//! Node representation in the diffusion graph

use super::key::RecordKey;
use serde::{Deserialize, Serialize};

/// Weight recorded for third-hop nodes, whose global citation count is never
/// computed.
pub const DIFFUSION_WEIGHT: u64 = 1;

/// Layer a record occupies in the diffusion graph.
///
/// Variants are declared in priority order: when a key qualifies for several
/// layers it is recorded under the earliest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    /// The seed record everything is rooted at
    Core,
    /// A direct citer of the core that made it into the giant set
    Awakener,
    /// Any other direct citer of the core
    #[serde(rename = "Citing_L2")]
    CitingL2,
    /// A record outside the monitored set that cites a giant
    #[serde(rename = "Diffusion_L3")]
    DiffusionL3,
}

impl Layer {
    /// Label used in the node table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::Awakener => "Awakener",
            Self::CitingL2 => "Citing_L2",
            Self::DiffusionL3 => "Diffusion_L3",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the node table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Record key
    pub id: RecordKey,
    /// Highest-priority layer the key qualifies for
    pub layer: Layer,
    /// Global citation count, or [`DIFFUSION_WEIGHT`] for third-hop nodes
    pub weight: u64,
}

impl Node {
    pub fn new(id: RecordKey, layer: Layer, weight: u64) -> Self {
        Self { id, layer, weight }
    }

    /// A third-hop node with the sentinel weight
    pub fn diffusion(id: RecordKey) -> Self {
        Self::new(id, Layer::DiffusionL3, DIFFUSION_WEIGHT)
    }
}
