//! Directed citation edges

use super::key::RecordKey;
use serde::{Deserialize, Serialize};

/// Why an edge was captured during expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Both endpoints lie in the monitored set (core and direct citers)
    Internal,
    /// The target is a giant; the source may be anywhere
    Diffusion,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "Internal",
            Self::Diffusion => "Diffusion",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge: `source` cites `target`.
///
/// Edges are a projection of archive rows, not a canonical store. The same
/// pair may appear several times, and may appear once per kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: RecordKey,
    pub target: RecordKey,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(source: RecordKey, target: RecordKey, kind: EdgeKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }

    pub fn internal(source: RecordKey, target: RecordKey) -> Self {
        Self::new(source, target, EdgeKind::Internal)
    }

    pub fn diffusion(source: RecordKey, target: RecordKey) -> Self {
        Self::new(source, target, EdgeKind::Diffusion)
    }
}
