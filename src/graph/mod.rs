//! Core graph data structures

mod edge;
mod key;
mod node;
mod table;


pub use edge::{Edge, EdgeKind};
pub use key::{canonical_key, KeySet, RecordKey};
pub use node::{Layer, Node, DIFFUSION_WEIGHT};
pub use table::NodeTable;
