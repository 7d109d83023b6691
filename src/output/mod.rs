//! Output tables: nodes, edges, histories, links, key lists and profiles

mod error;
mod sink;
mod writer;

pub use error::{OutputError, OutputResult};
pub use sink::{EdgeSink, EdgeTableSink};
pub use writer::{
    write_edge, write_keys, write_nodes, write_summary, TableWriter, EDGE_HEADER, LINK_HEADER,
    NODE_HEADER, PROFILE_HEADER, SEED_HEADER, SUMMARY_HEADER,
};
