//! EdgeSink trait: where the expansion pass pushes edges
//!
//! Edges are streamed out as they are classified, so the edge list never has
//! to be held in memory by the pass itself.

use super::error::OutputResult;
use super::writer::{write_edge, TableWriter, EDGE_HEADER};
use crate::graph::{Edge, EdgeKind};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Receiver for classified edges.
pub trait EdgeSink {
    /// Accept one edge
    fn accept(&mut self, edge: Edge) -> OutputResult<()>;

    /// Called once after the last edge of a run
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Collect edges in memory
impl EdgeSink for Vec<Edge> {
    fn accept(&mut self, edge: Edge) -> OutputResult<()> {
        self.push(edge);
        Ok(())
    }
}

/// Streams edges into an edge table, counting them per kind.
pub struct EdgeTableSink<W: Write> {
    table: TableWriter<W>,
    internal: u64,
    diffusion: u64,
}

impl EdgeTableSink<BufWriter<File>> {
    /// Create (or truncate) the edge table at `path`
    pub fn create(path: impl AsRef<Path>, delimiter: u8) -> OutputResult<Self> {
        Ok(Self::new(TableWriter::create(path, delimiter, &EDGE_HEADER)?))
    }
}

impl<W: Write> EdgeTableSink<W> {
    pub fn new(table: TableWriter<W>) -> Self {
        Self {
            table,
            internal: 0,
            diffusion: 0,
        }
    }

    pub fn internal_edges(&self) -> u64 {
        self.internal
    }

    pub fn diffusion_edges(&self) -> u64 {
        self.diffusion
    }

    pub fn into_table(self) -> TableWriter<W> {
        self.table
    }
}

impl<W: Write> EdgeSink for EdgeTableSink<W> {
    fn accept(&mut self, edge: Edge) -> OutputResult<()> {
        write_edge(&mut self.table, &edge)?;
        match edge.kind {
            EdgeKind::Internal => self.internal += 1,
            EdgeKind::Diffusion => self.diffusion += 1,
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.table.flush()
    }
}
