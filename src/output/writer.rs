//! Delimited table writers
//!
//! Every table is created fresh (truncating any previous run) with a fixed
//! column order, and its header is written exactly once at creation.

use super::error::{OutputError, OutputResult};
use crate::aggregate::CitationHistory;
use crate::graph::{Edge, Node, RecordKey};
use csv::{Writer, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const NODE_HEADER: [&str; 3] = ["id", "layer", "weight"];
pub const EDGE_HEADER: [&str; 3] = ["source", "target", "type"];
pub const SUMMARY_HEADER: [&str; 4] = [
    "target_id",
    "birth_year",
    "total_citations",
    "history_string",
];
pub const LINK_HEADER: [&str; 3] = ["source_id", "target_id", "citation_date"];
pub const SEED_HEADER: [&str; 1] = ["patent_id"];
pub const PROFILE_HEADER: [&str; 4] = ["citing_id", "year", "assignee", "cpc_groups"];

/// A delimited table being written row by row.
pub struct TableWriter<W: Write> {
    writer: Writer<W>,
    path: PathBuf,
    rows: u64,
}

impl TableWriter<BufWriter<File>> {
    /// Create (or truncate) `path` and write the header.
    pub fn create(path: impl AsRef<Path>, delimiter: u8, header: &[&str]) -> OutputResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
        }
        let file = File::create(&path).map_err(|e| OutputError::io(&path, e))?;
        Self::from_writer(BufWriter::new(file), path, delimiter, header)
    }
}

impl<W: Write> TableWriter<W> {
    /// Wrap an arbitrary sink; `label` names it in errors.
    pub fn from_writer(
        inner: W,
        label: impl Into<PathBuf>,
        delimiter: u8,
        header: &[&str],
    ) -> OutputResult<Self> {
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(header)?;
        Ok(Self {
            writer,
            path: label.into(),
            rows: 0,
        })
    }

    pub fn write_row<I, T>(&mut self, row: I) -> OutputResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(row)?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written, excluding the header
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::io(&self.path, e))
    }

    /// Flush and hand back the inner sink
    pub fn into_inner(self) -> OutputResult<W> {
        let path = self.path;
        self.writer
            .into_inner()
            .map_err(|e| OutputError::io(&path, e.into_error()))
    }
}

/// Write the node table
pub fn write_nodes<'a>(
    path: impl AsRef<Path>,
    delimiter: u8,
    nodes: impl IntoIterator<Item = &'a Node>,
) -> OutputResult<u64> {
    let mut table = TableWriter::create(path, delimiter, &NODE_HEADER)?;
    for node in nodes {
        table.write_row([
            node.id.as_str(),
            node.layer.as_str(),
            node.weight.to_string().as_str(),
        ])?;
    }
    table.flush()?;
    Ok(table.rows_written())
}

/// Write an edge row
pub fn write_edge<W: Write>(table: &mut TableWriter<W>, edge: &Edge) -> OutputResult<()> {
    table.write_row([edge.source.as_str(), edge.target.as_str(), edge.kind.as_str()])
}

/// Write the citation-history summary table
pub fn write_summary(
    path: impl AsRef<Path>,
    delimiter: u8,
    histories: &[CitationHistory],
) -> OutputResult<u64> {
    let mut table = TableWriter::create(path, delimiter, &SUMMARY_HEADER)?;
    for h in histories {
        table.write_row([
            h.target.as_str(),
            h.birth_year.to_string().as_str(),
            h.total_citations.to_string().as_str(),
            h.history_string().as_str(),
        ])?;
    }
    table.flush()?;
    Ok(table.rows_written())
}

/// Write a single-column key list, sorted
pub fn write_keys<'a>(
    path: impl AsRef<Path>,
    delimiter: u8,
    keys: impl IntoIterator<Item = &'a RecordKey>,
) -> OutputResult<u64> {
    let mut sorted: Vec<&RecordKey> = keys.into_iter().collect();
    sorted.sort();
    let mut table = TableWriter::create(path, delimiter, &SEED_HEADER)?;
    for key in sorted {
        table.write_row([key.as_str()])?;
    }
    table.flush()?;
    Ok(table.rows_written())
}
