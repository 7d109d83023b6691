//! Citation link extraction for a seed key set
//!
//! One streaming pass over the citation archive. Rows citing any seed key are
//! appended to the link table as they are found, and the table is flushed
//! after every batch so a long run leaves a usable prefix behind.

use super::cancel::CancellationToken;
use super::config::PipelineConfig;
use super::error::PipelineResult;
use super::pass::{check_columns, for_each_batch, PassStats};
use crate::aggregate::matching_rows;
use crate::graph::{canonical_key, KeySet};
use crate::output::{TableWriter, LINK_HEADER};
use crate::scan::{fields, Archive};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

const LINK_FIELDS: [&str; 3] = [fields::RECORD_ID, fields::CITED_ID, fields::CITATION_DATE];

/// Result of a link extraction run
#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub seeds: usize,
    pub links: u64,
    pub stats: PassStats,
    pub path: PathBuf,
}

/// Stream every citation of a key in `seeds` into `table`.
///
/// The header is already on the table; this only appends rows. Source and
/// target are written in canonical form, the date as found.
pub fn extract_links<W: Write>(
    archive: &mut Archive,
    seeds: &KeySet,
    table: &mut TableWriter<W>,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> PipelineResult<PassStats> {
    for_each_batch(
        "links",
        archive,
        &LINK_FIELDS,
        &config.schema,
        config.batch_size,
        cancel,
        |batch| {
            let before = table.rows_written();
            for row in matching_rows(batch, 1, seeds) {
                table.write_row([
                    canonical_key(row.get(0)),
                    canonical_key(row.get(1)),
                    row.get(2).trim(),
                ])?;
            }
            if table.rows_written() > before {
                table.flush()?;
            }
            Ok(())
        },
    )
}

/// Run link extraction with the configured archive and output path.
///
/// The link table is created with its header before the first batch, so it
/// is well formed even when no row matches.
pub fn run_links(
    config: &PipelineConfig,
    seeds: &KeySet,
    cancel: &CancellationToken,
) -> PipelineResult<LinkReport> {
    config.validate()?;
    let mut archive = config.inputs.citations.open()?;
    check_columns(&mut archive, &LINK_FIELDS, &config.schema)?;

    let path = config.outputs.links.clone();
    let mut table = TableWriter::create(&path, config.delimiter(), &LINK_HEADER)?;
    let stats = extract_links(&mut archive, seeds, &mut table, config, cancel)?;
    table.flush()?;

    let links = table.rows_written();
    tracing::info!(
        seeds = seeds.len(),
        links,
        batches = stats.batches,
        path = %path.display(),
        "link extraction complete"
    );
    Ok(LinkReport {
        seeds: seeds.len(),
        links,
        stats,
        path,
    })
}
