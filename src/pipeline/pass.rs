//! Driving one streaming pass over an archive

use super::cancel::CancellationToken;
use super::error::PipelineResult;
use crate::scan::{Archive, RowBatch, SchemaAliases};
use serde::Serialize;

/// Counters for one completed pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
    pub batches: u64,
    pub rows: u64,
}

/// Scan `archive` projecting `fields`, handing each batch to `visit`.
///
/// The token is checked before every batch; a cancelled pass stops at once
/// and whatever `visit` accumulated belongs to the caller to drop.
pub fn for_each_batch<F>(
    stage: &str,
    archive: &mut Archive,
    fields: &[&str],
    aliases: &SchemaAliases,
    batch_size: usize,
    cancel: &CancellationToken,
    mut visit: F,
) -> PipelineResult<PassStats>
where
    F: FnMut(&RowBatch) -> PipelineResult<()>,
{
    let span = tracing::info_span!("pass", stage, member = %archive.member());
    let _enter = span.enter();

    let mut scanner = archive.scan(fields, aliases, batch_size)?;
    let mut stats = PassStats::default();
    loop {
        if let Err(e) = cancel.checkpoint(stage) {
            tracing::info!(batches = stats.batches, "pass cancelled");
            return Err(e);
        }
        let Some(batch) = scanner.next() else {
            break;
        };
        let batch = batch?;
        visit(&batch)?;
        stats.batches += 1;
        stats.rows += batch.len() as u64;
        tracing::debug!(batch = stats.batches, rows = stats.rows, "batch processed");
    }

    tracing::debug!(batches = stats.batches, rows = stats.rows, "pass complete");
    Ok(stats)
}

/// Resolve `fields` against the archive header without reading any rows.
///
/// Runs that write output call this first so that a configuration problem
/// fails before an output file is created.
pub fn check_columns(
    archive: &mut Archive,
    fields: &[&str],
    aliases: &SchemaAliases,
) -> PipelineResult<()> {
    let header = archive.headers()?;
    aliases.resolve_all(&header, fields)?;
    Ok(())
}
