//! Seed key lists

use super::cancel::CancellationToken;
use super::config::PipelineConfig;
use super::error::{PipelineError, PipelineResult};
use super::pass::for_each_batch;
use crate::graph::{KeySet, RecordKey};
use crate::scan::{fields, Archive, SchemaAliases};
use std::path::Path;

/// Read a key list table.
///
/// The key column is the record id column when the header has one under any
/// of its aliases, otherwise the first column. Blank cells are skipped.
pub fn load_key_list(
    path: impl AsRef<Path>,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> PipelineResult<KeySet> {
    let path = path.as_ref();
    let mut archive = Archive::open(path, None)?;
    let header = archive.headers()?;

    let column = match config.schema.resolve(&header, fields::RECORD_ID) {
        Ok(col) => header[col].clone(),
        Err(_) => header.first().cloned().ok_or_else(|| {
            PipelineError::InvalidConfig(format!("key list {} has no columns", path.display()))
        })?,
    };

    let mut keys = KeySet::new();
    for_each_batch(
        "seed list",
        &mut archive,
        &[column.as_str()],
        &SchemaAliases::empty(),
        config.batch_size,
        cancel,
        |batch| {
            keys.extend(batch.rows().filter_map(|row| RecordKey::parse(row.get(0))));
            Ok(())
        },
    )?;

    tracing::info!(path = %path.display(), column = %column, keys = keys.len(), "loaded key list");
    Ok(keys)
}

/// Seed keys for a run: the key list file when configured, else the single
/// seed key.
pub fn seed_keys(config: &PipelineConfig, cancel: &CancellationToken) -> PipelineResult<KeySet> {
    match &config.seed_list {
        Some(path) => load_key_list(path, config, cancel),
        None => Ok(std::iter::once(config.seed_key()?).collect()),
    }
}
