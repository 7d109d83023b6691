//! Seed selection by classification code prefix

use super::cancel::CancellationToken;
use super::config::PipelineConfig;
use super::error::PipelineResult;
use super::pass::{check_columns, for_each_batch, PassStats};
use crate::graph::{KeySet, RecordKey};
use crate::output::write_keys;
use crate::scan::{fields, Archive};
use serde::Serialize;

const IPC_FIELDS: [&str; 6] = [
    fields::RECORD_ID,
    fields::IPC_SECTION,
    fields::IPC_CLASS,
    fields::IPC_SUBCLASS,
    fields::IPC_MAIN_GROUP,
    fields::IPC_SUBGROUP,
];

/// Result of a selection run
#[derive(Debug, Clone, Serialize)]
pub struct SelectReport {
    pub selected: usize,
    pub stats: PassStats,
}

/// Join the code parts of a classification row into one code.
///
/// Parts are trimmed and blank or `nan` parts contribute nothing, so
/// `G`, `06`, `N`, `3`, `/04` gives `G06N3/04`.
pub fn full_code<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.eq_ignore_ascii_case("nan"))
        .collect()
}

/// Keys whose classification code starts with any of `prefixes`.
pub fn select_by_prefix(
    archive: &mut Archive,
    prefixes: &[String],
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> PipelineResult<(KeySet, PassStats)> {
    let mut selected = KeySet::new();

    let stats = for_each_batch(
        "select",
        archive,
        &IPC_FIELDS,
        &config.schema,
        config.batch_size,
        cancel,
        |batch| {
            for row in batch.rows() {
                let code = full_code(row.cells()[1..].iter().map(String::as_str));
                if prefixes.iter().any(|p| code.starts_with(p.as_str())) {
                    selected.extend(RecordKey::parse(row.get(0)));
                }
            }
            Ok(())
        },
    )?;

    Ok((selected, stats))
}

/// Select seeds from the configured classification archive and write the
/// seed table.
pub fn run_select(
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> PipelineResult<SelectReport> {
    config.validate()?;
    let mut archive = config.inputs.ipc.open()?;
    check_columns(&mut archive, &IPC_FIELDS, &config.schema)?;

    let (selected, stats) = select_by_prefix(&mut archive, &config.prefixes, config, cancel)?;
    write_keys(&config.outputs.seeds, config.delimiter(), selected.iter())?;
    tracing::info!(
        selected = selected.len(),
        rows = stats.rows,
        path = %config.outputs.seeds.display(),
        "classification selection complete"
    );
    Ok(SelectReport {
        selected: selected.len(),
        stats,
    })
}
