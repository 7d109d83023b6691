//! Citation history summary over an extracted link table
//!
//! Three passes keep memory bounded by the keys the links mention:
//!
//! - pass A reads the link table and collects every key that needs a year
//! - pass B reads the record archive, keeping years only for those keys
//! - pass C re-reads the link table and folds the yearly histories

use super::cancel::CancellationToken;
use super::config::{ArchiveSpec, PipelineConfig};
use super::error::PipelineResult;
use super::pass::{check_columns, for_each_batch, PassStats};
use crate::aggregate::{matching_rows, parse_year, CitationHistory, HistoryAggregator, YearLookup};
use crate::graph::{KeySet, RecordKey};
use crate::output::write_summary;
use crate::scan::{fields, Archive};
use serde::Serialize;

const LINK_FIELDS: [&str; 2] = [fields::RECORD_ID, fields::CITED_ID];
const RECORD_FIELDS: [&str; 2] = [fields::RECORD_ID, fields::RECORD_DATE];

/// Result of a history run
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryReport {
    pub targets: usize,
    /// Targets whose own year could not be resolved
    pub undated_targets: usize,
    pub dated_links: u64,
    /// Links dropped because the citing record had no year
    pub undated_links: u64,
    /// Keys that needed a year and got one
    pub resolved_years: usize,
    pub passes: Vec<PassStats>,
}

/// Build histories from an opened link table and record archive.
pub fn collect_histories(
    links: &mut Archive,
    records: &mut Archive,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> PipelineResult<(Vec<CitationHistory>, HistoryReport)> {
    let mut needed = KeySet::new();
    let pass_a = for_each_batch(
        "history keys",
        links,
        &LINK_FIELDS,
        &config.schema,
        config.batch_size,
        cancel,
        |batch| {
            for row in batch.rows() {
                needed.extend(RecordKey::parse(row.get(0)));
                needed.extend(RecordKey::parse(row.get(1)));
            }
            Ok(())
        },
    )?;

    let mut years = YearLookup::new();
    let mut unparsed = 0u64;
    let pass_b = for_each_batch(
        "record years",
        records,
        &RECORD_FIELDS,
        &config.schema,
        config.batch_size,
        cancel,
        |batch| {
            for row in matching_rows(batch, 0, &needed) {
                let Some(key) = RecordKey::parse(row.get(0)) else {
                    continue;
                };
                match parse_year(row.get(1)) {
                    Some(year) => years.insert(key, year),
                    None => unparsed += 1,
                }
            }
            Ok(())
        },
    )?;
    if unparsed > 0 {
        tracing::debug!(rows = unparsed, "record dates without a year");
    }

    let mut aggregator = HistoryAggregator::new();
    let pass_c = for_each_batch(
        "history fold",
        links,
        &LINK_FIELDS,
        &config.schema,
        config.batch_size,
        cancel,
        |batch| {
            for row in batch.rows() {
                if let (Some(source), Some(target)) =
                    (RecordKey::parse(row.get(0)), RecordKey::parse(row.get(1)))
                {
                    aggregator.add_link(&source, &target, &years);
                }
            }
            Ok(())
        },
    )?;

    let dated_links = aggregator.dated_links();
    let undated_links = aggregator.undated_links();
    let histories = aggregator.finish(&years);
    let report = HistoryReport {
        targets: histories.len(),
        undated_targets: histories.iter().filter(|h| !h.is_dated()).count(),
        dated_links,
        undated_links,
        resolved_years: years.len(),
        passes: vec![pass_a, pass_b, pass_c],
    };

    if report.undated_links > 0 {
        tracing::warn!(
            links = report.undated_links,
            "links dropped: citing record has no year"
        );
    }
    tracing::info!(
        targets = report.targets,
        undated_targets = report.undated_targets,
        dated_links = report.dated_links,
        "history aggregation complete"
    );
    Ok((histories, report))
}

/// Build the citation summary table from the configured link table and
/// record archive.
pub fn build_histories(
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> PipelineResult<HistoryReport> {
    config.validate()?;
    let mut links = ArchiveSpec::new(&config.outputs.links)
        .open()?
        .with_delimiter(config.delimiter());
    let mut records = config.inputs.records.open()?;
    check_columns(&mut links, &LINK_FIELDS, &config.schema)?;
    check_columns(&mut records, &RECORD_FIELDS, &config.schema)?;

    let (histories, report) = collect_histories(&mut links, &mut records, config, cancel)?;
    let written = write_summary(&config.outputs.summary, config.delimiter(), &histories)?;
    tracing::info!(
        rows = written,
        path = %config.outputs.summary.display(),
        "summary table written"
    );
    Ok(report)
}
