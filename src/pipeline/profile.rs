//! Citer profiles: grant year, assignee and classification groups
//!
//! Each attribute comes from its own filtered pass over one archive, so only
//! the profiled keys are ever held in memory.

use super::cancel::CancellationToken;
use super::config::PipelineConfig;
use super::error::PipelineResult;
use super::pass::{check_columns, for_each_batch, PassStats};
use crate::aggregate::matching_rows;
use crate::graph::{canonical_key, KeySet, RecordKey};
use crate::output::{OutputResult, TableWriter, PROFILE_HEADER};
use crate::scan::{fields, Archive};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Year written when a citer has no record date
pub const UNKNOWN_YEAR: &str = "N/A";
/// Assignee written when a citer has no organization
pub const UNKNOWN_ASSIGNEE: &str = "Individual/Unknown";

/// Attributes of one profiled record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CiterProfile {
    pub id: RecordKey,
    /// First four characters of the record date
    pub year: Option<String>,
    pub assignee: Option<String>,
    pub cpc_groups: BTreeSet<String>,
}

impl CiterProfile {
    pub fn new(id: RecordKey) -> Self {
        Self {
            id,
            year: None,
            assignee: None,
            cpc_groups: BTreeSet::new(),
        }
    }

    pub fn year_label(&self) -> &str {
        self.year.as_deref().unwrap_or(UNKNOWN_YEAR)
    }

    pub fn assignee_label(&self) -> &str {
        self.assignee.as_deref().unwrap_or(UNKNOWN_ASSIGNEE)
    }

    /// Distinct groups, sorted, joined with `"; "`
    pub fn cpc_label(&self) -> String {
        self.cpc_groups
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Result of a profile run
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub profiled: usize,
    pub with_year: usize,
    pub with_assignee: usize,
    pub with_cpc: usize,
    pub passes: Vec<PassStats>,
}

/// Opened archives the profile passes read
pub struct ProfileSources<'a> {
    pub records: &'a mut Archive,
    pub assignees: &'a mut Archive,
    pub cpc: &'a mut Archive,
}

/// Profile every key in `citers`.
///
/// Output is sorted by year label, then key. The year is the first
/// non-blank date seen for a key; for the assignee the last non-blank
/// organization wins.
pub fn profile_citers(
    citers: &KeySet,
    sources: ProfileSources<'_>,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> PipelineResult<(Vec<CiterProfile>, Vec<PassStats>)> {
    let mut profiles: HashMap<RecordKey, CiterProfile> = citers
        .iter()
        .map(|k| (k.clone(), CiterProfile::new(k.clone())))
        .collect();

    let years = for_each_batch(
        "profile years",
        sources.records,
        &[fields::RECORD_ID, fields::RECORD_DATE],
        &config.schema,
        config.batch_size,
        cancel,
        |batch| {
            for row in matching_rows(batch, 0, citers) {
                let date = row.get(1).trim();
                if date.is_empty() {
                    continue;
                }
                if let Some(profile) = profiles.get_mut(canonical_key(row.get(0))) {
                    if profile.year.is_none() {
                        profile.year = Some(date.chars().take(4).collect());
                    }
                }
            }
            Ok(())
        },
    )?;

    let assignees = for_each_batch(
        "profile assignees",
        sources.assignees,
        &[fields::RECORD_ID, fields::ORGANIZATION],
        &config.schema,
        config.batch_size,
        cancel,
        |batch| {
            for row in matching_rows(batch, 0, citers) {
                let organization = row.get(1).trim();
                if organization.is_empty() {
                    continue;
                }
                if let Some(profile) = profiles.get_mut(canonical_key(row.get(0))) {
                    profile.assignee = Some(organization.to_string());
                }
            }
            Ok(())
        },
    )?;

    let groups = for_each_batch(
        "profile cpc",
        sources.cpc,
        &[fields::RECORD_ID, fields::CPC_GROUP],
        &config.schema,
        config.batch_size,
        cancel,
        |batch| {
            for row in matching_rows(batch, 0, citers) {
                let group = row.get(1).trim();
                if group.is_empty() {
                    continue;
                }
                if let Some(profile) = profiles.get_mut(canonical_key(row.get(0))) {
                    if !profile.cpc_groups.contains(group) {
                        profile.cpc_groups.insert(group.to_string());
                    }
                }
            }
            Ok(())
        },
    )?;

    let mut profiles: Vec<CiterProfile> = profiles.into_values().collect();
    profiles.sort_by(|a, b| {
        a.year_label()
            .cmp(b.year_label())
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok((profiles, vec![years, assignees, groups]))
}

/// Write the profile table
pub fn write_profiles(
    path: impl AsRef<Path>,
    delimiter: u8,
    profiles: &[CiterProfile],
) -> OutputResult<u64> {
    let mut table = TableWriter::create(path, delimiter, &PROFILE_HEADER)?;
    for p in profiles {
        table.write_row([
            p.id.as_str(),
            p.year_label(),
            p.assignee_label(),
            p.cpc_label().as_str(),
        ])?;
    }
    table.flush()?;
    Ok(table.rows_written())
}

/// Profile the citers in `citers` from the configured archives and write the
/// profile table.
pub fn run_profile(
    config: &PipelineConfig,
    citers: &KeySet,
    cancel: &CancellationToken,
) -> PipelineResult<ProfileReport> {
    config.validate()?;
    let mut records = config.inputs.records.open()?;
    let mut assignees = config.inputs.assignees.open()?;
    let mut cpc = config.inputs.cpc.open()?;
    check_columns(&mut records, &[fields::RECORD_ID, fields::RECORD_DATE], &config.schema)?;
    check_columns(&mut assignees, &[fields::RECORD_ID, fields::ORGANIZATION], &config.schema)?;
    check_columns(&mut cpc, &[fields::RECORD_ID, fields::CPC_GROUP], &config.schema)?;

    let sources = ProfileSources {
        records: &mut records,
        assignees: &mut assignees,
        cpc: &mut cpc,
    };
    let (profiles, passes) = profile_citers(citers, sources, config, cancel)?;
    write_profiles(&config.outputs.profile, config.delimiter(), &profiles)?;

    let report = ProfileReport {
        profiled: profiles.len(),
        with_year: profiles.iter().filter(|p| p.year.is_some()).count(),
        with_assignee: profiles.iter().filter(|p| p.assignee.is_some()).count(),
        with_cpc: profiles.iter().filter(|p| !p.cpc_groups.is_empty()).count(),
        passes,
    };
    tracing::info!(
        profiled = report.profiled,
        with_year = report.with_year,
        with_assignee = report.with_assignee,
        path = %config.outputs.profile.display(),
        "citer profile written"
    );
    Ok(report)
}
