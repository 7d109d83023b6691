//! Yearly citation histories
//!
//! Citation links are grouped by `(target, year of the citing record)` and
//! folded into one sparse history per target. Links whose citing record has
//! no resolvable year are dropped rather than assigned a placeholder year.

use crate::graph::RecordKey;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Birth year written for targets whose own date could not be resolved
pub const UNDATED: i32 = 0;

/// Date layouts accepted in date cells, tried in order
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];

/// Extract a year from a date cell.
///
/// Accepts a calendar date (`1990-02-20`, `19900220`, `1990/02/20`),
/// optionally followed by a time, or a bare four-digit year. Impossible
/// dates and trailing junk are unresolved.
pub fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim().trim_matches('"').trim();
    let day = s.split(|c: char| c == 'T' || c.is_whitespace()).next()?;

    let year = if day.len() == 4 && day.bytes().all(|b| b.is_ascii_digit()) {
        day.parse().ok()?
    } else {
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())?
            .year()
    };
    (year > 0).then_some(year)
}

/// Key → year lookup restricted to the keys a run actually needs.
#[derive(Debug, Clone, Default)]
pub struct YearLookup {
    years: HashMap<RecordKey, i32>,
}

impl YearLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key's year; the first year seen for a key is kept.
    pub fn insert(&mut self, key: RecordKey, year: i32) {
        self.years.entry(key).or_insert(year);
    }

    pub fn year_of(&self, key: &RecordKey) -> Option<i32> {
        self.years.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

impl FromIterator<(RecordKey, i32)> for YearLookup {
    fn from_iter<I: IntoIterator<Item = (RecordKey, i32)>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for (key, year) in iter {
            lookup.insert(key, year);
        }
        lookup
    }
}

/// Error from parsing a serialized history string
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Malformed history item '{item}'")]
pub struct HistoryParseError {
    pub item: String,
}

/// Per-target citation history: sparse `year → count`, its total, and the
/// target's own birth year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationHistory {
    pub target: RecordKey,
    /// Year the target was created; [`UNDATED`] when unresolved
    pub birth_year: i32,
    pub years: BTreeMap<i32, u64>,
    pub total_citations: u64,
}

impl CitationHistory {
    pub fn new(target: RecordKey, birth_year: Option<i32>) -> Self {
        Self {
            target,
            birth_year: birth_year.unwrap_or(UNDATED),
            years: BTreeMap::new(),
            total_citations: 0,
        }
    }

    pub fn add(&mut self, year: i32, count: u64) {
        *self.years.entry(year).or_insert(0) += count;
        self.total_citations += count;
    }

    pub fn is_dated(&self) -> bool {
        self.birth_year != UNDATED
    }

    /// Serialize as `"year:count; year:count"` in ascending year order.
    pub fn history_string(&self) -> String {
        format_history(&self.years)
    }

    /// Parse a serialized history back into its year map.
    pub fn parse_history(s: &str) -> Result<BTreeMap<i32, u64>, HistoryParseError> {
        let mut years = BTreeMap::new();
        for item in s.split(';').map(str::trim).filter(|i| !i.is_empty()) {
            let malformed = || HistoryParseError {
                item: item.to_string(),
            };
            let (year, count) = item.split_once(':').ok_or_else(malformed)?;
            let year: i32 = year.trim().parse().map_err(|_| malformed())?;
            let count: u64 = count.trim().parse().map_err(|_| malformed())?;
            *years.entry(year).or_insert(0) += count;
        }
        Ok(years)
    }
}

pub fn format_history(years: &BTreeMap<i32, u64>) -> String {
    years
        .iter()
        .map(|(year, count)| format!("{}:{}", year, count))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates `(target, citing year)` counts over a link pass.
#[derive(Debug, Default)]
pub struct HistoryAggregator {
    counts: HashMap<RecordKey, BTreeMap<i32, u64>>,
    /// Order targets were first seen, for stable output
    order: Vec<RecordKey>,
    undated_links: u64,
    dated_links: u64,
}

impl HistoryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one citation link. Links whose source has no year are counted
    /// as dropped and otherwise ignored.
    pub fn add_link(&mut self, source: &RecordKey, target: &RecordKey, years: &YearLookup) {
        let Some(year) = years.year_of(source) else {
            self.undated_links += 1;
            return;
        };
        self.dated_links += 1;
        if !self.counts.contains_key(target) {
            self.order.push(target.clone());
        }
        *self
            .counts
            .entry(target.clone())
            .or_default()
            .entry(year)
            .or_insert(0) += 1;
    }

    /// Links dropped because the citing record had no year
    pub fn undated_links(&self) -> u64 {
        self.undated_links
    }

    pub fn dated_links(&self) -> u64 {
        self.dated_links
    }

    /// Fold the counts into histories, resolving birth years from `years`.
    ///
    /// Output is sorted by target key.
    pub fn finish(mut self, years: &YearLookup) -> Vec<CitationHistory> {
        self.order.sort();
        self.order
            .into_iter()
            .map(|target| {
                let per_year = self.counts.remove(&target).unwrap_or_default();
                let mut history = CitationHistory::new(target, None);
                history.birth_year = years.year_of(&history.target).unwrap_or(UNDATED);
                for (year, count) in per_year {
                    history.add(year, count);
                }
                history
            })
            .collect()
    }
}
