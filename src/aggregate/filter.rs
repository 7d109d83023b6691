//! Membership filtering of row batches against key sets

use crate::graph::{canonical_key, KeySet, RecordKey};
use crate::scan::{Row, RowBatch};

/// Rows of `batch` whose `column` holds a key in `targets`.
///
/// The cell is canonicalized before each comparison, so `4901362.0` in the
/// archive matches the key `4901362`. Lazy and allocation-free.
pub fn matching_rows<'b>(
    batch: &'b RowBatch,
    column: usize,
    targets: &'b KeySet,
) -> impl Iterator<Item = Row<'b>> + 'b {
    batch
        .rows()
        .filter(move |row| targets.contains_raw(row.get(column)))
}

/// Rows of `batch` whose `column` equals a single key.
pub fn rows_equal<'b>(
    batch: &'b RowBatch,
    column: usize,
    key: &'b RecordKey,
) -> impl Iterator<Item = Row<'b>> + 'b {
    batch
        .rows()
        .filter(move |row| canonical_key(row.get(column)) == key.as_str())
}

/// Canonical keys found in `column` of the matching rows.
///
/// Rows whose key cell is blank after canonicalization are skipped.
pub fn matching_keys<'b>(
    batch: &'b RowBatch,
    filter_column: usize,
    targets: &'b KeySet,
    key_column: usize,
) -> impl Iterator<Item = RecordKey> + 'b {
    matching_rows(batch, filter_column, targets)
        .filter_map(move |row| RecordKey::parse(row.get(key_column)))
}
