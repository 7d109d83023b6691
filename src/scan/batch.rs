//! Row batches: bounded, column-projected slices of a table

use std::sync::Arc;

/// Most rows reserved up front; larger batches grow as rows arrive.
const MAX_RESERVED_ROWS: usize = 65_536;

/// A bounded batch of rows holding only the requested columns.
///
/// Cells are stored row-major in one flat buffer. Column `i` of every row is
/// the `i`-th requested field, whatever its position in the source header.
#[derive(Debug, Clone)]
pub struct RowBatch {
    fields: Arc<[String]>,
    cells: Vec<String>,
    first_row: u64,
}

impl RowBatch {
    pub(crate) fn with_capacity(fields: Arc<[String]>, rows: usize, first_row: u64) -> Self {
        let width = fields.len();
        Self {
            fields,
            cells: Vec::with_capacity(rows.min(MAX_RESERVED_ROWS).saturating_mul(width)),
            first_row,
        }
    }

    /// Build a batch from literal rows. Short rows are padded with empty
    /// cells, long rows truncated.
    pub fn from_rows<S: AsRef<str>>(fields: &[&str], rows: &[Vec<S>], first_row: u64) -> Self {
        let fields: Arc<[String]> = fields.iter().map(|f| f.to_string()).collect();
        let mut batch = Self::with_capacity(fields, rows.len(), first_row);
        for row in rows {
            batch.push_row(row.iter().map(|c| c.as_ref().to_string()));
        }
        batch
    }

    pub(crate) fn push_row(&mut self, cells: impl Iterator<Item = String>) {
        let width = self.width();
        let start = self.cells.len();
        self.cells.extend(cells.take(width));
        self.cells.resize(start + width, String::new());
    }

    /// Canonical field names, in column order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Column index of a requested field
    pub fn column(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    pub fn width(&self) -> usize {
        self.fields.len()
    }

    pub fn len(&self) -> usize {
        if self.fields.is_empty() {
            0
        } else {
            self.cells.len() / self.width()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-based ordinal of the first row in the underlying table
    pub fn first_row(&self) -> u64 {
        self.first_row
    }

    pub fn row(&self, index: usize) -> Row<'_> {
        let width = self.width();
        Row {
            cells: &self.cells[index * width..(index + 1) * width],
            ordinal: self.first_row + index as u64,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }
}

/// A borrowed row of a [`RowBatch`]
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    cells: &'a [String],
    ordinal: u64,
}

impl<'a> Row<'a> {
    /// Raw cell value for a column; empty when out of range
    pub fn get(&self, column: usize) -> &'a str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    /// Position of this row in the underlying table
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    pub fn cells(&self) -> &'a [String] {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_is_capped() {
        let fields: Arc<[String]> = vec!["record_id".to_string(), "cited_id".to_string()].into();
        let mut batch = RowBatch::with_capacity(fields, usize::MAX / 2, 0);
        assert!(batch.cells.capacity() <= MAX_RESERVED_ROWS * 2);

        batch.push_row(["B".to_string(), "A".to_string()].into_iter());
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn rows_are_projected_and_padded() {
        let batch = RowBatch::from_rows(
            &["record_id", "cited_id"],
            &[vec!["B", "A"], vec!["C"], vec!["D", "B", "extra"]],
            10,
        );
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.row(1).get(0), "C");
        assert_eq!(batch.row(1).get(1), "");
        assert_eq!(batch.row(2).cells().len(), 2);
        assert_eq!(batch.row(2).ordinal(), 12);
        assert_eq!(batch.column("cited_id"), Some(1));
    }

    #[test]
    fn empty_batch() {
        let batch = RowBatch::from_rows::<&str>(&["record_id"], &[], 0);
        assert!(batch.is_empty());
        assert_eq!(batch.rows().count(), 0);
    }
}
