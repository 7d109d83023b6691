//! BatchScanner: lazy, bounded-size iteration over a delimited table

use super::batch::RowBatch;
use super::error::{ScanError, ScanResult};
use super::schema::{normalize_header, SchemaAliases};
use csv::{ByteRecord, Reader, ReaderBuilder};
use std::io::Read;
use std::sync::Arc;

/// Iterator over [`RowBatch`]es of at most `batch_size` rows.
///
/// Holds one batch plus one record buffer at a time. The underlying
/// decompression stream is consumed once; to scan again, start a new scan
/// from the archive.
pub struct BatchScanner<'a> {
    reader: Reader<Box<dyn Read + 'a>>,
    fields: Arc<[String]>,
    columns: Vec<usize>,
    batch_size: usize,
    record: ByteRecord,
    next_row: u64,
    finished: bool,
}

impl<'a> BatchScanner<'a> {
    pub(crate) fn new(
        stream: Box<dyn Read + 'a>,
        delimiter: u8,
        fields: &[&str],
        aliases: &SchemaAliases,
        batch_size: usize,
    ) -> ScanResult<Self> {
        if batch_size == 0 {
            return Err(ScanError::InvalidBatchSize);
        }

        let mut reader = builder(delimiter).from_reader(stream);
        let header = normalized_header(&mut reader)?;
        let columns = aliases.resolve_all(&header, fields)?;

        Ok(Self {
            reader,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            columns,
            batch_size,
            record: ByteRecord::new(),
            next_row: 0,
            finished: false,
        })
    }

    pub(crate) fn read_header(
        stream: Box<dyn Read + 'a>,
        delimiter: u8,
    ) -> ScanResult<Vec<String>> {
        let mut reader = builder(delimiter).from_reader(stream);
        normalized_header(&mut reader)
    }

    /// Canonical names of the projected columns
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Rows consumed so far
    pub fn rows_read(&self) -> u64 {
        self.next_row
    }

    fn next_batch(&mut self) -> ScanResult<Option<RowBatch>> {
        let mut batch =
            RowBatch::with_capacity(self.fields.clone(), self.batch_size, self.next_row);

        while batch.len() < self.batch_size {
            if !self.reader.read_byte_record(&mut self.record)? {
                self.finished = true;
                break;
            }
            let record = &self.record;
            batch.push_row(self.columns.iter().map(|&col| {
                record
                    .get(col)
                    .map(|cell| String::from_utf8_lossy(cell).into_owned())
                    .unwrap_or_default()
            }));
            self.next_row += 1;
        }

        Ok(if batch.is_empty() { None } else { Some(batch) })
    }
}

impl Iterator for BatchScanner<'_> {
    type Item = ScanResult<RowBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_batch() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn builder(delimiter: u8) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true);
    builder
}

fn normalized_header<R: Read>(reader: &mut Reader<R>) -> ScanResult<Vec<String>> {
    let header = reader.byte_headers()?;
    Ok(header
        .iter()
        .map(|h| normalize_header(&String::from_utf8_lossy(h)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::schema::fields;

    const TABLE: &str = "patent_id\tcitation_patent_id\tcitation_date\n\
                         B\tA\t1990-01-01\n\
                         C\tA\t1991-01-01\n\
                         D\tB\t1992-01-01\n";

    fn scanner(text: &'static str, batch_size: usize) -> BatchScanner<'static> {
        BatchScanner::new(
            Box::new(text.as_bytes()),
            b'\t',
            &[fields::CITED_ID, fields::RECORD_ID],
            &SchemaAliases::default(),
            batch_size,
        )
        .unwrap()
    }

    #[test]
    fn batches_are_bounded() {
        let batches: Vec<RowBatch> = scanner(TABLE, 2).map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[1].len(), 1);
        assert_eq!(batches[1].first_row(), 2);
    }

    #[test]
    fn columns_follow_request_order() {
        let batch = scanner(TABLE, 10).next().unwrap().unwrap();
        assert_eq!(batch.fields(), &["cited_id".to_string(), "record_id".to_string()]);
        assert_eq!(batch.width(), 2);
        assert_eq!(batch.row(2).get(0), "B");
        assert_eq!(batch.row(2).get(1), "D");
    }

    #[test]
    fn header_only_table_yields_nothing() {
        let mut s = scanner("patent_id\tcitation_patent_id\n", 4);
        assert!(s.next().is_none());
        assert_eq!(s.rows_read(), 0);
    }

    #[test]
    fn bom_prefixed_header_resolves() {
        let text = "\u{feff}patent_id\tcitation_patent_id\nX\tY\n";
        let batch = scanner(text, 4).next().unwrap().unwrap();
        assert_eq!(batch.row(0).get(1), "X");
    }

    #[test]
    fn missing_column_fails_before_first_batch() {
        let result = BatchScanner::new(
            Box::new("id\tdate\n1\t2\n".as_bytes()),
            b'\t',
            &[fields::CITED_ID],
            &SchemaAliases::default(),
            10,
        );
        assert!(matches!(result, Err(ScanError::MissingColumn { .. })));
    }

    #[test]
    fn zero_batch_size_rejected() {
        let result = BatchScanner::new(
            Box::new(TABLE.as_bytes()),
            b'\t',
            &[fields::RECORD_ID],
            &SchemaAliases::default(),
            0,
        );
        assert!(matches!(result, Err(ScanError::InvalidBatchSize)));
    }

    #[test]
    fn short_rows_pad_missing_cells() {
        let text = "patent_id\tcitation_patent_id\nonly\n";
        let batch = scanner(text, 4).next().unwrap().unwrap();
        assert_eq!(batch.row(0).get(0), "");
        assert_eq!(batch.row(0).get(1), "only");
    }
}
