//! Filtering and aggregation primitives applied to scanned batches

pub mod filter;
pub mod frequency;
pub mod history;

pub use filter::{matching_keys, matching_rows, rows_equal};
pub use frequency::{FrequencyCounter, FrequencyTable};
pub use history::{
    format_history, parse_year, CitationHistory, HistoryAggregator, HistoryParseError, YearLookup,
    UNDATED,
};
