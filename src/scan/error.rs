//! Errors raised while opening and scanning archives

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while opening or scanning an archive.
///
/// Everything here is fatal: column resolution and member selection run
/// before the first batch is produced, so a failed scan never yields partial
/// data.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Table parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No table member in {}: {detail}", archive.display())]
    NoTableMember { archive: PathBuf, detail: String },

    #[error("No column for '{field}' (tried {aliases:?}; header has {available:?})")]
    MissingColumn {
        field: String,
        aliases: Vec<String>,
        available: Vec<String>,
    },

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,
}

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
