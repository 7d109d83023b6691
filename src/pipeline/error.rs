//! Pipeline error taxonomy

use crate::output::OutputError;
use crate::scan::ScanError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Only configuration problems, unreadable input and cancellation end a run.
/// Row-level data gaps (undated records, blank keys) are absorbed by the
/// passes and never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cancelled during {stage} pass")]
    Cancelled { stage: String },
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// True for errors caused by configuration rather than by the data or
    /// the environment
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigRead { .. }
                | Self::ConfigParse { .. }
                | Self::InvalidConfig(_)
                | Self::Scan(ScanError::MissingInput(_))
                | Self::Scan(ScanError::NoTableMember { .. })
                | Self::Scan(ScanError::MissingColumn { .. })
                | Self::Scan(ScanError::InvalidBatchSize)
        )
    }
}
