//! Chunked table scanning over compressed archives
//!
//! An [`Archive`] selects the table inside a zip, gzip or plain file. Each
//! [`Archive::scan`] resolves the requested fields through the
//! [`SchemaAliases`] table and returns a [`BatchScanner`] that yields
//! column-projected [`RowBatch`]es of bounded size. Memory use is one batch
//! regardless of table length.

mod archive;
mod batch;
mod error;
mod scanner;
pub mod schema;

pub use archive::{Archive, ArchiveFormat};
pub use batch::{Row, RowBatch};
pub use error::{ScanError, ScanResult};
pub use scanner::BatchScanner;
pub use schema::{fields, SchemaAliases};
