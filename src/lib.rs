//! Citeflow: Bounded-Memory Citation Diffusion Extraction
//!
//! Streams very large citation archives in fixed-size batches and derives a
//! multi-hop diffusion graph rooted at one core record, plus per-record
//! yearly citation histories.
//!
//! # Core Concepts
//!
//! - **Scan**: an archive is read batch by batch, exposing only the columns a
//!   pass asks for
//! - **Pass**: one full scan; its complete result gates the next pass
//! - **Layers**: core, awakeners (giant direct citers), other direct citers,
//!   and layer-3 citers of giants
//!
//! # Example
//!
//! ```no_run
//! use citeflow::{DiffusionPipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default().with_seed("4901362");
//! let outcome = DiffusionPipeline::new(config).run()?;
//! println!("{} direct citers", outcome.citers);
//! # Ok::<(), citeflow::PipelineError>(())
//! ```

pub mod aggregate;
pub mod graph;
pub mod output;
pub mod pipeline;
pub mod scan;

pub use aggregate::{CitationHistory, FrequencyCounter, FrequencyTable, YearLookup};
pub use graph::{canonical_key, Edge, EdgeKind, KeySet, Layer, Node, NodeTable, RecordKey};
pub use output::{EdgeSink, EdgeTableSink, OutputError, OutputResult};
pub use pipeline::{
    CancellationToken, DiffusionOutcome, DiffusionPipeline, PipelineConfig, PipelineError,
    PipelineResult,
};
pub use scan::{Archive, RowBatch, ScanError, ScanResult, SchemaAliases};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
