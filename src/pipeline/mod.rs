//! Streaming passes and the pipelines built from them
//!
//! Every pipeline is a fixed sequence of full scans. A pass never starts
//! before the one it depends on has consumed its whole archive, and the
//! only state carried between passes is the handoff value the earlier pass
//! returned.

mod assembler;
mod cancel;
pub mod classify;
mod config;
pub mod diffusion;
mod error;
pub mod history;
pub mod links;
mod pass;
pub mod profile;
pub mod seeds;

pub use assembler::assemble;
pub use cancel::CancellationToken;
pub use classify::{full_code, run_select, select_by_prefix, SelectReport};
pub use config::{
    ArchiveSpec, InputPaths, OutputPaths, PipelineConfig, DEFAULT_BATCH_SIZE, DEFAULT_GIANTS,
    DEFAULT_PREFIXES,
};
pub use diffusion::{
    discover, expand, weigh, DiffusionOutcome, DiffusionPipeline, ExpansionReport, HopOne, Weights,
};
pub use error::{PipelineError, PipelineResult};
pub use history::{build_histories, collect_histories, HistoryReport};
pub use links::{extract_links, run_links, LinkReport};
pub use pass::{check_columns, for_each_batch, PassStats};
pub use profile::{
    profile_citers, run_profile, write_profiles, CiterProfile, ProfileReport, ProfileSources,
};
pub use seeds::{load_key_list, seed_keys};
