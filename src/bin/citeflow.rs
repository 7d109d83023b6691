//! Citeflow CLI: streaming citation diffusion extraction.
//!
//! Usage:
//!   citeflow diffusion --seed <id> [--config run.yaml]
//!   citeflow links [--seed <id> | --seed-list ids.csv]
//!   citeflow history
//!   citeflow select [--prefix G06N ...]
//!   citeflow profile [--seed <id> | --citers ids.csv]

use citeflow::pipeline::{
    build_histories, discover, load_key_list, run_links, run_profile, run_select, seed_keys,
};
use citeflow::{CancellationToken, DiffusionPipeline, KeySet, PipelineConfig, PipelineResult};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "citeflow",
    version,
    about = "Bounded-memory citation diffusion extraction"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// YAML run configuration; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Rows per batch
    #[arg(long, global = true)]
    batch_size: Option<usize>,
    /// Directory for output tables (keeps default file names)
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,
    /// Print the run summary as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Log per-batch progress
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the diffusion node and edge tables for one seed
    Diffusion {
        /// Core record key
        #[arg(long)]
        seed: Option<String>,
        /// Citation archive
        #[arg(long)]
        citations: Option<PathBuf>,
        /// Number of giants
        #[arg(long)]
        giants: Option<usize>,
    },
    /// Extract every citation of the seed keys into the link table
    Links {
        /// Single seed key
        #[arg(long)]
        seed: Option<String>,
        /// Key list file (first column or patent_id)
        #[arg(long)]
        seed_list: Option<PathBuf>,
        /// Citation archive
        #[arg(long)]
        citations: Option<PathBuf>,
    },
    /// Summarize yearly citation histories from the link table
    History {
        /// Link table produced by `links`
        #[arg(long)]
        links: Option<PathBuf>,
        /// Record archive with grant dates
        #[arg(long)]
        records: Option<PathBuf>,
    },
    /// Select seed keys by classification code prefix
    Select {
        /// Classification archive
        #[arg(long)]
        ipc: Option<PathBuf>,
        /// Code prefix; repeat to select several
        #[arg(long = "prefix")]
        prefixes: Vec<String>,
    },
    /// Profile the direct citers of a seed
    Profile {
        /// Seed whose direct citers are profiled
        #[arg(long)]
        seed: Option<String>,
        /// Key list of records to profile instead of discovering citers
        #[arg(long)]
        citers: Option<PathBuf>,
        /// Citation archive used for discovery
        #[arg(long)]
        citations: Option<PathBuf>,
    },
}

fn load_config(common: &CommonArgs) -> PipelineResult<PipelineConfig> {
    let mut config = match &common.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(batch_size) = common.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(dir) = &common.out_dir {
        config.outputs = config.outputs.reroot(dir);
    }
    Ok(config)
}

fn apply_overrides(config: &mut PipelineConfig, command: &Commands) {
    use citeflow::pipeline::ArchiveSpec;

    match command {
        Commands::Diffusion {
            seed,
            citations,
            giants,
        } => {
            if let Some(seed) = seed {
                config.seed = Some(seed.clone());
            }
            if let Some(path) = citations {
                config.inputs.citations = ArchiveSpec::new(path);
            }
            if let Some(giants) = giants {
                config.giants = *giants;
            }
        }
        Commands::Links {
            seed,
            seed_list,
            citations,
        } => {
            if let Some(seed) = seed {
                config.seed = Some(seed.clone());
                config.seed_list = None;
            }
            if let Some(list) = seed_list {
                config.seed_list = Some(list.clone());
            }
            if let Some(path) = citations {
                config.inputs.citations = ArchiveSpec::new(path);
            }
        }
        Commands::History { links, records } => {
            if let Some(path) = links {
                config.outputs.links = path.clone();
            }
            if let Some(path) = records {
                config.inputs.records = ArchiveSpec::new(path);
            }
        }
        Commands::Select { ipc, prefixes } => {
            if let Some(path) = ipc {
                config.inputs.ipc = ArchiveSpec::new(path);
            }
            if !prefixes.is_empty() {
                config.prefixes = prefixes.clone();
            }
        }
        Commands::Profile {
            seed, citations, ..
        } => {
            if let Some(seed) = seed {
                config.seed = Some(seed.clone());
            }
            if let Some(path) = citations {
                config.inputs.citations = ArchiveSpec::new(path);
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "citeflow=debug" } else { "citeflow=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report<T: Serialize>(json: bool, summary: &T, line: String) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error: cannot encode summary: {}", e),
        }
    } else {
        println!("{}", line);
    }
}

fn profile_targets(
    config: &PipelineConfig,
    citers: Option<&PathBuf>,
    cancel: &CancellationToken,
) -> PipelineResult<KeySet> {
    match citers {
        Some(path) => load_key_list(path, config, cancel),
        None => {
            let seed = config.seed_key()?;
            let mut archive = config.inputs.citations.open()?;
            Ok(discover(&mut archive, &seed, config, cancel)?.citers)
        }
    }
}

fn run(command: &Commands, config: &PipelineConfig, json: bool) -> PipelineResult<()> {
    let cancel = CancellationToken::new();
    match command {
        Commands::Diffusion { .. } => {
            let outcome = DiffusionPipeline::new(config.clone())
                .with_cancellation(cancel)
                .run()?;
            let line = if outcome.is_empty() {
                format!("Seed {} has no citers; wrote empty tables", outcome.seed)
            } else {
                format!(
                    "Seed {}: {} citers, {} giants, {} internal and {} diffusion edges, {} layer-3 nodes",
                    outcome.seed,
                    outcome.citers,
                    outcome.giants.len(),
                    outcome.internal_edges,
                    outcome.diffusion_edges,
                    outcome.diffusion_l3
                )
            };
            report(json, &outcome, line);
        }
        Commands::Links { .. } => {
            let seeds = seed_keys(config, &cancel)?;
            let summary = run_links(config, &seeds, &cancel)?;
            let line = format!(
                "Wrote {} links for {} seeds to {}",
                summary.links,
                summary.seeds,
                summary.path.display()
            );
            report(json, &summary, line);
        }
        Commands::History { .. } => {
            let summary = build_histories(config, &cancel)?;
            let line = format!(
                "Summarized {} targets ({} undated); dropped {} undated links",
                summary.targets, summary.undated_targets, summary.undated_links
            );
            report(json, &summary, line);
        }
        Commands::Select { .. } => {
            let summary = run_select(config, &cancel)?;
            let line = format!(
                "Selected {} keys to {}",
                summary.selected,
                config.outputs.seeds.display()
            );
            report(json, &summary, line);
        }
        Commands::Profile { citers, .. } => {
            let targets = profile_targets(config, citers.as_ref(), &cancel)?;
            let summary = run_profile(config, &targets, &cancel)?;
            let line = format!(
                "Profiled {} records to {}",
                summary.profiled,
                config.outputs.profile.display()
            );
            report(json, &summary, line);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.common.verbose);

    let mut config = match load_config(&cli.common) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    apply_overrides(&mut config, &cli.command);

    if let Err(e) = run(&cli.command, &config, cli.common.json) {
        eprintln!("Error: {}", e);
        let code = if e.is_configuration() { 2 } else { 1 };
        std::process::exit(code);
    }
}
