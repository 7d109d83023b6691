//! Pipeline configuration
//!
//! Everything a run needs (seed, archive locations, batch size, giant count,
//! schema aliases, output locations) lives in one [`PipelineConfig`] value
//! that is threaded through the passes. Independent runs over different
//! seeds or archives just use different configs.

use super::error::{PipelineError, PipelineResult};
use crate::graph::RecordKey;
use crate::scan::{Archive, SchemaAliases};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: usize = 1_000_000;
pub const DEFAULT_GIANTS: usize = 20;

/// Classification prefixes selected by default: machine learning, pattern
/// recognition, vision, NLP, adaptive control, sensing and driver assistance
/// codes across old and new scheme versions.
pub const DEFAULT_PREFIXES: [&str; 12] = [
    "G06N", "G06F15/18", "G06K9", "G06V", "G06T7", "G06F17/30", "G06F40", "B25J9/16", "G05B13",
    "G01S", "G10L", "B60W30",
];

/// Location of a table: a file plus, for zip archives, an optional member.
///
/// In YAML either a bare path or `{ path: ..., member: ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ArchiveSpecRepr")]
pub struct ArchiveSpec {
    pub path: PathBuf,
    pub member: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArchiveSpecRepr {
    Path(PathBuf),
    Full {
        path: PathBuf,
        #[serde(default)]
        member: Option<String>,
    },
}

impl From<ArchiveSpecRepr> for ArchiveSpec {
    fn from(repr: ArchiveSpecRepr) -> Self {
        match repr {
            ArchiveSpecRepr::Path(path) => Self { path, member: None },
            ArchiveSpecRepr::Full { path, member } => Self { path, member },
        }
    }
}

impl ArchiveSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            member: None,
        }
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    pub fn open(&self) -> PipelineResult<Archive> {
        Ok(Archive::open(&self.path, self.member.as_deref())?)
    }
}

/// Input archives
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputPaths {
    /// Citation table: citing record, cited record, citation date
    pub citations: ArchiveSpec,
    /// Record table: record id and grant date
    pub records: ArchiveSpec,
    /// Disambiguated assignee table
    pub assignees: ArchiveSpec,
    /// CPC classification table
    pub cpc: ArchiveSpec,
    /// IPC classification table
    pub ipc: ArchiveSpec,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            citations: ArchiveSpec::new("g_us_patent_citation.tsv.zip"),
            records: ArchiveSpec::new("g_patent.tsv.zip"),
            assignees: ArchiveSpec::new("g_assignee_disambiguated.tsv.zip"),
            cpc: ArchiveSpec::new("g_cpc_current.tsv.zip"),
            ipc: ArchiveSpec::new("g_ipc_at_issue.tsv.zip"),
        }
    }
}

/// Output tables
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputPaths {
    pub nodes: PathBuf,
    pub edges: PathBuf,
    pub links: PathBuf,
    pub summary: PathBuf,
    pub seeds: PathBuf,
    pub profile: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            nodes: PathBuf::from("expanded_diffusion_nodes.csv"),
            edges: PathBuf::from("expanded_diffusion_edges.csv"),
            links: PathBuf::from("citation_links.csv"),
            summary: PathBuf::from("citation_summary.csv"),
            seeds: PathBuf::from("selected_patent_ids.csv"),
            profile: PathBuf::from("citing_profile.csv"),
        }
    }
}

impl OutputPaths {
    /// Default output files placed under `dir`
    pub fn rooted_at(dir: &Path) -> Self {
        Self::default().reroot(dir)
    }

    /// Move every configured output file into `dir`, keeping its file name
    pub fn reroot(&self, dir: &Path) -> Self {
        let under = |p: &Path| match p.file_name() {
            Some(name) => dir.join(name),
            None => dir.join(p),
        };
        Self {
            nodes: under(&self.nodes),
            edges: under(&self.edges),
            links: under(&self.links),
            summary: under(&self.summary),
            seeds: under(&self.seeds),
            profile: under(&self.profile),
        }
    }
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Core record the diffusion graph is rooted at
    pub seed: Option<String>,
    /// File holding a seed key list (first column or a `patent_id` column)
    pub seed_list: Option<PathBuf>,
    /// Rows per batch
    pub batch_size: usize,
    /// Number of giants drawn from the direct citers
    pub giants: usize,
    pub inputs: InputPaths,
    pub outputs: OutputPaths,
    /// Overrides for the column alias table
    pub schema: SchemaAliases,
    /// Delimiter of written tables
    pub output_delimiter: char,
    /// Classification code prefixes for seed selection
    pub prefixes: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            seed_list: None,
            batch_size: DEFAULT_BATCH_SIZE,
            giants: DEFAULT_GIANTS,
            inputs: InputPaths::default(),
            outputs: OutputPaths::default(),
            schema: SchemaAliases::default(),
            output_delimiter: ',',
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl PipelineConfig {
    /// Load a config from a YAML file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_yaml::from_str(&text).map_err(|source| PipelineError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that cannot be expressed in the types
    pub fn validate(&self) -> PipelineResult<()> {
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if !self.output_delimiter.is_ascii() {
            return Err(PipelineError::InvalidConfig(format!(
                "output_delimiter must be a single ASCII character, got {:?}",
                self.output_delimiter
            )));
        }
        if let Some(seed) = &self.seed {
            if RecordKey::parse(seed).is_none() {
                return Err(PipelineError::InvalidConfig("seed key is blank".to_string()));
            }
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_giants(mut self, giants: usize) -> Self {
        self.giants = giants;
        self
    }

    /// The configured seed as a canonical key
    pub fn seed_key(&self) -> PipelineResult<RecordKey> {
        self.seed
            .as_deref()
            .and_then(RecordKey::parse)
            .ok_or_else(|| PipelineError::InvalidConfig("no seed key configured".to_string()))
    }

    /// Output delimiter as a byte
    pub fn delimiter(&self) -> u8 {
        if self.output_delimiter.is_ascii() {
            self.output_delimiter as u8
        } else {
            b','
        }
    }
}
