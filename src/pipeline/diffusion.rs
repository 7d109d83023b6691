//! Multi-hop diffusion graph: discovery, weighting and expansion passes
//!
//! Each pass is a full scan of the citation archive and each depends on the
//! complete result of the one before it:
//!
//! 1. discovery collects the direct citers of the seed ([`HopOne`])
//! 2. weighting counts how often each direct citer is cited and ranks the
//!    giants ([`Weights`])
//! 3. expansion classifies every row against the monitored set and the
//!    giants, streaming edges to an [`EdgeSink`] ([`ExpansionReport`])
//!
//! The handoff values are immutable; a later pass only ever borrows them.

use super::assembler::assemble;
use super::cancel::CancellationToken;
use super::config::PipelineConfig;
use super::error::PipelineResult;
use super::pass::{check_columns, for_each_batch, PassStats};
use crate::aggregate::{matching_rows, rows_equal, FrequencyCounter, FrequencyTable};
use crate::graph::{Edge, KeySet, Layer, NodeTable, RecordKey};
use crate::output::{write_nodes, EdgeSink, EdgeTableSink};
use crate::scan::{fields, Archive};
use serde::Serialize;

const CITATION_FIELDS: [&str; 2] = [fields::RECORD_ID, fields::CITED_ID];

/// Direct citers of the seed, the result of the discovery pass.
#[derive(Debug, Clone)]
pub struct HopOne {
    pub seed: RecordKey,
    pub citers: KeySet,
    /// Citers in the order they were first seen
    pub order: Vec<RecordKey>,
    /// Rows citing the seed
    pub seed_citations: u64,
    pub stats: PassStats,
}

impl HopOne {
    /// The seed together with its direct citers
    pub fn monitored(&self) -> KeySet {
        let mut monitored = self.citers.clone();
        monitored.insert(self.seed.clone());
        monitored
    }

    pub fn len(&self) -> usize {
        self.citers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citers.is_empty()
    }
}

/// Completed citation counts over the direct citers and the giants drawn
/// from them.
#[derive(Debug, Clone)]
pub struct Weights {
    pub table: FrequencyTable,
    /// Giants in rank order
    pub giants: Vec<RecordKey>,
    pub giant_set: KeySet,
    pub stats: PassStats,
}

impl Weights {
    /// Times `key` was cited in the weighting pass
    pub fn weight_of(&self, key: &RecordKey) -> u64 {
        self.table.count(key)
    }

    pub fn is_giant(&self, key: &RecordKey) -> bool {
        self.giant_set.contains(key)
    }
}

/// What the expansion pass emitted
#[derive(Debug, Clone, Default)]
pub struct ExpansionReport {
    pub internal_edges: u64,
    pub diffusion_edges: u64,
    /// Citers of giants outside the monitored set
    pub layer3: KeySet,
    /// Matched rows skipped because the citing key was blank
    pub blank_rows: u64,
    pub stats: PassStats,
}

/// Discovery pass: every row whose cited record is the seed.
pub fn discover(
    archive: &mut Archive,
    seed: &RecordKey,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> PipelineResult<HopOne> {
    let mut citers = KeySet::new();
    let mut order = Vec::new();
    let mut seed_citations = 0u64;

    let stats = for_each_batch(
        "discovery",
        archive,
        &CITATION_FIELDS,
        &config.schema,
        config.batch_size,
        cancel,
        |batch| {
            for row in rows_equal(batch, 1, seed) {
                seed_citations += 1;
                if let Some(source) = RecordKey::parse(row.get(0)) {
                    if citers.insert(source.clone()) {
                        order.push(source);
                    }
                }
            }
            Ok(())
        },
    )?;

    tracing::info!(
        seed = %seed,
        citers = citers.len(),
        seed_citations,
        "discovery pass complete"
    );
    Ok(HopOne {
        seed: seed.clone(),
        citers,
        order,
        seed_citations,
        stats,
    })
}

/// Weighting pass: count citations of every direct citer, then pick the
/// `giants` most cited.
///
/// Ranking only happens on the finished table. When fewer than `giants`
/// citers were cited at all, uncited citers fill the remaining places in
/// discovery order, so the giant set always holds `min(giants, |hop-1|)`
/// keys.
pub fn weigh(
    archive: &mut Archive,
    hop: &HopOne,
    giants: usize,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> PipelineResult<Weights> {
    let mut counter = FrequencyCounter::new();

    let stats = for_each_batch(
        "weighting",
        archive,
        &[fields::CITED_ID],
        &config.schema,
        config.batch_size,
        cancel,
        |batch| {
            for row in matching_rows(batch, 0, &hop.citers) {
                if let Some(target) = RecordKey::parse(row.get(0)) {
                    counter.record_at(target, row.ordinal());
                }
            }
            Ok(())
        },
    )?;

    let table = counter.finish();
    let mut ranked = table.top_n(giants);
    let wanted = giants.min(hop.len());
    if ranked.len() < wanted {
        let mut chosen: KeySet = ranked.iter().cloned().collect();
        for key in &hop.order {
            if ranked.len() == wanted {
                break;
            }
            if chosen.insert(key.clone()) {
                ranked.push(key.clone());
            }
        }
    }
    let giant_set: KeySet = ranked.iter().cloned().collect();

    tracing::info!(
        cited = table.distinct(),
        citations = table.observations(),
        giants = ranked.len(),
        "weighting pass complete"
    );
    Ok(Weights {
        table,
        giants: ranked,
        giant_set,
        stats,
    })
}

/// Expansion pass: classify every row against the monitored set and the
/// giants.
///
/// The two predicates are evaluated independently. A row whose endpoints are
/// both monitored and whose target is a giant yields an internal and a
/// diffusion edge for the same pair.
pub fn expand<S: EdgeSink>(
    archive: &mut Archive,
    hop: &HopOne,
    weights: &Weights,
    sink: &mut S,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> PipelineResult<ExpansionReport> {
    let monitored = hop.monitored();
    let mut report = ExpansionReport::default();

    report.stats = for_each_batch(
        "expansion",
        archive,
        &CITATION_FIELDS,
        &config.schema,
        config.batch_size,
        cancel,
        |batch| {
            for row in batch.rows() {
                let (source_raw, target_raw) = (row.get(0), row.get(1));
                let source_monitored = monitored.contains_raw(source_raw);
                let internal = source_monitored && monitored.contains_raw(target_raw);
                let diffusion = weights.giant_set.contains_raw(target_raw);
                if !internal && !diffusion {
                    continue;
                }
                let (Some(source), Some(target)) =
                    (RecordKey::parse(source_raw), RecordKey::parse(target_raw))
                else {
                    report.blank_rows += 1;
                    continue;
                };

                if internal {
                    sink.accept(Edge::internal(source.clone(), target.clone()))?;
                    report.internal_edges += 1;
                }
                if diffusion {
                    if !source_monitored {
                        report.layer3.insert(source.clone());
                    }
                    sink.accept(Edge::diffusion(source, target))?;
                    report.diffusion_edges += 1;
                }
            }
            Ok(())
        },
    )?;
    sink.finish()?;

    if report.blank_rows > 0 {
        tracing::debug!(rows = report.blank_rows, "skipped rows with blank keys");
    }
    tracing::info!(
        internal = report.internal_edges,
        diffusion = report.diffusion_edges,
        layer3 = report.layer3.len(),
        "expansion pass complete"
    );
    Ok(report)
}

/// Summary of one diffusion run
#[derive(Debug, Clone, Serialize)]
pub struct DiffusionOutcome {
    pub seed: RecordKey,
    pub seed_citations: u64,
    pub citers: usize,
    pub giants: Vec<RecordKey>,
    pub internal_edges: u64,
    pub diffusion_edges: u64,
    pub awakeners: usize,
    pub citing_l2: usize,
    pub diffusion_l3: usize,
    pub passes: Vec<PassStats>,
    #[serde(skip)]
    pub nodes: NodeTable,
}

impl DiffusionOutcome {
    fn empty(hop: &HopOne) -> Self {
        Self {
            seed: hop.seed.clone(),
            seed_citations: hop.seed_citations,
            citers: 0,
            giants: Vec::new(),
            internal_edges: 0,
            diffusion_edges: 0,
            awakeners: 0,
            citing_l2: 0,
            diffusion_l3: 0,
            passes: vec![hop.stats],
            nodes: NodeTable::new(),
        }
    }

    /// True when the seed had no citers and nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The diffusion graph pipeline for one seed over one citation archive.
#[derive(Debug, Clone)]
pub struct DiffusionPipeline {
    config: PipelineConfig,
    cancel: CancellationToken,
}

impl DiffusionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` to stop the run between batches
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run all passes, streaming edges to `sink`, and return the assembled
    /// node table inside the outcome. Nothing is written to disk.
    pub fn run_with_sink<S: EdgeSink>(&self, sink: &mut S) -> PipelineResult<DiffusionOutcome> {
        self.config.validate()?;
        let seed = self.config.seed_key()?;
        let mut archive = self.config.inputs.citations.open()?;
        self.run_on(&mut archive, &seed, sink)
    }

    /// Run all passes and write the node and edge tables.
    ///
    /// Inputs and columns are checked before any output file is created. An
    /// empty hop-1 set still produces both tables, header only.
    pub fn run(&self) -> PipelineResult<DiffusionOutcome> {
        self.config.validate()?;
        let seed = self.config.seed_key()?;
        let mut archive = self.config.inputs.citations.open()?;
        check_columns(&mut archive, &CITATION_FIELDS, &self.config.schema)?;

        let outputs = &self.config.outputs;
        let delimiter = self.config.delimiter();
        let mut sink = EdgeTableSink::create(&outputs.edges, delimiter)?;
        let outcome = self.run_on(&mut archive, &seed, &mut sink)?;
        let written = write_nodes(&outputs.nodes, delimiter, outcome.nodes.iter())?;

        tracing::info!(
            nodes = written,
            edges = sink.internal_edges() + sink.diffusion_edges(),
            node_table = %outputs.nodes.display(),
            edge_table = %outputs.edges.display(),
            "diffusion tables written"
        );
        Ok(outcome)
    }

    fn run_on<S: EdgeSink>(
        &self,
        archive: &mut Archive,
        seed: &RecordKey,
        sink: &mut S,
    ) -> PipelineResult<DiffusionOutcome> {
        let config = &self.config;
        let hop = discover(archive, seed, config, &self.cancel)?;
        if hop.is_empty() {
            tracing::info!(seed = %seed, "seed has no citers, nothing to expand");
            sink.finish()?;
            return Ok(DiffusionOutcome::empty(&hop));
        }

        let weights = weigh(archive, &hop, config.giants, config, &self.cancel)?;
        let report = expand(archive, &hop, &weights, sink, config, &self.cancel)?;
        let nodes = assemble(&hop, &weights, &report.layer3);

        Ok(DiffusionOutcome {
            seed: hop.seed.clone(),
            seed_citations: hop.seed_citations,
            citers: hop.len(),
            giants: weights.giants.clone(),
            internal_edges: report.internal_edges,
            diffusion_edges: report.diffusion_edges,
            awakeners: nodes.count_in(Layer::Awakener),
            citing_l2: nodes.count_in(Layer::CitingL2),
            diffusion_l3: nodes.count_in(Layer::DiffusionL3),
            passes: vec![hop.stats, weights.stats, report.stats],
            nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeKind;
    use crate::pipeline::{ArchiveSpec, PipelineError};
    use std::path::Path;

    fn citation_archive(dir: &Path, rows: &[(&str, &str)]) -> PipelineConfig {
        let path = dir.join("citations.tsv");
        let mut text = String::from("patent_id\tcitation_patent_id\tcitation_date\n");
        for (source, target) in rows {
            text.push_str(&format!("{}\t{}\t2000-01-01\n", source, target));
        }
        std::fs::write(&path, text).unwrap();

        let mut config = PipelineConfig::default().with_seed("A").with_giants(1);
        config.inputs.citations = ArchiveSpec::new(path);
        config
    }

    #[test]
    fn scenario_graph() {
        let dir = tempfile::tempdir().unwrap();
        let config = citation_archive(dir.path(), &[("B", "A"), ("C", "A"), ("D", "B")]);
        let mut edges: Vec<Edge> = Vec::new();
        let outcome = DiffusionPipeline::new(config).run_with_sink(&mut edges).unwrap();

        assert_eq!(outcome.citers, 2);
        assert_eq!(outcome.giants, vec![RecordKey::from("B")]);
        assert_eq!(
            edges,
            vec![
                Edge::internal("B".into(), "A".into()),
                Edge::internal("C".into(), "A".into()),
                Edge::diffusion("D".into(), "B".into()),
            ]
        );
        let layers: Vec<(String, Layer, u64)> = outcome
            .nodes
            .iter()
            .map(|n| (n.id.to_string(), n.layer, n.weight))
            .collect();
        assert_eq!(
            layers,
            vec![
                ("A".to_string(), Layer::Core, 2),
                ("B".to_string(), Layer::Awakener, 1),
                ("C".to_string(), Layer::CitingL2, 0),
                ("D".to_string(), Layer::DiffusionL3, 1),
            ]
        );
    }

    #[test]
    fn giants_pad_with_uncited_citers() {
        let dir = tempfile::tempdir().unwrap();
        let config = citation_archive(dir.path(), &[("B", "A"), ("C", "A")]).with_giants(5);
        let mut archive = config.inputs.citations.open().unwrap();
        let cancel = CancellationToken::new();
        let hop = discover(&mut archive, &"A".into(), &config, &cancel).unwrap();
        let weights = weigh(&mut archive, &hop, 5, &config, &cancel).unwrap();
        assert_eq!(weights.giants, vec![RecordKey::from("B"), RecordKey::from("C")]);
    }

    #[test]
    fn dual_predicate_row_emits_two_edges() {
        let dir = tempfile::tempdir().unwrap();
        // C cites A and B; B is the giant and both are monitored
        let config = citation_archive(
            dir.path(),
            &[("B", "A"), ("C", "A"), ("C", "B"), ("E", "B")],
        );
        let mut edges: Vec<Edge> = Vec::new();
        DiffusionPipeline::new(config).run_with_sink(&mut edges).unwrap();

        let c_to_b: Vec<EdgeKind> = edges
            .iter()
            .filter(|e| e.source.as_str() == "C" && e.target.as_str() == "B")
            .map(|e| e.kind)
            .collect();
        assert_eq!(c_to_b, vec![EdgeKind::Internal, EdgeKind::Diffusion]);
    }

    #[test]
    fn seed_without_citers_is_empty_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let config = citation_archive(dir.path(), &[("B", "C")]);
        let mut edges: Vec<Edge> = Vec::new();
        let outcome = DiffusionPipeline::new(config).run_with_sink(&mut edges).unwrap();
        assert!(outcome.is_empty());
        assert!(edges.is_empty());
        assert_eq!(outcome.passes.len(), 1);
    }

    #[test]
    fn cancelled_run_stops() {
        let dir = tempfile::tempdir().unwrap();
        let config = citation_archive(dir.path(), &[("B", "A")]);
        let token = CancellationToken::new();
        token.cancel();
        let mut edges: Vec<Edge> = Vec::new();
        let err = DiffusionPipeline::new(config)
            .with_cancellation(token)
            .run_with_sink(&mut edges)
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Cancelled { ref stage } if stage == "discovery"
        ));
    }
}
