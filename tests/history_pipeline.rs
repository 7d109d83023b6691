//! Link extraction feeding the yearly history summary

mod common;

use citeflow::aggregate::format_history;
use citeflow::pipeline::{build_histories, run_links, seed_keys, ArchiveSpec};
use citeflow::{CancellationToken, CitationHistory, PipelineConfig};
use common::{tsv, write_plain, write_zip, Workspace};
use std::collections::BTreeMap;

fn archives(ws: &Workspace) -> PipelineConfig {
    let citations = write_zip(
        &ws.path("g_us_patent_citation.tsv.zip"),
        "g_us_patent_citation.tsv",
        &tsv(
            &["patent_id", "citation_patent_id", "citation_date"],
            &[
                vec!["P1", "S1", "1996-04-01"],
                vec!["P2", "S1", "1997-01-09"],
                vec!["P3", "S1", "1997-11-30"],
                vec!["P4", "S2", "2004-02-02"],
                vec!["P5", "OTHER", "2004-02-02"],
                vec!["P6", "S2", ""],
            ],
        ),
    );
    let records = write_zip(
        &ws.path("g_patent.tsv.zip"),
        "g_patent.tsv",
        &tsv(
            &["patent_id", "patent_type", "patent_date"],
            &[
                vec!["S1", "utility", "1990-02-20"],
                vec!["P1", "utility", "1996-08-01"],
                vec!["P2", "utility", "1997-05-05"],
                vec!["P3", "utility", "1998-01-13"],
                vec!["P4", "utility", "2005-10-10"],
                vec!["P5", "utility", "2005-10-10"],
                vec!["P6", "design", ""],
            ],
        ),
    );

    let mut config = ws.config(&citations);
    config.inputs.records = ArchiveSpec::new(&records);
    config
}

#[test]
fn summary_from_seed_list() {
    let ws = Workspace::new();
    let mut config = archives(&ws);
    config.seed_list = Some(write_plain(
        &ws.path("selected_patent_ids.csv"),
        "patent_id\nS1\nS2\n",
    ));
    let cancel = CancellationToken::new();

    let seeds = seed_keys(&config, &cancel).unwrap();
    assert_eq!(seeds.len(), 2);

    let links = run_links(&config, &seeds, &cancel).unwrap();
    assert_eq!(links.links, 5);

    let report = build_histories(&config, &cancel).unwrap();
    assert_eq!(report.targets, 2);
    assert_eq!(report.undated_links, 1);
    assert_eq!(report.undated_targets, 1);

    assert_eq!(
        ws.read(&config.outputs.summary),
        "target_id,birth_year,total_citations,history_string\n\
         S1,1990,3,1996:1; 1997:1; 1998:1\n\
         S2,0,1,2005:1\n"
    );
}

#[test]
fn summary_history_strings_round_trip() {
    let ws = Workspace::new();
    let config = archives(&ws).with_seed("S1");
    let cancel = CancellationToken::new();

    let seeds = seed_keys(&config, &cancel).unwrap();
    run_links(&config, &seeds, &cancel).unwrap();
    build_histories(&config, &cancel).unwrap();

    let summary = ws.read(&config.outputs.summary);
    let mut rows = csv::Reader::from_reader(summary.as_bytes());
    for row in rows.records() {
        let row = row.unwrap();
        let total: u64 = row[2].parse().unwrap();
        let years = CitationHistory::parse_history(&row[3]).unwrap();
        assert_eq!(years.values().sum::<u64>(), total);
        assert_eq!(format_history(&years), &row[3]);
    }
}

#[test]
fn history_string_round_trip() {
    let mut years = BTreeMap::new();
    years.insert(2001, 4u64);
    years.insert(1994, 1);
    years.insert(2010, 12);

    let text = format_history(&years);
    assert_eq!(text, "1994:1; 2001:4; 2010:12");
    assert_eq!(CitationHistory::parse_history(&text).unwrap(), years);
    assert!(CitationHistory::parse_history("1994-1").is_err());
    assert!(CitationHistory::parse_history("").unwrap().is_empty());
}
