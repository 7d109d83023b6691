//! Archive fixtures

use citeflow::pipeline::{ArchiveSpec, OutputPaths};
use citeflow::PipelineConfig;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::unstable::write::FileOptionsExt;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Render a header and rows as tab-separated text
pub fn tsv(header: &[&str], rows: &[Vec<&str>]) -> String {
    let mut text = header.join("\t");
    text.push('\n');
    for row in rows {
        text.push_str(&row.join("\t"));
        text.push('\n');
    }
    text
}

pub fn write_plain(path: &Path, text: &str) -> PathBuf {
    std::fs::write(path, text).expect("write plain table");
    path.to_path_buf()
}

/// Write a zip holding `text` as `member`
pub fn write_zip(path: &Path, member: &str, text: &str) -> PathBuf {
    write_zip_with_members(path, &[(member, text)])
}

/// Write a zip holding several members, in order
pub fn write_zip_with_members(path: &Path, members: &[(&str, &str)]) -> PathBuf {
    let file = File::create(path).expect("create zip");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, text) in members {
        zip.start_file(*name, options).expect("start zip member");
        zip.write_all(text.as_bytes()).expect("write zip member");
    }
    zip.finish().expect("finish zip");
    path.to_path_buf()
}

/// Write a zip whose first member is password protected, followed by `member`
pub fn write_zip_with_locked_entry(path: &Path, locked: &str, member: &str, text: &str) -> PathBuf {
    let file = File::create(path).expect("create zip");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(locked, options.with_deprecated_encryption(b"secret"))
        .expect("start locked member");
    zip.write_all(b"private").expect("write locked member");
    zip.start_file(member, options).expect("start zip member");
    zip.write_all(text.as_bytes()).expect("write zip member");
    zip.finish().expect("finish zip");
    path.to_path_buf()
}

pub fn write_gzip(path: &Path, text: &str) -> PathBuf {
    let file = File::create(path).expect("create gzip");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(text.as_bytes()).expect("write gzip");
    encoder.finish().expect("finish gzip");
    path.to_path_buf()
}

/// A temporary directory with a config whose outputs all point into it
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Default config with outputs under `out/` and the citation archive set
    pub fn config(&self, citations: &Path) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.outputs = OutputPaths::rooted_at(&self.path("out"));
        config.inputs.citations = ArchiveSpec::new(citations);
        config
    }

    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).expect("read output table")
    }
}

/// Citation table header in the archive's own column names
pub const CITATION_HEADER: [&str; 3] = ["patent_id", "citation_patent_id", "citation_date"];

/// Citation rows `(citing, cited)` with a fixed date
pub fn citation_tsv(pairs: &[(&str, &str)]) -> String {
    let rows: Vec<Vec<&str>> = pairs
        .iter()
        .map(|(source, target)| vec![*source, *target, "2001-01-01"])
        .collect();
    tsv(&CITATION_HEADER, &rows)
}
