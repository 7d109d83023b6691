//! Common test utilities for citeflow integration tests
//!
//! Fixtures write small delimited tables into temporary directories, either
//! plain, zipped or gzipped, the way the real archives are distributed.

#![allow(dead_code)]

pub mod archives;
pub mod synthetic;

pub use archives::{
    citation_tsv, tsv, write_gzip, write_plain, write_zip, write_zip_with_locked_entry,
    write_zip_with_members, Workspace, CITATION_HEADER,
};
pub use synthetic::{random_citations, SyntheticCitations};
