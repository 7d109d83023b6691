//! Schema alias table for column resolution
//!
//! Archive releases rename columns (`patent_id` vs `id`, `patent_date` vs
//! `date`). Callers ask for canonical field names; the alias table maps each
//! to an ordered list of accepted header names and the first one present in
//! the header wins.

use super::error::{ScanError, ScanResult};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Canonical field names understood by the default alias table
pub mod fields {
    /// Identifier of the record a row belongs to (the citing record in a
    /// citation table)
    pub const RECORD_ID: &str = "record_id";
    /// Identifier of the cited record
    pub const CITED_ID: &str = "cited_id";
    /// Date the citation was made
    pub const CITATION_DATE: &str = "citation_date";
    /// Grant or publication date of a record
    pub const RECORD_DATE: &str = "record_date";
    /// Disambiguated assignee organization
    pub const ORGANIZATION: &str = "organization";
    /// CPC group code
    pub const CPC_GROUP: &str = "cpc_group";
    pub const IPC_SECTION: &str = "ipc_section";
    pub const IPC_CLASS: &str = "ipc_class";
    pub const IPC_SUBCLASS: &str = "ipc_subclass";
    pub const IPC_MAIN_GROUP: &str = "ipc_main_group";
    pub const IPC_SUBGROUP: &str = "ipc_subgroup";
}

/// Mapping from canonical field name to accepted header aliases.
///
/// Deserializes from a map of overrides that is layered on top of the
/// defaults, so a config file only needs to name the fields it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<String>>")]
pub struct SchemaAliases {
    aliases: BTreeMap<String, Vec<String>>,
}

impl Default for SchemaAliases {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            (
                fields::RECORD_ID,
                &["patent_id", "patent_number", "id", "source_id"],
            ),
            (
                fields::CITED_ID,
                &["citation_patent_id", "cited_patent_id", "citation_id", "target_id"],
            ),
            (fields::CITATION_DATE, &["citation_date", "date"]),
            (fields::RECORD_DATE, &["patent_date", "date", "grant_date"]),
            (
                fields::ORGANIZATION,
                &["organization", "disambig_assignee_organization"],
            ),
            (
                fields::CPC_GROUP,
                &["cpc_group", "group_id", "cpc_subclass", "subsection_id"],
            ),
            (fields::IPC_SECTION, &["section"]),
            (fields::IPC_CLASS, &["ipc_class"]),
            (fields::IPC_SUBCLASS, &["subclass"]),
            (fields::IPC_MAIN_GROUP, &["main_group"]),
            (fields::IPC_SUBGROUP, &["subgroup"]),
        ];

        let aliases = table
            .iter()
            .map(|(field, names)| {
                (
                    field.to_string(),
                    names.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect();
        Self { aliases }
    }
}

impl From<BTreeMap<String, Vec<String>>> for SchemaAliases {
    fn from(overrides: BTreeMap<String, Vec<String>>) -> Self {
        let mut schema = Self::default();
        for (field, names) in overrides {
            schema.set(field, names);
        }
        schema
    }
}

impl SchemaAliases {
    /// An empty table; every field resolves only under its own name.
    pub fn empty() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    /// Replace the alias list for a field
    pub fn set(&mut self, field: impl Into<String>, aliases: Vec<String>) {
        self.aliases.insert(field.into(), aliases);
    }

    /// Builder form of [`SchemaAliases::set`]
    pub fn with(mut self, field: impl Into<String>, aliases: &[&str]) -> Self {
        self.set(field, aliases.iter().map(|a| a.to_string()).collect());
        self
    }

    /// Accepted header names for a field, in probe order.
    ///
    /// A field with no entry is only accepted under its own name.
    pub fn aliases_for(&self, field: &str) -> Vec<String> {
        match self.aliases.get(field) {
            Some(names) if !names.is_empty() => names.clone(),
            _ => vec![field.to_string()],
        }
    }

    /// Resolve one field against a normalized header.
    pub fn resolve(&self, header: &[String], field: &str) -> ScanResult<usize> {
        let aliases = self.aliases_for(field);
        aliases
            .iter()
            .find_map(|alias| header.iter().position(|h| h == alias))
            .ok_or_else(|| ScanError::MissingColumn {
                field: field.to_string(),
                aliases,
                available: header.to_vec(),
            })
    }

    /// Resolve every requested field, in request order.
    pub fn resolve_all(&self, header: &[String], fields: &[&str]) -> ScanResult<Vec<usize>> {
        fields.iter().map(|f| self.resolve(header, f)).collect()
    }
}

/// Strip a byte-order mark, whitespace and surrounding quotes from a header
/// cell.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .trim_matches('"')
        .trim()
        .to_string()
}
