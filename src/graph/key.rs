//! Record keys and their canonical string form

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;

/// Opaque identifier of a citation record (patent or document number).
///
/// Keys are compared as strings and never parsed as numbers, so leading
/// zeros and alphanumeric prefixes (`RE28671`, `D0512345`) survive intact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    /// Build a key from a raw cell, canonicalizing it first.
    ///
    /// Returns `None` when nothing is left after canonicalization.
    pub fn parse(raw: &str) -> Option<Self> {
        let canonical = canonical_key(raw);
        if canonical.is_empty() {
            None
        } else {
            Some(Self(canonical.to_string()))
        }
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for RecordKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        Self(canonical_key(s).to_string())
    }
}

impl From<String> for RecordKey {
    fn from(s: String) -> Self {
        if canonical_key(&s).len() == s.len() {
            Self(s)
        } else {
            Self(canonical_key(&s).to_string())
        }
    }
}

/// Coerce a raw cell to the canonical key representation.
///
/// Archives encode the same key inconsistently: padded with whitespace,
/// wrapped in quotes, prefixed with a byte-order mark, or re-exported as a
/// float (`4901362.0`). All of these map to the same canonical string,
/// which is always a slice of the input.
pub fn canonical_key(raw: &str) -> &str {
    let mut s = raw.trim_start_matches('\u{feff}').trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s = s[1..s.len() - 1].trim();
    }

    if let Some((int_part, frac)) = s.split_once('.') {
        let integral = !int_part.is_empty() && int_part.bytes().all(|b| b.is_ascii_digit());
        let zero_fraction = !frac.is_empty() && frac.bytes().all(|b| b == b'0');
        if integral && zero_fraction {
            s = int_part;
        }
    }

    s
}

/// A set of canonical record keys.
///
/// Lookups through [`KeySet::contains_raw`] canonicalize the probe first, so
/// a raw archive cell can be tested without allocating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    keys: HashSet<RecordKey>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, returning `true` if it was not present.
    pub fn insert(&mut self, key: RecordKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.keys.contains(key)
    }

    /// Test a raw, uncanonicalized cell for membership.
    pub fn contains_raw(&self, raw: &str) -> bool {
        let canonical = canonical_key(raw);
        !canonical.is_empty() && self.keys.contains(canonical)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordKey> {
        self.keys.iter()
    }

    /// Keys in ascending string order, for deterministic output.
    pub fn sorted(&self) -> Vec<RecordKey> {
        let mut keys: Vec<RecordKey> = self.keys.iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Union of two sets as a new set.
    pub fn union(&self, other: &KeySet) -> KeySet {
        self.keys.union(&other.keys).cloned().collect()
    }
}

impl FromIterator<RecordKey> for KeySet {
    fn from_iter<I: IntoIterator<Item = RecordKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl Extend<RecordKey> for KeySet {
    fn extend<I: IntoIterator<Item = RecordKey>>(&mut self, iter: I) {
        self.keys.extend(iter);
    }
}

impl<'a> IntoIterator for &'a KeySet {
    type Item = &'a RecordKey;
    type IntoIter = std::collections::hash_set::Iter<'a, RecordKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_strips_decoration() {
        assert_eq!(canonical_key("  4901362 "), "4901362");
        assert_eq!(canonical_key("\"4901362\""), "4901362");
        assert_eq!(canonical_key("\u{feff}4901362"), "4901362");
    }

    #[test]
    fn canonical_key_drops_float_suffix() {
        assert_eq!(canonical_key("4901362.0"), "4901362");
        assert_eq!(canonical_key("4901362.000"), "4901362");
        // Non-zero fraction and non-digit keys are left alone
        assert_eq!(canonical_key("4901362.5"), "4901362.5");
        assert_eq!(canonical_key("RE28671.0"), "RE28671.0");
    }

    #[test]
    fn canonical_key_keeps_leading_zeros() {
        assert_eq!(canonical_key("0012345"), "0012345");
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(RecordKey::parse("   ").is_none());
        assert!(RecordKey::parse("\"\"").is_none());
        assert_eq!(RecordKey::parse(" 42 ").unwrap().as_str(), "42");
    }

    #[test]
    fn key_set_matches_raw_numeric_encodings() {
        let set: KeySet = vec![RecordKey::from("4901362")].into_iter().collect();
        assert!(set.contains_raw("4901362"));
        assert!(set.contains_raw("4901362.0"));
        assert!(set.contains_raw(" \"4901362\" "));
        assert!(!set.contains_raw("490136"));
        assert!(!set.contains_raw(""));
    }

    #[test]
    fn sorted_is_lexicographic() {
        let set: KeySet = ["20", "3", "100"].iter().map(|s| RecordKey::from(*s)).collect();
        let sorted: Vec<String> = set.sorted().iter().map(|k| k.to_string()).collect();
        assert_eq!(sorted, vec!["100", "20", "3"]);
    }
}
