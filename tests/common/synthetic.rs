//! Seeded synthetic citation tables

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::archives::{tsv, CITATION_HEADER};

/// A generated citation table and the seed it was built around
pub struct SyntheticCitations {
    pub seed: String,
    pub rows: usize,
    pub text: String,
}

/// Generate `rows` random citations among numeric keys.
///
/// The seed gets `citers` direct citers; targets are drawn from a small key
/// range so that direct citers are themselves cited often. Some cells use a
/// float encoding (`1000123.0`) the way numeric exports do.
pub fn random_citations(rng_seed: u64, rows: usize, citers: u64) -> SyntheticCitations {
    let mut rng = StdRng::seed_from_u64(rng_seed);
    let seed = "999".to_string();
    let key = |n: u64| (1_000_000 + n).to_string();

    let mut pairs: Vec<(String, String)> = (0..citers).map(|n| (key(n), seed.clone())).collect();
    while pairs.len() < rows {
        let source = key(rng.gen_range(0..4 * citers.max(1) + 500));
        let target = if rng.gen_bool(0.02) {
            seed.clone()
        } else {
            key(rng.gen_range(0..2 * citers.max(1)))
        };
        let target = if rng.gen_bool(0.1) {
            format!("{}.0", target)
        } else {
            target
        };
        pairs.push((source, target));
    }
    pairs.shuffle(&mut rng);

    let table: Vec<Vec<&str>> = pairs
        .iter()
        .map(|(s, t)| vec![s.as_str(), t.as_str(), "2010-06-01"])
        .collect();
    SyntheticCitations {
        seed,
        rows: pairs.len(),
        text: tsv(&CITATION_HEADER, &table),
    }
}
