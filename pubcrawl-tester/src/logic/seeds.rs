use anyhow::{Result, bail};
use std::collections::HashSet;

use crate::common::parse_seed_token;

/// Seed used when no tokens were supplied.
pub const DEFAULT_SEED: u64 = 1337;

/// Resolve a list of CLI seed arguments into unique numeric seeds.
///
/// Accepts decimal or `0x`-prefixed hexadecimal values. Duplicates keep their
/// first position; an empty list falls back to [`DEFAULT_SEED`].
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seen = HashSet::new();
    let mut seeds = Vec::new();

    for token in tokens {
        if token.trim().is_empty() {
            continue;
        }
        let Some(seed) = parse_seed_token(token) else {
            bail!("Unrecognized seed token: {token}");
        };
        if seen.insert(seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    Ok(seeds)
}
