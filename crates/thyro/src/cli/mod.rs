//! Command implementations.

pub mod config;
pub mod dataset;
pub mod evaluate;
pub mod files;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seeded generator when `--seed` is given, otherwise seeded from entropy.
pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            tracing::info!("Using random seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}
