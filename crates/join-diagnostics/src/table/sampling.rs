//! Seeded row sampling for large inputs.
//!
//! Sampling is a pre-processing step: the analyzer calls it before deriving
//! keys, and nothing downstream ever samples on its own.

use rand::prelude::*;
use tracing::debug;

use super::Table;

/// Uniformly sample `size` rows without replacement.
///
/// Returns the sampled table and the seed that produced it. Original row
/// order is preserved. If `size >= table.height()` the table is returned
/// unchanged. When `seed` is `None` a fresh seed is drawn; pass the returned
/// seed back in to reproduce the sample.
pub fn sample_rows(table: &Table, size: usize, seed: Option<u64>) -> (Table, u64) {
    let seed = seed.unwrap_or_else(|| thread_rng().r#gen());

    if size >= table.height() {
        return (table.clone(), seed);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let indices: Vec<usize> = (0..table.height()).collect();
    let mut sampled: Vec<usize> = indices.choose_multiple(&mut rng, size).copied().collect();
    sampled.sort_unstable();

    debug!(
        "Sampled {} of {} rows (seed {})",
        sampled.len(),
        table.height(),
        seed
    );

    (table.select_rows(&sampled), seed)
}
