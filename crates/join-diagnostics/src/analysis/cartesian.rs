//! Cartesian explosion risk.

use serde::{Deserialize, Serialize};

use crate::keys::{Key, KeyFrequencies};

/// Number of worst offending keys kept.
pub const WORST_OFFENDER_LIMIT: usize = 5;

/// Row multiplication contributed by one matched key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyExpansion {
    pub key: Key,
    pub x_count: u64,
    pub y_count: u64,
    pub product: u64,
}

/// Result of the explosion check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartesianRisk {
    /// `expansion_factor > threshold`.
    pub at_risk: bool,
    /// Matched rows divided by the larger input row count.
    pub expansion_factor: f64,
    /// Sum of per-key products over matched keys.
    pub matched_rows: u64,
    pub threshold: f64,
    /// Up to five keys with the largest products, largest first.
    pub worst_offenders: Vec<KeyExpansion>,
}

impl CartesianRisk {
    /// The explicit result when no key is shared by both tables.
    pub fn none(threshold: f64) -> Self {
        Self {
            at_risk: false,
            expansion_factor: 0.0,
            matched_rows: 0,
            threshold,
            worst_offenders: Vec::new(),
        }
    }
}

/// Estimate how much a join over these keys multiplies rows.
///
/// Row totals include NA-key rows. Products saturate rather than wrap.
pub fn estimate_cartesian_risk(
    x: &KeyFrequencies,
    y: &KeyFrequencies,
    threshold: f64,
) -> CartesianRisk {
    let mut expansions: Vec<KeyExpansion> = x
        .iter()
        .filter_map(|(key, x_count)| {
            let y_count = y.count(key);
            (y_count > 0).then(|| KeyExpansion {
                key: key.clone(),
                x_count,
                y_count,
                product: x_count.saturating_mul(y_count),
            })
        })
        .collect();

    if expansions.is_empty() {
        return CartesianRisk::none(threshold);
    }

    let matched_rows = expansions
        .iter()
        .fold(0u64, |acc, e| acc.saturating_add(e.product));
    let base = x.row_count().max(y.row_count());
    let expansion_factor = matched_rows as f64 / base as f64;

    // Stable: equal products keep first-seen order.
    expansions.sort_by(|a, b| b.product.cmp(&a.product));
    expansions.truncate(WORST_OFFENDER_LIMIT);

    CartesianRisk {
        at_risk: expansion_factor > threshold,
        expansion_factor,
        matched_rows,
        threshold,
        worst_offenders: expansions,
    }
}
