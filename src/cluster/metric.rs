//! Co-click distance between two clusters of the same partition.
//!
//! ```text
//! common = Σ_{n ∈ N(a) ∩ N(b)} w(a, n) + w(b, n)
//! d(a, b) = 1 - common / (total(a) + total(b))
//! ```
//!
//! This is the complement of a weighted overlap coefficient: `0` when every
//! link of both clusters goes to shared neighbors, `1` when they share none.
//! Clusters without any link weight are maximally distant.

use super::graph::Cluster;
use crate::error::{Error, Result};

/// Distance in `[0, 1]` between two clusters of the same partition.
pub fn distance<E>(a: &Cluster<E>, b: &Cluster<E>) -> Result<f64> {
    let total = a
        .total_weight()
        .checked_add(b.total_weight())
        .ok_or(Error::WeightOverflow {
            context: "computing a distance",
        })?;
    if total == 0 {
        return Ok(1.0);
    }

    let (small, large) = if a.degree() <= b.degree() { (a, b) } else { (b, a) };

    // common <= total, so plain addition is safe here
    let common: u64 = small
        .links()
        .iter()
        .filter_map(|(&n, &w)| large.links().get(&n).map(|&v| w + v))
        .sum();

    Ok(1.0 - common as f64 / total as f64)
}
