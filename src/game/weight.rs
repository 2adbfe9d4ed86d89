//! Weight model: how much board presence a cluster is worth.
//!
//! Weight grows faster than linearly with cluster size, rewarding players
//! who keep their territory connected:
//!
//! | cells  | weight       |
//! |--------|--------------|
//! | 1      | 1            |
//! | 2–4    | 1.2 × cells  |
//! | 5–9    | 1.5 × cells  |
//! | 10–19  | 2.0 × cells  |
//! | ≥ 20   | 3.0 × cells  |

use crate::game::Cluster;

/// Size tiers as `(minimum cell count, multiplier)`, largest first.
const WEIGHT_TIERS: [(usize, f64); 5] = [(20, 3.0), (10, 2.0), (5, 1.5), (2, 1.2), (1, 1.0)];

/// Weight contributed by a cluster of `size` cells.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cluster_weight(size: usize) -> f64 {
    WEIGHT_TIERS
        .iter()
        .find(|(min, _)| size >= *min)
        .map_or(0.0, |(_, multiplier)| size as f64 * multiplier)
}

/// Total weight of a player's clusters.
///
/// Always a full sum over the current clusters, never adjusted incrementally.
#[must_use]
pub fn player_weight(clusters: &[Cluster]) -> f64 {
    clusters.iter().map(|c| cluster_weight(c.len())).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_tier_values() {
        assert!(approx(cluster_weight(1), 1.0));
        assert!(approx(cluster_weight(4), 4.8));
        assert!(approx(cluster_weight(9), 13.5));
        assert!(approx(cluster_weight(19), 38.0));
        assert!(approx(cluster_weight(20), 60.0));
    }

    #[test]
    fn test_tier_boundaries() {
        assert!(approx(cluster_weight(2), 2.4));
        assert!(approx(cluster_weight(5), 7.5));
        assert!(approx(cluster_weight(10), 20.0));
        assert!(approx(cluster_weight(400), 1200.0));
    }

    #[test]
    fn test_empty_cluster_weighs_nothing() {
        assert!(approx(cluster_weight(0), 0.0));
        assert!(approx(player_weight(&[]), 0.0));
    }

    #[test]
    fn test_monotonic() {
        let mut previous = 0.0;
        for size in 0..=400 {
            let w = cluster_weight(size);
            assert!(w >= previous, "weight dropped at size {size}");
            previous = w;
        }
    }
}
