//! Turning fetched records into dashboard stats.
//!
//! The user collection the dashboard polls carries no business figures, so
//! stats are synthesized from it. The synthesis is a placeholder and is
//! injected through [`StatsSynthesizer`].

use crate::types::DashboardStats;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reactive_stores_core::fetch::Records;
use std::sync::{Mutex, PoisonError};

/// Builds [`DashboardStats`] from one successful fetch
pub trait StatsSynthesizer: Send + Sync {
    /// Stats for `records`, stamped with `at`
    fn synthesize(&self, records: &Records, at: DateTime<Utc>) -> DashboardStats;
}

/// Default synthesis
///
/// - `total_users`: number of records
/// - `active_users`: 70% of them, rounded down
/// - `total_sales`: random in `5000..15000`
/// - `today_revenue`: random in `1000..6000`
pub struct HeuristicStats {
    rng: Mutex<StdRng>,
}

impl HeuristicStats {
    /// Random figures seeded from the OS
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible random figures
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for HeuristicStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSynthesizer for HeuristicStats {
    fn synthesize(&self, records: &Records, at: DateTime<Utc>) -> DashboardStats {
        let total_users = records.len() as u64;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        DashboardStats {
            total_users,
            active_users: total_users * 7 / 10,
            total_sales: rng.gen_range(5_000..15_000),
            today_revenue: rng.gen_range(1_000..6_000),
            last_updated: at,
        }
    }
}

impl std::fmt::Debug for HeuristicStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeuristicStats").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn figures_follow_the_heuristic() {
        let records: Records = (0..10).map(|id| json!({ "id": id })).collect();
        let at = Utc::now();

        for seed in 0..50 {
            let stats = HeuristicStats::seeded(seed).synthesize(&records, at);
            assert_eq!(stats.total_users, 10);
            assert_eq!(stats.active_users, 7);
            assert!((5_000..15_000).contains(&stats.total_sales));
            assert!((1_000..6_000).contains(&stats.today_revenue));
            assert_eq!(stats.last_updated, at);
        }
    }

    #[test]
    fn active_users_round_down() {
        let records: Records = (0..3).map(|id| json!({ "id": id })).collect();
        let stats = HeuristicStats::seeded(1).synthesize(&records, Utc::now());
        assert_eq!(stats.active_users, 2);
    }

    #[test]
    fn same_seed_same_figures() {
        let at = Utc::now();
        let a = HeuristicStats::seeded(42).synthesize(&Vec::new(), at);
        let b = HeuristicStats::seeded(42).synthesize(&Vec::new(), at);
        assert_eq!(a, b);
    }
}
