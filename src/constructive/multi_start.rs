//! Multi-start Path-Scanning.
//!
//! Runs independent Path-Scanning attempts with different tie-break seeds
//! and keeps the cheapest. Attempt 0 uses the deterministic lowest-id rule,
//! so the result is never worse than plain [`path_scanning`](super::path_scanning).
//! Attempts share nothing but the read-only problem and run on the rayon
//! pool.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{ArcRoutingProblem, RoutePlan};

use super::path_scanning::{path_scanning_restricted, path_scanning_seeded};

/// Configuration for [`multi_start_path_scanning`].
///
/// # Examples
///
/// ```
/// use u_arc_routing::constructive::MultiStartConfig;
///
/// let config = MultiStartConfig::default().with_attempts(16).with_seed(3);
/// assert_eq!(config.attempts, 16);
/// assert_eq!(config.seed, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiStartConfig {
    /// Number of attempts (at least one is always run).
    pub attempts: usize,
    /// Base seed; attempt `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for MultiStartConfig {
    fn default() -> Self {
        Self {
            attempts: 8,
            seed: 42,
        }
    }
}

impl MultiStartConfig {
    /// Sets the number of attempts.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Runs several Path-Scanning attempts and returns the cheapest plan.
///
/// Equal costs resolve to the lowest attempt index. The returned plan is
/// evaluated.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, ServiceCatalog};
/// use u_arc_routing::constructive::{multi_start_path_scanning, MultiStartConfig};
///
/// let mut graph = Graph::new(4);
/// for v in 2..=4 {
///     graph.add_edge(1, v, 1.0).unwrap();
/// }
/// let mut catalog = ServiceCatalog::new();
/// for v in 2..=4 {
///     catalog.register_node(v, 4, 0.0).unwrap();
/// }
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 10).unwrap();
///
/// let plan = multi_start_path_scanning(&problem, &MultiStartConfig::default());
/// assert_eq!(plan.num_services(), 3);
/// assert!(plan.cost().is_finite());
/// ```
pub fn multi_start_path_scanning(
    problem: &ArcRoutingProblem,
    config: &MultiStartConfig,
) -> RoutePlan {
    let ids = problem.servable_ids();
    let attempts = config.attempts.max(1);

    let mut results: Vec<RoutePlan> = (0..attempts)
        .into_par_iter()
        .map(|attempt| {
            if attempt == 0 {
                path_scanning_restricted(problem, &ids)
            } else {
                let mut rng =
                    u_numflow::random::create_rng(config.seed.wrapping_add(attempt as u64));
                path_scanning_seeded(problem, &ids, &mut rng)
            }
        })
        .collect();

    let mut best_index = 0;
    for (i, plan) in results.iter().enumerate().skip(1) {
        if plan.cost() < results[best_index].cost() {
            best_index = i;
        }
    }
    debug!(
        attempts,
        best_attempt = best_index,
        cost = results[best_index].cost(),
        "multi-start construction finished"
    );
    results.swap_remove(best_index)
}
