//! Ruin-and-recreate large neighbourhood search.
//!
//! - [`RandomRemoval`] — Destroy operator removing a random share of services
//! - [`CheapestInsertion`] — Repair operator with exhaustive full-replay insertion
//! - [`RuinAndRecreate`] — Greedy-acceptance driver
//!
//! # Algorithm
//!
//! Each iteration ruins a copy of the best plan, recreates it, and keeps the
//! result only if it is strictly cheaper. The best plan therefore never
//! gets worse.

mod destroy;
mod repair;

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use u_metaheur::alns::{DestroyOperator, RepairOperator};

use crate::evaluation::RouteEvaluator;
use crate::models::{ArcRoutingProblem, RoutePlan, ServiceId};

pub use destroy::RandomRemoval;
pub use repair::CheapestInsertion;

/// Configuration for [`RuinAndRecreate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuinRecreateConfig {
    /// Share of served services removed per iteration.
    pub destruction_fraction: f64,
    /// Iteration budget.
    pub iterations: usize,
    /// RNG seed.
    pub seed: u64,
    /// Optional wall-clock budget, checked between iterations.
    pub time_limit: Option<Duration>,
}

impl Default for RuinRecreateConfig {
    fn default() -> Self {
        Self {
            destruction_fraction: 0.35,
            iterations: 50,
            seed: 42,
            time_limit: None,
        }
    }
}

impl RuinRecreateConfig {
    /// Sets the destruction fraction.
    pub fn with_destruction_fraction(mut self, fraction: f64) -> Self {
        self.destruction_fraction = fraction;
        self
    }

    /// Sets the iteration budget.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }
}

/// Result of a ruin-and-recreate run.
#[derive(Debug, Clone)]
pub struct RuinRecreateOutcome {
    /// Best plan found.
    pub best: RoutePlan,
    /// Its cost.
    pub best_cost: f64,
    /// Number of accepted (strictly improving) iterations.
    pub improvements: usize,
    /// Services no repair can place (demand over capacity or no depot
    /// round trip); they stay in `best.unassigned()`.
    pub unservable: usize,
    /// Iterations completed.
    pub iterations: usize,
    /// Best cost before the first iteration and after each one.
    pub history: Vec<f64>,
}

/// Ruin-and-recreate driver.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, RoutePlan, ServiceCatalog};
/// use u_arc_routing::ruin_recreate::{RuinAndRecreate, RuinRecreateConfig};
///
/// let mut graph = Graph::new(4);
/// graph.add_edge(1, 2, 1.0).unwrap();
/// graph.add_edge(2, 3, 1.0).unwrap();
/// graph.add_edge(3, 4, 1.0).unwrap();
/// let mut catalog = ServiceCatalog::new();
/// for v in 2..=4 {
///     catalog.register_node(v, 2, 0.0).unwrap();
/// }
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 10).unwrap();
///
/// let initial = RoutePlan::new(vec![vec![1], vec![2], vec![3]]);
/// let config = RuinRecreateConfig::default().with_iterations(30);
/// let outcome = RuinAndRecreate::new(&problem, config).run(&initial);
/// assert!(outcome.best_cost <= 12.0);
/// ```
pub struct RuinAndRecreate<'a> {
    evaluator: RouteEvaluator<'a>,
    destroy: RandomRemoval,
    repair: CheapestInsertion<'a>,
    config: RuinRecreateConfig,
}

impl<'a> RuinAndRecreate<'a> {
    /// Creates a driver over `problem`.
    pub fn new(problem: &'a ArcRoutingProblem, config: RuinRecreateConfig) -> Self {
        Self {
            evaluator: RouteEvaluator::new(problem),
            destroy: RandomRemoval,
            repair: CheapestInsertion::new(problem),
            config,
        }
    }

    /// Runs from `initial`, which is evaluated first.
    pub fn run(&self, initial: &RoutePlan) -> RuinRecreateOutcome {
        let start = Instant::now();
        let mut rng = u_numflow::random::create_rng(self.config.seed);

        let mut best = initial.clone();
        best.drop_empty_routes();
        self.evaluator.evaluate(&mut best);

        let (_, unplaceable) = self.repair.partition_pending(best.unassigned());
        let unservable: BTreeSet<ServiceId> = self
            .evaluator
            .problem()
            .unservable()
            .iter()
            .copied()
            .chain(unplaceable)
            .collect();
        if !unservable.is_empty() {
            warn!(
                count = unservable.len(),
                services = ?unservable,
                "services left unassigned: no single vehicle can serve them"
            );
        }
        let mut history = vec![best.cost()];
        let mut improvements = 0;
        let mut iteration = 0;

        debug!(
            destroy = self.destroy.name(),
            repair = self.repair.name(),
            cost = best.cost(),
            "ruin and recreate started"
        );

        while iteration < self.config.iterations {
            if self.config.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                debug!(iteration, "ruin and recreate hit its time limit");
                break;
            }
            iteration += 1;

            let ruined = self
                .destroy
                .destroy(&best, self.config.destruction_fraction, &mut rng);
            let candidate = self.repair.repair(&ruined, &mut rng);

            if candidate.cost().is_finite() && candidate.cost() < best.cost() - 1e-10 {
                debug!(iteration, cost = candidate.cost(), "accepted recreated plan");
                best = candidate;
                improvements += 1;
            }
            history.push(best.cost());
        }

        info!(
            iterations = iteration,
            improvements,
            cost = best.cost(),
            "ruin and recreate finished"
        );
        RuinRecreateOutcome {
            best_cost: best.cost(),
            best,
            improvements,
            unservable: unservable.len(),
            iterations: iteration,
            history,
        }
    }
}
