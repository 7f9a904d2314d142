//! Local search operators for improving arc routing plans.
//!
//! - [`two_opt`] — Intra-route sub-sequence reversal (first-improvement)
//! - [`relocate`] — Inter-route service relocation (best-improvement)
//! - [`swap`] — Inter-route service exchange (best-improvement)
//!
//! [`LocalSearch`] chains the three until a full round finds nothing.
//! Every candidate is costed by replaying the affected routes; no operator
//! ever accepts a move that raises the total cost.

mod relocate;
mod swap;
mod two_opt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::evaluation::RouteEvaluator;
use crate::models::{ArcRoutingProblem, RoutePlan, Solution};

pub use relocate::relocate_improve;
pub use swap::swap_improve;
pub use two_opt::{two_opt_improve, two_opt_plan};

/// A move must lower the cost by more than this to be accepted.
pub(crate) const IMPROVEMENT_EPSILON: f64 = 1e-10;

/// Round-based local search driver: 2-opt, then relocate, then swap.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, RoutePlan, ServiceCatalog};
/// use u_arc_routing::local_search::LocalSearch;
///
/// let mut graph = Graph::new(5);
/// graph.add_edge(1, 2, 1.0).unwrap();
/// graph.add_edge(2, 3, 1.0).unwrap();
/// graph.add_edge(1, 4, 1.0).unwrap();
/// graph.add_edge(4, 5, 1.0).unwrap();
/// let mut catalog = ServiceCatalog::new();
/// for v in [2, 3, 4, 5] {
///     catalog.register_node(v, 5, 0.0).unwrap();
/// }
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 10).unwrap();
///
/// let initial = RoutePlan::new(vec![vec![1, 4], vec![3, 2]]);
/// let improved = LocalSearch::new(&problem).improve(&initial);
/// assert!((improved.cost() - 8.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct LocalSearch<'a> {
    evaluator: RouteEvaluator<'a>,
    max_rounds: usize,
}

/// Tuning for [`LocalSearch`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSearchConfig {
    /// Upper bound on 2-opt → relocate → swap rounds.
    pub max_rounds: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self { max_rounds: 50 }
    }
}

impl LocalSearchConfig {
    /// Sets the round limit.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

impl<'a> LocalSearch<'a> {
    /// Creates a driver with default settings.
    pub fn new(problem: &'a ArcRoutingProblem) -> Self {
        Self::with_config(problem, &LocalSearchConfig::default())
    }

    /// Creates a driver from a config.
    pub fn with_config(problem: &'a ArcRoutingProblem, config: &LocalSearchConfig) -> Self {
        Self {
            evaluator: RouteEvaluator::new(problem),
            max_rounds: config.max_rounds.max(1),
        }
    }

    /// Sets the round limit.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// Improves a plan to a local optimum of the three neighbourhoods.
    ///
    /// Empty routes are dropped. The result is evaluated and never costs
    /// more than the input.
    pub fn improve(&self, plan: &RoutePlan) -> RoutePlan {
        let mut current = plan.clone();
        current.drop_empty_routes();
        let mut cost = self.evaluator.evaluate(&mut current);

        for round in 0..self.max_rounds {
            two_opt_plan(&mut current, &self.evaluator);
            current = relocate_improve(&current, &self.evaluator);
            current = swap_improve(&current, &self.evaluator);
            current.drop_empty_routes();

            let next = current.cost();
            if next >= cost - IMPROVEMENT_EPSILON {
                debug!(rounds = round + 1, cost = next, "local search converged");
                break;
            }
            cost = next;
        }
        current
    }

    /// Improves a materialised solution, rebuilding its routes.
    ///
    /// Unassigned ids carry over.
    pub fn improve_solution(&self, solution: &Solution) -> Result<Solution> {
        let improved = self.improve(&RoutePlan::from_solution(solution));
        self.evaluator.build_solution(&improved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructive::path_scanning;
    use crate::distance::Graph;
    use crate::models::ServiceCatalog;

    /// Ring 1..=6 with a chord; mixed node and edge services.
    fn ring() -> ArcRoutingProblem {
        let mut g = Graph::new(6);
        for v in 1..6 {
            g.add_edge(v, v + 1, 2.0).expect("valid");
        }
        g.add_edge(6, 1, 2.0).expect("valid");
        g.add_arc(1, 4, 3.0).expect("valid");
        let mut c = ServiceCatalog::new();
        c.register_edge(2, 3, 3, 2.0).expect("valid");
        c.register_node(5, 4, 0.0).expect("valid");
        c.register_arc(4, 5, 2, 2.0).expect("valid");
        c.register_edge(6, 1, 3, 2.0).expect("valid");
        c.register_node(3, 2, 0.0).expect("valid");
        c.register_node(2, 4, 1.0).expect("valid");
        ArcRoutingProblem::from_graph(&g, c, 1, 9).expect("valid")
    }

    #[test]
    fn test_improve_never_worse() {
        let p = ring();
        let eval = RouteEvaluator::new(&p);
        let ls = LocalSearch::new(&p);
        for routes in [
            vec![vec![1, 2], vec![3, 4], vec![5, 6]],
            vec![vec![6, 5, 4], vec![3, 2, 1]],
            vec![vec![2], vec![4], vec![1], vec![3], vec![5], vec![6]],
        ] {
            let plan = RoutePlan::new(routes);
            let before = eval.plan_cost(&plan);
            let improved = ls.improve(&plan);
            assert!(improved.cost() <= before + 1e-10);
            assert_eq!(improved.num_services(), 6);
            for r in improved.routes() {
                assert!(eval.is_feasible(r));
                assert!(!r.is_empty());
            }
        }
    }

    #[test]
    fn test_improve_is_idempotent_at_local_optimum() {
        let p = ring();
        let ls = LocalSearch::new(&p);
        let once = ls.improve(&RoutePlan::new(vec![vec![1, 2], vec![3, 4], vec![5, 6]]));
        let twice = ls.improve(&once);
        assert!((once.cost() - twice.cost()).abs() < 1e-10);
    }

    #[test]
    fn test_improve_solution_keeps_coverage() {
        let p = ring();
        let initial = path_scanning(&p).expect("valid");
        let improved = LocalSearch::new(&p)
            .with_max_rounds(3)
            .improve_solution(&initial)
            .expect("valid");
        assert!(improved.total_cost() <= initial.total_cost() + 1e-10);
        assert!(improved.validate(&p).is_empty());
    }
}
