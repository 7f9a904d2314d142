//! Intra-route 2-opt improvement.
//!
//! # Algorithm
//!
//! For each index pair (i, j) of a route's service sequence, reverse the
//! sub-sequence `[i..=j]` and replay the whole route. Accept the reversal
//! as soon as the replayed cost is strictly lower (first-improvement), then
//! keep scanning. Repeat full passes until no reversal improves.
//!
//! Reversing changes which vertex precedes each service, and shortest-path
//! costs between new neighbours cannot be derived from the old ones, so
//! every candidate is costed by full replay.
//!
//! # Complexity
//!
//! O(n³) per pass (n² candidates, O(n) replay each).
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use crate::evaluation::RouteEvaluator;
use crate::models::{RoutePlan, ServiceId};

use super::IMPROVEMENT_EPSILON;

/// Applies 2-opt improvement to a single route.
///
/// Returns the improved sequence and its cost. Reversal never changes the
/// route's demand, so a route over capacity stays at `f64::INFINITY`.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, ServiceCatalog};
/// use u_arc_routing::evaluation::RouteEvaluator;
/// use u_arc_routing::local_search::two_opt_improve;
///
/// // Line 1 - 2 - 3 - 4 with a node service at each of 2, 3, 4
/// let mut graph = Graph::new(4);
/// for v in 1..4 {
///     graph.add_edge(v, v + 1, 1.0).unwrap();
/// }
/// let mut catalog = ServiceCatalog::new();
/// for v in 2..=4 {
///     catalog.register_node(v, 1, 0.0).unwrap();
/// }
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 10).unwrap();
/// let evaluator = RouteEvaluator::new(&problem);
///
/// // Zig-zag order 3 → 2 → 4 costs 8; a straight sweep costs 6
/// let (improved, cost) = two_opt_improve(&[2, 1, 3], &evaluator);
/// assert!((cost - 6.0).abs() < 1e-10);
/// assert_eq!(improved.len(), 3);
/// ```
pub fn two_opt_improve(route: &[ServiceId], evaluator: &RouteEvaluator) -> (Vec<ServiceId>, f64) {
    let mut current = route.to_vec();
    let mut current_cost = evaluator.route_cost(&current);
    if current.len() < 2 || !current_cost.is_finite() {
        return (current, current_cost);
    }

    let n = current.len();
    let mut improved = true;
    while improved {
        improved = false;
        for i in 0..n - 1 {
            for j in i + 1..n {
                current[i..=j].reverse();
                let cost = evaluator.route_cost(&current);
                if cost < current_cost - IMPROVEMENT_EPSILON {
                    current_cost = cost;
                    improved = true;
                } else {
                    current[i..=j].reverse();
                }
            }
        }
    }

    (current, current_cost)
}

/// Applies [`two_opt_improve`] to every route of a plan.
///
/// Returns `true` if any route got cheaper. The plan's cost is refreshed.
pub fn two_opt_plan(plan: &mut RoutePlan, evaluator: &RouteEvaluator) -> bool {
    let mut any = false;
    for route in plan.routes_mut().iter_mut() {
        let before = evaluator.route_cost(route);
        let (improved, cost) = two_opt_improve(route, evaluator);
        if cost < before - IMPROVEMENT_EPSILON {
            *route = improved;
            any = true;
        }
    }
    evaluator.evaluate(plan);
    any
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Graph;
    use crate::models::{ArcRoutingProblem, ServiceCatalog};

    /// Line 1 - 2 - 3 - 4 - 5, node service at every non-depot vertex.
    fn line() -> ArcRoutingProblem {
        let mut g = Graph::new(5);
        for v in 1..5 {
            g.add_edge(v, v + 1, 1.0).expect("valid");
        }
        let mut c = ServiceCatalog::new();
        for v in 2..=5 {
            c.register_node(v, 1, 0.0).expect("valid");
        }
        ArcRoutingProblem::from_graph(&g, c, 1, 3).expect("valid")
    }

    #[test]
    fn test_two_opt_empty_and_single() {
        let p = line();
        let eval = RouteEvaluator::new(&p);
        let (r, c) = two_opt_improve(&[], &eval);
        assert!(r.is_empty());
        assert_eq!(c, 0.0);
        let (r, c) = two_opt_improve(&[2], &eval);
        assert_eq!(r, vec![2]);
        assert!((c - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_two_opt_fixes_zigzag() {
        let p = line();
        let eval = RouteEvaluator::new(&p);
        // 1→4 (3), 4→2 (2), 2→3 (1), 3→1 (2)
        let before = eval.route_cost(&[3, 1, 2]);
        assert!((before - 8.0).abs() < 1e-10);
        let (r, c) = two_opt_improve(&[3, 1, 2], &eval);
        assert!(c < before);
        assert!((c - 6.0).abs() < 1e-10);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_two_opt_keeps_over_capacity_route() {
        let p = line();
        let eval = RouteEvaluator::new(&p);
        let (r, c) = two_opt_improve(&[4, 3, 2, 1], &eval);
        assert_eq!(r, vec![4, 3, 2, 1]);
        assert!(c.is_infinite());
    }

    #[test]
    fn test_two_opt_plan_never_worse() {
        let p = line();
        let eval = RouteEvaluator::new(&p);
        let mut plan = RoutePlan::new(vec![vec![3, 1, 2], vec![4]]);
        let before = eval.plan_cost(&plan);
        assert!(two_opt_plan(&mut plan, &eval));
        assert!(plan.cost() < before);
        assert!(!two_opt_plan(&mut plan, &eval));
    }
}
