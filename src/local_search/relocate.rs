//! Inter-route service relocation operator.
//!
//! # Algorithm
//!
//! Tries moving each service from its current route to every insertion
//! position of every other route. The move with the greatest net reduction
//! (source saving plus destination increase, both by full replay) that
//! keeps the destination within capacity is applied. Passes repeat until no
//! move improves (best-improvement strategy).
//!
//! # Complexity
//!
//! O(n² × L) per pass where n = services, L = replayed route length.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use crate::evaluation::RouteEvaluator;
use crate::models::{RoutePlan, ServiceId};

use super::IMPROVEMENT_EPSILON;

/// A relocate move: move a service from one route to another.
#[derive(Debug, Clone)]
struct RelocateMove {
    from_route: usize,
    from_pos: usize,
    to_route: usize,
    to_pos: usize,
    delta: f64,
}

/// Applies inter-route relocate improvement to a plan.
///
/// Routes emptied by a move are dropped. The returned plan is evaluated and
/// never costs more than the input.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, RoutePlan, ServiceCatalog};
/// use u_arc_routing::evaluation::RouteEvaluator;
/// use u_arc_routing::local_search::relocate_improve;
///
/// let mut graph = Graph::new(3);
/// graph.add_edge(1, 2, 1.0).unwrap();
/// graph.add_edge(2, 3, 1.0).unwrap();
/// let mut catalog = ServiceCatalog::new();
/// catalog.register_node(2, 1, 0.0).unwrap();
/// catalog.register_node(3, 1, 0.0).unwrap();
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 10).unwrap();
/// let evaluator = RouteEvaluator::new(&problem);
///
/// let initial = RoutePlan::new(vec![vec![1], vec![2]]);
/// let improved = relocate_improve(&initial, &evaluator);
/// assert_eq!(improved.num_routes(), 1);
/// assert!(improved.cost() < evaluator.plan_cost(&initial));
/// ```
pub fn relocate_improve(plan: &RoutePlan, evaluator: &RouteEvaluator) -> RoutePlan {
    let mut result = plan.clone();
    if result.num_routes() < 2 {
        evaluator.evaluate(&mut result);
        return result;
    }

    let routes = result.routes_mut();
    while let Some(mv) = find_best_relocate(routes, evaluator) {
        let id = routes[mv.from_route].remove(mv.from_pos);
        routes[mv.to_route].insert(mv.to_pos, id);
        if routes[mv.from_route].is_empty() {
            routes.remove(mv.from_route);
        }
    }

    evaluator.evaluate(&mut result);
    result
}

/// Finds the best improving relocate move across all route pairs.
fn find_best_relocate(routes: &[Vec<ServiceId>], evaluator: &RouteEvaluator) -> Option<RelocateMove> {
    let capacity = evaluator.problem().capacity();
    let catalog = evaluator.problem().catalog();
    let costs: Vec<f64> = routes.iter().map(|r| evaluator.route_cost(r)).collect();
    let demands: Vec<_> = routes.iter().map(|r| evaluator.sequence_demand(r)).collect();
    let mut best: Option<RelocateMove> = None;

    for (from_r, source) in routes.iter().enumerate() {
        for from_pos in 0..source.len() {
            let id = source[from_pos];
            let mut shortened = source.clone();
            shortened.remove(from_pos);
            let saving = costs[from_r] - evaluator.route_cost(&shortened);

            for (to_r, dest) in routes.iter().enumerate() {
                if to_r == from_r {
                    continue;
                }
                if demands[to_r].saturating_add(catalog.demand(id)) > capacity {
                    continue;
                }

                let mut extended = Vec::with_capacity(dest.len() + 1);
                for to_pos in 0..=dest.len() {
                    extended.clear();
                    extended.extend_from_slice(&dest[..to_pos]);
                    extended.push(id);
                    extended.extend_from_slice(&dest[to_pos..]);
                    let delta = evaluator.route_cost(&extended) - costs[to_r] - saving;

                    if delta < -IMPROVEMENT_EPSILON {
                        let is_better = best.as_ref().is_none_or(|b| delta < b.delta);
                        if is_better {
                            best = Some(RelocateMove {
                                from_route: from_r,
                                from_pos,
                                to_route: to_r,
                                to_pos,
                                delta,
                            });
                        }
                    }
                }
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Graph;
    use crate::models::{ArcRoutingProblem, ServiceCatalog};

    /// Two branches from depot 1: 1-2-3 and 1-4-5, node services on 2..=5.
    fn branches(capacity: u32) -> ArcRoutingProblem {
        let mut g = Graph::new(5);
        g.add_edge(1, 2, 1.0).expect("valid");
        g.add_edge(2, 3, 1.0).expect("valid");
        g.add_edge(1, 4, 5.0).expect("valid");
        g.add_edge(4, 5, 1.0).expect("valid");
        let mut c = ServiceCatalog::new();
        for v in 2..=5 {
            c.register_node(v, 2, 0.0).expect("valid");
        }
        ArcRoutingProblem::from_graph(&g, c, 1, capacity).expect("valid")
    }

    #[test]
    fn test_relocate_single_route() {
        let p = branches(10);
        let eval = RouteEvaluator::new(&p);
        let plan = RoutePlan::new(vec![vec![1, 2]]);
        let improved = relocate_improve(&plan, &eval);
        assert_eq!(improved.routes(), plan.routes());
        assert!((improved.cost() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_relocate_moves_misplaced_service() {
        let p = branches(10);
        let eval = RouteEvaluator::new(&p);
        // service 2 (vertex 3) sits on the far branch
        let plan = RoutePlan::new(vec![vec![1], vec![3, 2, 4]]);
        let before = eval.plan_cost(&plan);
        let improved = relocate_improve(&plan, &eval);
        assert!(improved.cost() < before - 1e-10);
        assert_eq!(improved.num_services(), 4);
        let home = improved
            .routes()
            .iter()
            .find(|r| r.contains(&1))
            .expect("service 1 routed");
        assert!(home.contains(&2));
    }

    #[test]
    fn test_relocate_respects_capacity() {
        let p = branches(4);
        let eval = RouteEvaluator::new(&p);
        let plan = RoutePlan::new(vec![vec![1, 2], vec![3, 4]]);
        let improved = relocate_improve(&plan, &eval);
        for r in improved.routes() {
            assert!(eval.sequence_demand(r) <= 4);
        }
        assert!(improved.cost() <= eval.plan_cost(&plan) + 1e-10);
    }

    #[test]
    fn test_relocate_drops_emptied_route() {
        let p = branches(10);
        let eval = RouteEvaluator::new(&p);
        let plan = RoutePlan::new(vec![vec![1], vec![2], vec![3, 4]]);
        let improved = relocate_improve(&plan, &eval);
        assert!(improved.routes().iter().all(|r| !r.is_empty()));
        assert_eq!(improved.num_services(), 4);
    }
}
