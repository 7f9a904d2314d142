//! Inter-route service swap operator.
//!
//! # Algorithm
//!
//! For every pair of routes and every pair of positions, exchange the two
//! services in place. A swap is valid when both resulting routes stay
//! within capacity; it is applied when the replayed total of both routes is
//! strictly lower. Each pass applies the best exchange found
//! (best-improvement) and passes repeat until none improves.
//!
//! # Complexity
//!
//! O(n² × L) per pass where n = services, L = replayed route length.

use crate::evaluation::RouteEvaluator;
use crate::models::{RoutePlan, ServiceId};

use super::IMPROVEMENT_EPSILON;

#[derive(Debug, Clone)]
struct SwapMove {
    route_a: usize,
    pos_a: usize,
    route_b: usize,
    pos_b: usize,
    delta: f64,
}

/// Applies inter-route swap improvement to a plan.
///
/// The returned plan is evaluated and never costs more than the input.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, RoutePlan, ServiceCatalog};
/// use u_arc_routing::evaluation::RouteEvaluator;
/// use u_arc_routing::local_search::swap_improve;
///
/// // Two branches 1-2-3 and 1-4-5
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
/// let evaluator = RouteEvaluator::new(&problem);
///
/// // Each route mixes both branches
/// let initial = RoutePlan::new(vec![vec![1, 4], vec![3, 2]]);
/// let improved = swap_improve(&initial, &evaluator);
/// assert!(improved.cost() < evaluator.plan_cost(&initial));
/// ```
pub fn swap_improve(plan: &RoutePlan, evaluator: &RouteEvaluator) -> RoutePlan {
    let mut result = plan.clone();
    let routes = result.routes_mut();
    while let Some(mv) = find_best_swap(routes, evaluator) {
        let a = routes[mv.route_a][mv.pos_a];
        routes[mv.route_a][mv.pos_a] = routes[mv.route_b][mv.pos_b];
        routes[mv.route_b][mv.pos_b] = a;
    }
    evaluator.evaluate(&mut result);
    result
}

fn find_best_swap(routes: &[Vec<ServiceId>], evaluator: &RouteEvaluator) -> Option<SwapMove> {
    let capacity = evaluator.problem().capacity();
    let catalog = evaluator.problem().catalog();
    let costs: Vec<f64> = routes.iter().map(|r| evaluator.route_cost(r)).collect();
    let demands: Vec<_> = routes.iter().map(|r| evaluator.sequence_demand(r)).collect();
    let mut best: Option<SwapMove> = None;

    for route_a in 0..routes.len() {
        for route_b in route_a + 1..routes.len() {
            let mut ra = routes[route_a].clone();
            let mut rb = routes[route_b].clone();
            for pos_a in 0..ra.len() {
                for pos_b in 0..rb.len() {
                    let (sa, sb) = (ra[pos_a], rb[pos_b]);
                    let da = catalog.demand(sa);
                    let db = catalog.demand(sb);
                    let new_a = (demands[route_a] - da).saturating_add(db);
                    let new_b = (demands[route_b] - db).saturating_add(da);
                    if new_a > capacity || new_b > capacity {
                        continue;
                    }

                    ra[pos_a] = sb;
                    rb[pos_b] = sa;
                    let delta = evaluator.route_cost(&ra) + evaluator.route_cost(&rb)
                        - costs[route_a]
                        - costs[route_b];
                    ra[pos_a] = sa;
                    rb[pos_b] = sb;

                    if delta < -IMPROVEMENT_EPSILON && best.as_ref().is_none_or(|b| delta < b.delta) {
                        best = Some(SwapMove {
                            route_a,
                            pos_a,
                            route_b,
                            pos_b,
                            delta,
                        });
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

    fn branches() -> ArcRoutingProblem {
        let mut g = Graph::new(5);
        g.add_edge(1, 2, 1.0).expect("valid");
        g.add_edge(2, 3, 1.0).expect("valid");
        g.add_edge(1, 4, 1.0).expect("valid");
        g.add_edge(4, 5, 1.0).expect("valid");
        let mut c = ServiceCatalog::new();
        c.register_node(2, 5, 0.0).expect("valid");
        c.register_node(3, 5, 0.0).expect("valid");
        c.register_node(4, 5, 0.0).expect("valid");
        c.register_node(5, 5, 0.0).expect("valid");
        ArcRoutingProblem::from_graph(&g, c, 1, 10).expect("valid")
    }

    #[test]
    fn test_swap_untangles_branches() {
        let p = branches();
        let eval = RouteEvaluator::new(&p);
        // vertices 2,5 and 4,3: 1 + 3 + 2 = 6 each
        let plan = RoutePlan::new(vec![vec![1, 4], vec![3, 2]]);
        assert!((eval.plan_cost(&plan) - 12.0).abs() < 1e-10);
        let improved = swap_improve(&plan, &eval);
        // each branch on its own route: 1 + 1 + 2 = 4
        assert!((improved.cost() - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_swap_never_breaks_capacity() {
        let mut g = Graph::new(3);
        g.add_edge(1, 2, 1.0).expect("valid");
        g.add_edge(1, 3, 10.0).expect("valid");
        let mut c = ServiceCatalog::new();
        c.register_node(2, 8, 0.0).expect("valid");
        c.register_node(3, 2, 0.0).expect("valid");
        c.register_node(2, 2, 0.0).expect("valid");
        let p = ArcRoutingProblem::from_graph(&g, c, 1, 10).expect("valid");
        let eval = RouteEvaluator::new(&p);
        let plan = RoutePlan::new(vec![vec![1, 2], vec![3]]);
        let improved = swap_improve(&plan, &eval);
        for r in improved.routes() {
            assert!(eval.sequence_demand(r) <= 10);
        }
        assert!(improved.cost() <= eval.plan_cost(&plan) + 1e-10);
    }

    #[test]
    fn test_swap_single_route_is_noop() {
        let p = branches();
        let eval = RouteEvaluator::new(&p);
        let plan = RoutePlan::new(vec![vec![1, 2]]);
        let improved = swap_improve(&plan, &eval);
        assert_eq!(improved.routes(), plan.routes());
    }
}
