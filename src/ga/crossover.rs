//! Route-level best-of-both crossover.
//!
//! # Algorithm
//!
//! 1. Pool the routes of both parents and sort them by replayed cost.
//! 2. Walk the pool and keep every route whose services are all still
//!    unclaimed (first-fit cover); infeasible routes are never kept.
//! 3. Build routes for the leftover services with Path-Scanning restricted
//!    to them.
//!
//! Parents covering different service sets cannot be combined; the first
//! parent is returned unchanged.
//!
//! # Complexity
//!
//! O(R log R + n²) where R = pooled routes and n = leftover services.

use std::collections::BTreeSet;

use tracing::debug;

use crate::constructive::path_scanning_restricted;
use crate::evaluation::RouteEvaluator;
use crate::models::{RoutePlan, ServiceId};

/// Combines two parents into one evaluated child.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, RoutePlan, ServiceCatalog};
/// use u_arc_routing::evaluation::RouteEvaluator;
/// use u_arc_routing::ga::route_crossover;
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
/// let evaluator = RouteEvaluator::new(&problem);
///
/// let a = RoutePlan::new(vec![vec![1, 2], vec![3]]);
/// let b = RoutePlan::new(vec![vec![3, 1], vec![2]]);
/// let child = route_crossover(&a, &b, &evaluator);
/// assert_eq!(child.num_services(), 3);
/// assert!(child.cost().is_finite());
/// ```
pub fn route_crossover(
    parent1: &RoutePlan,
    parent2: &RoutePlan,
    evaluator: &RouteEvaluator,
) -> RoutePlan {
    let services = parent1.service_set();
    if services != parent2.service_set() {
        debug!("crossover parents cover different services, keeping first parent");
        return parent1.clone();
    }

    let mut pool: Vec<(&Vec<ServiceId>, f64)> = parent1
        .routes()
        .iter()
        .chain(parent2.routes())
        .filter(|r| !r.is_empty())
        .map(|r| (r, evaluator.route_cost(r)))
        .filter(|(_, cost)| cost.is_finite())
        .collect();
    pool.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut claimed: BTreeSet<ServiceId> = BTreeSet::new();
    let mut routes: Vec<Vec<ServiceId>> = Vec::new();
    for (route, _) in pool {
        if route.iter().all(|id| !claimed.contains(id)) && has_no_repeats(route) {
            claimed.extend(route.iter().copied());
            routes.push(route.clone());
        }
    }

    let leftover: Vec<ServiceId> = services.difference(&claimed).copied().collect();
    let mut unassigned = parent1.unassigned().to_vec();
    if !leftover.is_empty() {
        let filler = path_scanning_restricted(evaluator.problem(), &leftover);
        routes.extend(filler.routes().iter().cloned());
        for &id in filler.unassigned() {
            if !unassigned.contains(&id) {
                unassigned.push(id);
            }
        }
    }

    let mut child = RoutePlan::with_unassigned(routes, unassigned);
    evaluator.evaluate(&mut child);
    child
}

fn has_no_repeats(route: &[ServiceId]) -> bool {
    let mut seen = BTreeSet::new();
    route.iter().all(|id| seen.insert(*id))
}
