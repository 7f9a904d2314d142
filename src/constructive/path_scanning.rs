//! Path-Scanning constructive heuristic for arc routing.
//!
//! Builds routes greedily: starting from the depot, always service the
//! unserved, capacity-feasible service whose entry vertex is cheapest to
//! reach from the current position. When nothing fits, return to the depot
//! and open a new route.
//!
//! # Complexity
//!
//! O(n²) where n = number of services (one scan of the open set per step).
//!
//! # Reference
//!
//! Golden, B. L., DeArmon, J. S. & Baker, E. K. (1983). "Computational
//! experiments with algorithms for a class of routing problems",
//! *Computers & Operations Research* 10(1), 47-59.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::warn;

use crate::error::Result;
use crate::evaluation::RouteEvaluator;
use crate::models::{ArcRoutingProblem, Demand, RoutePlan, ServiceId, Solution};

/// Travel costs closer than this are considered tied.
const TIE_EPSILON: f64 = 1e-10;

/// Constructs a solution over every servable service.
///
/// Ties between equally close candidates go to the lowest service id, so
/// the result is deterministic. Unservable services are reported in
/// [`Solution::unassigned`].
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, ServiceCatalog};
/// use u_arc_routing::constructive::path_scanning;
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
/// let solution = path_scanning(&problem).unwrap();
/// assert!(solution.num_routes() >= 2);
/// assert!(solution.routes().iter().all(|r| r.demand() <= 10));
/// assert_eq!(solution.num_served(), 3);
/// ```
pub fn path_scanning(problem: &ArcRoutingProblem) -> Result<Solution> {
    let plan = path_scanning_restricted(problem, &problem.servable_ids());
    RouteEvaluator::new(problem).build_solution(&plan)
}

/// Path-Scanning over a subset of services, lowest-id tie-break.
///
/// Ids the problem cannot serve end up in [`RoutePlan::unassigned`]. The
/// returned plan is evaluated.
pub fn path_scanning_restricted(problem: &ArcRoutingProblem, ids: &[ServiceId]) -> RoutePlan {
    scan(problem, ids, |ties| ties[0])
}

/// Path-Scanning over a subset of services, breaking ties uniformly at random.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, ServiceCatalog};
/// use u_arc_routing::constructive::path_scanning_seeded;
///
/// let mut graph = Graph::new(3);
/// graph.add_edge(1, 2, 1.0).unwrap();
/// graph.add_edge(1, 3, 1.0).unwrap();
/// let mut catalog = ServiceCatalog::new();
/// catalog.register_node(2, 1, 0.0).unwrap();
/// catalog.register_node(3, 1, 0.0).unwrap();
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 5).unwrap();
///
/// let mut rng = u_numflow::random::create_rng(7);
/// let plan = path_scanning_seeded(&problem, &[1, 2], &mut rng);
/// assert_eq!(plan.num_services(), 2);
/// assert!((plan.cost() - 4.0).abs() < 1e-10);
/// ```
pub fn path_scanning_seeded<R: Rng>(
    problem: &ArcRoutingProblem,
    ids: &[ServiceId],
    rng: &mut R,
) -> RoutePlan {
    scan(problem, ids, |ties| ties[rng.random_range(0..ties.len())])
}

/// Core loop shared by every variant; `choose` picks among tied candidates
/// (always given in ascending id order, never empty).
fn scan<F>(problem: &ArcRoutingProblem, ids: &[ServiceId], mut choose: F) -> RoutePlan
where
    F: FnMut(&[ServiceId]) -> ServiceId,
{
    let catalog = problem.catalog();
    let capacity = problem.capacity();
    let depot = problem.depot();

    let mut unassigned = Vec::new();
    let mut remaining = BTreeSet::new();
    for &id in ids {
        if problem.is_servable(id) {
            remaining.insert(id);
        } else if !unassigned.contains(&id) {
            unassigned.push(id);
        }
    }

    let mut routes = Vec::new();
    let mut ties = Vec::new();
    while !remaining.is_empty() {
        let mut route = Vec::new();
        let mut position = depot;
        let mut load: Demand = 0;

        loop {
            ties.clear();
            let mut best = f64::INFINITY;
            for &id in &remaining {
                let Some(service) = catalog.get(id) else {
                    continue;
                };
                if load.saturating_add(service.demand()) > capacity {
                    continue;
                }
                let travel = problem.travel(position, service.start());
                if !travel.is_finite() {
                    continue;
                }
                if travel < best - TIE_EPSILON {
                    best = travel;
                    ties.clear();
                    ties.push(id);
                } else if travel <= best + TIE_EPSILON {
                    ties.push(id);
                }
            }
            if ties.is_empty() {
                break;
            }

            let id = choose(&ties);
            remaining.remove(&id);
            if let Some(service) = catalog.get(id) {
                load = load.saturating_add(service.demand());
                position = service.end();
            }
            route.push(id);
        }

        if route.is_empty() {
            warn!(
                count = remaining.len(),
                "services could not be placed on a fresh route"
            );
            unassigned.extend(remaining.iter().copied());
            break;
        }
        routes.push(route);
    }

    for &id in &unassigned {
        if !problem.is_servable(id) {
            warn!(service = id, "skipping unservable service");
        }
    }

    let mut plan = RoutePlan::with_unassigned(routes, unassigned);
    RouteEvaluator::new(problem).evaluate(&mut plan);
    plan
}
