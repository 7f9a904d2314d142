//! Capacity-greedy fill of a fixed service order.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::evaluation::RouteEvaluator;
use crate::models::{ArcRoutingProblem, Demand, RoutePlan, ServiceId};

/// Cuts `order` into routes: each service joins the current route while it
/// fits capacity, otherwise a new route is opened.
///
/// Unservable ids are skipped into [`RoutePlan::unassigned`]. The returned
/// plan is evaluated.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, ServiceCatalog};
/// use u_arc_routing::constructive::greedy_fill;
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
/// let plan = greedy_fill(&problem, &[3, 1, 2]);
/// assert_eq!(plan.routes(), &[vec![3, 1], vec![2]]);
/// ```
pub fn greedy_fill(problem: &ArcRoutingProblem, order: &[ServiceId]) -> RoutePlan {
    let catalog = problem.catalog();
    let capacity = problem.capacity();

    let mut routes: Vec<Vec<ServiceId>> = Vec::new();
    let mut unassigned = Vec::new();
    let mut current = Vec::new();
    let mut load: Demand = 0;

    for &id in order {
        if !problem.is_servable(id) {
            unassigned.push(id);
            continue;
        }
        let demand = catalog.demand(id);
        if load.saturating_add(demand) > capacity && !current.is_empty() {
            routes.push(std::mem::take(&mut current));
            load = 0;
        }
        current.push(id);
        load = load.saturating_add(demand);
    }
    if !current.is_empty() {
        routes.push(current);
    }

    let mut plan = RoutePlan::with_unassigned(routes, unassigned);
    RouteEvaluator::new(problem).evaluate(&mut plan);
    plan
}

/// Greedy fill of a uniformly shuffled order of every servable service.
pub fn random_greedy_fill<R: Rng>(problem: &ArcRoutingProblem, rng: &mut R) -> RoutePlan {
    let mut order = problem.servable_ids();
    order.shuffle(rng);
    greedy_fill(problem, &order)
}
