//! Recreate step: cheapest feasible insertion.

use rand::Rng;
use u_metaheur::alns::RepairOperator;

use crate::evaluation::RouteEvaluator;
use crate::models::{ArcRoutingProblem, RoutePlan, ServiceId};

/// Reinserts pending services one at a time, in list order.
///
/// Each service goes to the globally cheapest feasible `(route, position)`,
/// found by replaying every candidate route in full. A new route is opened
/// only when no existing route can take the service.
///
/// Ids the problem marks as unservable (demand over capacity or no depot
/// round trip) are never inserted; they stay in the unassigned list.
/// Every other id fits a route of its own, so a repair always places all
/// servable ids.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, RoutePlan, ServiceCatalog};
/// use u_arc_routing::ruin_recreate::CheapestInsertion;
/// use u_metaheur::alns::RepairOperator;
///
/// let mut graph = Graph::new(3);
/// graph.add_edge(1, 2, 1.0).unwrap();
/// graph.add_edge(2, 3, 1.0).unwrap();
/// let mut catalog = ServiceCatalog::new();
/// catalog.register_node(2, 4, 0.0).unwrap();
/// catalog.register_node(3, 4, 0.0).unwrap();
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 10).unwrap();
///
/// let partial = RoutePlan::with_unassigned(vec![vec![2]], vec![1]);
/// let mut rng = u_numflow::random::create_rng(0);
/// let repaired = CheapestInsertion::new(&problem).repair(&partial, &mut rng);
/// assert_eq!(repaired.routes(), &[vec![1, 2]]);
/// assert!((repaired.cost() - 4.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CheapestInsertion<'a> {
    evaluator: RouteEvaluator<'a>,
}

impl<'a> CheapestInsertion<'a> {
    /// Creates the operator for `problem`.
    pub fn new(problem: &'a ArcRoutingProblem) -> Self {
        Self {
            evaluator: RouteEvaluator::new(problem),
        }
    }

    /// Splits ids into `(servable, unservable)`, keeping list order.
    pub fn partition_pending(&self, ids: &[ServiceId]) -> (Vec<ServiceId>, Vec<ServiceId>) {
        let problem = self.evaluator.problem();
        ids.iter().partition(|&&id| problem.is_servable(id))
    }

    /// Cheapest feasible insertion of `id` into an existing route.
    ///
    /// Returns `(route_index, position, cost_increase)`.
    fn best_insertion(&self, routes: &[Vec<ServiceId>], id: ServiceId) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;
        let mut candidate = Vec::new();

        for (ri, route) in routes.iter().enumerate() {
            let current = self.evaluator.route_cost(route);
            if !current.is_finite() {
                continue;
            }
            for pos in 0..=route.len() {
                candidate.clear();
                candidate.extend_from_slice(&route[..pos]);
                candidate.push(id);
                candidate.extend_from_slice(&route[pos..]);

                let cost = self.evaluator.route_cost(&candidate);
                if !cost.is_finite() {
                    continue;
                }
                let delta = cost - current;
                if best.as_ref().is_none_or(|b| delta < b.2 - 1e-10) {
                    best = Some((ri, pos, delta));
                }
            }
        }
        best
    }
}

impl RepairOperator<RoutePlan> for CheapestInsertion<'_> {
    fn name(&self) -> &str {
        "cheapest_insertion"
    }

    fn repair<R: Rng>(&self, solution: &RoutePlan, _rng: &mut R) -> RoutePlan {
        let (pending, unassigned) = self.partition_pending(solution.unassigned());
        let mut routes = solution.routes().to_vec();

        for id in pending {
            match self.best_insertion(&routes, id) {
                Some((ri, pos, _)) => routes[ri].insert(pos, id),
                None => routes.push(vec![id]),
            }
        }

        let mut repaired = RoutePlan::with_unassigned(routes, unassigned);
        self.evaluator.evaluate(&mut repaired);
        repaired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Graph;
    use crate::models::ServiceCatalog;

    /// Path 1 - 2 - 3 - 4, node services at 2, 3 and 4 with demand 4.
    fn path_problem(capacity: u32) -> ArcRoutingProblem {
        let mut g = Graph::new(4);
        g.add_edge(1, 2, 1.0).expect("valid");
        g.add_edge(2, 3, 1.0).expect("valid");
        g.add_edge(3, 4, 1.0).expect("valid");
        let mut c = ServiceCatalog::new();
        for v in 2..=4 {
            c.register_node(v, 4, 0.0).expect("valid");
        }
        ArcRoutingProblem::from_graph(&g, c, 1, capacity).expect("valid")
    }

    #[test]
    fn test_inserts_between_neighbours() {
        let p = path_problem(20);
        let op = CheapestInsertion::new(&p);
        let plan = RoutePlan::with_unassigned(vec![vec![1, 3]], vec![2]);
        let mut rng = u_numflow::random::create_rng(0);
        let repaired = op.repair(&plan, &mut rng);
        assert_eq!(repaired.routes(), &[vec![1, 2, 3]]);
        assert!((repaired.cost() - 6.0).abs() < 1e-10);
        assert!(repaired.unassigned().is_empty());
    }

    #[test]
    fn test_opens_route_when_nothing_fits() {
        let p = path_problem(8);
        let op = CheapestInsertion::new(&p);
        let plan = RoutePlan::with_unassigned(vec![vec![1, 2]], vec![3]);
        let mut rng = u_numflow::random::create_rng(0);
        let repaired = op.repair(&plan, &mut rng);
        assert_eq!(repaired.num_routes(), 2);
        assert_eq!(repaired.routes()[1], vec![3]);
        assert!(repaired.cost().is_finite());
    }

    #[test]
    fn test_unservable_ids_left_alone() {
        let mut g = Graph::new(3);
        g.add_edge(1, 2, 1.0).expect("valid");
        g.add_edge(2, 3, 1.0).expect("valid");
        let mut c = ServiceCatalog::new();
        c.register_node(2, 4, 0.0).expect("valid");
        c.register_node(3, 50, 0.0).expect("valid");
        let p = ArcRoutingProblem::from_graph(&g, c, 1, 10).expect("valid");

        let op = CheapestInsertion::new(&p);
        let plan = RoutePlan::with_unassigned(vec![], vec![2, 1]);
        let mut rng = u_numflow::random::create_rng(0);
        let repaired = op.repair(&plan, &mut rng);
        assert_eq!(repaired.routes(), &[vec![1]]);
        assert_eq!(repaired.unassigned(), &[2]);
        assert!(repaired.cost().is_finite());
    }

    #[test]
    fn test_one_way_dead_end_stays_unassigned() {
        // arc 2 -> 3 has no way back to the depot
        let mut g = Graph::new(3);
        g.add_edge(1, 2, 1.0).expect("valid");
        g.add_arc(2, 3, 1.0).expect("valid");
        let mut c = ServiceCatalog::new();
        c.register_node(2, 2, 0.0).expect("valid");
        c.register_arc(2, 3, 2, 1.0).expect("valid");
        let p = ArcRoutingProblem::from_graph(&g, c, 1, 10).expect("valid");
        assert_eq!(p.unservable(), &[2]);

        let op = CheapestInsertion::new(&p);
        assert_eq!(op.partition_pending(&[2, 1]), (vec![1], vec![2]));

        let plan = RoutePlan::with_unassigned(vec![], vec![2, 1]);
        let mut rng = u_numflow::random::create_rng(0);
        let repaired = op.repair(&plan, &mut rng);
        assert_eq!(repaired.routes(), &[vec![1]]);
        assert_eq!(repaired.unassigned(), &[2]);
        assert!((repaired.cost() - 2.0).abs() < 1e-10);
    }
}
