//! Route evaluator that replays service sequences over the shortest-path index.

use tracing::debug;

use crate::error::{Result, RoutingError};
use crate::models::{
    ArcRoutingProblem, Demand, Route, RoutePlan, ServiceId, Solution, Violation, ViolationType,
};

/// Computes cost, demand and feasibility of service sequences.
///
/// A sequence is travelled depot → entry of the first service → … → exit of
/// the last service → depot, paying the shortest travel cost of each leg plus
/// every service cost. Every figure is a full replay of the sequence.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, ServiceCatalog};
/// use u_arc_routing::evaluation::RouteEvaluator;
///
/// let mut graph = Graph::new(3);
/// graph.add_edge(1, 2, 2.0).unwrap();
/// graph.add_edge(2, 3, 3.0).unwrap();
/// let mut catalog = ServiceCatalog::new();
/// catalog.register_edge(2, 3, 4, 3.0).unwrap();
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 10).unwrap();
///
/// let evaluator = RouteEvaluator::new(&problem);
/// // 1→2 (2) + service (3) + 3→1 (5)
/// assert_eq!(evaluator.sequence_cost(&[1]), 10.0);
/// let (route, violations) = evaluator.build_route(1, &[1]).unwrap();
/// assert_eq!(route.len(), 1);
/// assert!(violations.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteEvaluator<'a> {
    problem: &'a ArcRoutingProblem,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates a new evaluator for the given problem.
    pub fn new(problem: &'a ArcRoutingProblem) -> Self {
        Self { problem }
    }

    /// The problem being evaluated.
    pub fn problem(&self) -> &'a ArcRoutingProblem {
        self.problem
    }

    /// Travel plus service cost of a depot-to-depot sequence.
    ///
    /// Empty sequences cost nothing; unknown ids and unreachable legs yield
    /// `f64::INFINITY`.
    pub fn sequence_cost(&self, services: &[ServiceId]) -> f64 {
        if services.is_empty() {
            return 0.0;
        }
        let depot = self.problem.depot();
        let mut position = depot;
        let mut cost = 0.0;
        for &id in services {
            let Some(service) = self.problem.service(id) else {
                return f64::INFINITY;
            };
            cost += self.problem.travel(position, service.start()) + service.service_cost();
            position = service.end();
        }
        cost + self.problem.travel(position, depot)
    }

    /// Accumulated demand of a sequence (unknown ids count as zero).
    pub fn sequence_demand(&self, services: &[ServiceId]) -> Demand {
        let catalog = self.problem.catalog();
        services
            .iter()
            .fold(0, |acc: Demand, &id| acc.saturating_add(catalog.demand(id)))
    }

    /// Returns `true` if the sequence fits capacity and every leg is reachable.
    pub fn is_feasible(&self, services: &[ServiceId]) -> bool {
        self.sequence_demand(services) <= self.problem.capacity()
            && self.sequence_cost(services).is_finite()
    }

    /// Sequence cost, or `f64::INFINITY` when capacity is exceeded.
    pub fn route_cost(&self, services: &[ServiceId]) -> f64 {
        if self.sequence_demand(services) > self.problem.capacity() {
            return f64::INFINITY;
        }
        self.sequence_cost(services)
    }

    /// Total cost of a plan, `f64::INFINITY` if any route is infeasible.
    pub fn plan_cost(&self, plan: &RoutePlan) -> f64 {
        plan.routes().iter().map(|r| self.route_cost(r)).sum()
    }

    /// Evaluates a plan and caches its cost.
    pub fn evaluate(&self, plan: &mut RoutePlan) -> f64 {
        let cost = self.plan_cost(plan);
        plan.set_cost(cost);
        cost
    }

    /// Materialises a route with full visit detail.
    ///
    /// Returns the route and its capacity or reachability violations (with
    /// `route_index` 0).
    ///
    /// # Errors
    ///
    /// [`RoutingError::UnknownService`] for ids missing from the catalog.
    pub fn build_route(&self, id: usize, services: &[ServiceId]) -> Result<(Route, Vec<Violation>)> {
        let index = self.problem.index();
        let depot = self.problem.depot();
        let mut route = Route::new(id, depot);
        let mut violations = Vec::new();
        let mut reachable = true;

        for &sid in services {
            let service = self
                .problem
                .service(sid)
                .ok_or(RoutingError::UnknownService(sid))?;
            let (cost, path) = index.query(route.last_vertex(), service.start())?;
            reachable &= cost.is_finite();
            route.append_service(service, cost, &path);
        }
        let (cost, path) = index.query(route.last_vertex(), depot)?;
        reachable &= cost.is_finite();
        route.append_depot_return(cost, &path);

        if !route.is_feasible(self.problem.capacity()) {
            violations.push(Violation::new(ViolationType::CapacityExceeded {
                route_index: 0,
                demand: route.demand(),
                capacity: self.problem.capacity(),
            }));
        }
        if !reachable {
            violations.push(Violation::new(ViolationType::Unreachable { route_index: 0 }));
        }
        Ok((route, violations))
    }

    /// Materialises every non-empty route of a plan into a solution.
    ///
    /// Routes are numbered from 1. The plan's unassigned ids and the
    /// problem's unservable ids are reported as unassigned. Route
    /// violations are logged at debug level.
    pub fn build_solution(&self, plan: &RoutePlan) -> Result<Solution> {
        let (solution, violations) = self.build_solution_with_violations(plan)?;
        for violation in &violations {
            debug!(kind = ?violation.kind, "materialised route violates a constraint");
        }
        Ok(solution)
    }

    /// Like [`build_solution`](Self::build_solution), also returning the
    /// capacity and reachability violations of the built routes.
    ///
    /// `route_index` in each violation is the route's position in the
    /// returned solution.
    pub fn build_solution_with_violations(
        &self,
        plan: &RoutePlan,
    ) -> Result<(Solution, Vec<Violation>)> {
        let mut solution = Solution::new();
        let mut violations = Vec::new();
        for services in plan.routes().iter().filter(|r| !r.is_empty()) {
            let route_index = solution.num_routes();
            let (route, route_violations) = self.build_route(route_index + 1, services)?;
            violations.extend(
                route_violations
                    .into_iter()
                    .map(|v| Violation::new(v.kind.at_route(route_index))),
            );
            solution.add_route(route);
        }
        for &id in self.problem.unservable().iter().chain(plan.unassigned()) {
            solution.add_unassigned(id);
        }
        Ok((solution, violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Graph;
    use crate::models::ServiceCatalog;

    /// Star around depot 1: spokes 1-2, 1-3, 1-4 of cost 1, 2, 3.
    fn setup() -> ArcRoutingProblem {
        let mut g = Graph::new(4);
        g.add_edge(1, 2, 1.0).expect("valid");
        g.add_edge(1, 3, 2.0).expect("valid");
        g.add_edge(1, 4, 3.0).expect("valid");
        let mut c = ServiceCatalog::new();
        c.register_node(2, 10, 0.0).expect("valid");
        c.register_node(3, 20, 1.0).expect("valid");
        c.register_edge(1, 4, 15, 3.0).expect("valid");
        ArcRoutingProblem::from_graph(&g, c, 1, 50).expect("valid")
    }

    #[test]
    fn test_empty_sequence() {
        let p = setup();
        let eval = RouteEvaluator::new(&p);
        assert_eq!(eval.sequence_cost(&[]), 0.0);
        let (route, violations) = eval.build_route(1, &[]).expect("valid");
        assert!(route.is_empty());
        assert!(violations.is_empty());
        assert_eq!(route.cost(), 0.0);
    }

    #[test]
    fn test_sequence_cost() {
        let p = setup();
        let eval = RouteEvaluator::new(&p);
        // 1→2 (1) + 0, 2→3 (3) + 1, 3→1 (2)
        assert!((eval.sequence_cost(&[1, 2]) - 7.0).abs() < 1e-10);
        // 1→1 (0) + 3, 4→1 (3)
        assert!((eval.sequence_cost(&[3]) - 6.0).abs() < 1e-10);
        assert!(eval.sequence_cost(&[42]).is_infinite());
    }

    #[test]
    fn test_capacity_makes_route_infinite() {
        let p = setup();
        let eval = RouteEvaluator::new(&p);
        // 10 + 20 + 15 = 45 <= 50
        assert!(eval.is_feasible(&[1, 2, 3]));
        let mut plan = RoutePlan::new(vec![vec![1, 2, 3, 1]]);
        assert!(eval.evaluate(&mut plan).is_infinite());
        assert!(plan.cost().is_infinite());
    }

    #[test]
    fn test_build_route_matches_sequence_cost() {
        let p = setup();
        let eval = RouteEvaluator::new(&p);
        let (route, violations) = eval.build_route(3, &[2, 1, 3]).expect("valid");
        assert!(violations.is_empty());
        assert_eq!(route.id(), 3);
        assert_eq!(route.demand(), 45);
        assert!((route.cost() - eval.sequence_cost(&[2, 1, 3])).abs() < 1e-10);
    }

    #[test]
    fn test_build_route_capacity_violated() {
        let p = setup();
        let eval = RouteEvaluator::new(&p);
        let (_, violations) = eval.build_route(1, &[2, 2, 3]).expect("valid");
        assert!(matches!(
            violations[0].kind,
            ViolationType::CapacityExceeded {
                demand: 55,
                capacity: 50,
                ..
            }
        ));
    }

    #[test]
    fn test_build_route_unknown_service() {
        let p = setup();
        let eval = RouteEvaluator::new(&p);
        assert!(matches!(
            eval.build_route(1, &[9]),
            Err(RoutingError::UnknownService(9))
        ));
    }

    #[test]
    fn test_build_solution_numbers_routes() {
        let p = setup();
        let eval = RouteEvaluator::new(&p);
        let plan = RoutePlan::new(vec![vec![], vec![1], vec![2, 3]]);
        let sol = eval.build_solution(&plan).expect("valid");
        assert_eq!(sol.num_routes(), 2);
        assert_eq!(sol.routes()[1].id(), 2);
        assert!((sol.total_cost() - eval.plan_cost(&plan)).abs() < 1e-10);
        assert!(sol.validate(&p).is_empty());
    }

    #[test]
    fn test_build_solution_reports_route_violations() {
        let p = setup();
        let eval = RouteEvaluator::new(&p);
        let plan = RoutePlan::new(vec![vec![1], vec![], vec![2, 2, 3]]);
        let (sol, violations) = eval.build_solution_with_violations(&plan).expect("valid");
        assert_eq!(sol.num_routes(), 2);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0].kind,
            ViolationType::CapacityExceeded {
                route_index: 1,
                demand: 55,
                capacity: 50,
            }
        ));
        assert!(sol.validate(&p).contains(&violations[0]));

        let feasible = RoutePlan::new(vec![vec![1], vec![2, 3]]);
        let (_, violations) = eval.build_solution_with_violations(&feasible).expect("valid");
        assert!(violations.is_empty());
    }
}
