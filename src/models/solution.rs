//! Solution and violation types.

use std::collections::BTreeMap;

use super::problem::ArcRoutingProblem;
use super::service::{Demand, ServiceId};
use super::Route;

/// A type of constraint violation in a route or solution.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationType {
    /// Vehicle capacity exceeded.
    CapacityExceeded {
        /// Route index in the solution.
        route_index: usize,
        /// Demand carried by the route.
        demand: Demand,
        /// Vehicle capacity.
        capacity: Demand,
    },
    /// A leg of the route has no finite shortest path.
    Unreachable {
        /// Route index in the solution.
        route_index: usize,
    },
    /// A servable service is not on any route.
    MissingService {
        /// Uncovered service.
        service_id: ServiceId,
    },
    /// A service appears on more than one route position.
    DuplicateService {
        /// Repeated service.
        service_id: ServiceId,
        /// Number of occurrences.
        count: usize,
    },
}

impl ViolationType {
    /// Returns the same violation attributed to route `route_index`.
    ///
    /// Solution-level kinds are returned unchanged.
    pub fn at_route(self, route_index: usize) -> Self {
        match self {
            ViolationType::CapacityExceeded {
                demand, capacity, ..
            } => ViolationType::CapacityExceeded {
                route_index,
                demand,
                capacity,
            },
            ViolationType::Unreachable { .. } => ViolationType::Unreachable { route_index },
            other => other,
        }
    }
}

/// A constraint violation in a solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// A set of depot-to-depot routes and the ids left unserved.
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::{Route, Solution};
///
/// let mut sol = Solution::new();
/// sol.add_route(Route::new(1, 1));
/// sol.add_unassigned(7);
/// assert_eq!(sol.num_routes(), 1);
/// assert_eq!(sol.unassigned(), &[7]);
/// assert_eq!(sol.total_cost(), 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Solution {
    routes: Vec<Route>,
    unassigned: Vec<ServiceId>,
}

impl Solution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route.
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Records a service that no route carries.
    pub fn add_unassigned(&mut self, service_id: ServiceId) {
        if !self.unassigned.contains(&service_id) {
            self.unassigned.push(service_id);
        }
    }

    /// Returns all routes.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns a mutable reference to the routes.
    pub fn routes_mut(&mut self) -> &mut Vec<Route> {
        &mut self.routes
    }

    /// Number of routes.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Unserved ids (permanently unservable or unresolved).
    pub fn unassigned(&self) -> &[ServiceId] {
        &self.unassigned
    }

    /// Sum of route costs.
    pub fn total_cost(&self) -> f64 {
        self.routes.iter().map(Route::cost).sum()
    }

    /// Sum of route demands.
    pub fn total_demand(&self) -> u64 {
        self.routes.iter().map(|r| r.demand() as u64).sum()
    }

    /// Number of service visits across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(Route::len).sum()
    }

    /// Renumbers routes `1..=num_routes` in their current order.
    pub fn renumber_routes(&mut self) {
        for (i, route) in self.routes.iter_mut().enumerate() {
            route.set_id(i + 1);
        }
    }

    /// Checks capacity, reachability and coverage against `problem`.
    ///
    /// Coverage means every servable id is routed exactly once; ids the
    /// problem marks unservable are not expected on any route.
    pub fn validate(&self, problem: &ArcRoutingProblem) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut counts: BTreeMap<ServiceId, usize> = BTreeMap::new();

        for (route_index, route) in self.routes.iter().enumerate() {
            if !route.is_feasible(problem.capacity()) {
                violations.push(Violation::new(ViolationType::CapacityExceeded {
                    route_index,
                    demand: route.demand(),
                    capacity: problem.capacity(),
                }));
            }
            if !route.cost().is_finite() {
                violations.push(Violation::new(ViolationType::Unreachable { route_index }));
            }
            for id in route.service_ids() {
                *counts.entry(id).or_insert(0) += 1;
            }
        }

        for (&service_id, &count) in &counts {
            if count > 1 {
                violations.push(Violation::new(ViolationType::DuplicateService {
                    service_id,
                    count,
                }));
            }
        }
        for service_id in problem.servable_ids() {
            if !counts.contains_key(&service_id) {
                violations.push(Violation::new(ViolationType::MissingService { service_id }));
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Service;

    #[test]
    fn test_solution_empty() {
        let sol = Solution::new();
        assert_eq!(sol.num_routes(), 0);
        assert_eq!(sol.num_served(), 0);
        assert_eq!(sol.total_cost(), 0.0);
    }

    #[test]
    fn test_totals() {
        let mut a = Route::new(1, 1);
        a.append_service(&Service::node(1, 2, 3, 1.0), 2.0, &[1, 2]);
        a.append_depot_return(2.0, &[2, 1]);
        let mut b = Route::new(2, 1);
        b.append_service(&Service::node(2, 3, 4, 0.0), 5.0, &[1, 3]);
        b.append_depot_return(5.0, &[3, 1]);

        let mut sol = Solution::new();
        sol.add_route(a);
        sol.add_route(b);
        assert!((sol.total_cost() - 15.0).abs() < 1e-10);
        assert_eq!(sol.total_demand(), 7);
        assert_eq!(sol.num_served(), 2);
    }

    #[test]
    fn test_unassigned_deduplicated() {
        let mut sol = Solution::new();
        sol.add_unassigned(3);
        sol.add_unassigned(3);
        assert_eq!(sol.unassigned(), &[3]);
    }

    #[test]
    fn test_renumber() {
        let mut sol = Solution::new();
        sol.add_route(Route::new(7, 1));
        sol.add_route(Route::new(3, 1));
        sol.renumber_routes();
        let ids: Vec<usize> = sol.routes().iter().map(Route::id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_violation_types() {
        let v = Violation::new(ViolationType::CapacityExceeded {
            route_index: 0,
            demand: 12,
            capacity: 10,
        });
        assert!(matches!(v.kind, ViolationType::CapacityExceeded { .. }));
        let v = Violation::new(ViolationType::MissingService { service_id: 4 });
        assert_eq!(v.kind, ViolationType::MissingService { service_id: 4 });
    }
}
