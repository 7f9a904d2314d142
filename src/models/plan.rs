//! Lightweight route-set representation used by the improvement stages.

use std::collections::BTreeSet;

use super::service::ServiceId;
use super::solution::Solution;

/// Routes as plain service-id sequences plus a cached cost.
///
/// The depot legs are implicit: every sequence is travelled depot → first
/// entry vertex → … → last exit vertex → depot. The cached cost is
/// `f64::INFINITY` until evaluated and whenever a route breaks capacity.
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::RoutePlan;
///
/// let mut plan = RoutePlan::new(vec![vec![1, 2], vec![], vec![3]]);
/// assert_eq!(plan.num_services(), 3);
/// plan.drop_empty_routes();
/// assert_eq!(plan.num_routes(), 2);
/// assert!(plan.cost().is_infinite());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    routes: Vec<Vec<ServiceId>>,
    unassigned: Vec<ServiceId>,
    cost: f64,
}

impl RoutePlan {
    /// Creates an unevaluated plan.
    pub fn new(routes: Vec<Vec<ServiceId>>) -> Self {
        Self {
            routes,
            unassigned: Vec::new(),
            cost: f64::INFINITY,
        }
    }

    /// Creates an unevaluated plan carrying unresolved ids.
    pub fn with_unassigned(routes: Vec<Vec<ServiceId>>, unassigned: Vec<ServiceId>) -> Self {
        Self {
            routes,
            unassigned,
            cost: f64::INFINITY,
        }
    }

    /// Extracts service sequences from a materialised solution.
    ///
    /// The cost is taken over from the solution.
    pub fn from_solution(solution: &Solution) -> Self {
        Self {
            routes: solution.routes().iter().map(|r| r.service_ids()).collect(),
            unassigned: solution.unassigned().to_vec(),
            cost: solution.total_cost(),
        }
    }

    /// Service sequences.
    pub fn routes(&self) -> &[Vec<ServiceId>] {
        &self.routes
    }

    /// Mutable service sequences. Invalidate the cost after editing.
    pub fn routes_mut(&mut self) -> &mut Vec<Vec<ServiceId>> {
        &mut self.routes
    }

    /// Ids that no route carries.
    pub fn unassigned(&self) -> &[ServiceId] {
        &self.unassigned
    }

    /// Cached total cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Stores an evaluated total cost.
    pub fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }

    /// Marks the plan as unevaluated.
    pub fn invalidate(&mut self) {
        self.cost = f64::INFINITY;
    }

    /// Number of routes.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Number of routed services.
    pub fn num_services(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }

    /// All routed ids as a set.
    pub fn service_set(&self) -> BTreeSet<ServiceId> {
        self.routes.iter().flatten().copied().collect()
    }

    /// Removes routes without services.
    pub fn drop_empty_routes(&mut self) {
        self.routes.retain(|r| !r.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_plan_is_unevaluated() {
        let plan = RoutePlan::new(vec![vec![1]]);
        assert!(plan.cost().is_infinite());
        assert!(plan.unassigned().is_empty());
    }

    #[test]
    fn test_service_set() {
        let plan = RoutePlan::with_unassigned(vec![vec![3, 1], vec![2]], vec![4]);
        assert_eq!(plan.service_set().into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(plan.unassigned(), &[4]);
    }

    #[test]
    fn test_invalidate() {
        let mut plan = RoutePlan::new(vec![vec![1]]);
        plan.set_cost(12.0);
        assert_eq!(plan.cost(), 12.0);
        plan.routes_mut()[0].push(2);
        plan.invalidate();
        assert!(plan.cost().is_infinite());
    }
}
