//! Route and visit types.

use crate::distance::{ShortestPathIndex, VertexId};
use crate::error::{Result, RoutingError};

use super::catalog::ServiceCatalog;
use super::service::{Demand, Service, ServiceId};

/// One step of a vehicle's trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// The vehicle is at the depot (route start, end, or reload).
    Depot,
    /// A required element is serviced from `u` to `v`.
    Service {
        /// Serviced element.
        id: ServiceId,
        /// Entry vertex.
        u: VertexId,
        /// Exit vertex.
        v: VertexId,
    },
    /// Pass-through vertex on a shortest path between two service visits.
    Transit {
        /// Traversed vertex.
        vertex: VertexId,
    },
}

impl Visit {
    /// Returns the service id for service visits.
    pub fn service_id(&self) -> Option<ServiceId> {
        match self {
            Visit::Service { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// A vehicle trip that starts and ends at the depot.
///
/// `visits` always opens with [`Visit::Depot`]. Interior vertices of each
/// traversal are kept as [`Visit::Transit`] for inspection but never appear
/// in the output format.
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::{Route, Service, ServiceKind, Visit};
///
/// let s = Service::new(1, ServiceKind::Arc, 3, 4, 5, 2.0);
/// let mut route = Route::new(1, 1);
/// route.append_service(&s, 6.0, &[1, 2, 3]);
/// route.append_depot_return(7.0, &[4, 1]);
///
/// assert_eq!(route.demand(), 5);
/// assert_eq!(route.cost(), 15.0);
/// assert_eq!(route.visits()[1], Visit::Transit { vertex: 2 });
/// assert_eq!(route.service_ids(), vec![1]);
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    id: usize,
    depot: VertexId,
    visits: Vec<Visit>,
    demand: Demand,
    cost: f64,
    position: VertexId,
}

impl Route {
    /// Opens an empty route at `depot`.
    pub fn new(id: usize, depot: VertexId) -> Self {
        Self {
            id,
            depot,
            visits: vec![Visit::Depot],
            demand: 0,
            cost: 0.0,
            position: depot,
        }
    }

    /// Route number used in output lines.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Renumbers the route.
    pub fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    /// Depot vertex.
    pub fn depot(&self) -> VertexId {
        self.depot
    }

    /// Full visit list in travel order.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Accumulated demand.
    pub fn demand(&self) -> Demand {
        self.demand
    }

    /// Accumulated travel plus service cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Vertex the vehicle currently stands at.
    pub fn last_vertex(&self) -> VertexId {
        self.position
    }

    /// Number of service visits.
    pub fn len(&self) -> usize {
        self.visits.iter().filter(|v| v.service_id().is_some()).count()
    }

    /// Returns `true` if no service has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serviced ids in travel order.
    pub fn service_ids(&self) -> Vec<ServiceId> {
        self.visits.iter().filter_map(Visit::service_id).collect()
    }

    /// Travels `traversal_path` and services `service`.
    ///
    /// `traversal_path` runs from the current position to the service's
    /// entry vertex, both included; its interior becomes transit visits.
    pub fn append_service(&mut self, service: &Service, traversal_cost: f64, traversal_path: &[VertexId]) {
        self.push_transits(traversal_path);
        let (u, v) = service.endpoints();
        self.visits.push(Visit::Service {
            id: service.id(),
            u,
            v,
        });
        self.demand = self.demand.saturating_add(service.demand());
        self.cost += traversal_cost + service.service_cost();
        self.position = v;
    }

    /// Travels `traversal_path` back to the depot and closes the trip.
    pub fn append_depot_return(&mut self, traversal_cost: f64, traversal_path: &[VertexId]) {
        self.push_transits(traversal_path);
        self.visits.push(Visit::Depot);
        self.cost += traversal_cost;
        self.position = self.depot;
    }

    fn push_transits(&mut self, path: &[VertexId]) {
        if path.len() > 2 {
            self.visits.extend(
                path[1..path.len() - 1]
                    .iter()
                    .map(|&vertex| Visit::Transit { vertex }),
            );
        }
    }

    /// Returns `true` if accumulated demand fits `capacity`.
    pub fn is_feasible(&self, capacity: Demand) -> bool {
        self.demand <= capacity
    }

    /// Recomputes demand and cost by replaying the visit list.
    ///
    /// Travel is charged hop by hop through every transit vertex, so a
    /// recorded detour keeps its cost. Service visits add their service
    /// cost. Calling this twice yields the same values.
    pub fn recompute_aggregates(
        &mut self,
        index: &ShortestPathIndex,
        catalog: &ServiceCatalog,
    ) -> Result<()> {
        let mut demand: Demand = 0;
        let mut cost = 0.0;
        let mut position = self.depot;
        for visit in self.visits.iter().skip(1) {
            match *visit {
                Visit::Depot => {
                    cost += index.cost(position, self.depot);
                    position = self.depot;
                }
                Visit::Service { id, .. } => {
                    let service = catalog.get(id).ok_or(RoutingError::UnknownService(id))?;
                    cost += index.cost(position, service.start()) + service.service_cost();
                    demand = demand.saturating_add(service.demand());
                    position = service.end();
                }
                Visit::Transit { vertex } => {
                    cost += index.cost(position, vertex);
                    position = vertex;
                }
            }
        }
        self.demand = demand;
        self.cost = cost;
        self.position = position;
        Ok(())
    }

    /// Renders the summary and sequence lines.
    ///
    /// Summary: `0 1 <routeId> <demand> <cost> <serviceCount>`.
    /// Sequence: `(D 0,1,<routeId>)` per depot visit and `(S <id>,<u>,<v>)`
    /// per service visit.
    pub fn to_output_format(&self) -> (String, String) {
        let summary = format!(
            "0 1 {} {} {} {}",
            self.id,
            self.demand,
            self.cost,
            self.len()
        );
        let mut sequence = String::new();
        for visit in &self.visits {
            let token = match *visit {
                Visit::Depot => format!("(D 0,1,{})", self.id),
                Visit::Service { id, u, v } => format!("(S {id},{u},{v})"),
                Visit::Transit { .. } => continue,
            };
            if !sequence.is_empty() {
                sequence.push(' ');
            }
            sequence.push_str(&token);
        }
        (summary, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Graph;
    use crate::models::ServiceKind;

    fn line_setup() -> (ShortestPathIndex, ServiceCatalog) {
        // 1 - 2 - 3 - 4, unit edges
        let mut g = Graph::new(4);
        g.add_edge(1, 2, 1.0).expect("valid");
        g.add_edge(2, 3, 1.0).expect("valid");
        g.add_edge(3, 4, 1.0).expect("valid");
        let index = ShortestPathIndex::build(&g).expect("valid");
        let mut catalog = ServiceCatalog::new();
        catalog.register_edge(3, 4, 2, 1.0).expect("valid");
        catalog.register_node(2, 3, 0.5).expect("valid");
        (index, catalog)
    }

    #[test]
    fn test_new_route_starts_at_depot() {
        let r = Route::new(1, 5);
        assert_eq!(r.visits(), &[Visit::Depot]);
        assert!(r.is_empty());
        assert_eq!(r.last_vertex(), 5);
        assert_eq!(r.cost(), 0.0);
    }

    #[test]
    fn test_append_tracks_position_and_transits() {
        let (index, catalog) = line_setup();
        let s = catalog.get(1).expect("registered");
        let (c, p) = index.query(1, 3).expect("valid");
        let mut r = Route::new(1, 1);
        r.append_service(s, c, &p);
        assert_eq!(r.last_vertex(), 4);
        let (c, p) = index.query(4, 1).expect("valid");
        r.append_depot_return(c, &p);
        assert_eq!(r.last_vertex(), 1);
        assert_eq!(r.cost(), 2.0 + 1.0 + 3.0);
        let transits = r
            .visits()
            .iter()
            .filter(|v| matches!(v, Visit::Transit { .. }))
            .count();
        // 2 on the way out, 3 and 2 on the way back
        assert_eq!(transits, 3);
    }

    #[test]
    fn test_recompute_matches_incremental_and_is_idempotent() {
        let (index, catalog) = line_setup();
        let mut r = Route::new(1, 1);
        for id in [2, 1] {
            let s = catalog.get(id).expect("registered");
            let (c, p) = index.query(r.last_vertex(), s.start()).expect("valid");
            r.append_service(s, c, &p);
        }
        let (c, p) = index.query(r.last_vertex(), 1).expect("valid");
        r.append_depot_return(c, &p);
        let incremental = (r.demand(), r.cost());

        r.recompute_aggregates(&index, &catalog).expect("valid");
        assert_eq!(r.demand(), incremental.0);
        assert!((r.cost() - incremental.1).abs() < 1e-10);

        r.recompute_aggregates(&index, &catalog).expect("valid");
        assert_eq!(r.demand(), incremental.0);
        assert!((r.cost() - incremental.1).abs() < 1e-10);
    }

    #[test]
    fn test_recompute_follows_recorded_detour() {
        // shortest 1 -> 3 runs via 2 (cost 2); the recorded trip goes via 4
        let mut g = Graph::new(4);
        g.add_edge(1, 2, 1.0).expect("valid");
        g.add_edge(2, 3, 1.0).expect("valid");
        g.add_edge(1, 4, 3.0).expect("valid");
        g.add_edge(4, 3, 3.0).expect("valid");
        let index = ShortestPathIndex::build(&g).expect("valid");
        let mut catalog = ServiceCatalog::new();
        catalog.register_node(3, 1, 0.5).expect("valid");

        let mut r = Route::new(1, 1);
        r.append_service(catalog.get(1).expect("registered"), 6.0, &[1, 4, 3]);
        r.append_depot_return(2.0, &[3, 2, 1]);
        assert!((r.cost() - 8.5).abs() < 1e-10);

        r.recompute_aggregates(&index, &catalog).expect("valid");
        assert!((r.cost() - 8.5).abs() < 1e-10);
        assert_eq!(r.last_vertex(), 1);
    }

    #[test]
    fn test_recompute_unknown_service() {
        let (index, catalog) = line_setup();
        let s = Service::new(9, ServiceKind::Node, 2, 2, 1, 0.0);
        let mut r = Route::new(1, 1);
        r.append_service(&s, 1.0, &[1, 2]);
        assert_eq!(
            r.recompute_aggregates(&index, &catalog),
            Err(RoutingError::UnknownService(9))
        );
    }

    #[test]
    fn test_feasibility() {
        let mut r = Route::new(1, 1);
        r.append_service(&Service::node(1, 2, 7, 0.0), 1.0, &[1, 2]);
        assert!(r.is_feasible(7));
        assert!(!r.is_feasible(6));
    }

    #[test]
    fn test_output_format() {
        let mut r = Route::new(2, 1);
        r.append_service(&Service::new(4, ServiceKind::Edge, 3, 4, 2, 1.0), 2.0, &[1, 2, 3]);
        r.append_depot_return(3.0, &[4, 3, 2, 1]);
        let (summary, sequence) = r.to_output_format();
        assert_eq!(summary, "0 1 2 2 6 1");
        assert_eq!(sequence, "(D 0,1,2) (S 4,3,4) (D 0,1,2)");
    }
}
