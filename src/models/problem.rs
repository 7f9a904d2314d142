//! Problem instance: network index, services, depot and fleet capacity.

use tracing::{debug, warn};

use crate::distance::{Graph, ShortestPathIndex, VertexId};
use crate::error::{Result, RoutingError};

use super::catalog::ServiceCatalog;
use super::service::{Demand, Service, ServiceId};

/// A mixed capacitated arc routing instance.
///
/// Owns the read-only shortest-path index and service catalog. Algorithms
/// borrow it immutably, so it can be shared across threads.
///
/// On construction every service is classified: it is *unservable* when its
/// demand exceeds the vehicle capacity or when the round trip
/// depot → entry vertex, exit vertex → depot has no finite path.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, ServiceCatalog};
///
/// let mut graph = Graph::new(3);
/// graph.add_edge(1, 2, 1.0).unwrap();
/// graph.add_edge(2, 3, 1.0).unwrap();
///
/// let mut catalog = ServiceCatalog::new();
/// catalog.register_edge(2, 3, 4, 1.0).unwrap();
/// catalog.register_node(3, 20, 0.0).unwrap(); // too heavy
///
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 10).unwrap();
/// assert_eq!(problem.servable_ids(), vec![1]);
/// assert_eq!(problem.unservable(), &[2]);
/// ```
#[derive(Debug, Clone)]
pub struct ArcRoutingProblem {
    index: ShortestPathIndex,
    catalog: ServiceCatalog,
    depot: VertexId,
    capacity: Demand,
    unservable: Vec<ServiceId>,
}

impl ArcRoutingProblem {
    /// Creates an instance from a prebuilt index.
    ///
    /// # Errors
    ///
    /// [`RoutingError::InvalidCapacity`] for zero capacity and
    /// [`RoutingError::UnknownVertex`] for a depot or service endpoint
    /// outside the index.
    pub fn new(
        index: ShortestPathIndex,
        catalog: ServiceCatalog,
        depot: VertexId,
        capacity: Demand,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(RoutingError::InvalidCapacity);
        }
        let known = |v: VertexId| v >= 1 && v <= index.num_vertices();
        if !known(depot) {
            return Err(RoutingError::UnknownVertex(depot));
        }
        for service in catalog.iter() {
            let (u, v) = service.endpoints();
            for vertex in [u, v] {
                if !known(vertex) {
                    return Err(RoutingError::UnknownVertex(vertex));
                }
            }
        }

        let unservable: Vec<ServiceId> = catalog
            .iter()
            .filter(|s| !round_trip_possible(&index, s, depot, capacity))
            .map(Service::id)
            .collect();
        for &id in &unservable {
            warn!(service = id, "service cannot be served by any single vehicle");
        }
        debug!(
            services = catalog.len(),
            unservable = unservable.len(),
            depot,
            capacity,
            "problem instance ready"
        );

        Ok(Self {
            index,
            catalog,
            depot,
            capacity,
            unservable,
        })
    }

    /// Builds the shortest-path index for `graph` and creates the instance.
    pub fn from_graph(
        graph: &Graph,
        catalog: ServiceCatalog,
        depot: VertexId,
        capacity: Demand,
    ) -> Result<Self> {
        let index = ShortestPathIndex::build(graph)?;
        Self::new(index, catalog, depot, capacity)
    }

    /// Shortest-path index.
    pub fn index(&self) -> &ShortestPathIndex {
        &self.index
    }

    /// Required services.
    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// Depot vertex.
    pub fn depot(&self) -> VertexId {
        self.depot
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> Demand {
        self.capacity
    }

    /// Shortest travel cost `u → v`.
    pub fn travel(&self, u: VertexId, v: VertexId) -> f64 {
        self.index.cost(u, v)
    }

    /// Looks up a service.
    pub fn service(&self, id: ServiceId) -> Option<&Service> {
        self.catalog.get(id)
    }

    /// Ids no single vehicle can serve, in ascending order.
    pub fn unservable(&self) -> &[ServiceId] {
        &self.unservable
    }

    /// Returns `true` if `id` exists and can be served.
    pub fn is_servable(&self, id: ServiceId) -> bool {
        self.catalog.contains(id) && self.unservable.binary_search(&id).is_err()
    }

    /// Servable ids in ascending order.
    pub fn servable_ids(&self) -> Vec<ServiceId> {
        self.catalog
            .ids()
            .filter(|&id| self.unservable.binary_search(&id).is_err())
            .collect()
    }

    /// Number of registered services, servable or not.
    pub fn required_count(&self) -> usize {
        self.catalog.len()
    }
}

fn round_trip_possible(
    index: &ShortestPathIndex,
    service: &Service,
    depot: VertexId,
    capacity: Demand,
) -> bool {
    service.demand() <= capacity
        && index.is_reachable(depot, service.start())
        && index.is_reachable(service.end(), depot)
}
