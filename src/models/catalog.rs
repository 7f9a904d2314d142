//! Registry of required services.

use std::collections::BTreeSet;

use crate::distance::VertexId;
use crate::error::{Result, RoutingError};

use super::service::{Demand, Service, ServiceId, ServiceKind};

/// All required elements of an instance, keyed by synthetic id.
///
/// Ids are assigned sequentially from 1 in registration order, across node,
/// edge and arc services alike, so lookups are a direct index.
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::ServiceCatalog;
///
/// let mut catalog = ServiceCatalog::new();
/// let a = catalog.register_node(2, 4, 1.0).unwrap();
/// let b = catalog.register_arc(2, 3, 6, 5.0).unwrap();
/// assert_eq!((a, b), (1, 2));
/// assert_eq!(catalog.get(b).unwrap().demand(), 6);
/// assert_eq!(catalog.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    services: Vec<Service>,
}

impl ServiceCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service and returns its id.
    pub fn register(
        &mut self,
        kind: ServiceKind,
        u: VertexId,
        v: VertexId,
        demand: Demand,
        service_cost: f64,
    ) -> Result<ServiceId> {
        if !service_cost.is_finite() || service_cost < 0.0 {
            return Err(RoutingError::InvalidCost {
                from: u,
                to: v,
                cost: service_cost,
            });
        }
        let id = self.services.len() + 1;
        self.services
            .push(Service::new(id, kind, u, v, demand, service_cost));
        Ok(id)
    }

    /// Registers a required vertex.
    pub fn register_node(
        &mut self,
        vertex: VertexId,
        demand: Demand,
        service_cost: f64,
    ) -> Result<ServiceId> {
        self.register(ServiceKind::Node, vertex, vertex, demand, service_cost)
    }

    /// Registers a required edge, serviced from `u` to `v`.
    pub fn register_edge(
        &mut self,
        u: VertexId,
        v: VertexId,
        demand: Demand,
        service_cost: f64,
    ) -> Result<ServiceId> {
        self.register(ServiceKind::Edge, u, v, demand, service_cost)
    }

    /// Registers a required arc `u → v`.
    pub fn register_arc(
        &mut self,
        u: VertexId,
        v: VertexId,
        demand: Demand,
        service_cost: f64,
    ) -> Result<ServiceId> {
        self.register(ServiceKind::Arc, u, v, demand, service_cost)
    }

    /// Details of a service.
    pub fn get(&self, id: ServiceId) -> Option<&Service> {
        id.checked_sub(1).and_then(|i| self.services.get(i))
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: ServiceId) -> bool {
        self.get(id).is_some()
    }

    /// Demand of a service, zero for unknown ids.
    pub fn demand(&self, id: ServiceId) -> Demand {
        self.get(id).map_or(0, Service::demand)
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ServiceId> + '_ {
        self.services.iter().map(Service::id)
    }

    /// All ids as a set.
    pub fn id_set(&self) -> BTreeSet<ServiceId> {
        self.ids().collect()
    }

    /// Iterates over services in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Service> {
        self.services.iter()
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Sum of all demands.
    pub fn total_demand(&self) -> u64 {
        self.services.iter().map(|s| s.demand() as u64).sum()
    }
}
