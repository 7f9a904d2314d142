//! Required network elements.

use serde::{Deserialize, Serialize};

use crate::distance::VertexId;

/// Synthetic, sequential service identifier (starting at 1).
pub type ServiceId = usize;

/// Capacity units consumed by a service.
pub type Demand = u32;

/// Which network element a service is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    /// A required vertex; both endpoints are the vertex itself.
    Node,
    /// A required two-way edge, serviced from `u` to `v`.
    Edge,
    /// A required one-way arc `u → v`.
    Arc,
}

/// A required node, edge or arc with its demand and service cost.
///
/// Servicing starts at [`start`](Self::start) and leaves the vehicle at
/// [`end`](Self::end).
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::{Service, ServiceKind};
///
/// let s = Service::new(3, ServiceKind::Arc, 4, 7, 12, 2.5);
/// assert_eq!(s.endpoints(), (4, 7));
/// assert_eq!(s.demand(), 12);
///
/// let n = Service::node(1, 5, 3, 1.0);
/// assert_eq!(n.start(), n.end());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    id: ServiceId,
    kind: ServiceKind,
    u: VertexId,
    v: VertexId,
    demand: Demand,
    service_cost: f64,
}

impl Service {
    /// Creates a service.
    pub fn new(
        id: ServiceId,
        kind: ServiceKind,
        u: VertexId,
        v: VertexId,
        demand: Demand,
        service_cost: f64,
    ) -> Self {
        Self {
            id,
            kind,
            u,
            v,
            demand,
            service_cost,
        }
    }

    /// Creates a node service at `vertex`.
    pub fn node(id: ServiceId, vertex: VertexId, demand: Demand, service_cost: f64) -> Self {
        Self::new(id, ServiceKind::Node, vertex, vertex, demand, service_cost)
    }

    /// Service ID.
    pub fn id(&self) -> ServiceId {
        self.id
    }

    /// Element kind.
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// `(u, v)` in service orientation.
    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.u, self.v)
    }

    /// Vertex where servicing begins.
    pub fn start(&self) -> VertexId {
        self.u
    }

    /// Vertex where servicing ends.
    pub fn end(&self) -> VertexId {
        self.v
    }

    /// Demand.
    pub fn demand(&self) -> Demand {
        self.demand
    }

    /// Cost of performing the service itself.
    pub fn service_cost(&self) -> f64 {
        self.service_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_new() {
        let s = Service::new(2, ServiceKind::Edge, 1, 3, 5, 4.0);
        assert_eq!(s.id(), 2);
        assert_eq!(s.kind(), ServiceKind::Edge);
        assert_eq!(s.start(), 1);
        assert_eq!(s.end(), 3);
        assert_eq!(s.service_cost(), 4.0);
    }

    #[test]
    fn test_node_service() {
        let s = Service::node(1, 9, 2, 0.5);
        assert_eq!(s.kind(), ServiceKind::Node);
        assert_eq!(s.endpoints(), (9, 9));
    }
}
