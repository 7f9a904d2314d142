//! Error type shared by the crate.

use thiserror::Error;

use crate::models::ServiceId;
use crate::distance::VertexId;

/// Errors raised while building problem data or the shortest-path index.
///
/// Algorithm stages never return an error for "no improving move" or for an
/// unreachable target; those are ordinary outcomes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// A vertex id outside `1..=num_vertices`.
    #[error("unknown vertex {0}")]
    UnknownVertex(VertexId),

    /// A negative or non-finite traversal or service cost.
    #[error("invalid cost {cost} on connection {from} -> {to}")]
    InvalidCost {
        /// Tail vertex.
        from: VertexId,
        /// Head vertex.
        to: VertexId,
        /// Offending cost.
        cost: f64,
    },

    /// Vehicle capacity of zero.
    #[error("vehicle capacity must be positive")]
    InvalidCapacity,

    /// A service id not present in the catalog.
    #[error("unknown service {0}")]
    UnknownService(ServiceId),

    /// The predecessor data does not lead back to the source.
    #[error("broken predecessor chain from {from} to {to}")]
    BrokenPredecessorChain {
        /// Source vertex.
        from: VertexId,
        /// Target vertex.
        to: VertexId,
    },

    /// A token in a route sequence line could not be read.
    #[error("malformed route token `{0}`")]
    MalformedToken(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RoutingError>;
