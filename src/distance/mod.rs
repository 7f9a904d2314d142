//! Network representation and the all-pairs shortest-path oracle.
//!
//! - [`Graph`] — Mixed network of two-way edges and one-way arcs
//! - [`ShortestPathIndex`] — Minimum travel cost and path reconstruction
//! - [`DistanceMatrix`] — Dense row-major cost storage

mod graph;
mod matrix;
mod shortest_path;

pub use graph::{Graph, VertexId};
pub use matrix::DistanceMatrix;
pub use shortest_path::{PathAlgorithm, ShortestPathIndex};
