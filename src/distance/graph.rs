//! Mixed network of edges (two-way) and arcs (one-way).

use crate::error::{Result, RoutingError};

/// Vertex identifier. Vertices are numbered `1..=num_vertices`.
pub type VertexId = usize;

/// A mixed graph with identical vertex numbering to the instance files.
///
/// Parallel connections are kept as given; the shortest-path index collapses
/// them to the cheapest one.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
///
/// let mut g = Graph::new(3);
/// g.add_edge(1, 2, 5.0).unwrap();
/// g.add_arc(2, 3, 4.0).unwrap();
/// assert_eq!(g.num_vertices(), 3);
/// assert_eq!(g.neighbors(2).len(), 2); // 2→1 (edge) and 2→3 (arc)
/// assert!(g.add_arc(3, 4, 1.0).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    adjacency: Vec<Vec<(VertexId, f64)>>,
    num_links: usize,
}

impl Graph {
    /// Creates a graph with vertices `1..=num_vertices` and no connections.
    pub fn new(num_vertices: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); num_vertices],
            num_links: 0,
        }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed connections (an edge counts twice).
    pub fn num_links(&self) -> usize {
        self.num_links
    }

    /// Returns `true` if `v` is a vertex of this graph.
    pub fn contains(&self, v: VertexId) -> bool {
        v >= 1 && v <= self.adjacency.len()
    }

    /// Iterates over all vertex ids.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> {
        1..=self.adjacency.len()
    }

    /// Adds an undirected edge, traversable both ways at `cost`.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId, cost: f64) -> Result<()> {
        self.add_arc(u, v, cost)?;
        self.add_arc(v, u, cost)
    }

    /// Adds a one-way arc `u → v`.
    pub fn add_arc(&mut self, u: VertexId, v: VertexId, cost: f64) -> Result<()> {
        let from = self.index(u).ok_or(RoutingError::UnknownVertex(u))?;
        if !self.contains(v) {
            return Err(RoutingError::UnknownVertex(v));
        }
        if !cost.is_finite() || cost < 0.0 {
            return Err(RoutingError::InvalidCost { from: u, to: v, cost });
        }
        self.adjacency[from].push((v, cost));
        self.num_links += 1;
        Ok(())
    }

    /// Outgoing connections of `v` as `(head, cost)`; empty for unknown vertices.
    pub fn neighbors(&self, v: VertexId) -> &[(VertexId, f64)] {
        match self.index(v) {
            Some(i) => &self.adjacency[i],
            None => &[],
        }
    }

    /// Dense index of a vertex id.
    pub(crate) fn index(&self, v: VertexId) -> Option<usize> {
        if self.contains(v) {
            Some(v - 1)
        } else {
            None
        }
    }
}
