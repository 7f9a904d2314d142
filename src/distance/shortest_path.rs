//! All-pairs shortest-path index with path reconstruction.
//!
//! # Algorithm
//!
//! Two interchangeable strategies fill the same cost and predecessor tables:
//!
//! - **Floyd–Warshall**: O(n³), best on dense networks.
//! - **Dijkstra per source**: O(n · m log n), one source per rayon task,
//!   best on sparse road-like networks.
//!
//! `pred[u][v]` holds the vertex preceding `v` on the cheapest `u → v` path.
//! After the tables are filled, every source's predecessor tree is checked;
//! a chain that does not lead back to its source aborts construction.
//!
//! # Reference
//!
//! Floyd, R.W. (1962). "Algorithm 97: Shortest path", *Communications of the
//! ACM* 5(6), 345.
//!
//! Dijkstra, E.W. (1959). "A note on two problems in connexion with graphs",
//! *Numerische Mathematik* 1, 269-271.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::{Graph, VertexId};
use super::matrix::DistanceMatrix;
use crate::error::{Result, RoutingError};

const NO_PRED: usize = usize::MAX;

/// Strategy used to fill the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathAlgorithm {
    /// Dense all-pairs dynamic programming.
    FloydWarshall,
    /// Single-source Dijkstra repeated from every vertex.
    Dijkstra,
}

impl PathAlgorithm {
    /// Picks Dijkstra when the graph has fewer than n²/8 connections.
    pub fn for_graph(graph: &Graph) -> Self {
        let n = graph.num_vertices();
        if graph.num_links() * 8 < n * n {
            PathAlgorithm::Dijkstra
        } else {
            PathAlgorithm::FloydWarshall
        }
    }
}

/// Precomputed minimum travel cost and predecessor data for every vertex pair.
///
/// Built once, read-only afterward; safe to share across threads.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::{Graph, ShortestPathIndex};
///
/// let mut g = Graph::new(3);
/// g.add_edge(1, 2, 5.0).unwrap();
/// g.add_edge(2, 3, 5.0).unwrap();
/// g.add_edge(1, 3, 20.0).unwrap();
///
/// let index = ShortestPathIndex::build(&g).unwrap();
/// let (cost, path) = index.query(1, 3).unwrap();
/// assert_eq!(cost, 10.0);
/// assert_eq!(path, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct ShortestPathIndex {
    dist: DistanceMatrix,
    pred: Vec<usize>,
    size: usize,
}

impl ShortestPathIndex {
    /// Builds the index with the strategy suited to the graph density.
    pub fn build(graph: &Graph) -> Result<Self> {
        Self::build_with(graph, PathAlgorithm::for_graph(graph))
    }

    /// Builds the index with an explicit strategy.
    pub fn build_with(graph: &Graph, algorithm: PathAlgorithm) -> Result<Self> {
        let index = match algorithm {
            PathAlgorithm::FloydWarshall => floyd_warshall(graph),
            PathAlgorithm::Dijkstra => dijkstra_all(graph),
        };
        index.validate()?;
        debug!(vertices = index.size, ?algorithm, "shortest-path index built");
        Ok(index)
    }

    /// Number of vertices covered by the index.
    pub fn num_vertices(&self) -> usize {
        self.size
    }

    /// Minimum travel cost from `u` to `v`.
    ///
    /// `f64::INFINITY` when `v` is unreachable or either vertex is unknown.
    pub fn cost(&self, u: VertexId, v: VertexId) -> f64 {
        match (self.index(u), self.index(v)) {
            (Some(i), Some(j)) => self.dist.get(i, j),
            _ => f64::INFINITY,
        }
    }

    /// Returns `true` if a finite-cost path `u → v` exists.
    pub fn is_reachable(&self, u: VertexId, v: VertexId) -> bool {
        self.cost(u, v).is_finite()
    }

    /// Minimum cost and vertex path `u → … → v` (both endpoints included).
    ///
    /// Unreachable targets yield `(f64::INFINITY, vec![])`.
    pub fn query(&self, u: VertexId, v: VertexId) -> Result<(f64, Vec<VertexId>)> {
        let cost = self.cost_checked(u, v)?;
        if cost.is_infinite() {
            return Ok((cost, Vec::new()));
        }
        Ok((cost, self.path(u, v)?))
    }

    /// Vertex path `u → … → v`; empty when unreachable.
    pub fn path(&self, u: VertexId, v: VertexId) -> Result<Vec<VertexId>> {
        let i = self.index(u).ok_or(RoutingError::UnknownVertex(u))?;
        let j = self.index(v).ok_or(RoutingError::UnknownVertex(v))?;
        if self.dist.get(i, j).is_infinite() {
            return Ok(Vec::new());
        }

        let mut path = vec![v];
        let mut current = j;
        let mut steps = 0;
        while current != i {
            let p = self.pred[i * self.size + current];
            steps += 1;
            if p == NO_PRED || steps > self.size {
                return Err(RoutingError::BrokenPredecessorChain { from: u, to: v });
            }
            path.push(p + 1);
            current = p;
        }
        path.reverse();
        Ok(path)
    }

    fn cost_checked(&self, u: VertexId, v: VertexId) -> Result<f64> {
        let i = self.index(u).ok_or(RoutingError::UnknownVertex(u))?;
        let j = self.index(v).ok_or(RoutingError::UnknownVertex(v))?;
        Ok(self.dist.get(i, j))
    }

    fn index(&self, v: VertexId) -> Option<usize> {
        if v >= 1 && v <= self.size {
            Some(v - 1)
        } else {
            None
        }
    }

    /// Checks that every reachable pair's predecessor chain ends at its source.
    ///
    /// Each tree is walked once per source, so the check is O(n²).
    fn validate(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unseen,
            OnStack,
            Rooted,
        }

        let n = self.size;
        let mut marks = vec![Mark::Unseen; n];
        let mut stack = Vec::new();

        for s in 0..n {
            marks.iter_mut().for_each(|m| *m = Mark::Unseen);
            marks[s] = Mark::Rooted;

            for t in 0..n {
                if marks[t] != Mark::Unseen || self.dist.get(s, t).is_infinite() {
                    continue;
                }
                stack.clear();
                let mut current = t;
                loop {
                    match marks[current] {
                        Mark::Rooted => break,
                        Mark::OnStack => {
                            return Err(RoutingError::BrokenPredecessorChain {
                                from: s + 1,
                                to: t + 1,
                            });
                        }
                        Mark::Unseen => {}
                    }
                    marks[current] = Mark::OnStack;
                    stack.push(current);
                    let p = self.pred[s * n + current];
                    if p == NO_PRED {
                        return Err(RoutingError::BrokenPredecessorChain {
                            from: s + 1,
                            to: t + 1,
                        });
                    }
                    current = p;
                }
                for &v in &stack {
                    marks[v] = Mark::Rooted;
                }
            }
        }
        Ok(())
    }
}

fn floyd_warshall(graph: &Graph) -> ShortestPathIndex {
    let n = graph.num_vertices();
    let mut dist = DistanceMatrix::filled(n, f64::INFINITY);
    let mut pred = vec![NO_PRED; n * n];

    for i in 0..n {
        dist.set(i, i, 0.0);
        for &(head, cost) in graph.neighbors(i + 1) {
            let j = head - 1;
            // Parallel connections collapse to the cheapest.
            if i != j && cost < dist.get(i, j) {
                dist.set(i, j, cost);
                pred[i * n + j] = i;
            }
        }
    }

    for k in 0..n {
        for i in 0..n {
            let d_ik = dist.get(i, k);
            if d_ik.is_infinite() {
                continue;
            }
            for j in 0..n {
                let candidate = d_ik + dist.get(k, j);
                if candidate < dist.get(i, j) {
                    dist.set(i, j, candidate);
                    pred[i * n + j] = pred[k * n + j];
                }
            }
        }
    }

    ShortestPathIndex {
        dist,
        pred,
        size: n,
    }
}

/// Heap entry ordered so that `BinaryHeap` pops the cheapest first.
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    cost: f64,
    vertex: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

fn dijkstra_row(graph: &Graph, source: usize) -> (Vec<f64>, Vec<usize>) {
    let n = graph.num_vertices();
    let mut dist = vec![f64::INFINITY; n];
    let mut pred = vec![NO_PRED; n];
    let mut heap = BinaryHeap::new();

    dist[source] = 0.0;
    heap.push(HeapEntry {
        cost: 0.0,
        vertex: source,
    });

    while let Some(HeapEntry { cost, vertex }) = heap.pop() {
        if cost > dist[vertex] {
            continue;
        }
        for &(head, weight) in graph.neighbors(vertex + 1) {
            let next = head - 1;
            let candidate = cost + weight;
            if candidate < dist[next] {
                dist[next] = candidate;
                pred[next] = vertex;
                heap.push(HeapEntry {
                    cost: candidate,
                    vertex: next,
                });
            }
        }
    }

    (dist, pred)
}

fn dijkstra_all(graph: &Graph) -> ShortestPathIndex {
    let n = graph.num_vertices();
    let rows: Vec<(Vec<f64>, Vec<usize>)> = (0..n)
        .into_par_iter()
        .map(|s| dijkstra_row(graph, s))
        .collect();

    let mut dist = DistanceMatrix::filled(n, f64::INFINITY);
    let mut pred = Vec::with_capacity(n * n);
    for (s, (row_dist, row_pred)) in rows.into_iter().enumerate() {
        for (t, d) in row_dist.into_iter().enumerate() {
            dist.set(s, t, d);
        }
        pred.extend(row_pred);
    }

    ShortestPathIndex {
        dist,
        pred,
        size: n,
    }
}
