//! Constructive heuristics for building initial arc routing solutions.
//!
//! - [`path_scanning`] — Greedy nearest-feasible-service construction, O(n²)
//! - [`path_scanning_restricted`] / [`path_scanning_seeded`] — Same, over a
//!   subset of services, with lowest-id or random tie-breaking
//! - [`multi_start_path_scanning`] — Parallel independent attempts, best kept
//! - [`greedy_fill`] — Capacity-greedy cut of a given service order

mod greedy_fill;
mod multi_start;
mod path_scanning;

pub use greedy_fill::{greedy_fill, random_greedy_fill};
pub use multi_start::{multi_start_path_scanning, MultiStartConfig};
pub use path_scanning::{path_scanning, path_scanning_restricted, path_scanning_seeded};
