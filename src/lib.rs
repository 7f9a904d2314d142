//! # u-arc-routing
//!
//! Mixed capacitated arc routing (MCARP) on networks of required vertices,
//! edges and arcs served from a single depot by identical vehicles.
//!
//! ## Modules
//!
//! - [`distance`] — Mixed network, all-pairs shortest-path index
//! - [`models`] — Services, catalog, routes, solutions, route plans, problem
//! - [`evaluation`] — Full-replay route cost, demand and materialisation
//! - [`constructive`] — Path-Scanning (single, restricted, multi-start)
//! - [`local_search`] — 2-opt, relocate, swap and the round driver
//! - [`ga`] — Memetic genetic algorithm over route plans
//! - [`ruin_recreate`] — Random removal + cheapest insertion with greedy acceptance
//! - [`output`] — Route lines, solution documents, sequence parsing
//! - [`pipeline`] — All stages in sequence, best-ever kept
//!
//! ## Example
//!
//! ```
//! use u_arc_routing::distance::Graph;
//! use u_arc_routing::models::{ArcRoutingProblem, ServiceCatalog};
//! use u_arc_routing::constructive::path_scanning;
//! use u_arc_routing::local_search::LocalSearch;
//!
//! let mut graph = Graph::new(4);
//! graph.add_edge(1, 2, 2.0).unwrap();
//! graph.add_edge(2, 3, 1.0).unwrap();
//! graph.add_arc(3, 4, 1.0).unwrap();
//! graph.add_edge(4, 1, 2.0).unwrap();
//!
//! let mut catalog = ServiceCatalog::new();
//! catalog.register_edge(2, 3, 3, 1.0).unwrap();
//! catalog.register_arc(3, 4, 2, 1.0).unwrap();
//! catalog.register_node(4, 4, 0.0).unwrap();
//!
//! let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 10).unwrap();
//! let initial = path_scanning(&problem).unwrap();
//! let improved = LocalSearch::new(&problem).improve_solution(&initial).unwrap();
//! assert!(improved.validate(&problem).is_empty());
//! assert!(improved.total_cost() <= initial.total_cost());
//! ```

pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod local_search;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod ruin_recreate;

pub use error::{Result, RoutingError};
