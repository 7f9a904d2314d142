//! Domain model types for arc routing problems.
//!
//! Provides the core abstractions: required services and their catalog,
//! routes as depot-to-depot visit lists, solutions with violation checks,
//! lightweight route plans for the metaheuristics, and the problem instance
//! that ties everything together.

mod catalog;
mod plan;
mod problem;
mod route;
mod service;
mod solution;

pub use catalog::ServiceCatalog;
pub use plan::RoutePlan;
pub use problem::ArcRoutingProblem;
pub use route::{Route, Visit};
pub use service::{Demand, Service, ServiceId, ServiceKind};
pub use solution::{Solution, Violation, ViolationType};
