//! Memetic genetic algorithm for arc routing.
//!
//! - [`RoutePlan`](crate::models::RoutePlan) is the chromosome; it implements
//!   [`Individual`](u_metaheur::ga::Individual)
//! - [`route_crossover`] — Best-of-both route crossover
//! - [`mutate`] — One to three of six structural mutations
//! - [`GeneticSearch`] — Generational loop with elitism and periodic local search

mod chromosome;
mod crossover;
mod mutation;
mod search;

pub use crossover::route_crossover;
pub use mutation::{apply_mutation, mutate, MutationKind};
pub use search::{GeneticConfig, GeneticOutcome, GeneticSearch};
