//! Generational memetic search over route plans.
//!
//! # Algorithm
//!
//! 1. Initial population: the seed plan, ⌊P/4⌋ Path-Scanning plans with
//!    random tie-breaks, then shuffled greedy-fill plans up to P.
//! 2. Each generation:
//!    - every K generations, improve the best ⌈P/4⌉ finite individuals with
//!      local search (in parallel);
//!    - evaluate the population (in parallel) and snapshot the best-ever;
//!    - next generation = ⌊P/5⌋ finite elites + children from two
//!      tournaments, route crossover and, with probability r, mutation.
//! 3. Stop after G generations or when the time limit is reached.
//!
//! Every parallel task owns its data and the join completes before
//! selection, so runs are reproducible for a given seed.

use std::time::{Duration, Instant};

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use u_metaheur::ga::Individual;

use crate::constructive::{path_scanning_seeded, random_greedy_fill};
use crate::evaluation::RouteEvaluator;
use crate::local_search::{LocalSearch, LocalSearchConfig};
use crate::models::{ArcRoutingProblem, RoutePlan};

use super::chromosome::by_fitness;
use super::crossover::route_crossover;
use super::mutation::mutate;

/// Configuration for [`GeneticSearch`].
///
/// # Examples
///
/// ```
/// use u_arc_routing::ga::GeneticConfig;
///
/// let config = GeneticConfig::default()
///     .with_population_size(20)
///     .with_generations(50)
///     .with_seed(7);
/// assert_eq!(config.population_size, 20);
/// assert_eq!(config.tournament_size, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// Population size P.
    pub population_size: usize,
    /// Generation budget G.
    pub generations: usize,
    /// Tournament size T.
    pub tournament_size: usize,
    /// Probability r that a child is mutated.
    pub mutation_rate: f64,
    /// Memetic improvement runs every K generations (0 disables it).
    pub memetic_interval: usize,
    /// Share of the population improved by local search.
    pub memetic_fraction: f64,
    /// Share of the population copied unchanged into the next generation.
    pub elite_fraction: f64,
    /// Share of the initial population built by Path-Scanning.
    pub constructive_fraction: f64,
    /// Local search settings for memetic improvement.
    pub local_search: LocalSearchConfig,
    /// RNG seed.
    pub seed: u64,
    /// Optional wall-clock budget, checked between generations.
    pub time_limit: Option<Duration>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            generations: 300,
            tournament_size: 5,
            mutation_rate: 0.4,
            memetic_interval: 10,
            memetic_fraction: 0.25,
            elite_fraction: 0.2,
            constructive_fraction: 0.25,
            local_search: LocalSearchConfig::default(),
            seed: 42,
            time_limit: None,
        }
    }
}

impl GeneticConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    /// Sets the generation budget.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, tournament_size: usize) -> Self {
        self.tournament_size = tournament_size;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = mutation_rate;
        self
    }

    /// Sets the memetic interval.
    pub fn with_memetic_interval(mut self, memetic_interval: usize) -> Self {
        self.memetic_interval = memetic_interval;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }
}

/// Result of a genetic run.
#[derive(Debug, Clone)]
pub struct GeneticOutcome {
    /// Best plan ever seen.
    pub best: RoutePlan,
    /// Its cost.
    pub best_cost: f64,
    /// Generations completed.
    pub generations: usize,
    /// Best-ever cost after initialisation and after each generation.
    pub history: Vec<f64>,
}

/// Memetic genetic algorithm over [`RoutePlan`]s.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, ServiceCatalog};
/// use u_arc_routing::constructive::path_scanning_restricted;
/// use u_arc_routing::ga::{GeneticConfig, GeneticSearch};
///
/// let mut graph = Graph::new(5);
/// for v in 2..=5 {
///     graph.add_edge(1, v, 1.0).unwrap();
/// }
/// let mut catalog = ServiceCatalog::new();
/// for v in 2..=5 {
///     catalog.register_node(v, 3, 0.0).unwrap();
/// }
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 6).unwrap();
///
/// let seed = path_scanning_restricted(&problem, &problem.servable_ids());
/// let config = GeneticConfig::default().with_population_size(10).with_generations(5);
/// let outcome = GeneticSearch::new(&problem, config).run(Some(&seed));
/// assert!(outcome.best_cost <= seed.cost() + 1e-10);
/// assert_eq!(outcome.best.num_services(), 4);
/// ```
pub struct GeneticSearch<'a> {
    problem: &'a ArcRoutingProblem,
    evaluator: RouteEvaluator<'a>,
    local_search: LocalSearch<'a>,
    config: GeneticConfig,
}

impl<'a> GeneticSearch<'a> {
    /// Creates a search over `problem`.
    pub fn new(problem: &'a ArcRoutingProblem, config: GeneticConfig) -> Self {
        Self {
            problem,
            evaluator: RouteEvaluator::new(problem),
            local_search: LocalSearch::with_config(problem, &config.local_search),
            config,
        }
    }

    /// Runs the search, optionally seeding the population with `seed`.
    pub fn run(&self, seed: Option<&RoutePlan>) -> GeneticOutcome {
        let start = Instant::now();
        let mut rng = u_numflow::random::create_rng(self.config.seed);
        let size = self.config.population_size.max(2);

        let mut population = self.initial_population(seed, size, &mut rng);
        self.evaluate_population(&mut population);

        let mut best = population
            .iter()
            .min_by(|a, b| by_fitness(a, b))
            .cloned()
            .unwrap_or_else(|| RoutePlan::new(Vec::new()));
        let mut history = vec![best.fitness()];
        info!(population = size, cost = best.fitness(), "genetic search started");

        let mut generation = 0;
        while generation < self.config.generations {
            if self.config.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                debug!(generation, "genetic search hit its time limit");
                break;
            }

            let interval = self.config.memetic_interval;
            if interval > 0 && generation % interval == 0 {
                self.memetic_step(&mut population, size);
            }
            self.evaluate_population(&mut population);
            population.sort_by(by_fitness);

            if population[0].fitness() < best.fitness() - 1e-10 {
                best = population[0].clone();
                debug!(generation = generation + 1, cost = best.fitness(), "new best plan");
            }
            history.push(best.fitness());

            population = self.next_generation(&population, size, &mut rng);
            generation += 1;
        }

        self.evaluate_population(&mut population);
        if let Some(last) = population.iter().min_by(|a, b| by_fitness(a, b)) {
            if last.fitness() < best.fitness() - 1e-10 {
                best = last.clone();
                if let Some(h) = history.last_mut() {
                    *h = best.fitness();
                }
            }
        }

        info!(generations = generation, cost = best.fitness(), "genetic search finished");
        GeneticOutcome {
            best_cost: best.fitness(),
            best,
            generations: generation,
            history,
        }
    }

    fn initial_population<R: Rng>(
        &self,
        seed: Option<&RoutePlan>,
        size: usize,
        rng: &mut R,
    ) -> Vec<RoutePlan> {
        let ids = self.problem.servable_ids();
        let mut population = Vec::with_capacity(size);
        if let Some(seed) = seed {
            population.push(seed.clone());
        }

        let constructive = (size as f64 * self.config.constructive_fraction) as usize;
        for _ in 0..constructive {
            if population.len() >= size {
                break;
            }
            population.push(path_scanning_seeded(self.problem, &ids, rng));
        }
        while population.len() < size {
            population.push(random_greedy_fill(self.problem, rng));
        }
        population
    }

    fn evaluate_population(&self, population: &mut [RoutePlan]) {
        let evaluator = self.evaluator;
        population.par_iter_mut().for_each(|plan| {
            evaluator.evaluate(plan);
        });
    }

    /// Improves the best finite individuals in place.
    fn memetic_step(&self, population: &mut [RoutePlan], size: usize) {
        population.sort_by(by_fitness);
        let count = ((size as f64 * self.config.memetic_fraction).ceil() as usize).min(population.len());
        let local_search = &self.local_search;
        population[..count]
            .par_iter_mut()
            .filter(|plan| plan.fitness().is_finite())
            .for_each(|plan| *plan = local_search.improve(plan));
    }

    /// Builds the next generation from a population sorted by fitness.
    fn next_generation<R: Rng>(
        &self,
        population: &[RoutePlan],
        size: usize,
        rng: &mut R,
    ) -> Vec<RoutePlan> {
        let elite = (size as f64 * self.config.elite_fraction) as usize;
        let mut next: Vec<RoutePlan> = population
            .iter()
            .take(elite)
            .filter(|plan| plan.fitness().is_finite())
            .cloned()
            .collect();

        while next.len() < size {
            let p1 = self.tournament(population, rng);
            let p2 = self.tournament(population, rng);
            let mut child = route_crossover(&population[p1], &population[p2], &self.evaluator);
            if rng.random_bool(self.config.mutation_rate.clamp(0.0, 1.0)) {
                mutate(&mut child, &self.evaluator, rng);
            }
            next.push(child);
        }
        next
    }

    /// Index of the fittest of `tournament_size` distinct random individuals.
    fn tournament<R: Rng>(&self, population: &[RoutePlan], rng: &mut R) -> usize {
        let k = self.config.tournament_size.clamp(1, population.len());
        rand::seq::index::sample(rng, population.len(), k)
            .into_iter()
            .min_by(|&a, &b| by_fitness(&population[a], &population[b]).then(a.cmp(&b)))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructive::path_scanning_restricted;
    use crate::distance::Graph;
    use crate::models::ServiceCatalog;

    /// Two rings around depot 1 with edge services on every ring edge.
    fn double_ring() -> ArcRoutingProblem {
        let mut g = Graph::new(7);
        for (u, v) in [(1, 2), (2, 3), (3, 4), (4, 1), (1, 5), (5, 6), (6, 7), (7, 1)] {
            g.add_edge(u, v, 2.0).expect("valid");
        }
        let mut c = ServiceCatalog::new();
        for (u, v) in [(1, 2), (2, 3), (3, 4), (4, 1), (1, 5), (5, 6), (6, 7), (7, 1)] {
            c.register_edge(u, v, 2, 2.0).expect("valid");
        }
        ArcRoutingProblem::from_graph(&g, c, 1, 8).expect("valid")
    }

    fn small_config() -> GeneticConfig {
        GeneticConfig::default()
            .with_population_size(12)
            .with_generations(15)
            .with_memetic_interval(5)
            .with_seed(3)
    }

    #[test]
    fn test_history_is_non_increasing() {
        let p = double_ring();
        let outcome = GeneticSearch::new(&p, small_config()).run(None);
        assert_eq!(outcome.history.len(), outcome.generations + 1);
        for w in outcome.history.windows(2) {
            assert!(w[1] <= w[0] + 1e-10);
        }
        assert!((outcome.best_cost - outcome.history[outcome.history.len() - 1]).abs() < 1e-10);
    }

    #[test]
    fn test_best_covers_and_fits() {
        let p = double_ring();
        let eval = RouteEvaluator::new(&p);
        let outcome = GeneticSearch::new(&p, small_config()).run(None);
        let mut ids: Vec<usize> = outcome.best.routes().iter().flatten().copied().collect();
        ids.sort_unstable();
        assert_eq!(ids, p.servable_ids());
        for r in outcome.best.routes() {
            assert!(eval.is_feasible(r));
        }
        assert!((eval.plan_cost(&outcome.best) - outcome.best_cost).abs() < 1e-10);
    }

    #[test]
    fn test_never_worse_than_seed() {
        let p = double_ring();
        let seed = path_scanning_restricted(&p, &p.servable_ids());
        let outcome = GeneticSearch::new(&p, small_config()).run(Some(&seed));
        assert!(outcome.best_cost <= seed.cost() + 1e-10);
    }

    #[test]
    fn test_reproducible_for_seed() {
        let p = double_ring();
        let a = GeneticSearch::new(&p, small_config()).run(None);
        let b = GeneticSearch::new(&p, small_config()).run(None);
        assert_eq!(a.best.routes(), b.best.routes());
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_zero_generations() {
        let p = double_ring();
        let config = small_config().with_generations(0);
        let outcome = GeneticSearch::new(&p, config).run(None);
        assert_eq!(outcome.generations, 0);
        assert_eq!(outcome.history.len(), 1);
        assert!(outcome.best_cost.is_finite());
    }
}
