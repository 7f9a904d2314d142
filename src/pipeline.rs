//! End-to-end solve: construction, local search, genetic search, then
//! ruin-and-recreate.
//!
//! Each stage starts from the best plan found so far and the pipeline keeps
//! the best-ever plan, so the reported cost never exceeds the cost after
//! construction.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constructive::{multi_start_path_scanning, MultiStartConfig};
use crate::error::Result;
use crate::evaluation::RouteEvaluator;
use crate::ga::{GeneticConfig, GeneticSearch};
use crate::local_search::{LocalSearch, LocalSearchConfig};
use crate::models::{ArcRoutingProblem, RoutePlan, Solution};
use crate::ruin_recreate::{RuinAndRecreate, RuinRecreateConfig};

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Multi-start Path-Scanning.
    Construction,
    /// 2-opt / relocate / swap descent.
    LocalSearch,
    /// Memetic genetic search.
    Genetic,
    /// Ruin-and-recreate.
    RuinRecreate,
}

/// Settings for every stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Construction settings.
    pub multi_start: MultiStartConfig,
    /// Local search settings.
    pub local_search: LocalSearchConfig,
    /// Genetic search settings.
    pub genetic: GeneticConfig,
    /// Ruin-and-recreate settings.
    pub ruin_recreate: RuinRecreateConfig,
}

/// Cost reached by one stage and the wall-clock time it took.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageCost {
    /// The stage.
    pub stage: Stage,
    /// Cost of the plan the stage returned.
    pub cost: f64,
    /// Time spent inside the stage.
    pub elapsed: Duration,
}

/// Result of [`solve`].
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Per-stage costs and timings in run order.
    pub stages: Vec<StageCost>,
    /// Stage that produced the best plan.
    pub best_stage: Stage,
    /// Best plan, materialised.
    pub solution: Solution,
}

impl PipelineReport {
    /// Total cost of the best solution.
    pub fn best_cost(&self) -> f64 {
        self.solution.total_cost()
    }

    /// Total time spent across all stages.
    pub fn total_elapsed(&self) -> Duration {
        self.stages.iter().map(|s| s.elapsed).sum()
    }

    /// Cost recorded for `stage`, if it ran.
    pub fn stage_cost(&self, stage: Stage) -> Option<f64> {
        self.stages.iter().find(|s| s.stage == stage).map(|s| s.cost)
    }
}

/// Runs all stages and returns the best-ever solution.
///
/// # Errors
///
/// Propagates errors from materialising the final routes; with a valid
/// [`ArcRoutingProblem`] this does not happen.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, ServiceCatalog};
/// use u_arc_routing::pipeline::{solve, PipelineConfig};
///
/// let mut graph = Graph::new(3);
/// graph.add_edge(1, 2, 1.0).unwrap();
/// graph.add_edge(2, 3, 1.0).unwrap();
/// let mut catalog = ServiceCatalog::new();
/// catalog.register_edge(1, 2, 2, 1.0).unwrap();
/// catalog.register_edge(2, 3, 2, 1.0).unwrap();
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 10).unwrap();
///
/// let mut config = PipelineConfig::default();
/// config.genetic = config.genetic.with_population_size(8).with_generations(5);
/// let report = solve(&problem, &config).unwrap();
/// assert_eq!(report.solution.num_routes(), 1);
/// assert!((report.best_cost() - 4.0).abs() < 1e-10);
/// ```
pub fn solve(problem: &ArcRoutingProblem, config: &PipelineConfig) -> Result<PipelineReport> {
    let evaluator = RouteEvaluator::new(problem);

    let started = Instant::now();
    let constructed = multi_start_path_scanning(problem, &config.multi_start);
    let mut tracker = BestTracker::new(constructed, Stage::Construction, started.elapsed());

    let started = Instant::now();
    let improved = LocalSearch::with_config(problem, &config.local_search).improve(tracker.best());
    tracker.offer(improved, Stage::LocalSearch, started.elapsed());

    let started = Instant::now();
    let genetic = GeneticSearch::new(problem, config.genetic.clone()).run(Some(tracker.best()));
    tracker.offer(genetic.best, Stage::Genetic, started.elapsed());

    let started = Instant::now();
    let recreated = RuinAndRecreate::new(problem, config.ruin_recreate.clone()).run(tracker.best());
    tracker.offer(recreated.best, Stage::RuinRecreate, started.elapsed());

    let BestTracker {
        best,
        stage: best_stage,
        stages,
    } = tracker;
    let solution = evaluator.build_solution(&best)?;
    info!(
        cost = solution.total_cost(),
        routes = solution.num_routes(),
        unassigned = solution.unassigned().len(),
        stage = ?best_stage,
        elapsed_ms = stages.iter().map(|s| s.elapsed).sum::<Duration>().as_millis(),
        "pipeline finished"
    );

    Ok(PipelineReport {
        stages,
        best_stage,
        solution,
    })
}

/// Keeps a snapshot of the cheapest plan and the stage that produced it.
struct BestTracker {
    best: RoutePlan,
    stage: Stage,
    stages: Vec<StageCost>,
}

impl BestTracker {
    fn new(plan: RoutePlan, stage: Stage, elapsed: Duration) -> Self {
        Self {
            stages: vec![StageCost {
                stage,
                cost: plan.cost(),
                elapsed,
            }],
            best: plan,
            stage,
        }
    }

    fn best(&self) -> &RoutePlan {
        &self.best
    }

    fn offer(&mut self, plan: RoutePlan, stage: Stage, elapsed: Duration) {
        self.stages.push(StageCost {
            stage,
            cost: plan.cost(),
            elapsed,
        });
        debug!(?stage, cost = plan.cost(), ?elapsed, "stage finished");
        if plan.cost() < self.best.cost() - 1e-10 {
            self.best = plan;
            self.stage = stage;
        }
    }
}
