//! Multi-mode mutation for route plans.
//!
//! Each call applies one to three operators drawn uniformly and
//! independently. An operator edits a copy of the affected routes and
//! commits only when every edited route is still feasible; otherwise it is a
//! no-op. Empty routes are dropped at the end.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constructive::path_scanning_restricted;
use crate::evaluation::RouteEvaluator;
use crate::models::{RoutePlan, ServiceId};

/// Mutation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    /// Exchange two services between two routes.
    Swap,
    /// Reverse a random sub-sequence of one route.
    Reverse,
    /// Move one service into a random position of another route.
    Relocate,
    /// Cut one route in two at its midpoint.
    Split,
    /// Concatenate two routes whose combined demand fits.
    Merge,
    /// Rebuild one route with Path-Scanning over its own services.
    Resequence,
}

impl MutationKind {
    /// Every operator, in draw order.
    pub const ALL: [MutationKind; 6] = [
        MutationKind::Swap,
        MutationKind::Reverse,
        MutationKind::Relocate,
        MutationKind::Split,
        MutationKind::Merge,
        MutationKind::Resequence,
    ];
}

/// Applies one to three random operators to `plan`.
///
/// Returns the number of operators that changed the plan. The plan is
/// re-evaluated afterwards.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, RoutePlan, ServiceCatalog};
/// use u_arc_routing::evaluation::RouteEvaluator;
/// use u_arc_routing::ga::mutate;
///
/// let mut graph = Graph::new(5);
/// for v in 2..=5 {
///     graph.add_edge(1, v, 1.0).unwrap();
/// }
/// let mut catalog = ServiceCatalog::new();
/// for v in 2..=5 {
///     catalog.register_node(v, 2, 0.0).unwrap();
/// }
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 6).unwrap();
/// let evaluator = RouteEvaluator::new(&problem);
///
/// let mut rng = u_numflow::random::create_rng(1);
/// let mut plan = RoutePlan::new(vec![vec![1, 2], vec![3, 4]]);
/// mutate(&mut plan, &evaluator, &mut rng);
/// assert_eq!(plan.num_services(), 4);
/// assert!(plan.cost().is_finite());
/// ```
pub fn mutate<R: Rng>(plan: &mut RoutePlan, evaluator: &RouteEvaluator, rng: &mut R) -> usize {
    let count = rng.random_range(1..=3);
    let mut applied = 0;
    for _ in 0..count {
        let kind = MutationKind::ALL[rng.random_range(0..MutationKind::ALL.len())];
        if apply_mutation(plan, kind, evaluator, rng) {
            applied += 1;
        }
    }
    plan.drop_empty_routes();
    evaluator.evaluate(plan);
    applied
}

/// Applies a single operator. Returns `true` if the plan changed.
///
/// The cached cost is invalidated on change but not recomputed.
pub fn apply_mutation<R: Rng>(
    plan: &mut RoutePlan,
    kind: MutationKind,
    evaluator: &RouteEvaluator,
    rng: &mut R,
) -> bool {
    let changed = match kind {
        MutationKind::Swap => swap(plan.routes_mut(), evaluator, rng),
        MutationKind::Reverse => reverse(plan.routes_mut(), evaluator, rng),
        MutationKind::Relocate => relocate(plan.routes_mut(), evaluator, rng),
        MutationKind::Split => split(plan.routes_mut(), rng),
        MutationKind::Merge => merge(plan.routes_mut(), evaluator, rng),
        MutationKind::Resequence => resequence(plan.routes_mut(), evaluator, rng),
    };
    if changed {
        plan.invalidate();
    }
    changed
}

/// Two distinct indices of non-empty routes, if there are at least two.
fn two_routes<R: Rng>(routes: &[Vec<ServiceId>], rng: &mut R) -> Option<(usize, usize)> {
    let candidates: Vec<usize> = (0..routes.len()).filter(|&i| !routes[i].is_empty()).collect();
    if candidates.len() < 2 {
        return None;
    }
    let a = rng.random_range(0..candidates.len());
    let mut b = rng.random_range(0..candidates.len() - 1);
    if b >= a {
        b += 1;
    }
    Some((candidates[a], candidates[b]))
}

fn swap<R: Rng>(routes: &mut [Vec<ServiceId>], evaluator: &RouteEvaluator, rng: &mut R) -> bool {
    let Some((a, b)) = two_routes(routes, rng) else {
        return false;
    };
    let pa = rng.random_range(0..routes[a].len());
    let pb = rng.random_range(0..routes[b].len());
    let (mut ra, mut rb) = (routes[a].clone(), routes[b].clone());
    std::mem::swap(&mut ra[pa], &mut rb[pb]);
    if !evaluator.is_feasible(&ra) || !evaluator.is_feasible(&rb) {
        return false;
    }
    routes[a] = ra;
    routes[b] = rb;
    true
}

fn reverse<R: Rng>(routes: &mut [Vec<ServiceId>], evaluator: &RouteEvaluator, rng: &mut R) -> bool {
    if routes.is_empty() {
        return false;
    }
    let r = rng.random_range(0..routes.len());
    let len = routes[r].len();
    if len < 2 {
        return false;
    }
    let i = rng.random_range(0..len - 1);
    let j = rng.random_range(i + 1..len);
    let mut candidate = routes[r].clone();
    candidate[i..=j].reverse();
    if !evaluator.is_feasible(&candidate) {
        return false;
    }
    routes[r] = candidate;
    true
}

fn relocate<R: Rng>(routes: &mut [Vec<ServiceId>], evaluator: &RouteEvaluator, rng: &mut R) -> bool {
    let Some((from, to)) = two_routes(routes, rng) else {
        return false;
    };
    let pos = rng.random_range(0..routes[from].len());
    let mut source = routes[from].clone();
    let id = source.remove(pos);
    let mut dest = routes[to].clone();
    let at = rng.random_range(0..=dest.len());
    dest.insert(at, id);
    if !evaluator.is_feasible(&dest) || !evaluator.is_feasible(&source) {
        return false;
    }
    routes[from] = source;
    routes[to] = dest;
    true
}

fn split<R: Rng>(routes: &mut Vec<Vec<ServiceId>>, rng: &mut R) -> bool {
    if routes.is_empty() {
        return false;
    }
    let r = rng.random_range(0..routes.len());
    if routes[r].len() < 2 {
        return false;
    }
    // halves never carry more demand than the whole route
    let mid = routes[r].len() / 2;
    let tail = routes[r].split_off(mid);
    routes.push(tail);
    true
}

fn merge<R: Rng>(routes: &mut Vec<Vec<ServiceId>>, evaluator: &RouteEvaluator, rng: &mut R) -> bool {
    let Some((a, b)) = two_routes(routes, rng) else {
        return false;
    };
    let mut combined = routes[a].clone();
    combined.extend_from_slice(&routes[b]);
    if !evaluator.is_feasible(&combined) {
        return false;
    }
    routes[a] = combined;
    routes.remove(b);
    true
}

fn resequence<R: Rng>(
    routes: &mut Vec<Vec<ServiceId>>,
    evaluator: &RouteEvaluator,
    rng: &mut R,
) -> bool {
    if routes.is_empty() {
        return false;
    }
    let r = rng.random_range(0..routes.len());
    if routes[r].len() < 2 {
        return false;
    }
    let rebuilt = path_scanning_restricted(evaluator.problem(), &routes[r]);
    match rebuilt.routes() {
        [single] if rebuilt.unassigned().is_empty() && single != &routes[r] => {
            routes[r] = single.clone();
            true
        }
        _ => false,
    }
}
