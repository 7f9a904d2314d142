//! Ruin step: random removal of served services.
//!
//! # Reference
//!
//! Schrimpf, G., Schneider, J., Stamm-Wilbrandt, H. & Dueck, G. (2000).
//! "Record Breaking Optimization Results Using the Ruin and Recreate
//! Principle", *Journal of Computational Physics* 159(2), 139-171.

use rand::Rng;
use u_metaheur::alns::DestroyOperator;

use crate::models::{RoutePlan, ServiceId};

/// Removes `⌈degree · n⌉` randomly sampled served services (at least one).
///
/// Removed ids are appended to the plan's unassigned list in sampling
/// order, which is the order [`CheapestInsertion`](super::CheapestInsertion)
/// reinserts them in. Emptied routes are dropped and the cached cost is
/// invalidated.
///
/// # Examples
///
/// ```
/// use u_arc_routing::models::RoutePlan;
/// use u_arc_routing::ruin_recreate::RandomRemoval;
/// use u_metaheur::alns::DestroyOperator;
///
/// let plan = RoutePlan::new(vec![vec![1, 2, 3], vec![4, 5]]);
/// let mut rng = u_numflow::random::create_rng(42);
/// let ruined = RandomRemoval.destroy(&plan, 0.35, &mut rng);
/// assert_eq!(ruined.unassigned().len(), 2);
/// assert_eq!(ruined.num_services(), 3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRemoval;

impl RandomRemoval {
    /// Number of services removed from a plan serving `served` services.
    pub fn removal_count(served: usize, degree: f64) -> usize {
        if served == 0 {
            return 0;
        }
        ((served as f64 * degree.clamp(0.0, 1.0)).ceil() as usize).clamp(1, served)
    }
}

impl DestroyOperator<RoutePlan> for RandomRemoval {
    fn name(&self) -> &str {
        "random_removal"
    }

    fn destroy<R: Rng>(&self, solution: &RoutePlan, degree: f64, rng: &mut R) -> RoutePlan {
        let served: Vec<ServiceId> = solution.routes().iter().flatten().copied().collect();
        let count = Self::removal_count(served.len(), degree);

        let removed: Vec<ServiceId> = rand::seq::index::sample(rng, served.len(), count)
            .into_iter()
            .map(|i| served[i])
            .collect();

        let routes: Vec<Vec<ServiceId>> = solution
            .routes()
            .iter()
            .map(|route| {
                route
                    .iter()
                    .copied()
                    .filter(|id| !removed.contains(id))
                    .collect()
            })
            .collect();

        let mut unassigned = solution.unassigned().to_vec();
        unassigned.extend(removed);

        let mut ruined = RoutePlan::with_unassigned(routes, unassigned);
        ruined.drop_empty_routes();
        ruined
    }
}
