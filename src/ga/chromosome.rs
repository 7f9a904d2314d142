//! Route-set chromosome for arc routing genetic algorithms.
//!
//! Individuals are [`RoutePlan`]s used directly: the genotype is the list of
//! service sequences and the fitness is the cached total cost. Any route
//! over capacity makes the fitness `f64::INFINITY`; there is no penalty
//! relaxation.

use u_metaheur::ga::Individual;

use crate::models::RoutePlan;

impl Individual for RoutePlan {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.cost()
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.set_cost(fitness);
    }
}

/// Orders two plans by fitness, lowest first; NaN sorts last.
pub(crate) fn by_fitness(a: &RoutePlan, b: &RoutePlan) -> std::cmp::Ordering {
    a.fitness().total_cmp(&b.fitness())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_fitness_defaults_to_infinity() {
        let plan = RoutePlan::new(vec![vec![1, 2]]);
        assert_eq!(plan.fitness(), f64::INFINITY);
    }

    #[test]
    fn test_plan_set_fitness() {
        let mut plan = RoutePlan::new(vec![vec![1, 2, 3]]);
        plan.set_fitness(42.5);
        assert_eq!(plan.fitness(), 42.5);
        assert_eq!(plan.cost(), 42.5);
    }

    #[test]
    fn test_plan_clone_keeps_fitness() {
        let mut plan = RoutePlan::new(vec![vec![1], vec![2]]);
        plan.set_fitness(10.0);
        let cloned = plan.clone();
        assert_eq!(cloned.routes(), plan.routes());
        assert_eq!(cloned.fitness(), 10.0);
    }

    #[test]
    fn test_by_fitness_orders_infinity_last() {
        let mut a = RoutePlan::new(vec![]);
        a.set_fitness(5.0);
        let b = RoutePlan::new(vec![]);
        let mut plans = vec![b, a];
        plans.sort_by(by_fitness);
        assert_eq!(plans[0].fitness(), 5.0);
        assert!(plans[1].fitness().is_infinite());
    }
}
