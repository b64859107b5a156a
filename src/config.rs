use crate::anneal::Acceptance;
use crate::roles::{BacktrackingAssigner, RoleStrategy};

/// Tuning of the search engine, fixed for the lifetime of a [`Solver`](crate::solver::Solver).
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Weight of the standard deviation of per-person rank sums in the target value.
    pub balancing_weight: f64,
    pub cluster_acceptance: Acceptance,
    pub assignment_acceptance: Acceptance,
    /// The clustering budget is `topics² × cluster_tries_per_topic_pair`.
    pub cluster_tries_per_topic_pair: usize,
    pub max_backtrack_steps: usize,
    pub role_strategy: RoleStrategy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            balancing_weight: 20.0,
            cluster_acceptance: Acceptance::CLUSTERING,
            assignment_acceptance: Acceptance::ASSIGNMENT,
            cluster_tries_per_topic_pair: 100,
            max_backtrack_steps: BacktrackingAssigner::DEFAULT_MAX_STEPS,
            role_strategy: RoleStrategy::default(),
        }
    }
}

impl SolverConfig {
    pub fn with_balancing_weight(mut self, weight: f64) -> Self {
        self.balancing_weight = weight.max(0.0);
        self
    }

    pub fn with_cluster_acceptance(mut self, acceptance: Acceptance) -> Self {
        self.cluster_acceptance = acceptance;
        self
    }

    pub fn with_assignment_acceptance(mut self, acceptance: Acceptance) -> Self {
        self.assignment_acceptance = acceptance;
        self
    }

    pub fn with_cluster_tries_per_topic_pair(mut self, tries: usize) -> Self {
        self.cluster_tries_per_topic_pair = tries;
        self
    }

    pub fn with_max_backtrack_steps(mut self, steps: usize) -> Self {
        self.max_backtrack_steps = steps;
        self
    }

    pub fn with_role_strategy(mut self, strategy: RoleStrategy) -> Self {
        self.role_strategy = strategy;
        self
    }

    pub fn cluster_tries(&self, topics: usize) -> usize {
        topics * topics * self.cluster_tries_per_topic_pair
    }
}

/// Budget of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParameters {
    pub cluster_attempts: usize,
    pub assignment_attempts: usize,
    pub max_annealing_tries: usize,
    pub keep_best: usize,
    /// `None` draws fresh entropy for every attempt.
    pub seed: Option<u64>,
}

impl RunParameters {
    pub fn new(
        cluster_attempts: usize,
        assignment_attempts: usize,
        max_annealing_tries: usize,
        keep_best: usize,
    ) -> RunParameters {
        RunParameters {
            cluster_attempts,
            assignment_attempts,
            max_annealing_tries,
            keep_best,
            seed: Some(0),
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn total(&self) -> usize {
        self.cluster_attempts * self.assignment_attempts
    }

    fn derive(&self, value: u64) -> u64 {
        match self.seed {
            None => 0,
            Some(base) => base.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(value).max(1),
        }
    }

    fn attempt(&self, cluster_attempt: usize, assignment_attempt: usize) -> u64 {
        (cluster_attempt * self.assignment_attempts + assignment_attempt) as u64
    }

    pub fn cluster_seed(&self, cluster_attempt: usize) -> u64 {
        self.derive(678 + 12345 * cluster_attempt as u64)
    }

    pub fn assignment_seed(&self, cluster_attempt: usize, assignment_attempt: usize) -> u64 {
        self.derive(8812 + 4711 * self.attempt(cluster_attempt, assignment_attempt))
    }

    pub fn role_seed(&self, cluster_attempt: usize, assignment_attempt: usize) -> u64 {
        self.derive(0x5DEE_CE66 ^ (31 + 7919 * self.attempt(cluster_attempt, assignment_attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seeds_match_fixed_schedule() {
        let params = RunParameters::new(3, 4, 100, 5);
        assert_eq!(params.cluster_seed(0), 678);
        assert_eq!(params.cluster_seed(2), 678 + 2 * 12345);
        assert_eq!(params.assignment_seed(1, 2), 8812 + 6 * 4711);
        assert_eq!(params.total(), 12);
    }

    #[test]
    fn test_seeds_distinct_per_attempt() {
        let params = RunParameters::new(3, 3, 100, 5).with_seed(Some(42));
        let mut seeds: Vec<u64> = (0..3)
            .flat_map(|c| (0..3).map(move |a| (c, a)))
            .map(|(c, a)| params.assignment_seed(c, a))
            .collect();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 9);
        assert!(seeds.iter().all(|&seed| seed != 0));
    }

    #[test]
    fn test_entropy_seeds() {
        let params = RunParameters::new(1, 1, 10, 1).with_seed(None);
        assert_eq!(params.cluster_seed(0), 0);
        assert_eq!(params.role_seed(0, 0), 0);
    }

    #[test]
    fn test_builders() {
        let config = SolverConfig::default()
            .with_balancing_weight(-3.0)
            .with_max_backtrack_steps(7)
            .with_role_strategy(RoleStrategy::Backtracking);
        assert_eq!(config.balancing_weight, 0.0);
        assert_eq!(config.max_backtrack_steps, 7);
        assert_eq!(config.role_strategy, RoleStrategy::Backtracking);
        assert_eq!(config.cluster_tries(4), 1_600);
    }
}
