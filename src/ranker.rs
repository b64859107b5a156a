use crate::error::ConfigurationError;
use crate::solution::Solution;

/// The best solutions of a run, best first, at most `keep_best` of them.
#[derive(Debug, Clone)]
pub struct SolutionRanker {
    keep_best: usize,
    solutions: Vec<Solution>,
}

impl SolutionRanker {
    pub fn new(keep_best: usize) -> Result<SolutionRanker, ConfigurationError> {
        if keep_best == 0 {
            return Err(ConfigurationError::ZeroKeepBest);
        }
        Ok(SolutionRanker { keep_best, solutions: Vec::with_capacity(keep_best + 1) })
    }

    /// Returns the position the solution was ranked at, or `None` if it did not
    /// make the list.
    pub fn insert(&mut self, solution: Solution) -> Option<usize> {
        match self.solutions.iter().position(|ranked| solution.is_better_than(ranked)) {
            Some(position) => {
                self.solutions.insert(position, solution);
                self.solutions.truncate(self.keep_best);
                Some(position)
            }
            None if self.solutions.len() < self.keep_best => {
                self.solutions.push(solution);
                Some(self.solutions.len() - 1)
            }
            None => None,
        }
    }

    pub fn keep_best(&self) -> usize {
        self.keep_best
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn best(&self) -> Option<&Solution> {
        self.solutions.first()
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn into_solutions(self) -> Vec<Solution> {
        self.solutions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Clustering;
    use crate::model::table::RoleMatrix;
    use crate::session::Allocation;
    use crate::solution::Statistics;
    use rand::Rng;

    fn solution(index: usize, mean: f64, minimum: f64) -> Solution {
        let allocation = Allocation {
            clustering: Clustering::contiguous(2, 1),
            matrix: RoleMatrix::new(1, 2),
        };
        let mut solution = Solution::new(index, allocation);
        solution.record_evaluation(
            vec![minimum],
            Statistics { mean, minimum, std_deviation: 0.0, target_value: 0.0 },
        );
        solution
    }

    #[test]
    fn test_keeps_best_first() {
        let mut ranker = SolutionRanker::new(3).unwrap();
        assert_eq!(ranker.insert(solution(0, 0.50, 0.2)), Some(0));
        assert_eq!(ranker.insert(solution(1, 0.70, 0.2)), Some(0));
        assert_eq!(ranker.insert(solution(2, 0.60, 0.2)), Some(1));
        assert_eq!(ranker.insert(solution(3, 0.40, 0.2)), None);
        assert_eq!(ranker.insert(solution(4, 0.60, 0.3)), Some(1));

        let order: Vec<usize> = ranker.solutions().iter().map(Solution::index).collect();
        assert_eq!(order, vec![1, 4, 2]);
        assert_eq!(ranker.best().map(Solution::index), Some(1));
    }

    #[test]
    fn test_mean_compared_to_three_decimals() {
        let mut ranker = SolutionRanker::new(2).unwrap();
        ranker.insert(solution(0, 0.5004, 0.1));
        assert_eq!(ranker.insert(solution(1, 0.5001, 0.2)), Some(0));
    }

    #[test]
    fn test_bounded_and_sorted() {
        let mut rng = crate::anneal::seeded_rng(61);
        let mut ranker = SolutionRanker::new(5).unwrap();
        for index in 0..200 {
            ranker.insert(solution(index, rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)));
            assert!(ranker.len() <= 5);
            for pair in ranker.solutions().windows(2) {
                assert!(!pair[1].is_better_than(&pair[0]));
            }
        }
        assert_eq!(ranker.len(), 5);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        assert_eq!(SolutionRanker::new(0).unwrap_err(), ConfigurationError::ZeroKeepBest);
    }
}
