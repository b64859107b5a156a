use crate::model::condition::{Dimensions, RoleQuotas, Score};
use crate::model::table::{Cell, RoleMatrix};
use crate::preference::PreferenceModel;
use crate::solution::{Solution, Statistics};

/// Summed per-person costs plus `weight` times their standard deviation.
pub fn target_value(costs: &[usize], weight: f64) -> Score {
    if costs.is_empty() {
        return 0.0;
    }
    let total: usize = costs.iter().sum();
    let mean = total as f64 / costs.len() as f64;
    let variance = costs
        .iter()
        .map(|&cost| (mean - cost as f64).powi(2))
        .sum::<f64>()
        / costs.len() as f64;
    total as f64 + weight * variance.sqrt()
}

/// Computes satisfaction statistics of finished role assignments.
///
/// Roles are compared as levels: role `r` is level `r` and not attending is
/// level `roles`. A person's ideal level for a topic follows from how highly
/// they rank it: the best-ranked share of attendees ideally receives role 0, the
/// next share role 1 and so on, by the per-session role maxima.
#[derive(Debug, Clone)]
pub struct SolutionEvaluator<'a> {
    dims: &'a Dimensions,
    preferences: &'a PreferenceModel,
    balancing_weight: f64,
    optimal_levels: Vec<usize>,
}

impl<'a> SolutionEvaluator<'a> {
    pub fn new(
        dims: &'a Dimensions,
        preferences: &'a PreferenceModel,
        quotas: &RoleQuotas,
        balancing_weight: f64,
    ) -> SolutionEvaluator<'a> {
        let mut optimal_levels: Vec<usize> = quotas
            .iter()
            .enumerate()
            .flat_map(|(role, limits)| std::iter::repeat(role).take(limits.max))
            .take(dims.persons_per_topic())
            .collect();
        optimal_levels.resize(dims.persons(), dims.roles());
        SolutionEvaluator { dims, preferences, balancing_weight, optimal_levels }
    }

    fn level(&self, cell: Cell) -> usize {
        cell.role().unwrap_or(self.dims.roles())
    }

    fn optimal_level(&self, person: usize, topic: usize) -> usize {
        let slot = self.preferences.rank(person, topic) * self.dims.persons() / self.dims.topics();
        self.optimal_levels[slot]
    }

    /// Per-person satisfaction and aggregate statistics of `matrix`.
    pub fn statistics(&self, matrix: &RoleMatrix) -> (Vec<f64>, Statistics) {
        let persons = self.dims.persons();
        let topics = self.dims.topics();
        let roles = self.dims.roles() as f64;

        let cells: Vec<f64> = (0..persons)
            .flat_map(|person| (0..topics).map(move |topic| (person, topic)))
            .map(|(person, topic)| {
                let actual = self.level(matrix.get(person, topic));
                let optimal = self.optimal_level(person, topic);
                1.0 - actual.abs_diff(optimal) as f64 / roles
            })
            .collect();

        let per_person: Vec<f64> = cells
            .chunks(topics)
            .map(|row| row.iter().sum::<f64>() / topics as f64)
            .collect();
        let minimum = per_person.iter().copied().fold(1.0, f64::min);
        let mean = cells.iter().sum::<f64>() / cells.len() as f64;
        let variance = cells.iter().map(|s| (mean - s).powi(2)).sum::<f64>() / cells.len() as f64;

        let costs: Vec<usize> = (0..persons)
            .map(|person| {
                matrix.topics_of(person).map(|topic| self.preferences.rank(person, topic)).sum()
            })
            .collect();

        let statistics = Statistics {
            mean,
            minimum,
            std_deviation: variance.sqrt(),
            target_value: target_value(&costs, self.balancing_weight),
        };
        (per_person, statistics)
    }

    /// Stores the statistics on `solution` and derives its display name.
    pub fn evaluate(&self, solution: &mut Solution) {
        let (per_person, statistics) = self.statistics(solution.matrix());
        solution.record_evaluation(per_person, statistics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Clustering;
    use crate::session::Allocation;

    fn solution_from(matrix: RoleMatrix, group_size: usize) -> Solution {
        let clustering = Clustering::contiguous(matrix.topics(), group_size);
        Solution::new(2, Allocation { clustering, matrix })
    }

    #[test]
    fn test_target_value() {
        assert_eq!(target_value(&[3, 3, 3], 20.0), 9.0);
        assert_eq!(target_value(&[1, 3], 10.0), 14.0);
        assert_eq!(target_value(&[], 10.0), 0.0);
    }

    #[test]
    fn test_everyone_in_ideal_role() {
        let dims = Dimensions::new(2, 2, 1, 1).unwrap();
        let preferences = PreferenceModel::new(2, 2);
        let quotas = RoleQuotas::uniform(&dims);
        let mut matrix = RoleMatrix::new(2, 2);
        for person in 0..2 {
            for topic in 0..2 {
                matrix.set(person, topic, Cell::AttendingWithRole(0));
            }
        }
        let mut solution = solution_from(matrix, 1);
        SolutionEvaluator::new(&dims, &preferences, &quotas, 20.0).evaluate(&mut solution);

        let statistics = solution.statistics();
        assert_eq!(statistics.mean, 1.0);
        assert_eq!(statistics.minimum, 1.0);
        assert_eq!(statistics.std_deviation, 0.0);
        assert_eq!(statistics.target_value, 2.0);
        assert_eq!(solution.name(), "Solution 3: 1.000 - 1.000 - 0.000");
    }

    #[test]
    fn test_missed_favourite_lowers_satisfaction() {
        let dims = Dimensions::new(4, 4, 1, 2).unwrap();
        let preferences = PreferenceModel::new(4, 4);
        let quotas = RoleQuotas::uniform(&dims);
        let mut matrix = RoleMatrix::new(4, 4);
        for (person, topics) in [(0, [0, 2]), (1, [0, 2]), (2, [1, 3]), (3, [1, 3])] {
            for topic in topics {
                matrix.set(person, topic, Cell::AttendingWithRole(0));
            }
        }
        let evaluator = SolutionEvaluator::new(&dims, &preferences, &quotas, 20.0);
        let (per_person, statistics) = evaluator.statistics(&matrix);

        // Ideal: role 0 for the two best-ranked topics, nothing for the rest.
        assert_eq!(per_person[0], 0.5);
        assert_eq!(per_person[2], 0.5);
        assert_eq!(statistics.minimum, 0.5);
        assert_eq!(statistics.mean, 0.5);
        assert_eq!(statistics.std_deviation, 0.5);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let dims = Dimensions::new(6, 6, 3, 2).unwrap();
        let mut preferences = PreferenceModel::new(6, 6);
        preferences.shuffle(&mut crate::anneal::seeded_rng(8), 12);
        let quotas = RoleQuotas::uniform(&dims);
        let mut matrix = RoleMatrix::new(6, 6);
        for person in 0..6 {
            for group in 0..3 {
                let topic = group * 2 + person / 3;
                matrix.set(person, topic, Cell::AttendingWithRole((person + group) % 3));
            }
        }
        let evaluator = SolutionEvaluator::new(&dims, &preferences, &quotas, 20.0);
        let mut solution = solution_from(matrix, 2);
        evaluator.evaluate(&mut solution);
        let first = solution.clone();
        evaluator.evaluate(&mut solution);
        assert_eq!(solution, first);
        assert!(solution.person_satisfactions().iter().all(|s| (0.0..=1.0).contains(s)));
    }
}
