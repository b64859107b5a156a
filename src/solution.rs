use std::fmt;

use crate::cluster::Clustering;
use crate::model::condition::Score;
use crate::model::entity::{GroupId, PersonId, TopicId};
use crate::model::table::{Cell, RoleMatrix};
use crate::session::Allocation;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistics {
    pub mean: f64,
    pub minimum: f64,
    pub std_deviation: f64,
    /// Summed preference rank plus fairness penalty; lower is better.
    pub target_value: Score,
}

/// One complete clustering and role assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    index: usize,
    name: String,
    clustering: Clustering,
    matrix: RoleMatrix,
    person_satisfaction: Vec<f64>,
    statistics: Statistics,
}

impl Solution {
    pub fn new(index: usize, allocation: Allocation) -> Solution {
        Solution {
            index,
            name: format!("Solution {}", index + 1),
            clustering: allocation.clustering,
            matrix: allocation.matrix,
            person_satisfaction: Vec::new(),
            statistics: Statistics::default(),
        }
    }

    pub(crate) fn record_evaluation(&mut self, person_satisfaction: Vec<f64>, statistics: Statistics) {
        self.name = format!(
            "Solution {}: {:.3} - {:.3} - {:.3}",
            self.index + 1,
            statistics.mean,
            statistics.minimum,
            statistics.std_deviation
        );
        self.person_satisfaction = person_satisfaction;
        self.statistics = statistics;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clustering(&self) -> &Clustering {
        &self.clustering
    }

    pub fn matrix(&self) -> &RoleMatrix {
        &self.matrix
    }

    pub fn role(&self, person: PersonId, topic: TopicId) -> Cell {
        self.matrix.get(person, topic)
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn person_satisfaction(&self, person: PersonId) -> f64 {
        self.person_satisfaction[person]
    }

    pub fn person_satisfactions(&self) -> &[f64] {
        &self.person_satisfaction
    }

    pub fn group_count(&self) -> usize {
        self.clustering.group_count()
    }

    pub fn group_size(&self) -> usize {
        self.clustering.group_size()
    }

    pub fn group_element(&self, group: GroupId, index: usize) -> TopicId {
        self.clustering.members(group)[index]
    }

    pub fn topic_to_group(&self, topic: TopicId) -> GroupId {
        self.clustering.group_of(topic)
    }

    /// Higher mean satisfaction (to three decimals) wins, then higher minimum.
    pub fn is_better_than(&self, other: &Solution) -> bool {
        let mean = (self.statistics.mean * 1000.0) as i64;
        let other_mean = (other.statistics.mean * 1000.0) as i64;
        match mean.cmp(&other_mean) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => self.statistics.minimum > other.statistics.minimum,
        }
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for (group, members) in self.clustering.groups().iter().enumerate() {
            writeln!(f, "group {}: {:?}", group, members)?;
        }
        write!(f, "{}", self.matrix)?;
        for (person, satisfaction) in self.person_satisfaction.iter().enumerate() {
            writeln!(f, "P{:<4} {:.3}", person, satisfaction)?;
        }
        writeln!(
            f,
            "mean={:.3} min={:.3} stddev={:.3} target={:.1}",
            self.statistics.mean,
            self.statistics.minimum,
            self.statistics.std_deviation,
            self.statistics.target_value
        )
    }
}
