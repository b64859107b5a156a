use rand::Rng;

use crate::action::{AttendanceSwap, Seat};
use crate::anneal::{self, Acceptance, Landscape, Params};
use crate::cluster::Clustering;
use crate::evaluate::target_value;
use crate::model::condition::{Dimensions, Score};
use crate::model::entity::{GroupId, PersonId, TopicId};
use crate::model::table::{Cell, RoleMatrix};
use crate::preference::PreferenceModel;

/// A topic clustering with one attended topic per person and group. Cells of
/// a fresh allocation are attended but still wait for a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub clustering: Clustering,
    pub matrix: RoleMatrix,
}

struct Attendance<'a> {
    preferences: &'a PreferenceModel,
    balancing_weight: f64,
    persons: usize,
    group_count: usize,
    persons_per_topic: usize,
    /// Topic attended by each person in each group, `person * group_count + group`.
    seats: Vec<TopicId>,
    costs: Vec<usize>,
    best: Vec<TopicId>,
}

impl<'a> Attendance<'a> {
    /// Splits the persons evenly over each group's topics in ascending order.
    fn seed(
        dims: &Dimensions,
        preferences: &'a PreferenceModel,
        clustering: &Clustering,
        balancing_weight: f64,
    ) -> Attendance<'a> {
        let persons = dims.persons();
        let group_count = clustering.group_count();
        let persons_per_topic = dims.persons_per_topic();
        let groups = clustering.groups();
        let seats: Vec<TopicId> = (0..persons)
            .flat_map(|person| {
                groups.iter().map(move |members| members[person / persons_per_topic])
            })
            .collect();
        let costs = (0..persons)
            .map(|person| {
                seats[person * group_count..(person + 1) * group_count]
                    .iter()
                    .map(|&topic| preferences.rank(person, topic))
                    .sum()
            })
            .collect();
        Attendance {
            preferences,
            balancing_weight,
            persons,
            group_count,
            persons_per_topic,
            best: seats.clone(),
            seats,
            costs,
        }
    }

    fn seat(&self, person: PersonId, group: GroupId) -> TopicId {
        self.seats[person * self.group_count + group]
    }

    fn move_person(&mut self, person: PersonId, group: GroupId, from: TopicId, to: TopicId) {
        self.seats[person * self.group_count + group] = to;
        self.costs[person] = self.costs[person] - self.preferences.rank(person, from)
            + self.preferences.rank(person, to);
    }

    fn into_matrix(self, topics: usize) -> RoleMatrix {
        let mut matrix = RoleMatrix::new(self.persons, topics);
        for (index, &topic) in self.best.iter().enumerate() {
            matrix.set(index / self.group_count, topic, Cell::AttendingPendingRole);
        }
        matrix
    }
}

impl Landscape for Attendance<'_> {
    type Move = AttendanceSwap;

    fn energy(&self) -> Score {
        target_value(&self.costs, self.balancing_weight)
    }

    fn propose<R: Rng>(&mut self, rng: &mut R) -> Option<AttendanceSwap> {
        let partners = self.persons - self.persons_per_topic;
        if partners == 0 {
            return None;
        }
        let person = rng.gen_range(0..self.persons);
        let group = rng.gen_range(0..self.group_count);
        let topic = self.seat(person, group);
        let pick = rng.gen_range(0..partners);
        let other = (0..self.persons)
            .filter(|&other| self.seat(other, group) != topic)
            .nth(pick)?;
        Some(AttendanceSwap {
            group,
            first: Seat { person, topic },
            second: Seat { person: other, topic: self.seat(other, group) },
        })
    }

    fn apply(&mut self, swap: &AttendanceSwap) {
        let (first, second) = swap.traded();
        self.move_person(first.person, swap.group, swap.first.topic, first.topic);
        self.move_person(second.person, swap.group, swap.second.topic, second.topic);
    }

    fn revert(&mut self, swap: &AttendanceSwap) {
        let (first, second) = swap.traded();
        self.move_person(first.person, swap.group, first.topic, swap.first.topic);
        self.move_person(second.person, swap.group, second.topic, swap.second.topic);
    }

    fn record_best(&mut self) {
        self.best.copy_from_slice(&self.seats);
    }
}

/// Places every person into exactly one topic of each group.
#[derive(Debug, Clone, Copy)]
pub struct SessionAssigner<'a> {
    dims: &'a Dimensions,
    preferences: &'a PreferenceModel,
    balancing_weight: f64,
    acceptance: Acceptance,
}

impl<'a> SessionAssigner<'a> {
    pub fn new(
        dims: &'a Dimensions,
        preferences: &'a PreferenceModel,
        balancing_weight: f64,
        acceptance: Acceptance,
    ) -> SessionAssigner<'a> {
        SessionAssigner { dims, preferences, balancing_weight, acceptance }
    }

    /// Anneals the attendance for `clustering`, minimizing the summed preference
    /// rank plus the fairness penalty, and returns the best state seen.
    pub fn assign(&self, clustering: &Clustering, tries: usize, seed: u64) -> Allocation {
        let mut attendance =
            Attendance::seed(self.dims, self.preferences, clustering, self.balancing_weight);
        let mut rng = anneal::seeded_rng(seed);
        let params = Params { acceptance: self.acceptance, max_iterations: tries };
        let outcome = anneal::anneal(&mut attendance, &params, &mut rng);
        tracing::trace!(
            best = ?outcome.best,
            iterations = outcome.iterations,
            improvements = outcome.improvements,
            "person assignment annealed"
        );
        Allocation {
            clustering: clustering.clone(),
            matrix: attendance.into_matrix(self.dims.topics()),
        }
    }
}
