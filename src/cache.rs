use crate::model::entity::{PersonId, RoleId, TopicId};
use crate::model::table::{Cell, RoleMatrix};

/// Occurrence counts of each role per topic and per person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTally {
    roles: usize,
    per_topic: Vec<usize>,
    per_person: Vec<usize>,
}

impl RoleTally {
    pub fn new(persons: usize, topics: usize, roles: usize) -> RoleTally {
        RoleTally {
            roles,
            per_topic: vec![0; topics * roles],
            per_person: vec![0; persons * roles],
        }
    }

    pub fn from_matrix(matrix: &RoleMatrix, roles: usize) -> RoleTally {
        let mut tally = RoleTally::new(matrix.persons(), matrix.topics(), roles);
        for person in 0..matrix.persons() {
            for (topic, cell) in matrix.row(person).iter().enumerate() {
                if let Cell::AttendingWithRole(role) = cell {
                    tally.add(person, topic, *role);
                }
            }
        }
        tally
    }

    pub fn clear(&mut self) {
        self.per_topic.iter_mut().for_each(|count| *count = 0);
        self.per_person.iter_mut().for_each(|count| *count = 0);
    }

    pub fn add(&mut self, person: PersonId, topic: TopicId, role: RoleId) {
        self.per_topic[topic * self.roles + role] += 1;
        self.per_person[person * self.roles + role] += 1;
    }

    pub fn remove(&mut self, person: PersonId, topic: TopicId, role: RoleId) {
        self.per_topic[topic * self.roles + role] -= 1;
        self.per_person[person * self.roles + role] -= 1;
    }

    pub fn topic_count(&self, topic: TopicId, role: RoleId) -> usize {
        self.per_topic[topic * self.roles + role]
    }

    pub fn person_count(&self, person: PersonId, role: RoleId) -> usize {
        self.per_person[person * self.roles + role]
    }

    pub fn fits(
        &self,
        person: PersonId,
        topic: TopicId,
        role: RoleId,
        topic_limit: usize,
        person_limit: usize,
    ) -> bool {
        self.topic_count(topic, role) < topic_limit && self.person_count(person, role) < person_limit
    }
}
