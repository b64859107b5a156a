use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::error::{ConfigurationError, InternalError};
use crate::model::condition::{Dimensions, RoleQuotas};
use crate::model::entity::{PersonId, RoleId, TopicId};
use crate::model::table::{Cell, RoleMatrix};
use crate::preference::PreferenceModel;
use crate::roles::{RoleAssigner, RoleOutcome};
use crate::session::Allocation;

/// Hands out roles topic by topic without ever failing.
///
/// Each topic first gets every role's minimum. The remaining seats are filled
/// with a random draw from the pool of optional roles (`max - min` copies per
/// role). Roles go to the pending attendee who ranks the topic highest, ties
/// broken at random.
#[derive(Debug, Clone)]
pub struct RandomizedGreedyAssigner<'a> {
    preferences: &'a PreferenceModel,
    quotas: &'a RoleQuotas,
    pool: Vec<RoleId>,
    candidates: Vec<PersonId>,
}

impl<'a> RandomizedGreedyAssigner<'a> {
    pub fn new(
        dims: &'a Dimensions,
        preferences: &'a PreferenceModel,
        quotas: &'a RoleQuotas,
    ) -> Result<RandomizedGreedyAssigner<'a>, ConfigurationError> {
        quotas.validate(dims)?;
        let pool = quotas
            .iter()
            .enumerate()
            .flat_map(|(role, limits)| std::iter::repeat(role).take(limits.max - limits.min))
            .collect();
        Ok(RandomizedGreedyAssigner {
            preferences,
            quotas,
            pool,
            candidates: Vec::with_capacity(dims.persons_per_topic()),
        })
    }

    fn most_interested(
        &mut self,
        matrix: &RoleMatrix,
        topic: TopicId,
        role: RoleId,
        rng: &mut SmallRng,
    ) -> Result<PersonId, InternalError> {
        self.candidates.clear();
        let mut best = usize::MAX;
        for person in matrix.attendees(topic) {
            if matrix.get(person, topic) != Cell::AttendingPendingRole {
                continue;
            }
            let rank = self.preferences.rank(person, topic);
            if rank < best {
                best = rank;
                self.candidates.clear();
            }
            if rank == best {
                self.candidates.push(person);
            }
        }
        self.candidates.choose(rng).copied().ok_or(InternalError::NoCandidate { topic, role })
    }

    fn roles_for(&self, topic: TopicId, pending: usize, rng: &mut SmallRng) -> Result<Vec<usize>, InternalError> {
        let required = self.quotas.min_total();
        let optional = pending.checked_sub(required).ok_or(InternalError::AttendeeShortfall {
            topic,
            attendees: pending,
            required,
        })?;
        if optional > self.pool.len() {
            return Err(InternalError::PoolExhausted {
                topic,
                needed: optional,
                available: self.pool.len(),
            });
        }
        let mut counts: Vec<usize> = self.quotas.iter().map(|limits| limits.min).collect();
        for &role in self.pool.choose_multiple(rng, optional) {
            counts[role] += 1;
        }
        Ok(counts)
    }
}

impl RoleAssigner for RandomizedGreedyAssigner<'_> {
    fn name(&self) -> &str {
        "RandomizedGreedyAssigner"
    }

    fn assign(
        &mut self,
        allocation: &mut Allocation,
        rng: &mut SmallRng,
    ) -> Result<RoleOutcome, InternalError> {
        let matrix = &mut allocation.matrix;
        let mut steps = 0;
        for topic in 0..matrix.topics() {
            let counts = self.roles_for(topic, matrix.count_pending(topic), rng)?;
            for (role, &count) in counts.iter().enumerate() {
                for _ in 0..count {
                    let person = self.most_interested(matrix, topic, role, rng)?;
                    matrix.set(person, topic, Cell::AttendingWithRole(role));
                    steps += 1;
                }
            }
        }
        Ok(RoleOutcome::Solved { steps })
    }
}
