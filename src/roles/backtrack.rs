use rand::rngs::SmallRng;

use crate::cache::RoleTally;
use crate::error::{ConfigurationError, InternalError};
use crate::model::condition::Dimensions;
use crate::model::entity::{PersonId, Rank, RoleId, TopicId};
use crate::model::table::{Cell, RoleMatrix};
use crate::preference::PreferenceModel;
use crate::roles::{RoleAssigner, RoleOutcome};
use crate::session::Allocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    Searching,
    Assigned,
    Backtrack,
    Solved,
    Failed,
}

/// A placed role, and where to resume scanning the person's ranking if it is undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    slot: usize,
    person: PersonId,
    topic: TopicId,
    role: RoleId,
    next_cursor: Rank,
}

/// Chronological backtracking over a fixed sequence of (slot, person) pairs.
///
/// Persons are visited cyclically, reversing direction every cycle. The
/// sequence is cut into `roles` equal bands and band `r` hands out role `r`.
/// Each slot takes the person's best-ranked pending topic that still has room
/// for the role; when none does, the previous placement is undone and retried
/// from its next ranked topic.
#[derive(Debug, Clone)]
pub struct BacktrackingAssigner<'a> {
    dims: &'a Dimensions,
    preferences: &'a PreferenceModel,
    max_steps: usize,
    order: Vec<PersonId>,
    tally: RoleTally,
    stack: Vec<Frame>,
}

impl<'a> BacktrackingAssigner<'a> {
    pub const DEFAULT_MAX_STEPS: usize = 100_000;

    pub fn new(
        dims: &'a Dimensions,
        preferences: &'a PreferenceModel,
        max_steps: usize,
    ) -> Result<BacktrackingAssigner<'a>, ConfigurationError> {
        Self::check_dimensions(dims)?;
        let persons = dims.persons();
        let order = (0..dims.assignment_count())
            .map(|slot| {
                let person = slot % persons;
                if (slot / persons) % 2 == 0 { person } else { persons - 1 - person }
            })
            .collect();
        Ok(BacktrackingAssigner {
            dims,
            preferences,
            max_steps,
            order,
            tally: RoleTally::new(persons, dims.topics(), dims.roles()),
            stack: Vec::new(),
        })
    }

    /// Role bands need `roles` to divide both the seats of a topic and the
    /// topics of a person.
    pub fn check_dimensions(dims: &Dimensions) -> Result<(), ConfigurationError> {
        if dims.persons_per_topic() % dims.roles() != 0 || dims.group_count() % dims.roles() != 0 {
            return Err(ConfigurationError::RolesNotDivisible {
                roles: dims.roles(),
                persons_per_topic: dims.persons_per_topic(),
                groups: dims.group_count(),
            });
        }
        Ok(())
    }

    fn role_for(&self, slot: usize) -> RoleId {
        slot / (self.order.len() / self.dims.roles())
    }

    fn place(&mut self, matrix: &mut RoleMatrix, slot: usize, cursor: Rank) -> Option<Frame> {
        let person = self.order[slot];
        let role = self.role_for(slot);
        let topic_limit = self.dims.topic_role_limit();
        let person_limit = self.dims.person_role_limit();
        let (rank, topic) = (cursor..self.dims.topics()).find_map(|rank| {
            let topic = self.preferences.topic_at(person, rank);
            let open = matrix.get(person, topic) == Cell::AttendingPendingRole
                && self.tally.fits(person, topic, role, topic_limit, person_limit);
            open.then_some((rank, topic))
        })?;
        matrix.set(person, topic, Cell::AttendingWithRole(role));
        self.tally.add(person, topic, role);
        Some(Frame { slot, person, topic, role, next_cursor: rank + 1 })
    }

    fn undo(&mut self, matrix: &mut RoleMatrix, frame: &Frame) {
        matrix.set(frame.person, frame.topic, Cell::AttendingPendingRole);
        self.tally.remove(frame.person, frame.topic, frame.role);
    }

    pub fn solve(&mut self, matrix: &mut RoleMatrix) -> RoleOutcome {
        self.tally.clear();
        self.stack.clear();

        let mut state = SearchState::Searching;
        let mut slot = 0;
        let mut cursor = 0;
        let mut steps = 0;
        loop {
            state = match state {
                SearchState::Searching if slot == self.order.len() => SearchState::Solved,
                SearchState::Searching => {
                    steps += 1;
                    if steps > self.max_steps {
                        SearchState::Failed
                    } else if let Some(frame) = self.place(matrix, slot, cursor) {
                        self.stack.push(frame);
                        SearchState::Assigned
                    } else {
                        SearchState::Backtrack
                    }
                }
                SearchState::Assigned => {
                    slot += 1;
                    cursor = 0;
                    SearchState::Searching
                }
                SearchState::Backtrack => match self.stack.pop() {
                    Some(frame) => {
                        self.undo(matrix, &frame);
                        slot = frame.slot;
                        cursor = frame.next_cursor;
                        SearchState::Searching
                    }
                    None => SearchState::Failed,
                },
                SearchState::Solved => return RoleOutcome::Solved { steps },
                SearchState::Failed => {
                    while let Some(frame) = self.stack.pop() {
                        self.undo(matrix, &frame);
                    }
                    return RoleOutcome::Failed { steps };
                }
            }
        }
    }
}

impl RoleAssigner for BacktrackingAssigner<'_> {
    fn name(&self) -> &str {
        "BacktrackingAssigner"
    }

    fn assign(
        &mut self,
        allocation: &mut Allocation,
        _rng: &mut SmallRng,
    ) -> Result<RoleOutcome, InternalError> {
        Ok(self.solve(&mut allocation.matrix))
    }
}
