use thiserror::Error;

use crate::model::entity::{PersonId, RoleId, TopicId};

/// Rejected before any search runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("dimension `{0}` must be positive")]
    ZeroDimension(&'static str),
    #[error("{topics} topics cannot be split evenly across {sessions} sessions")]
    TopicsNotDivisible { topics: usize, sessions: usize },
    #[error("{persons} persons cannot be split evenly across {sessions} sessions")]
    PersonsNotDivisible { persons: usize, sessions: usize },
    #[error("preference table has shape {found_persons}x{found_topics}, expected {persons}x{topics}")]
    PreferenceShape {
        persons: usize,
        topics: usize,
        found_persons: usize,
        found_topics: usize,
    },
    #[error("preferences of person {person} are not a permutation of the topics")]
    NotAPermutation { person: PersonId },
    #[error("expected quotas for {expected} roles, got {found}")]
    QuotaCount { expected: usize, found: usize },
    #[error("role {role} has minimum {min} above maximum {max}")]
    QuotaRange { role: RoleId, min: usize, max: usize },
    #[error("role quotas ({min_total}..={max_total}) cannot fill {seats} seats per topic")]
    QuotaInfeasible {
        min_total: usize,
        max_total: usize,
        seats: usize,
    },
    #[error("{roles} roles do not divide {persons_per_topic} seats per topic and {groups} topics per person")]
    RolesNotDivisible {
        roles: usize,
        persons_per_topic: usize,
        groups: usize,
    },
    #[error("at least one solution must be kept")]
    ZeroKeepBest,
}

/// A selection step found the invariants broken. The attempt is aborted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InternalError {
    #[error("no attendee of topic {topic} is left to receive role {role}")]
    NoCandidate { topic: TopicId, role: RoleId },
    #[error("topic {topic} needs {needed} optional roles but the pool holds {available}")]
    PoolExhausted {
        topic: TopicId,
        needed: usize,
        available: usize,
    },
    #[error("topic {topic} has {attendees} attendees, fewer than the {required} mandatory roles")]
    AttendeeShortfall {
        topic: TopicId,
        attendees: usize,
        required: usize,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SolverError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Internal(#[from] InternalError),
    #[error("solver worker panicked")]
    WorkerPanicked,
}
