//! Resolving pending attendances into concrete roles.

mod backtrack;
mod greedy;

pub use backtrack::BacktrackingAssigner;
pub use greedy::RandomizedGreedyAssigner;

use rand::rngs::SmallRng;

use crate::error::{ConfigurationError, InternalError};
use crate::model::condition::{Dimensions, RoleQuotas};
use crate::preference::PreferenceModel;
use crate::session::Allocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleOutcome {
    Solved { steps: usize },
    /// The search gave up; the allocation is left with pending roles.
    Failed { steps: usize },
}

impl RoleOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, RoleOutcome::Solved { .. })
    }

    pub fn steps(&self) -> usize {
        match self {
            RoleOutcome::Solved { steps } | RoleOutcome::Failed { steps } => *steps,
        }
    }
}

pub trait RoleAssigner {
    fn name(&self) -> &str;

    fn assign(
        &mut self,
        allocation: &mut Allocation,
        rng: &mut SmallRng,
    ) -> Result<RoleOutcome, InternalError>;
}

impl std::fmt::Debug for dyn RoleAssigner + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RoleAssigner({})", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleStrategy {
    /// Exhaustive search under the uniform per-topic and per-person limits.
    Backtracking,
    /// Most interested attendee first, optional roles drawn from a shared pool.
    #[default]
    RandomizedGreedy,
}

impl RoleStrategy {
    /// Checks that the strategy can run on `dims` with `quotas`.
    pub fn validate(self, dims: &Dimensions, quotas: &RoleQuotas) -> Result<(), ConfigurationError> {
        match self {
            RoleStrategy::Backtracking => BacktrackingAssigner::check_dimensions(dims),
            RoleStrategy::RandomizedGreedy => quotas.validate(dims),
        }
    }

    pub fn build<'a>(
        self,
        dims: &'a Dimensions,
        preferences: &'a PreferenceModel,
        quotas: &'a RoleQuotas,
        max_steps: usize,
    ) -> Result<Box<dyn RoleAssigner + 'a>, ConfigurationError> {
        self.validate(dims, quotas)?;
        Ok(match self {
            RoleStrategy::Backtracking => {
                Box::new(BacktrackingAssigner::new(dims, preferences, max_steps)?)
            }
            RoleStrategy::RandomizedGreedy => {
                Box::new(RandomizedGreedyAssigner::new(dims, preferences, quotas)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::condition::RoleLimits;

    #[test]
    fn test_validate_matches_strategy() {
        let dims = Dimensions::new(4, 4, 3, 2).unwrap();
        let quotas = RoleQuotas::new(vec![RoleLimits { min: 0, max: 1 }; 3]);
        assert_eq!(RoleStrategy::RandomizedGreedy.validate(&dims, &quotas), Ok(()));
        assert!(matches!(
            RoleStrategy::Backtracking.validate(&dims, &quotas),
            Err(ConfigurationError::RolesNotDivisible { roles: 3, .. })
        ));

        let short = RoleQuotas::new(vec![RoleLimits { min: 0, max: 1 }; 2]);
        assert_eq!(
            RoleStrategy::RandomizedGreedy.validate(&dims, &short),
            Err(ConfigurationError::QuotaCount { expected: 3, found: 2 })
        );
    }

    #[test]
    fn test_build_names_strategy() {
        let dims = Dimensions::new(6, 6, 3, 2).unwrap();
        let preferences = PreferenceModel::new(6, 6);
        let quotas = RoleQuotas::uniform(&dims);
        let built = RoleStrategy::Backtracking.build(&dims, &preferences, &quotas, 10).unwrap();
        assert_eq!(built.name(), "BacktrackingAssigner");
        let built = RoleStrategy::RandomizedGreedy.build(&dims, &preferences, &quotas, 10).unwrap();
        assert_eq!(built.name(), "RandomizedGreedyAssigner");
    }
}

#[cfg(test)]
mod static_assertions {
    use super::*;
    use ::static_assertions::assert_obj_safe;

    assert_obj_safe!(RoleAssigner);
}
