use crate::config::{RunParameters, SolverConfig};
use crate::error::{ConfigurationError, SolverError};
use crate::model::condition::{Dimensions, RoleQuotas};
use crate::preference::PreferenceModel;
use crate::solution::Solution;
use crate::task::{Progress, TaskRunner};

/// A validated problem instance together with its engine configuration.
#[derive(Debug, Clone)]
pub struct Solver {
    dims: Dimensions,
    preferences: PreferenceModel,
    quotas: RoleQuotas,
    config: SolverConfig,
}

impl Solver {
    pub fn new(
        dims: Dimensions,
        preferences: PreferenceModel,
        quotas: RoleQuotas,
        config: SolverConfig,
    ) -> Result<Solver, ConfigurationError> {
        if preferences.persons() != dims.persons() || preferences.topics() != dims.topics() {
            return Err(ConfigurationError::PreferenceShape {
                persons: dims.persons(),
                topics: dims.topics(),
                found_persons: preferences.persons(),
                found_topics: preferences.topics(),
            });
        }
        quotas.validate(&dims)?;
        config.role_strategy.validate(&dims, &quotas)?;
        Ok(Solver { dims, preferences, quotas, config })
    }

    /// Every role may be held by `persons_per_topic / roles` attendees per topic.
    pub fn with_uniform_quotas(
        dims: Dimensions,
        preferences: PreferenceModel,
        config: SolverConfig,
    ) -> Result<Solver, ConfigurationError> {
        let quotas = RoleQuotas::uniform(&dims);
        Solver::new(dims, preferences, quotas, config)
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    pub fn preferences(&self) -> &PreferenceModel {
        &self.preferences
    }

    /// Rankings may be edited between runs; the inverse index is rebuilt when a
    /// run starts.
    pub fn preferences_mut(&mut self) -> &mut PreferenceModel {
        &mut self.preferences
    }

    pub fn quotas(&self) -> &RoleQuotas {
        &self.quotas
    }

    pub fn set_quotas(&mut self, quotas: RoleQuotas) -> Result<(), ConfigurationError> {
        quotas.validate(&self.dims)?;
        self.quotas = quotas;
        Ok(())
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Runs the whole search on the calling thread.
    pub fn solve(&mut self, params: &RunParameters) -> Result<Vec<Solution>, SolverError> {
        TaskRunner::run(self, params, &Progress::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::condition::RoleLimits;
    use crate::roles::RoleStrategy;

    #[test]
    fn test_rejects_preference_shape() {
        let dims = Dimensions::new(4, 4, 1, 2).unwrap();
        let err = Solver::with_uniform_quotas(dims, PreferenceModel::new(4, 6), SolverConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::PreferenceShape {
                persons: 4,
                topics: 4,
                found_persons: 4,
                found_topics: 6
            }
        );
    }

    #[test]
    fn test_rejects_backtracking_on_uneven_split() {
        let dims = Dimensions::new(4, 4, 3, 2).unwrap();
        let quotas = RoleQuotas::new(vec![RoleLimits { min: 0, max: 1 }; 3]);
        let config = SolverConfig::default().with_role_strategy(RoleStrategy::Backtracking);
        assert!(matches!(
            Solver::new(dims, PreferenceModel::new(4, 4), quotas, config),
            Err(ConfigurationError::RolesNotDivisible { .. })
        ));
    }

    #[test]
    fn test_set_quotas_validates() {
        let dims = Dimensions::new(4, 4, 2, 2).unwrap();
        let mut solver =
            Solver::with_uniform_quotas(dims, PreferenceModel::new(4, 4), SolverConfig::default())
                .unwrap();
        let bad = RoleQuotas::new(vec![RoleLimits { min: 2, max: 1 }, RoleLimits { min: 0, max: 2 }]);
        assert!(solver.set_quotas(bad).is_err());
        assert_eq!(solver.quotas(), &RoleQuotas::uniform(solver.dimensions()));
    }

    #[test]
    fn test_solve_rejects_zero_keep_best() {
        let dims = Dimensions::new(4, 4, 1, 2).unwrap();
        let mut solver =
            Solver::with_uniform_quotas(dims, PreferenceModel::new(4, 4), SolverConfig::default())
                .unwrap();
        assert_eq!(
            solver.solve(&RunParameters::new(1, 1, 10, 0)),
            Err(SolverError::Configuration(ConfigurationError::ZeroKeepBest))
        );
    }
}
