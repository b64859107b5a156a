//! Assigns persons to parallel topic sessions, and roles within those sessions,
//! from ranked topic preferences.
//!
//! A run alternates two annealing stages. Topics are first partitioned into
//! groups of `sessions` topics that run in parallel, keeping topics liked by the
//! same persons apart. Each person then attends one topic per group, balanced so
//! every topic has the same number of attendees. Finally every attendance is
//! resolved into a role and the result is scored by how closely it follows the
//! preferences. The best solutions are kept in rank order.
//!
//! ```no_run
//! use session_shuffle::prelude::*;
//!
//! let dims = Dimensions::new(6, 6, 3, 2)?;
//! let solver_config = SolverConfig::default().with_role_strategy(RoleStrategy::Backtracking);
//! let mut solver = Solver::with_uniform_quotas(dims, PreferenceModel::new(6, 6), solver_config)?;
//! let solutions = solver.solve(&RunParameters::new(4, 4, 2_000, 3))?;
//! for solution in &solutions {
//!     println!("{solution}");
//! }
//! # Ok::<(), SolverError>(())
//! ```

pub mod action;
pub mod anneal;
pub mod cache;
pub mod cluster;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod preference;
pub mod ranker;
pub mod roles;
pub mod session;
pub mod solution;
pub mod solver;
pub mod task;

pub mod prelude {
    pub use crate::anneal::Acceptance;
    pub use crate::config::{RunParameters, SolverConfig};
    pub use crate::error::{ConfigurationError, InternalError, SolverError};
    pub use crate::model::condition::{Dimensions, RoleLimits, RoleQuotas};
    pub use crate::model::table::{Cell, RoleMatrix};
    pub use crate::preference::PreferenceModel;
    pub use crate::roles::RoleStrategy;
    pub use crate::solution::{Solution, Statistics};
    pub use crate::solver::Solver;
    pub use crate::task::{Progress, ProgressSnapshot, SolverTask, TaskOutput};
}

#[cfg(test)]
mod static_assertions {
    use super::prelude::*;
    use ::static_assertions::assert_impl_all;

    assert_impl_all!(Solver: Send, Sync, Clone);
    assert_impl_all!(Solution: Send, Sync, Clone);
    assert_impl_all!(PreferenceModel: Send, Sync);
    assert_impl_all!(SolverError: std::error::Error, Send, Sync);
}
