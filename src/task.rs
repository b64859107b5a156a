//! Running the search loop, inline or on a background thread, with progress
//! reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::anneal;
use crate::cluster::{ClusterHistory, DistanceMatrix, TopicClusterer};
use crate::config::RunParameters;
use crate::error::SolverError;
use crate::evaluate::SolutionEvaluator;
use crate::ranker::SolutionRanker;
use crate::session::SessionAssigner;
use crate::solution::Solution;
use crate::solver::Solver;

/// Shared between the worker and whoever watches it.
#[derive(Debug, Default)]
pub struct Progress {
    current: AtomicUsize,
    total: AtomicUsize,
    done: AtomicBool,
    cancelled: AtomicBool,
    message: Mutex<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub current: usize,
    pub total: usize,
    pub message: Option<String>,
    pub done: bool,
}

impl Progress {
    pub fn new() -> Progress {
        Progress::default()
    }

    fn begin(&self, total: usize) {
        self.total.store(total, Ordering::Release);
        self.current.store(0, Ordering::Release);
        self.done.store(false, Ordering::Release);
    }

    fn set_current(&self, current: usize) {
        self.current.fetch_max(current, Ordering::AcqRel);
    }

    fn set_message(&self, message: String) {
        *self.message.lock() = Some(message);
    }

    fn finish(&self) {
        self.done.store(true, Ordering::Release);
    }

    /// Asks the worker to stop before its next assignment attempt.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        *self.message.lock() = None;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            current: self.current.load(Ordering::Acquire),
            total: self.total.load(Ordering::Acquire),
            message: self.message.lock().clone(),
            done: self.done.load(Ordering::Acquire),
        }
    }
}

/// The outer clustering loop and inner assignment loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskRunner;

impl TaskRunner {
    /// Searches until the budget in `params` is spent or `progress` is
    /// cancelled, returning the best solutions found so far, best first.
    /// `progress` is marked done on every exit.
    #[tracing::instrument(
        name = "solve",
        skip_all,
        fields(
            persons = solver.dimensions().persons(),
            topics = solver.dimensions().topics(),
            clusters = params.cluster_attempts,
            assignments = params.assignment_attempts
        )
    )]
    pub fn run(
        solver: &mut Solver,
        params: &RunParameters,
        progress: &Progress,
    ) -> Result<Vec<Solution>, SolverError> {
        let result = Self::search(solver, params, progress);
        progress.finish();
        result
    }

    fn search(
        solver: &mut Solver,
        params: &RunParameters,
        progress: &Progress,
    ) -> Result<Vec<Solution>, SolverError> {
        let mut ranker = SolutionRanker::new(params.keep_best)?;
        solver.preferences_mut().rebuild_inverse();
        let solver: &Solver = solver;
        let dims = solver.dimensions();
        let preferences = solver.preferences();
        let config = solver.config();

        let distances = DistanceMatrix::from_preferences(preferences);
        let clusterer = TopicClusterer::new(&distances, config.cluster_acceptance);
        let assigner =
            SessionAssigner::new(dims, preferences, config.balancing_weight, config.assignment_acceptance);
        let evaluator =
            SolutionEvaluator::new(dims, preferences, solver.quotas(), config.balancing_weight);
        let mut roles = config.role_strategy.build(
            dims,
            preferences,
            solver.quotas(),
            config.max_backtrack_steps,
        )?;
        let mut history = ClusterHistory::default();
        let cluster_tries = config.cluster_tries(dims.topics());

        let total = params.total();
        progress.begin(total);
        info!(total, strategy = roles.name(), "starting search");

        let mut failures = 0usize;
        for cluster_attempt in 0..params.cluster_attempts {
            progress.set_message(format!(
                "Clustering topics, attempt {} of {}",
                cluster_attempt + 1,
                params.cluster_attempts
            ));
            let clustering = clusterer.cluster(
                dims.group_size(),
                &history,
                cluster_tries,
                params.cluster_seed(cluster_attempt),
            );
            let fresh = history.record(&clustering);
            debug!(cluster_attempt, fresh, groups = ?clustering.groups(), "topics clustered");

            for assignment_attempt in 0..params.assignment_attempts {
                let index = cluster_attempt * params.assignment_attempts + assignment_attempt;
                progress.set_current(index);
                if progress.is_cancelled() {
                    info!(index, kept = ranker.len(), "search cancelled");
                    return Ok(ranker.into_solutions());
                }

                let mut allocation = assigner.assign(
                    &clustering,
                    params.max_annealing_tries,
                    params.assignment_seed(cluster_attempt, assignment_attempt),
                );
                let mut rng = anneal::seeded_rng(params.role_seed(cluster_attempt, assignment_attempt));
                let outcome = roles.assign(&mut allocation, &mut rng)?;
                if !outcome.is_solved() {
                    failures += 1;
                    debug!(index, steps = outcome.steps(), "role assignment gave up");
                    continue;
                }

                let mut solution = Solution::new(index, allocation);
                evaluator.evaluate(&mut solution);
                if let Some(position) = ranker.insert(solution) {
                    debug!(index, position, "solution ranked");
                }
            }
        }

        progress.set_current(total);
        info!(kept = ranker.len(), failures, "search finished");
        Ok(ranker.into_solutions())
    }
}

/// Result of a background run. The solver is handed back so it can be reused.
#[derive(Debug)]
pub struct TaskOutput {
    pub solver: Solver,
    pub solutions: Vec<Solution>,
}

/// A search running on its own thread.
#[derive(Debug)]
pub struct SolverTask {
    progress: Arc<Progress>,
    handle: JoinHandle<Result<TaskOutput, SolverError>>,
}

/// Marks the progress done when the worker ends, unwinding included.
struct Finished<'a>(&'a Progress);

impl Drop for Finished<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

fn spawn_worker<T, F>(progress: Arc<Progress>, work: F) -> JoinHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&Progress) -> T + Send + 'static,
{
    thread::spawn(move || {
        let _finished = Finished(&progress);
        work(&progress)
    })
}

impl SolverTask {
    pub fn spawn(mut solver: Solver, params: RunParameters) -> SolverTask {
        let progress = Arc::new(Progress::new());
        let handle = spawn_worker(
            Arc::clone(&progress),
            move |progress: &Progress| -> Result<TaskOutput, SolverError> {
                let solutions = TaskRunner::run(&mut solver, &params, progress)?;
                Ok(TaskOutput { solver, solutions })
            },
        );
        SolverTask { progress, handle }
    }

    pub fn poll(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    pub fn cancel(&self) {
        self.progress.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.progress.is_done()
    }

    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    /// Blocks until the worker exits.
    pub fn join(self) -> Result<TaskOutput, SolverError> {
        self.handle.join().map_err(|_| SolverError::WorkerPanicked)?
    }
}
