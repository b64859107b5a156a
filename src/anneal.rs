use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::model::condition::Score;

/// Seed 0 draws fresh entropy; any other seed is reproducible.
pub fn seeded_rng(seed: u64) -> SmallRng {
    if seed == 0 {
        SmallRng::from_entropy()
    } else {
        SmallRng::seed_from_u64(seed)
    }
}

/// How moves are kept relative to the floating aspiration level.
///
/// A move that beats the aspiration level is always kept. Any other move is
/// kept with probability `worse`, which is multiplied by `cooling` after every
/// iteration and never drops to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acceptance {
    worse: f64,
    cooling: f64,
}

impl Acceptance {
    pub const CLUSTERING: Acceptance = Acceptance { worse: 0.1, cooling: 1.0 };
    pub const ASSIGNMENT: Acceptance = Acceptance { worse: 0.05, cooling: 1.0 };

    /// A NaN probability falls back to the clustering default.
    pub fn new(worse: f64) -> Acceptance {
        let worse = if worse.is_nan() { Acceptance::CLUSTERING.worse } else { worse };
        Acceptance { worse: worse.clamp(f64::EPSILON, 1.0), cooling: 1.0 }
    }

    /// Cooling outside `(0, 1]`, NaN included, disables cooling.
    pub fn with_cooling(mut self, cooling: f64) -> Acceptance {
        self.cooling = if cooling > 0.0 { cooling.min(1.0) } else { 1.0 };
        self
    }

    pub fn worse(&self) -> f64 {
        self.worse
    }

    pub fn cooling(&self) -> f64 {
        self.cooling
    }
}

/// A search state the annealer can perturb. Lower energy is better.
pub trait Landscape {
    type Move;

    fn energy(&self) -> Score;

    /// Draws a random move, or `None` when the state admits no move at all.
    fn propose<R: Rng>(&mut self, rng: &mut R) -> Option<Self::Move>;

    fn apply(&mut self, action: &Self::Move);

    fn revert(&mut self, action: &Self::Move);

    /// Whether the current state may become the recorded best.
    fn admissible(&self) -> bool {
        true
    }

    /// Snapshots the current state as the best one seen so far.
    fn record_best(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    pub acceptance: Acceptance,
    pub max_iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Outcome {
    pub best: Option<Score>,
    pub iterations: usize,
    pub kept: usize,
    pub improvements: usize,
}

struct State {
    aspiration: Score,
    worse: f64,
    outcome: Outcome,
}

impl State {
    fn offer<L: Landscape>(&mut self, landscape: &mut L, energy: Score) {
        if self.outcome.best.map_or(true, |best| energy < best) && landscape.admissible() {
            self.outcome.best = Some(energy);
            self.outcome.improvements += 1;
            landscape.record_best();
        }
    }
}

/// Runs the aspiration-level annealing loop on `landscape`.
///
/// The best admissible state (the start state included) is handed to
/// [`Landscape::record_best`]; the landscape itself ends in whatever state the
/// walk reached.
pub fn anneal<L: Landscape, R: Rng>(landscape: &mut L, params: &Params, rng: &mut R) -> Outcome {
    let start = landscape.energy();
    let mut state = State {
        aspiration: start,
        worse: params.acceptance.worse,
        outcome: Outcome::default(),
    };
    state.offer(landscape, start);

    for _ in 0..params.max_iterations {
        let Some(action) = landscape.propose(rng) else {
            break;
        };
        state.outcome.iterations += 1;
        landscape.apply(&action);
        let energy = landscape.energy();
        state.offer(landscape, energy);

        if energy < state.aspiration || rng.gen_bool(state.worse) {
            state.aspiration = energy;
            state.outcome.kept += 1;
        } else {
            landscape.revert(&action);
        }
        state.worse = (state.worse * params.acceptance.cooling).max(f64::EPSILON);
    }
    state.outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Position on a line; energy is the distance to `goal`.
    struct Walker {
        position: i64,
        goal: i64,
        best: i64,
        forbidden: Option<i64>,
    }

    impl Landscape for Walker {
        type Move = i64;

        fn energy(&self) -> Score {
            (self.position - self.goal).abs() as Score
        }

        fn propose<R: Rng>(&mut self, rng: &mut R) -> Option<i64> {
            Some(if rng.gen_bool(0.5) { 1 } else { -1 })
        }

        fn apply(&mut self, step: &i64) {
            self.position += step;
        }

        fn revert(&mut self, step: &i64) {
            self.position -= step;
        }

        fn admissible(&self) -> bool {
            Some(self.position) != self.forbidden
        }

        fn record_best(&mut self) {
            self.best = self.position;
        }
    }

    fn params(iterations: usize) -> Params {
        Params { acceptance: Acceptance::new(0.05), max_iterations: iterations }
    }

    #[test]
    fn test_reaches_goal() {
        let mut walker = Walker { position: 0, goal: 12, best: 0, forbidden: None };
        let mut rng = SmallRng::seed_from_u64(3);
        let outcome = anneal(&mut walker, &params(5_000), &mut rng);
        assert_eq!(walker.best, 12);
        assert_eq!(outcome.best, Some(0.0));
        assert_eq!(outcome.iterations, 5_000);
    }

    #[test]
    fn test_skips_inadmissible_states() {
        let mut walker = Walker { position: 0, goal: 5, best: 0, forbidden: Some(5) };
        let mut rng = SmallRng::seed_from_u64(11);
        let outcome = anneal(&mut walker, &params(5_000), &mut rng);
        assert_ne!(walker.best, 5);
        assert_eq!(outcome.best, Some(1.0));
    }

    #[test]
    fn test_zero_budget_records_start() {
        let mut walker = Walker { position: 4, goal: 0, best: -1, forbidden: None };
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = anneal(&mut walker, &params(0), &mut rng);
        assert_eq!(walker.best, 4);
        assert_eq!(outcome.best, Some(4.0));
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_acceptance_clamps() {
        let acceptance = Acceptance::new(0.0).with_cooling(-2.0);
        assert!(acceptance.worse() > 0.0);
        assert_eq!(acceptance.cooling(), 1.0);
        assert_eq!(Acceptance::new(3.0).worse(), 1.0);
    }

    #[test]
    fn test_nan_acceptance_falls_back() {
        let acceptance = Acceptance::new(f64::NAN).with_cooling(f64::NAN);
        assert_eq!(acceptance, Acceptance::CLUSTERING);

        let mut walker = Walker { position: 0, goal: 3, best: 0, forbidden: None };
        let params = Params { acceptance, max_iterations: 200 };
        let outcome = anneal(&mut walker, &params, &mut SmallRng::seed_from_u64(4));
        assert_eq!(outcome.iterations, 200);
    }

    /// Every move lowers the energy by one and counts how often it is undone.
    struct Descent {
        energy: Score,
        reverted: usize,
    }

    impl Landscape for Descent {
        type Move = ();

        fn energy(&self) -> Score {
            self.energy
        }

        fn propose<R: Rng>(&mut self, _rng: &mut R) -> Option<()> {
            Some(())
        }

        fn apply(&mut self, _: &()) {
            self.energy -= 1.0;
        }

        fn revert(&mut self, _: &()) {
            self.energy += 1.0;
            self.reverted += 1;
        }

        fn record_best(&mut self) {}
    }

    #[test]
    fn test_improvements_always_kept() {
        for acceptance in [Acceptance::CLUSTERING, Acceptance::ASSIGNMENT] {
            let mut descent = Descent { energy: 0.0, reverted: 0 };
            let params = Params { acceptance, max_iterations: 1_000 };
            let outcome = anneal(&mut descent, &params, &mut SmallRng::seed_from_u64(1));
            assert_eq!(descent.reverted, 0);
            assert_eq!(outcome.kept, 1_000);
            assert_eq!(outcome.best, Some(-1_000.0));
        }
    }

    #[test]
    fn test_same_seed_same_walk() {
        let run = || {
            let mut walker = Walker { position: 0, goal: 40, best: 0, forbidden: None };
            let mut rng = SmallRng::seed_from_u64(99);
            let outcome = anneal(&mut walker, &params(300), &mut rng);
            (walker.position, walker.best, outcome)
        };
        assert_eq!(run(), run());
    }
}
