//! # Sequence Optimizer
//!
//! Selects and orders slides to maximize the summed interest score of
//! consecutive slides, without reusing a slide or a photo.
//!
//! **Algorithm:** Three-phase anytime search:
//! - Phase 1: Greedy construction from slide 0, best-scoring extension first
//! - Phase 2: Local search to a local optimum (2-opt reversal, swap,
//!   relocation, vertical re-pairing, insertion of unused slides)
//! - Phase 3: Iterated local search, one seeded trajectory per worker,
//!   adopting only strict improvements
//!
//! Every phase polls a [`StopCondition`] at iteration boundaries and always
//! holds a valid sequence, so interruption returns the best found so far.

pub mod construct;
pub mod local;
pub mod perturb;
pub mod sequencer;
pub mod state;

pub use construct::greedy_construct;
pub use local::{improve, LocalSearchStats};
pub use perturb::{run_trajectory, TrajectoryLimits, TrajectoryResult};
pub use sequencer::{optimize, SearchOutcome, Sequencer};
pub use state::SearchState;

use serde::{Deserialize, Serialize};
use slidewise_common::config::SearchConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default consecutive non-improving perturbation rounds before a trajectory gives up
pub const DEFAULT_STALL_LIMIT: u64 = 20_000;

/// Why a phase or run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Nothing to search (empty universe)
    EmptyUniverse,
    /// Local optimum reached and no perturbation rounds requested
    Converged,
    /// Trajectory went `stall_limit` rounds without improving
    Stalled,
    /// Per-trajectory round cap reached
    IterationCap,
    /// Wall-clock budget exhausted
    TimeLimit,
    /// Cancelled through a [`CancelHandle`]
    Cancelled,
}

impl Termination {
    fn precedence(self) -> u8 {
        match self {
            Termination::EmptyUniverse => 0,
            Termination::Converged => 1,
            Termination::Stalled => 2,
            Termination::IterationCap => 3,
            Termination::TimeLimit => 4,
            Termination::Cancelled => 5,
        }
    }

    /// Combine reasons from parallel trajectories (external stops dominate)
    pub fn merge(self, other: Termination) -> Termination {
        if other.precedence() > self.precedence() {
            other
        } else {
            self
        }
    }

    /// Stopped by deadline or cancellation rather than by the search itself
    pub fn is_interrupted(self) -> bool {
        matches!(self, Termination::TimeLimit | Termination::Cancelled)
    }
}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Deadline plus cancellation, polled at iteration boundaries
#[derive(Debug, Clone)]
pub struct StopCondition {
    deadline: Instant,
    cancel: CancelHandle,
}

impl StopCondition {
    pub fn new(time_limit: Duration, cancel: CancelHandle) -> Self {
        Self {
            deadline: Instant::now() + time_limit,
            cancel,
        }
    }

    /// Stop condition that only ends on cancellation (for tests and tools)
    pub fn unbounded() -> Self {
        // ~30 years; Instant has no MAX
        Self::new(Duration::from_secs(1 << 30), CancelHandle::new())
    }

    /// `Some(reason)` once the run must stop
    pub fn check(&self) -> Option<Termination> {
        if self.cancel.is_cancelled() {
            Some(Termination::Cancelled)
        } else if Instant::now() >= self.deadline {
            Some(Termination::TimeLimit)
        } else {
            None
        }
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

/// Resolved optimizer parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub time_limit: Duration,
    /// Parallel perturbation trajectories
    pub workers: usize,
    /// Trajectory `i` seeds its RNG with `seed + i`
    pub seed: u64,
    /// Perturbation rounds per trajectory (None = until time or stall)
    pub max_iterations: Option<u64>,
    pub stall_limit: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(slidewise_common::config::DEFAULT_TIME_LIMIT_SECONDS),
            workers: 1,
            seed: slidewise_common::config::DEFAULT_SEED,
            max_iterations: None,
            stall_limit: DEFAULT_STALL_LIMIT,
        }
    }
}

impl SearchParams {
    /// Build from the `[search]` table; unset worker count means one per CPU
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            time_limit: Duration::from_secs(config.time_limit_seconds),
            workers: config.workers.unwrap_or_else(num_cpus::get).max(1),
            seed: config.seed,
            max_iterations: config.max_iterations,
            stall_limit: DEFAULT_STALL_LIMIT,
        }
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<u64>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_stall_limit(mut self, stall_limit: u64) -> Self {
        self.stall_limit = stall_limit;
        self
    }
}
