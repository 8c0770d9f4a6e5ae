//! Phase 3: Iterated local search
//!
//! **Algorithm:** per round
//! 1. Copy the current sequence and kick it: either exchange two adjacent
//!    random segments, or eject one to three random slides (freeing their
//!    photos for different pairings)
//! 2. Run local search on the copy
//! 3. Adopt the copy only if its total is strictly higher
//!
//! A trajectory ends on the round cap, after `stall_limit` rounds without
//! improvement, or when the stop condition fires. Because only strict
//! improvements are adopted, the current sequence is always the best seen.

use super::local::{improve, LocalSearchStats};
use super::{SearchState, StopCondition, Termination};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use slidewise_common::SlideIndex;
use tracing::debug;

/// Longest segment moved by a segment-exchange kick
const MAX_SEGMENT: usize = 50;

/// Most slides removed by an ejection kick
const MAX_EJECTED: usize = 3;

/// Outcome of one worker's trajectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryResult {
    pub worker: usize,
    pub seed: u64,
    #[serde(skip)]
    pub order: Vec<SlideIndex>,
    pub total: u64,
    /// Perturbation rounds run
    pub rounds: u64,
    /// Rounds whose result was adopted
    pub improvements: u64,
    pub local_search: LocalSearchStats,
    pub termination: Termination,
}

/// Trajectory limits
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryLimits {
    pub max_iterations: Option<u64>,
    pub stall_limit: u64,
}

/// Run one seeded trajectory from a local optimum
///
/// `start` is not modified; the trajectory works on its own copy.
pub fn run_trajectory(
    start: &SearchState,
    worker: usize,
    seed: u64,
    limits: TrajectoryLimits,
    stop: &StopCondition,
) -> TrajectoryResult {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut current = start.clone();
    let mut rounds = 0u64;
    let mut improvements = 0u64;
    let mut stalled_for = 0u64;
    let mut local_search = LocalSearchStats::default();

    let termination = loop {
        if let Some(cap) = limits.max_iterations {
            if rounds >= cap {
                break if cap == 0 {
                    Termination::Converged
                } else {
                    Termination::IterationCap
                };
            }
        }
        if stalled_for >= limits.stall_limit {
            break Termination::Stalled;
        }
        if let Some(reason) = stop.check() {
            break reason;
        }
        rounds += 1;

        let mut candidate = current.clone();
        kick(&mut candidate, &mut rng);
        let (stats, interrupted) = improve(&mut candidate, stop);
        local_search.absorb(stats);

        // an interrupted local search still leaves a valid sequence
        if candidate.total() > current.total() {
            current = candidate;
            improvements += 1;
            stalled_for = 0;
        } else {
            stalled_for += 1;
        }

        if let Some(reason) = interrupted {
            break reason;
        }
    };

    debug!(
        "Worker {} (seed {}) finished: total {} after {} rounds, {} improvements, {:?}",
        worker,
        seed,
        current.total(),
        rounds,
        improvements,
        termination
    );

    TrajectoryResult {
        worker,
        seed,
        total: current.total(),
        order: current.order().to_vec(),
        rounds,
        improvements,
        local_search,
        termination,
    }
}

/// Disturb the sequence enough to leave the current local optimum
fn kick(state: &mut SearchState, rng: &mut StdRng) {
    let n = state.len();
    if n < 2 {
        return;
    }

    if rng.gen_bool(0.5) {
        let start = rng.gen_range(0..n - 1);
        let mid = start + rng.gen_range(1..=MAX_SEGMENT.min(n - start - 1));
        let end = mid + rng.gen_range(1..=MAX_SEGMENT.min(n - mid));
        state.exchange_segments(start, mid, end);
    } else {
        // keep at least one slide so local search has something to extend
        let count = rng.gen_range(1..=MAX_EJECTED.min(n - 1));
        for _ in 0..count {
            let position = rng.gen_range(0..state.len());
            state.remove(position);
        }
    }
}
