//! Search driver
//!
//! **Purpose:** Run the three phases under one time budget and pick the
//! final sequence.
//!
//! [`Sequencer::run`] performs construction and local search once, then runs
//! one iterated-local-search trajectory per worker on Tokio's blocking pool.
//! [`optimize`] is the synchronous single-trajectory equivalent.
//!
//! The winner is the trajectory with the highest total; ties go to the lowest
//! worker index, so a fixed seed and round cap give a reproducible result.

use super::local::{improve, LocalSearchStats};
use super::perturb::{run_trajectory, TrajectoryLimits, TrajectoryResult};
use super::{greedy_construct, CancelHandle, SearchParams, SearchState, StopCondition, Termination};
use crate::error::Result;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use slidewise_common::{SlideIndex, SlideUniverse, Solution};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Totals after each phase, for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTotals {
    pub construction: u64,
    pub local_search: u64,
    pub final_total: u64,
}

/// Result of a complete optimizer run
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub solution: Solution,
    pub total_score: u64,
    pub termination: Termination,
    pub elapsed: Duration,
    pub phases: PhaseTotals,
    /// Local search statistics for phase 2 alone
    pub initial_local_search: LocalSearchStats,
    /// Per-worker results, ordered by worker index
    pub trajectories: Vec<TrajectoryResult>,
}

/// Phases 1 and 2 on the calling thread
struct Prepared {
    order: Vec<SlideIndex>,
    phases: PhaseTotals,
    local_search: LocalSearchStats,
    interrupted: Option<Termination>,
}

fn prepare(universe: &SlideUniverse, stop: &StopCondition) -> Prepared {
    let (mut state, interrupted) = greedy_construct(universe, stop);
    let construction = state.total();
    info!(
        "Greedy construction: {} slides, total {}",
        state.len(),
        construction
    );

    if interrupted.is_some() {
        return Prepared {
            order: state.order().to_vec(),
            phases: PhaseTotals {
                construction,
                local_search: construction,
                final_total: construction,
            },
            local_search: LocalSearchStats::default(),
            interrupted,
        };
    }

    let (local_search, interrupted) = improve(&mut state, stop);
    info!(
        "Local search: {} slides, total {} ({} moves over {} passes)",
        state.len(),
        state.total(),
        local_search.moves_applied,
        local_search.passes
    );

    Prepared {
        order: state.order().to_vec(),
        phases: PhaseTotals {
            construction,
            local_search: state.total(),
            final_total: state.total(),
        },
        local_search,
        interrupted,
    }
}

/// Outcome when phase 3 never ran
fn early_outcome(
    universe: &SlideUniverse,
    prepared: Prepared,
    termination: Termination,
    started: Instant,
) -> SearchOutcome {
    let solution = Solution::new(prepared.order);
    SearchOutcome {
        total_score: solution.total_score(universe),
        solution,
        termination,
        elapsed: started.elapsed(),
        phases: prepared.phases,
        initial_local_search: prepared.local_search,
        trajectories: Vec::new(),
    }
}

/// Highest total wins; ties go to the lowest worker index
fn pick_best(trajectories: &[TrajectoryResult]) -> Option<&TrajectoryResult> {
    trajectories
        .iter()
        .max_by_key(|t| (t.total, std::cmp::Reverse(t.worker)))
}

fn finish(
    prepared: Prepared,
    trajectories: Vec<TrajectoryResult>,
    started: Instant,
) -> SearchOutcome {
    let termination = trajectories
        .iter()
        .map(|t| t.termination)
        .reduce(Termination::merge)
        .unwrap_or(Termination::Converged);

    let (order, total) = match pick_best(&trajectories) {
        Some(best) if best.total >= prepared.phases.local_search => {
            (best.order.clone(), best.total)
        }
        _ => (prepared.order, prepared.phases.local_search),
    };

    info!(
        "Search finished: total {} ({} slides) in {:.2}s, {:?}",
        total,
        order.len(),
        started.elapsed().as_secs_f64(),
        termination
    );

    SearchOutcome {
        solution: Solution::new(order),
        total_score: total,
        termination,
        elapsed: started.elapsed(),
        phases: PhaseTotals {
            final_total: total,
            ..prepared.phases
        },
        initial_local_search: prepared.local_search,
        trajectories,
    }
}

/// Parallel optimizer over a shared candidate universe
pub struct Sequencer {
    universe: Arc<SlideUniverse>,
    params: SearchParams,
    cancel: CancelHandle,
}

impl Sequencer {
    pub fn new(universe: Arc<SlideUniverse>, params: SearchParams) -> Self {
        Self {
            universe,
            params,
            cancel: CancelHandle::new(),
        }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Handle for stopping a run early (e.g. on Ctrl-C)
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run all phases within the time limit
    ///
    /// Errors only if a worker task panics or is aborted.
    pub async fn run(&self) -> Result<SearchOutcome> {
        let started = Instant::now();
        let stop = StopCondition::new(self.params.time_limit, self.cancel.clone());

        if self.universe.is_empty() {
            info!("Empty candidate universe, nothing to sequence");
            return Ok(early_outcome(
                &self.universe,
                Prepared {
                    order: Vec::new(),
                    phases: PhaseTotals::default(),
                    local_search: LocalSearchStats::default(),
                    interrupted: None,
                },
                Termination::EmptyUniverse,
                started,
            ));
        }

        let prepared = {
            let universe = Arc::clone(&self.universe);
            let stop = stop.clone();
            tokio::task::spawn_blocking(move || prepare(&universe, &stop)).await?
        };
        if let Some(reason) = prepared.interrupted {
            return Ok(early_outcome(&self.universe, prepared, reason, started));
        }

        let limits = TrajectoryLimits {
            max_iterations: self.params.max_iterations,
            stall_limit: self.params.stall_limit,
        };
        debug!(
            "Starting {} trajectories, {:.1}s remaining",
            self.params.workers,
            stop.remaining().as_secs_f64()
        );

        let handles = (0..self.params.workers).map(|worker| {
            let universe = Arc::clone(&self.universe);
            let stop = stop.clone();
            let start = Solution::new(prepared.order.clone());
            let seed = self.params.seed.wrapping_add(worker as u64);
            tokio::task::spawn_blocking(move || -> Result<TrajectoryResult> {
                let state = SearchState::from_solution(&universe, &start)?;
                Ok(run_trajectory(&state, worker, seed, limits, &stop))
            })
        });

        let mut trajectories = Vec::with_capacity(self.params.workers);
        for joined in join_all(handles).await {
            trajectories.push(joined??);
        }

        Ok(finish(prepared, trajectories, started))
    }
}

/// Synchronous single-trajectory optimizer
///
/// Uses `params.seed` for the one trajectory and ignores `params.workers`.
pub fn optimize(
    universe: &SlideUniverse,
    params: &SearchParams,
    cancel: &CancelHandle,
) -> SearchOutcome {
    let started = Instant::now();
    let stop = StopCondition::new(params.time_limit, cancel.clone());

    if universe.is_empty() {
        return early_outcome(
            universe,
            Prepared {
                order: Vec::new(),
                phases: PhaseTotals::default(),
                local_search: LocalSearchStats::default(),
                interrupted: None,
            },
            Termination::EmptyUniverse,
            started,
        );
    }

    let prepared = prepare(universe, &stop);
    if let Some(reason) = prepared.interrupted {
        return early_outcome(universe, prepared, reason, started);
    }

    let limits = TrajectoryLimits {
        max_iterations: params.max_iterations,
        stall_limit: params.stall_limit,
    };
    // the prepared order came from this universe's own search state
    let trajectory = {
        let mut state = SearchState::new(universe);
        for &slide in &prepared.order {
            state.push(slide);
        }
        run_trajectory(&state, 0, params.seed, limits, &stop)
    };

    finish(prepared, vec![trajectory], started)
}
