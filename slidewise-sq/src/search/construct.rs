//! Phase 1: Greedy construction
//!
//! **Algorithm:**
//! 1. Start the sequence with slide 0
//! 2. Among slides that are unused and whose photos are all free, pick the one
//!    scoring highest against the current tail (lowest index on ties)
//! 3. Append it, even at score 0, and repeat until nothing is available
//!
//! A scan stops early once a candidate reaches the tail's score ceiling,
//! since no later slide can beat it and the earlier index wins the tie.

use super::{SearchState, StopCondition, Termination};
use slidewise_common::score::{score_ceiling, slide_score};
use slidewise_common::{SlideIndex, SlideUniverse};
use tracing::debug;

/// Slides scanned between stop-condition polls inside one extension
const POLL_EVERY: usize = 1 << 16;

/// Build a legal sequence greedily
///
/// Returns the state and, if the stop condition fired, why. An interrupted
/// construction still holds a valid, non-empty prefix.
pub fn greedy_construct<'u>(
    universe: &'u SlideUniverse,
    stop: &StopCondition,
) -> (SearchState<'u>, Option<Termination>) {
    let mut state = SearchState::new(universe);
    if universe.is_empty() {
        return (state, None);
    }
    state.push(0);

    loop {
        if let Some(reason) = stop.check() {
            debug!("Greedy construction interrupted at {} slides", state.len());
            return (state, Some(reason));
        }

        let (best, interrupted) = best_extension(&state, stop);
        match best {
            Some(slide) => state.push(slide),
            None => break,
        }
        if let Some(reason) = interrupted {
            return (state, Some(reason));
        }
    }

    debug!(
        "Greedy construction placed {} slides, total {}",
        state.len(),
        state.total()
    );
    (state, None)
}

/// Best available slide against the current tail
///
/// If the stop condition fires mid-scan, the best candidate seen so far is
/// still returned so progress is not thrown away.
fn best_extension(
    state: &SearchState,
    stop: &StopCondition,
) -> (Option<SlideIndex>, Option<Termination>) {
    let universe = state.universe();
    let Some(&tail) = state.order().last() else {
        return (None, None);
    };
    let tail_slide = universe.slide(tail);
    let ceiling = score_ceiling(&tail_slide.tags);

    let mut best: Option<(u32, SlideIndex)> = None;
    for candidate in 0..universe.len() {
        if candidate % POLL_EVERY == POLL_EVERY - 1 {
            if let Some(reason) = stop.check() {
                return (best.map(|(_, s)| s), Some(reason));
            }
        }
        if !state.is_available(candidate) {
            continue;
        }

        let score = slide_score(tail_slide, universe.slide(candidate));
        if best.map_or(true, |(b, _)| score > b) {
            best = Some((score, candidate));
            if score >= ceiling {
                break;
            }
        }
    }

    (best.map(|(_, s)| s), None)
}
