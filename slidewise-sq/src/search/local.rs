//! Phase 2: Local search
//!
//! **Moves** (first improvement, strictly positive gain only):
//! - Insert: place an unused, photo-compatible slide at its best position,
//!   or put it in place of a placed slide when that gains more
//! - Re-pair: swap a paired slide's partner for a free vertical photo, or
//!   exchange partners between two nearby paired slides
//! - Reverse: 2-opt segment reversal (covers adjacent swaps)
//! - Swap: exchange two nearby slides
//! - Relocate: move one slide to a nearby position
//!
//! Pairwise moves only look `NEIGHBOURHOOD` positions ahead, which keeps one
//! pass near-linear on long sequences. Passes repeat until none improves.

use super::{SearchState, StopCondition, Termination};
use serde::{Deserialize, Serialize};
use slidewise_common::{PhotoId, SlideIndex, SlidePhotos};

/// Window for pairwise moves
pub const NEIGHBOURHOOD: usize = 64;

/// Free vertical photos considered for re-pairing and insertion
const MAX_FREE_VERTICALS: usize = 64;

/// Counters for one local-search run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSearchStats {
    pub passes: u64,
    pub moves_applied: u64,
}

impl LocalSearchStats {
    pub fn absorb(&mut self, other: LocalSearchStats) {
        self.passes += other.passes;
        self.moves_applied += other.moves_applied;
    }
}

/// Apply improving moves until a local optimum or the stop condition
///
/// Returns `None` as the reason when a local optimum was reached.
pub fn improve(
    state: &mut SearchState,
    stop: &StopCondition,
) -> (LocalSearchStats, Option<Termination>) {
    let mut stats = LocalSearchStats::default();
    loop {
        if let Some(reason) = stop.check() {
            return (stats, Some(reason));
        }
        stats.passes += 1;

        let applied = insert_pass(state, stop)
            + repair_pass(state, stop)
            + reverse_pass(state, stop)
            + swap_pass(state, stop)
            + relocate_pass(state, stop);

        stats.moves_applied += applied;
        if applied == 0 {
            return (stats, None);
        }
    }
}

/// Free vertical photos, capped
fn free_verticals(state: &SearchState) -> Vec<PhotoId> {
    let universe = state.universe();
    state
        .free_photos()
        .filter(|&p| universe.single_slide(p).is_none())
        .take(MAX_FREE_VERTICALS)
        .collect()
}

/// Slides that could be added right now
fn insertion_candidates(state: &SearchState) -> Vec<SlideIndex> {
    let universe = state.universe();
    if !universe.has_layout() {
        return (0..universe.len())
            .filter(|&s| state.is_available(s))
            .collect();
    }

    let mut candidates: Vec<SlideIndex> = state
        .free_photos()
        .filter_map(|p| universe.single_slide(p))
        .collect();
    let verticals = free_verticals(state);
    for (i, &a) in verticals.iter().enumerate() {
        for &b in &verticals[i + 1..] {
            if let Some(slide) = universe.pair_slide(a, b) {
                candidates.push(slide);
            }
        }
    }
    candidates
}

fn insert_pass(state: &mut SearchState, stop: &StopCondition) -> u64 {
    let mut applied = 0;
    for slide in insertion_candidates(state) {
        if stop.check().is_some() {
            break;
        }
        // an earlier move may have claimed a shared photo
        if !state.is_available(slide) {
            continue;
        }

        let insert = (0..=state.len())
            .map(|position| (state.gain_insert(position, slide), position))
            .max_by_key(|&(gain, position)| (gain, std::cmp::Reverse(position)));
        let replace = (0..state.len())
            .map(|position| (state.gain_substitute(&[(position, slide)]), position))
            .max_by_key(|&(gain, position)| (gain, std::cmp::Reverse(position)));

        match (insert, replace) {
            (Some((gain, position)), Some((replace_gain, _))) if gain > 0 && gain >= replace_gain => {
                state.insert(position, slide);
                applied += 1;
            }
            (Some((gain, position)), None) if gain > 0 => {
                state.insert(position, slide);
                applied += 1;
            }
            (_, Some((gain, position))) if gain > 0 => {
                state.substitute(&[(position, slide)]);
                applied += 1;
            }
            _ => {}
        }
    }
    applied
}

fn repair_pass(state: &mut SearchState, stop: &StopCondition) -> u64 {
    let universe = state.universe();
    if !universe.has_layout() {
        return 0;
    }

    let mut applied = 0;
    let mut free = free_verticals(state);
    let mut i = 0;
    while i < state.len() {
        if stop.check().is_some() {
            break;
        }
        if let SlidePhotos::Pair(a, b) = universe.slide(state.order()[i]).photos {
            if take_free_partner(state, &free, i, a, b) {
                free = free_verticals(state);
                applied += 1;
            } else if exchange_partners(state, i, a, b) {
                applied += 1;
            }
        }
        i += 1;
    }
    applied
}

/// Replace one photo of the pair at `i` with a free vertical
fn take_free_partner(
    state: &mut SearchState,
    free: &[PhotoId],
    i: usize,
    a: PhotoId,
    b: PhotoId,
) -> bool {
    let universe = state.universe();
    for &f in free {
        for keep in [a, b] {
            let Some(slide) = universe.pair_slide(keep, f) else {
                continue;
            };
            if state.gain_substitute(&[(i, slide)]) > 0 {
                state.substitute(&[(i, slide)]);
                return true;
            }
        }
    }
    false
}

/// Re-pair `(a, b)` at `i` with `(c, d)` at a later nearby position
fn exchange_partners(state: &mut SearchState, i: usize, a: PhotoId, b: PhotoId) -> bool {
    let universe = state.universe();
    let end = state.len().min(i + 1 + NEIGHBOURHOOD);
    for j in i + 1..end {
        let SlidePhotos::Pair(c, d) = universe.slide(state.order()[j]).photos else {
            continue;
        };
        for (x, y) in [((a, c), (b, d)), ((a, d), (b, c))] {
            let (Some(first), Some(second)) =
                (universe.pair_slide(x.0, x.1), universe.pair_slide(y.0, y.1))
            else {
                continue;
            };
            for subs in [[(i, first), (j, second)], [(i, second), (j, first)]] {
                if state.gain_substitute(&subs) > 0 {
                    state.substitute(&subs);
                    return true;
                }
            }
        }
    }
    false
}

fn reverse_pass(state: &mut SearchState, stop: &StopCondition) -> u64 {
    let mut applied = 0;
    for i in 0..state.len() {
        if stop.check().is_some() {
            break;
        }
        let end = state.len().min(i + 1 + NEIGHBOURHOOD);
        for j in i + 1..end {
            if state.gain_reverse(i, j) > 0 {
                state.reverse(i, j);
                applied += 1;
            }
        }
    }
    applied
}

fn swap_pass(state: &mut SearchState, stop: &StopCondition) -> u64 {
    let mut applied = 0;
    for i in 0..state.len() {
        if stop.check().is_some() {
            break;
        }
        let end = state.len().min(i + 1 + NEIGHBOURHOOD);
        // j = i + 1 is a two-slide reversal, already covered
        for j in i + 2..end {
            let subs = [(i, state.order()[j]), (j, state.order()[i])];
            if state.gain_substitute(&subs) > 0 {
                state.swap(i, j);
                applied += 1;
            }
        }
    }
    applied
}

fn relocate_pass(state: &mut SearchState, stop: &StopCondition) -> u64 {
    let mut applied = 0;
    let mut from = 0;
    while from < state.len() {
        if stop.check().is_some() {
            break;
        }
        if let Some(to) = best_relocation(state, from) {
            state.relocate(from, to);
            applied += 1;
        }
        from += 1;
    }
    applied
}

/// Best improving target for the slide at `from`, in post-removal positions
fn best_relocation(state: &SearchState, from: usize) -> Option<usize> {
    let order = state.order();
    let n = order.len();
    if n < 2 {
        return None;
    }
    let slide = order[from];
    let removal = state.gain_remove(from);

    // position k in the sequence with `from` taken out
    let reduced = |k: usize| -> Option<SlideIndex> {
        if k >= n - 1 {
            None
        } else if k < from {
            Some(order[k])
        } else {
            Some(order[k + 1])
        }
    };
    let weight = |a: Option<SlideIndex>, b: Option<SlideIndex>| -> i64 {
        match (a, b) {
            (Some(a), Some(b)) => state.weight(a, b),
            _ => 0,
        }
    };

    let low = from.saturating_sub(NEIGHBOURHOOD);
    let high = (n - 1).min(from + NEIGHBOURHOOD);
    let mut best: Option<(i64, usize)> = None;
    for to in low..=high {
        if to == from {
            continue;
        }
        let prev = to.checked_sub(1).and_then(reduced);
        let next = reduced(to);
        let gain = removal + weight(prev, Some(slide)) + weight(Some(slide), next) - weight(prev, next);
        if gain > 0 && best.map_or(true, |(g, _)| gain > g) {
            best = Some((gain, to));
        }
    }
    best.map(|(_, to)| to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::construct::greedy_construct;
    use slidewise_common::{Catalog, Slide, SlideUniverse, Solution, TagSet};

    fn universe(text: &str) -> SlideUniverse {
        SlideUniverse::generate(&Catalog::parse(text).unwrap())
    }

    fn run(state: &mut SearchState) -> LocalSearchStats {
        let (stats, reason) = improve(state, &StopCondition::unbounded());
        assert_eq!(reason, None);
        assert_eq!(state.total(), state.recompute_total());
        state.to_solution().validate(state.universe()).unwrap();
        stats
    }

    #[test]
    fn test_never_decreases_total() {
        let u = universe(
            "6\nH 3 a b c\nH 3 x y z\nH 3 b c d\nH 3 y z w\nH 3 c d e\nH 3 z w v\n",
        );
        let (mut state, _) = greedy_construct(&u, &StopCondition::unbounded());
        let before = state.total();
        run(&mut state);
        assert!(state.total() >= before);
    }

    #[test]
    fn test_reversal_fixes_bad_order() {
        // chain {a,b} {b,c} {c,d} scores 1 per link only in order
        let u = universe("3\nH 2 a b\nH 2 b c\nH 2 c d\n");
        let mut state = SearchState::from_solution(&u, &Solution::new(vec![0, 2, 1])).unwrap();
        assert_eq!(state.total(), 1);

        run(&mut state);
        assert_eq!(state.total(), 2);
    }

    #[test]
    fn test_inserts_unused_slides() {
        let u = universe("3\nH 2 a b\nH 2 b c\nH 2 c d\n");
        let mut state = SearchState::from_solution(&u, &Solution::new(vec![0])).unwrap();

        let stats = run(&mut state);
        assert_eq!(state.len(), 3);
        assert_eq!(state.total(), 2);
        assert!(stats.moves_applied >= 2);
    }

    #[test]
    fn test_replaces_worthless_slide() {
        // {q} links nothing; {a,c} between {a,b} and {c,d} scores 2
        let u = universe("4\nH 2 a b\nH 1 q\nH 2 c d\nH 2 a c\n");
        let mut state = SearchState::from_solution(&u, &Solution::new(vec![0, 1, 2])).unwrap();
        assert_eq!(state.total(), 0);

        run(&mut state);
        assert_eq!(state.order(), &[0, 3, 2]);
        assert_eq!(state.total(), 2);
        assert!(!state.contains_slide(1));
    }

    #[test]
    fn test_takes_free_vertical_partner() {
        // H0 {a,b,c,d}; (1,2) = {a,q} scores 1, (1,3) = {a,b,e,f} scores 2
        let u = universe("4\nH 4 a b c d\nV 1 a\nV 1 q\nV 3 b e f\n");
        let start = u.pair_slide(1, 2).unwrap();
        let mut state = SearchState::from_solution(&u, &Solution::new(vec![0, start])).unwrap();
        assert_eq!(state.total(), 1);

        run(&mut state);
        assert_eq!(state.total(), 2);
        assert_eq!(state.order(), &[0, u.pair_slide(1, 3).unwrap()]);
        assert!(!state.photo_in_use(2));
    }

    #[test]
    fn test_exchange_partners_between_pairs() {
        // H0 {p,q} then pairs; (1,3) {p,r} and (2,4) {q,s} beat (1,2), (3,4)
        let u = universe("5\nH 2 p q\nV 1 p\nV 1 q\nV 1 r\nV 1 s\n");
        let bad_a = u.pair_slide(1, 2).unwrap(); // {p,q}: 0 against H0
        let bad_b = u.pair_slide(3, 4).unwrap(); // {r,s}: 0 against anything
        let mut state =
            SearchState::from_solution(&u, &Solution::new(vec![0, bad_a, bad_b])).unwrap();
        assert_eq!(state.total(), 0);

        run(&mut state);
        assert!(state.total() >= 1, "re-pairing should find a scoring link");
    }

    #[test]
    fn test_arbitrary_universe_without_layout() {
        let mut vocab = slidewise_common::Vocabulary::new();
        let slides = vec![
            Slide {
                photos: SlidePhotos::Single(0),
                tags: vocab.tag_set(["a", "b"]),
            },
            Slide {
                photos: SlidePhotos::Single(1),
                tags: TagSet::default(),
            },
            Slide {
                photos: SlidePhotos::Single(2),
                tags: vocab.tag_set(["b", "c"]),
            },
        ];
        let u = SlideUniverse::from_slides(slides, 3);
        let mut state = SearchState::from_solution(&u, &Solution::new(vec![0, 1])).unwrap();

        run(&mut state);
        assert_eq!(state.total(), 1);
        assert!(state.contains_slide(2));
    }

    #[test]
    fn test_stops_when_cancelled() {
        let u = universe("3\nH 2 a b\nH 2 b c\nH 2 c d\n");
        let mut state = SearchState::from_solution(&u, &Solution::new(vec![0])).unwrap();
        let cancel = crate::search::CancelHandle::new();
        cancel.cancel();
        let stop = StopCondition::new(std::time::Duration::from_secs(60), cancel);

        let (_, reason) = improve(&mut state, &stop);
        assert_eq!(reason, Some(Termination::Cancelled));
        assert_eq!(state.order(), &[0]);
    }
}
