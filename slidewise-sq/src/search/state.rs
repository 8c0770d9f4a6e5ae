//! Search state: current sequence plus usage flags
//!
//! One [`SearchState`] belongs to one trajectory. It owns the slide order,
//! per-slide and per-photo usage flags and the running total, and keeps all
//! four consistent under every mutation. The universe is only borrowed.
//!
//! `gain_*` methods price a move without applying it; the matching mutation
//! applies it and updates the total by the same amount.

use slidewise_common::score::slide_score;
use slidewise_common::{PhotoId, SlideIndex, SlideUniverse, Solution};

#[derive(Debug, Clone)]
pub struct SearchState<'u> {
    universe: &'u SlideUniverse,
    order: Vec<SlideIndex>,
    slide_used: Vec<bool>,
    photo_used: Vec<bool>,
    total: u64,
}

impl<'u> SearchState<'u> {
    /// Empty sequence over `universe`
    pub fn new(universe: &'u SlideUniverse) -> Self {
        Self {
            universe,
            order: Vec::new(),
            slide_used: vec![false; universe.len()],
            photo_used: vec![false; universe.photo_count()],
            total: 0,
        }
    }

    /// Rebuild a state from a known-valid solution
    pub fn from_solution(
        universe: &'u SlideUniverse,
        solution: &Solution,
    ) -> slidewise_common::Result<Self> {
        solution.validate(universe)?;
        let mut state = Self::new(universe);
        for &slide in solution.order() {
            state.push(slide);
        }
        Ok(state)
    }

    pub fn universe(&self) -> &'u SlideUniverse {
        self.universe
    }

    pub fn order(&self) -> &[SlideIndex] {
        &self.order
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn to_solution(&self) -> Solution {
        Solution::new(self.order.clone())
    }

    pub fn contains_slide(&self, slide: SlideIndex) -> bool {
        self.slide_used[slide]
    }

    pub fn photo_in_use(&self, photo: PhotoId) -> bool {
        self.photo_used[photo]
    }

    /// Photos not shown by any placed slide, ascending
    pub fn free_photos(&self) -> impl Iterator<Item = PhotoId> + '_ {
        self.photo_used
            .iter()
            .enumerate()
            .filter(|(_, used)| !**used)
            .map(|(id, _)| id)
    }

    /// Slide unused and every photo it shows is free
    pub fn is_available(&self, slide: SlideIndex) -> bool {
        !self.slide_used[slide]
            && self
                .universe
                .slide(slide)
                .photos
                .iter()
                .all(|p| !self.photo_used[p])
    }

    /// Score between two slides as a signed weight
    #[inline]
    pub fn weight(&self, a: SlideIndex, b: SlideIndex) -> i64 {
        slide_score(self.universe.slide(a), self.universe.slide(b)) as i64
    }

    #[inline]
    fn weight_opt(&self, a: Option<SlideIndex>, b: Option<SlideIndex>) -> i64 {
        match (a, b) {
            (Some(a), Some(b)) => self.weight(a, b),
            _ => 0,
        }
    }

    fn at(&self, position: usize) -> Option<SlideIndex> {
        self.order.get(position).copied()
    }

    fn before(&self, position: usize) -> Option<SlideIndex> {
        position.checked_sub(1).and_then(|p| self.at(p))
    }

    /// Recompute the objective from scratch
    pub fn recompute_total(&self) -> u64 {
        self.order
            .windows(2)
            .map(|w| self.weight(w[0], w[1]) as u64)
            .sum()
    }

    fn adjust(&mut self, delta: i64) {
        self.total = (self.total as i64 + delta) as u64;
    }

    fn mark(&mut self, slide: SlideIndex, used: bool) {
        self.slide_used[slide] = used;
        for photo in self.universe.slide(slide).photos.iter() {
            self.photo_used[photo] = used;
        }
    }

    // === Pricing ===

    /// Gain of inserting `slide` so it lands at `position` (0..=len)
    pub fn gain_insert(&self, position: usize, slide: SlideIndex) -> i64 {
        let prev = self.before(position);
        let next = self.at(position);
        self.weight_opt(prev, Some(slide)) + self.weight_opt(Some(slide), next)
            - self.weight_opt(prev, next)
    }

    /// Gain of removing the slide at `position`
    pub fn gain_remove(&self, position: usize) -> i64 {
        let slide = self.order[position];
        let prev = self.before(position);
        let next = self.at(position + 1);
        self.weight_opt(prev, next)
            - self.weight_opt(prev, Some(slide))
            - self.weight_opt(Some(slide), next)
    }

    /// Gain of reversing `order[i..=j]`
    ///
    /// The score is symmetric, so only the two boundary edges change.
    pub fn gain_reverse(&self, i: usize, j: usize) -> i64 {
        debug_assert!(i < j && j < self.order.len());
        let prev = self.before(i);
        let next = self.at(j + 1);
        let (first, last) = (self.order[i], self.order[j]);
        self.weight_opt(prev, Some(last)) + self.weight_opt(Some(first), next)
            - self.weight_opt(prev, Some(first))
            - self.weight_opt(Some(last), next)
    }

    /// Gain of putting each `(position, slide)` in place of what is there
    ///
    /// Positions must be distinct. Availability is the caller's concern.
    pub fn gain_substitute(&self, subs: &[(usize, SlideIndex)]) -> i64 {
        let n = self.order.len();
        let lookup = |p: usize| -> SlideIndex {
            subs.iter()
                .find(|(pos, _)| *pos == p)
                .map(|(_, s)| *s)
                .unwrap_or(self.order[p])
        };

        // Left endpoints of every edge touching a substituted position
        let mut edges: Vec<usize> = Vec::with_capacity(subs.len() * 2);
        for &(p, _) in subs {
            if p > 0 {
                edges.push(p - 1);
            }
            if p + 1 < n {
                edges.push(p);
            }
        }
        edges.sort_unstable();
        edges.dedup();

        edges
            .into_iter()
            .map(|e| {
                self.weight(lookup(e), lookup(e + 1)) - self.weight(self.order[e], self.order[e + 1])
            })
            .sum()
    }

    // === Mutations ===

    /// Append a slide
    pub fn push(&mut self, slide: SlideIndex) {
        let len = self.order.len();
        self.insert(len, slide);
    }

    /// Insert an available slide at `position` (0..=len)
    pub fn insert(&mut self, position: usize, slide: SlideIndex) {
        debug_assert!(self.is_available(slide), "slide {} not available", slide);
        let delta = self.gain_insert(position, slide);
        self.order.insert(position, slide);
        self.mark(slide, true);
        self.adjust(delta);
    }

    /// Remove and return the slide at `position`, freeing its photos
    pub fn remove(&mut self, position: usize) -> SlideIndex {
        let delta = self.gain_remove(position);
        let slide = self.order.remove(position);
        self.mark(slide, false);
        self.adjust(delta);
        slide
    }

    /// Reverse `order[i..=j]`
    pub fn reverse(&mut self, i: usize, j: usize) {
        let delta = self.gain_reverse(i, j);
        self.order[i..=j].reverse();
        self.adjust(delta);
    }

    /// Exchange the slides at two positions
    pub fn swap(&mut self, i: usize, j: usize) {
        let delta = self.gain_substitute(&[(i, self.order[j]), (j, self.order[i])]);
        self.order.swap(i, j);
        self.adjust(delta);
    }

    /// Move the slide at `from` so it lands at `to` in the resulting order
    pub fn relocate(&mut self, from: usize, to: usize) {
        let slide = self.remove(from);
        self.insert(to, slide);
    }

    /// Replace slides at distinct positions
    ///
    /// Old slides are released before new ones are claimed, so a replacement
    /// may reuse photos of the slides it displaces.
    pub fn substitute(&mut self, subs: &[(usize, SlideIndex)]) {
        let delta = self.gain_substitute(subs);
        for &(position, _) in subs {
            let old = self.order[position];
            self.mark(old, false);
        }
        for &(position, slide) in subs {
            debug_assert!(self.is_available(slide), "slide {} not available", slide);
            self.order[position] = slide;
            self.mark(slide, true);
        }
        self.adjust(delta);
    }

    /// Rotate `order[start..end]` left by `mid - start`: `A B C D` -> `A C B D`
    pub fn exchange_segments(&mut self, start: usize, mid: usize, end: usize) {
        debug_assert!(start <= mid && mid <= end && end <= self.order.len());
        self.order[start..end].rotate_left(mid - start);
        self.total = self.recompute_total();
    }
}
