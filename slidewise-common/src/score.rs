//! Interest score between two slides
//!
//! `score(A, B) = min(|A ∩ B|, |A \ B|, |B \ A|)`
//!
//! A transition is interesting only when the slides share some tags and each
//! still brings tags of its own.

use crate::catalog::TagSet;
use crate::slides::Slide;

/// Interest score between two tag sets
pub fn score(a: &TagSet, b: &TagSet) -> u32 {
    let common = a.intersection_len(b);
    let only_a = a.len() - common;
    let only_b = b.len() - common;
    common.min(only_a).min(only_b) as u32
}

/// Interest score between two slides
#[inline]
pub fn slide_score(a: &Slide, b: &Slide) -> u32 {
    score(&a.tags, &b.tags)
}

/// Best score `tags` could ever reach against any other set
///
/// `min(common, only_a, ...)` is bounded by `common + only_a = |A|` halved.
#[inline]
pub fn score_ceiling(tags: &TagSet) -> u32 {
    (tags.len() / 2) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Vocabulary;

    fn sets(a: &[&str], b: &[&str]) -> (TagSet, TagSet) {
        let mut vocab = Vocabulary::new();
        let a = vocab.tag_set(a);
        let b = vocab.tag_set(b);
        (a, b)
    }

    #[test]
    fn test_worked_example() {
        let (a, b) = sets(&["a", "b", "c"], &["b", "c", "d"]);
        assert_eq!(score(&a, &b), 1);
    }

    #[test]
    fn test_symmetric() {
        let cases: &[(&[&str], &[&str])] = &[
            (&["a", "b", "c", "d"], &["c", "d", "e"]),
            (&["x"], &["x", "y", "z"]),
            (&["p", "q", "r", "s", "t"], &["q", "r", "s", "u", "v", "w"]),
            (&[], &["a"]),
        ];
        for (left, right) in cases {
            let (a, b) = sets(left, right);
            assert_eq!(score(&a, &b), score(&b, &a), "{:?} vs {:?}", left, right);
        }
    }

    #[test]
    fn test_zero_when_disjoint() {
        let (a, b) = sets(&["a", "b"], &["c", "d"]);
        assert_eq!(score(&a, &b), 0);
    }

    #[test]
    fn test_zero_when_identical_or_subset() {
        let (a, b) = sets(&["a", "b", "c"], &["a", "b", "c"]);
        assert_eq!(score(&a, &b), 0);

        let (a, b) = sets(&["a", "b"], &["a", "b", "c", "d"]);
        assert_eq!(score(&a, &b), 0);
    }

    #[test]
    fn test_zero_when_empty() {
        let (a, b) = sets(&[], &["a", "b"]);
        assert_eq!(score(&a, &b), 0);
        assert_eq!(score(&a, &a), 0);
    }

    #[test]
    fn test_min_of_three_terms() {
        // common = 3, only_a = 2, only_b = 4
        let (a, b) = sets(
            &["c1", "c2", "c3", "a1", "a2"],
            &["c1", "c2", "c3", "b1", "b2", "b3", "b4"],
        );
        assert_eq!(score(&a, &b), 2);

        // common = 1 is the bottleneck
        let (a, b) = sets(&["c", "a1", "a2", "a3"], &["c", "b1", "b2"]);
        assert_eq!(score(&a, &b), 1);
    }

    #[test]
    fn test_ceiling_bounds_score() {
        let (a, b) = sets(&["c1", "c2", "a1", "a2"], &["c1", "c2", "b1", "b2"]);
        assert_eq!(score(&a, &b), 2);
        assert_eq!(score_ceiling(&a), 2);

        let (a, b) = sets(&["a", "b", "c"], &["b", "c", "d"]);
        assert!(score(&a, &b) <= score_ceiling(&a));
    }
}
