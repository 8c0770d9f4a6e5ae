//! Solution model and validation
//!
//! A [`Solution`] is an ordered list of slide indices into a
//! [`SlideUniverse`]. It is valid when no slide repeats and no photo is shown
//! twice. The empty solution is valid and scores 0.

use crate::catalog::{Catalog, Orientation, PhotoId, TagSet};
use crate::score::{score, slide_score};
use crate::slides::{SlideIndex, SlideUniverse};
use crate::{Error, Result};

/// Ordered slide selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    order: Vec<SlideIndex>,
}

impl Solution {
    pub fn new(order: Vec<SlideIndex>) -> Self {
        Self { order }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn order(&self) -> &[SlideIndex] {
        &self.order
    }

    pub fn into_order(self) -> Vec<SlideIndex> {
        self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of interest scores over consecutive slides
    ///
    /// # Panics
    ///
    /// If an index is outside `universe`; call [`Self::validate`] first on
    /// untrusted solutions.
    pub fn total_score(&self, universe: &SlideUniverse) -> u64 {
        self.order
            .windows(2)
            .map(|w| slide_score(universe.slide(w[0]), universe.slide(w[1])) as u64)
            .sum()
    }

    /// Check index range, slide uniqueness and photo uniqueness
    pub fn validate(&self, universe: &SlideUniverse) -> Result<()> {
        let mut slide_used = vec![false; universe.len()];
        let mut photo_used = vec![false; universe.photo_count()];

        for (position, &index) in self.order.iter().enumerate() {
            let slide = universe.get(index).ok_or_else(|| {
                Error::InvalidSolution(format!(
                    "position {}: slide {} outside universe of {}",
                    position,
                    index,
                    universe.len()
                ))
            })?;
            if std::mem::replace(&mut slide_used[index], true) {
                return Err(Error::InvalidSolution(format!(
                    "position {}: slide {} used twice",
                    position, index
                )));
            }
            for photo in slide.photos.iter() {
                if std::mem::replace(&mut photo_used[photo], true) {
                    return Err(Error::InvalidSolution(format!(
                        "position {}: photo {} used twice",
                        position, photo
                    )));
                }
            }
        }
        Ok(())
    }

    /// Photo-id groups in slide order, ready for the solution writer
    pub fn photo_groups(&self, universe: &SlideUniverse) -> Vec<Vec<PhotoId>> {
        self.order
            .iter()
            .map(|&index| universe.slide(index).photos.to_vec())
            .collect()
    }
}

/// Check that no photo appears in more than one group
///
/// Works on groups read back from a solution file, where slide indices are
/// no longer known.
pub fn check_photo_groups(groups: &[Vec<PhotoId>]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for (position, group) in groups.iter().enumerate() {
        for &photo in group {
            if !seen.insert(photo) {
                return Err(Error::InvalidSolution(format!(
                    "position {}: photo {} used twice",
                    position, photo
                )));
            }
        }
    }
    Ok(())
}

/// Score photo-id groups read from a solution file against their catalog
///
/// Each group must be one horizontal photo or two distinct vertical photos,
/// every id must exist, and no photo may repeat.
pub fn score_photo_groups(catalog: &Catalog, groups: &[Vec<PhotoId>]) -> Result<u64> {
    check_photo_groups(groups)?;

    let mut tag_sets: Vec<TagSet> = Vec::with_capacity(groups.len());
    for (position, group) in groups.iter().enumerate() {
        let mut photos = Vec::with_capacity(group.len());
        for &id in group {
            let photo = catalog.get(id).ok_or_else(|| {
                Error::InvalidSolution(format!(
                    "position {}: photo {} outside catalog of {}",
                    position,
                    id,
                    catalog.len()
                ))
            })?;
            photos.push(photo);
        }

        let tags = match photos.as_slice() {
            [single] if single.orientation == Orientation::Horizontal => single.tags.clone(),
            [first, second]
                if first.orientation == Orientation::Vertical
                    && second.orientation == Orientation::Vertical =>
            {
                first.tags.union(&second.tags)
            }
            _ => {
                return Err(Error::InvalidSolution(format!(
                    "position {}: a slide is one horizontal or two vertical photos",
                    position
                )))
            }
        };
        tag_sets.push(tags);
    }

    Ok(tag_sets
        .windows(2)
        .map(|w| score(&w[0], &w[1]) as u64)
        .sum())
}
