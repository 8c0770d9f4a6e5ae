//! Slide generator
//!
//! **Purpose:** Build the candidate slide universe from a catalog.
//!
//! **Layout (deterministic, input order only):**
//! 1. One singleton slide per horizontal photo, in input order
//! 2. One paired slide per unordered pair `(i, j)`, `i < j`, of vertical
//!    photos, lexicographic over the verticals' input order
//!
//! The pair block is quadratic in the vertical count, so the universe records
//! where each vertical sits and recovers a pair's slide index arithmetically
//! instead of keeping a lookup table.

use crate::catalog::{Catalog, Orientation, Photo, PhotoId, TagSet};
use tracing::{debug, warn};

/// Index into a [`SlideUniverse`]
pub type SlideIndex = usize;

/// Above this many candidates the generator logs a memory warning
const LARGE_UNIVERSE_WARN: u64 = 20_000_000;

/// Photo content of a slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlidePhotos {
    Single(PhotoId),
    Pair(PhotoId, PhotoId),
}

impl SlidePhotos {
    pub fn len(&self) -> usize {
        match self {
            SlidePhotos::Single(_) => 1,
            SlidePhotos::Pair(..) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, id: PhotoId) -> bool {
        match *self {
            SlidePhotos::Single(a) => a == id,
            SlidePhotos::Pair(a, b) => a == id || b == id,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = PhotoId> {
        let (first, second) = match *self {
            SlidePhotos::Single(a) => (a, None),
            SlidePhotos::Pair(a, b) => (a, Some(b)),
        };
        std::iter::once(first).chain(second)
    }

    pub fn to_vec(&self) -> Vec<PhotoId> {
        self.iter().collect()
    }
}

/// One displayable unit: a horizontal photo or two vertical photos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub photos: SlidePhotos,
    /// Union of the constituent photos' tags
    pub tags: TagSet,
}

impl Slide {
    pub fn single(photo: &Photo) -> Self {
        Self {
            photos: SlidePhotos::Single(photo.id),
            tags: photo.tags.clone(),
        }
    }

    pub fn pair(first: &Photo, second: &Photo) -> Self {
        debug_assert_ne!(first.id, second.id, "paired slide needs two distinct photos");
        Self {
            photos: SlidePhotos::Pair(first.id, second.id),
            tags: first.tags.union(&second.tags),
        }
    }
}

/// Generator layout: photo id -> rank among its orientation
///
/// A horizontal photo's rank is its slide index; vertical ranks address the
/// pair block that starts right after the singles.
#[derive(Debug, Clone)]
struct Layout {
    /// First slide index of the pair block (= horizontal count)
    offset: usize,
    /// Vertical photo ids in input order
    verticals: Vec<PhotoId>,
    /// Photo id -> rank among verticals
    rank: Vec<Option<usize>>,
    /// Photo id -> rank among horizontals
    single_rank: Vec<Option<usize>>,
}

impl Layout {
    fn single_of(&self, photo: PhotoId) -> Option<SlideIndex> {
        *self.single_rank.get(photo)?
    }

    fn pair_of(&self, a: PhotoId, b: PhotoId) -> Option<SlideIndex> {
        let ra = (*self.rank.get(a)?)?;
        let rb = (*self.rank.get(b)?)?;
        if ra == rb {
            return None;
        }
        let (i, j) = if ra < rb { (ra, rb) } else { (rb, ra) };
        let v = self.verticals.len();
        // Pairs before row i: i*(v-1) - i*(i-1)/2
        let row_start = i * (2 * v - i - 1) / 2;
        Some(self.offset + row_start + (j - i - 1))
    }
}

/// Candidate Universe: every slide the catalog can form, indexed 0..S-1
#[derive(Debug, Clone)]
pub struct SlideUniverse {
    slides: Vec<Slide>,
    photo_count: usize,
    layout: Option<Layout>,
}

impl SlideUniverse {
    /// Generate the full candidate universe for a catalog
    pub fn generate(catalog: &Catalog) -> Self {
        generate(catalog.photos())
    }

    /// Wrap an arbitrary slide list
    ///
    /// The pair lookup is unavailable for such universes.
    ///
    /// # Panics
    ///
    /// If a slide references a photo id `>= photo_count`.
    pub fn from_slides(slides: Vec<Slide>, photo_count: usize) -> Self {
        for (index, slide) in slides.iter().enumerate() {
            for id in slide.photos.iter() {
                assert!(
                    id < photo_count,
                    "slide {} references photo {} outside catalog of {}",
                    index,
                    id,
                    photo_count
                );
            }
        }
        Self {
            slides,
            photo_count,
            layout: None,
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// # Panics
    ///
    /// If `index` is out of range.
    pub fn slide(&self, index: SlideIndex) -> &Slide {
        &self.slides[index]
    }

    pub fn get(&self, index: SlideIndex) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Number of photos in the source catalog (ids are `0..photo_count`)
    pub fn photo_count(&self) -> usize {
        self.photo_count
    }

    /// Slide index pairing vertical photos `a` and `b`, in either order
    ///
    /// `None` when either photo is not vertical, `a == b`, or the universe was
    /// not produced by the generator.
    pub fn pair_slide(&self, a: PhotoId, b: PhotoId) -> Option<SlideIndex> {
        self.layout.as_ref()?.pair_of(a, b)
    }

    /// Singleton slide showing horizontal photo `photo`
    pub fn single_slide(&self, photo: PhotoId) -> Option<SlideIndex> {
        self.layout.as_ref()?.single_of(photo)
    }

    /// Whether [`Self::pair_slide`] and [`Self::single_slide`] are available
    pub fn has_layout(&self) -> bool {
        self.layout.is_some()
    }
}

/// Build the candidate universe from photos in input order
pub fn generate(photos: &[Photo]) -> SlideUniverse {
    let horizontals: Vec<&Photo> = photos
        .iter()
        .filter(|p| p.orientation == Orientation::Horizontal)
        .collect();
    let verticals: Vec<&Photo> = photos
        .iter()
        .filter(|p| p.orientation == Orientation::Vertical)
        .collect();

    let v = verticals.len() as u64;
    let expected = horizontals.len() as u64 + v * v.saturating_sub(1) / 2;
    if expected > LARGE_UNIVERSE_WARN {
        warn!(
            "Generating {} candidate slides from {} vertical photos; expect heavy memory use",
            expected,
            verticals.len()
        );
    }

    let mut slides = Vec::with_capacity(expected as usize);
    slides.extend(horizontals.iter().map(|p| Slide::single(p)));

    for (i, first) in verticals.iter().enumerate() {
        for second in &verticals[i + 1..] {
            slides.push(Slide::pair(first, second));
        }
    }

    let photo_count = photos.iter().map(|p| p.id + 1).max().unwrap_or(0);
    let mut rank = vec![None; photo_count];
    for (r, p) in verticals.iter().enumerate() {
        rank[p.id] = Some(r);
    }
    let mut single_rank = vec![None; photo_count];
    for (r, p) in horizontals.iter().enumerate() {
        single_rank[p.id] = Some(r);
    }

    debug!(
        "Generated {} slides ({} singles, {} pairs)",
        slides.len(),
        horizontals.len(),
        slides.len() - horizontals.len()
    );

    SlideUniverse {
        slides,
        photo_count,
        layout: Some(Layout {
            offset: horizontals.len(),
            verticals: verticals.iter().map(|p| p.id).collect(),
            rank,
            single_rank,
        }),
    }
}
