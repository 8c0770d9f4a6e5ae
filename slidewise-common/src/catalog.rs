//! Photo catalog
//!
//! **Purpose:** Turn raw photo records into typed, immutable [`Photo`] entities.
//!
//! Tag strings are interned into a catalog-wide [`Vocabulary`]; each photo
//! carries a [`TagSet`] of sorted, deduplicated tag ids. The vocabulary maps
//! ids back to the original keyword strings.

use crate::format::parse_input;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Photo identifier: 0-based position in input order
pub type PhotoId = usize;

/// Interned tag identifier
pub type TagId = u32;

/// Photo orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Parse an input-file orientation symbol (`H` or `V`)
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "H" => Some(Orientation::Horizontal),
            "V" => Some(Orientation::Vertical),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "H",
            Orientation::Vertical => "V",
        }
    }
}

/// Sorted, deduplicated set of tag ids
///
/// Ordering makes intersection counting a single merge pass, which is all the
/// score function needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagSet(Vec<TagId>);

impl TagSet {
    /// Build a set from arbitrary ids (duplicates collapse)
    pub fn from_ids<I: IntoIterator<Item = TagId>>(ids: I) -> Self {
        let mut ids: Vec<TagId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        TagSet(ids)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[TagId] {
        &self.0
    }

    pub fn contains(&self, id: TagId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Number of tags present in both sets
    pub fn intersection_len(&self, other: &TagSet) -> usize {
        let (a, b) = (&self.0, &other.0);
        let (mut i, mut j, mut common) = (0, 0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    common += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        common
    }

    /// Set union (merge of two sorted lists)
    pub fn union(&self, other: &TagSet) -> TagSet {
        let (a, b) = (&self.0, &other.0);
        let mut merged = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => {
                    merged.push(a[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    merged.push(b[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    merged.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&a[i..]);
        merged.extend_from_slice(&b[j..]);
        TagSet(merged)
    }
}

impl FromIterator<TagId> for TagSet {
    fn from_iter<I: IntoIterator<Item = TagId>>(iter: I) -> Self {
        TagSet::from_ids(iter)
    }
}

/// Bidirectional tag string <-> id mapping
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    names: Vec<String>,
    index: HashMap<String, TagId>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, assigning the next free id on first sight
    pub fn intern(&mut self, name: &str) -> TagId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len() as TagId;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, name: &str) -> Option<TagId> {
        self.index.get(name).copied()
    }

    pub fn resolve(&self, id: TagId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// Intern every name and collect the resulting set
    pub fn tag_set<I, S>(&mut self, names: I) -> TagSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|n| self.intern(n.as_ref())).collect()
    }

    /// Resolve a set back to its tag strings (sorted by string)
    pub fn names(&self, tags: &TagSet) -> Vec<&str> {
        let mut names: Vec<&str> = tags.ids().iter().filter_map(|&id| self.resolve(id)).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Raw photo record as read from the input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPhoto {
    pub orientation: String,
    pub tags: Vec<String>,
}

impl RawPhoto {
    pub fn new<I, S>(orientation: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            orientation: orientation.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Immutable photo entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: PhotoId,
    pub orientation: Orientation,
    pub tags: TagSet,
}

/// Catalog summary used for logging and run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub photos: usize,
    pub horizontal: usize,
    pub vertical: usize,
    pub distinct_tags: usize,
    /// H + C(V, 2)
    pub candidate_slides: u64,
}

/// Loaded photo collection plus its tag vocabulary
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    photos: Vec<Photo>,
    vocabulary: Vocabulary,
}

impl Catalog {
    /// Build photos from raw records
    ///
    /// Photo ids are assigned by record position. Errors report the line the
    /// record occupies in the standard input layout (count header on line 1).
    ///
    /// # Errors
    ///
    /// [`Error::InputFormat`] when an orientation symbol is not `H` or `V`.
    pub fn load(records: &[RawPhoto]) -> Result<Self> {
        let mut vocabulary = Vocabulary::new();
        let mut photos = Vec::with_capacity(records.len());

        for (id, record) in records.iter().enumerate() {
            let orientation = Orientation::from_symbol(&record.orientation).ok_or_else(|| {
                Error::input(
                    id + 2,
                    format!(
                        "photo {}: unknown orientation '{}' (expected H or V)",
                        id, record.orientation
                    ),
                )
            })?;
            let tags = vocabulary.tag_set(&record.tags);
            photos.push(Photo {
                id,
                orientation,
                tags,
            });
        }

        Ok(Self { photos, vocabulary })
    }

    /// Parse input-file text and load it
    pub fn parse(text: &str) -> Result<Self> {
        let records = parse_input(text)?;
        Self::load(&records)
    }

    /// Read, parse and load an input file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn get(&self, id: PhotoId) -> Option<&Photo> {
        self.photos.get(id)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn stats(&self) -> CatalogStats {
        let vertical = self
            .photos
            .iter()
            .filter(|p| p.orientation == Orientation::Vertical)
            .count();
        let horizontal = self.photos.len() - vertical;
        let v = vertical as u64;
        CatalogStats {
            photos: self.photos.len(),
            horizontal,
            vertical,
            distinct_tags: self.vocabulary.len(),
            candidate_slides: horizontal as u64 + v * v.saturating_sub(1) / 2,
        }
    }
}
