//! # Slidewise Common Library
//!
//! Shared code for the Slidewise slideshow tools:
//! - Photo catalog and tag vocabulary
//! - Candidate slide generation
//! - Interest score function
//! - Solution model, validation and file formats
//! - Configuration loading

pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod score;
pub mod slides;
pub mod solution;

pub use catalog::{Catalog, Orientation, Photo, PhotoId, RawPhoto, TagSet, Vocabulary};
pub use error::{Error, Result};
pub use score::score;
pub use slides::{Slide, SlideIndex, SlidePhotos, SlideUniverse};
pub use solution::Solution;
