//! Shared fixtures for slidewise-sq integration tests

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slidewise_common::{Catalog, SlideUniverse};
use std::fmt::Write;

/// Catalog from the problem statement's worked example
pub const SAMPLE_CATALOG: &str = "4\nH 2 cat dog\nH 2 dog bird\nV 1 cat\nV 1 bird\n";

/// Seeded random catalog in input-file format
///
/// Tags come from a small pool so most slide pairs share something.
pub fn random_catalog_text(seed: u64, photos: usize, tag_pool: usize) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut text = format!("{}\n", photos);
    for _ in 0..photos {
        let orientation = if rng.gen_bool(0.5) { "H" } else { "V" };
        let count = rng.gen_range(1..=5);
        let tags: Vec<String> = (0..count)
            .map(|_| format!("t{}", rng.gen_range(0..tag_pool)))
            .collect();
        let _ = writeln!(text, "{} {} {}", orientation, tags.len(), tags.join(" "));
    }
    text
}

pub fn universe_from(text: &str) -> (Catalog, SlideUniverse) {
    let catalog = Catalog::parse(text).expect("fixture catalog parses");
    let universe = SlideUniverse::generate(&catalog);
    (catalog, universe)
}
