//! # Slidewise Sequencer Library (slidewise-sq)
//!
//! Slideshow sequence optimizer.
//!
//! **Purpose:** Choose and order candidate slides so that the summed
//! interest score between consecutive slides is as high as possible within a
//! wall-clock budget, then report on the run.
//!
//! **Architecture:** Greedy construction, local search and seeded iterated
//! local search over an explicit search state; parallel trajectories run on
//! Tokio's blocking pool.

pub mod error;
pub mod report;
pub mod search;

pub use error::{Error, Result};
pub use report::{CliFormatter, RunReport};
pub use search::{optimize, CancelHandle, SearchOutcome, SearchParams, Sequencer, Termination};
