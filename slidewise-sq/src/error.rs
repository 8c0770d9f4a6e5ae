//! Error types for slidewise-sq
//!
//! Wraps the shared library errors and adds the optimizer's own failure modes.

use thiserror::Error;

/// Main error type for slidewise-sq
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog, solution, config or file errors from slidewise-common
    #[error(transparent)]
    Common(#[from] slidewise_common::Error),

    /// A search worker panicked or was aborted
    #[error("Search worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// Run report could not be serialized
    #[error("Report serialization error: {0}")]
    Report(#[from] serde_json::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using slidewise-sq Error
pub type Result<T> = std::result::Result<T, Error>;
