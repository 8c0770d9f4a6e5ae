//! Common error types for Slidewise

use thiserror::Error;

/// Common result type for Slidewise operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Slidewise crates
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed photo input (1-based line number)
    #[error("Input format error at line {line}: {message}")]
    InputFormat { line: usize, message: String },

    /// Malformed solution file (1-based line number)
    #[error("Solution format error at line {line}: {message}")]
    SolutionFormat { line: usize, message: String },

    /// Solution violates slide or photo uniqueness
    #[error("Invalid solution: {0}")]
    InvalidSolution(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn input(line: usize, message: impl Into<String>) -> Self {
        Error::InputFormat {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn solution(line: usize, message: impl Into<String>) -> Self {
        Error::SolutionFormat {
            line,
            message: message.into(),
        }
    }
}
