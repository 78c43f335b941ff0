//! Error types shared by the registry, executor and benchmark harness.

use thiserror::Error;

/// Errors surfaced by the public operations of this crate.
///
/// Every error is local to the call that produced it: the registry, the
/// caller's thread count and previously completed benchmark results are left
/// untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or zero-dimension image, or otherwise unusable arguments.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Filter already registered: {0}")]
    DuplicateFilter(String),

    /// A primitive failed on at least one band. Raised only after every
    /// in-flight band task has been joined.
    #[error("Filter '{filter}' failed: {message}")]
    PrimitiveFailure { filter: String, message: String },

    #[error("A benchmark run is already active")]
    BenchmarkBusy,

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by a filter primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PrimitiveError {
    pub message: String,
}

impl PrimitiveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Error {
    pub(crate) fn primitive(filter: &str, message: impl Into<String>) -> Self {
        Error::PrimitiveFailure {
            filter: filter.to_string(),
            message: message.into(),
        }
    }
}
