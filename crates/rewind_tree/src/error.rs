//! Error types for tree construction and (de)serialization.

use thiserror::Error;

/// Errors that can occur while building or loading a tree.
#[derive(Debug, Error)]
pub enum Error {
    /// An interception was registered as a deferred entry.
    ///
    /// Capture from a deferred call that does nothing else has no defined
    /// meaning, so such entries are rejected at construction.
    #[error("an interception cannot be registered as a deferred entry")]
    DeferredInterception,

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, Error>;
