//! Error types for emission.

use thiserror::Error;

/// Errors that can occur during emission.
#[derive(Debug, Error)]
pub enum Error {
    /// Emitted text falls outside the fixed statement grammar.
    ///
    /// The emitter is valid by construction, so this is always an emitter bug.
    #[error("invalid emitted syntax at line {line} ({reason}): {text}")]
    InvalidSyntax {
        /// 1-based line within the emitted body.
        line: usize,
        /// Offending line.
        text: String,
        /// What rule the line breaks.
        reason: &'static str,
    },
}

/// Result type alias for emission.
pub type Result<T> = std::result::Result<T, Error>;
