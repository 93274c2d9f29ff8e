//! Error types for the fuzz harness.

use rewind_emit::AssertionMismatch;
use thiserror::Error;

/// Errors that stop a fuzz run.
#[derive(Debug, Error)]
pub enum Error {
    /// Generation or simulation broke an invariant.
    #[error("oracle defect: {0}")]
    Oracle(#[from] rewind_oracle::Error),

    /// The emitter produced text outside its grammar.
    #[error("emitter defect: {0}")]
    Emit(#[from] rewind_emit::Error),

    /// Tree model error.
    #[error(transparent)]
    Tree(#[from] rewind_tree::Error),

    /// A runtime check disagreed with the oracle.
    #[error("assertion mismatch: {0}")]
    Mismatch(#[from] AssertionMismatch),

    /// Execution reached a leaf the oracle marked unreachable.
    #[error("executed a {kind} the oracle never reached")]
    Unreached {
        /// Leaf kind.
        kind: &'static str,
    },

    /// A fault escaped the whole program.
    #[error("fault {fault} escaped the program")]
    Escaped {
        /// Escaping fault id.
        fault: u64,
    },

    /// The toolchain failed without a recognizable assertion message.
    #[error("toolchain failed ({status}): {stderr}")]
    Toolchain {
        /// Exit status description.
        status: String,
        /// Captured diagnostic output.
        stderr: String,
    },

    /// The toolchain did not finish in time.
    #[error("toolchain timed out after {secs}s")]
    Timeout {
        /// Configured limit in seconds.
        secs: u64,
    },

    /// A replayed program differs from the one a manifest recorded.
    #[error("program hash mismatch: manifest {expected}, regenerated {found}")]
    HashMismatch {
        /// Hash stored in the manifest.
        expected: String,
        /// Hash of the regenerated program.
        found: String,
    },

    /// A failure tagged with the iteration that produced it.
    #[error("iteration {iteration} failed: {source}")]
    Iteration {
        /// Failing iteration index.
        iteration: u64,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML error.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Tags an error with the iteration that produced it.
    #[must_use]
    pub fn at(self, iteration: u64) -> Self {
        Self::Iteration {
            iteration,
            source: Box::new(self),
        }
    }

    /// Returns the failing iteration, if known.
    #[must_use]
    pub const fn iteration(&self) -> Option<u64> {
        match self {
            Self::Iteration { iteration, .. } => Some(*iteration),
            _ => None,
        }
    }
}

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;
