//! Error types for generation and simulation.
//!
//! Every variant except [`Error::InvalidWeights`] means the generator or the
//! simulator itself is broken, never the generated program.

use thiserror::Error;

/// Errors raised by the oracle.
#[derive(Debug, Error)]
pub enum Error {
    /// Generator weights cannot make progress.
    #[error("invalid kind weights: {0}")]
    InvalidWeights(String),

    /// A fault escaped the catch-all, or the root's inbound cell was left set.
    #[error("root is not quiescent: inbound {inbound}, outbound {outbound}")]
    RootNotQuiescent {
        /// Residual inbound fault at the root.
        inbound: u64,
        /// Fault still propagating out of the root.
        outbound: u64,
    },

    /// Stamped numbers of one counter are not exactly `1..=expected`.
    #[error("{counter} counter mismatch: expected 1..={expected}, stamped {stamped:?}")]
    CounterMismatch {
        /// Which counter (`step` or `fault`).
        counter: &'static str,
        /// Final counter value.
        expected: u64,
        /// Sorted stamped values found in the tree.
        stamped: Vec<u64>,
    },

    /// An interception expects a fault id that was never raised.
    #[error("interception expects fault {captured}, but only {faults} were raised")]
    UnknownCapture {
        /// Stamped capture value.
        captured: u64,
        /// Final fault counter value.
        faults: u64,
    },

    /// Tree model error.
    #[error(transparent)]
    Tree(#[from] rewind_tree::Error),
}

/// Result type alias for oracle operations.
pub type Result<T> = std::result::Result<T, Error>;
