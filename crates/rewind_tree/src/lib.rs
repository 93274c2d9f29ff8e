//! Action/scope tree model for Rewind.
//!
//! This crate provides:
//! - The four-case [`Action`] sum type (step, signal, interception, scope)
//! - [`Entry`] registrations that pair an action with a deferred flag
//! - [`Program`], the root scope wrapped in a catch-all interception
//! - JSON (de)serialization of trees for reproduction files
//!
//! A deferred interception cannot be constructed or deserialized.
//!
//! # Example
//!
//! ```rust,ignore
//! use rewind_tree::{Action, Entry, Scope};
//!
//! let mut scope = Scope::new();
//! scope.push(Entry::immediate(Action::step()));
//! scope.push(Entry::deferred(Action::signal())?);
//! assert_eq!(scope.cost(), 2);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{Action, Census, Entry, Program, Scope, NO_FAULT};

/// Parses a program from its JSON representation.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or describes a deferred
/// interception.
pub fn from_json(input: &str) -> Result<Program> {
    Ok(serde_json::from_str(input)?)
}

/// Serializes a program to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(program: &Program) -> Result<String> {
    Ok(serde_json::to_string_pretty(program)?)
}
