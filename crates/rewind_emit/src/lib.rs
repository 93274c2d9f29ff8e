//! Go program emission for Rewind.
//!
//! This crate is **pure and deterministic**:
//! - No I/O
//! - Same stamped tree always produces the same text
//!
//! The emitted program checks itself at run time through two support
//! functions, `step(want)` and `expect(want, recover())`, whose Rust
//! counterpart is [`Contract`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rewind_emit::Emitter;
//!
//! rewind_oracle::simulate_program(&mut program)?;
//! let source = Emitter::new().emit_program(&program)?;
//! std::fs::write("test.go", source)?;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::format_push_string)]

pub mod emitter;
pub mod error;
pub mod runtime;
pub mod syntax;

pub use emitter::{EmitOptions, Emitter};
pub use error::{Error, Result};
pub use runtime::{AssertionMismatch, Check, Contract};
