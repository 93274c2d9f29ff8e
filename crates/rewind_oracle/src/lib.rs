//! Tree generation and the execution oracle for Rewind.
//!
//! This crate is **pure**:
//! - No I/O
//! - Randomness only through the caller's [`rand::Rng`]
//! - Simulating the same tree always stamps the same numbers
//!
//! # Example
//!
//! ```rust,ignore
//! use rewind_oracle::{simulate_program, Generator, GeneratorConfig};
//!
//! let mut gen = Generator::new(rng, &GeneratorConfig::default())?;
//! let mut program = gen.generate()?;
//! let oracle = simulate_program(&mut program)?;
//! println!("{} steps, {} faults", oracle.steps, oracle.faults);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod generator;
pub mod simulator;
pub mod verify;

pub use error::{Error, Result};
pub use generator::{Generator, GeneratorConfig, KindWeights};
pub use simulator::{simulate_program, Oracle, Simulator};
pub use verify::verify_stamps;
