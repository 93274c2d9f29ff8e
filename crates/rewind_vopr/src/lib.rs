//! VOPR-style deterministic fuzz harness for Rewind.
//!
//! This crate provides:
//! - Per-iteration seeding so any iteration replays in isolation
//! - The generate → simulate → emit → execute loop
//! - Execution backends: the Go toolchain, or an in-process interpreter
//! - Reproduction manifests for failing iterations
//! - Proptest strategies for arbitrary well-formed trees
//!
//! # Example
//!
//! ```rust,ignore
//! use rewind_vopr::{FuzzConfig, Fuzzer};
//!
//! let fuzzer = Fuzzer::new(FuzzConfig::default().with_seed(42).with_iterations(1000));
//! let report = fuzzer.run().await?;
//! println!("{report}");
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod backend;
pub mod error;
pub mod generators;
pub mod harness;
pub mod interpreter;
pub mod manifest;
pub mod report;

pub use backend::{Backend, Execution, ToolchainConfig};
pub use error::{Error, Result};
pub use harness::{build_case, iteration_rng, Case, FuzzConfig, Fuzzer};
pub use interpreter::{Interpreter, Observed};
pub use manifest::Manifest;
pub use report::{CampaignReport, IterationRecord, ReportFormat};
