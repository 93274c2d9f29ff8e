//! Runtime assertion contract.
//!
//! Emitted programs call two checks:
//! - `step(want)` bumps a live counter and dies unless it now equals `want`
//! - `expect(want, recover())` dies unless the captured value equals `want`,
//!   where `nil` and `0` are the same thing
//!
//! Both report failures as `have <observed>, want <expected>`. [`Contract`]
//! implements the same checks in Rust for in-process execution.

use crate::emitter::EmitOptions;
use std::fmt;
use thiserror::Error;

/// Returns the Go source of the support functions.
#[must_use]
pub fn support_source(options: &EmitOptions) -> String {
    let (trace_expect, trace_step) = if options.trace_calls {
        ("\tprintln(\"expect\", n)\n", "\tprintln(\"step\", want)\n")
    } else {
        ("", "")
    };

    let mut out = String::new();
    out.push_str("func expect(n int, err interface{}) {\n");
    out.push_str(trace_expect);
    out.push_str("\tif n != err && !(n == 0 && err == nil) {\n");
    out.push_str("\t\tlog.Fatalf(\"have %v, want %v\", err, n)\n");
    out.push_str("\t}\n}\n\n");
    out.push_str("var steps int\n\n");
    out.push_str("func step(want int) {\n");
    out.push_str(trace_step);
    out.push_str("\tsteps++\n");
    out.push_str("\tif steps != want {\n");
    out.push_str("\t\tlog.Fatalf(\"have %v, want %v\", steps, want)\n");
    out.push_str("\t}\n}\n");
    out
}

/// Which runtime check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// `step(want)`.
    Step,
    /// `expect(want, recover())`.
    Expect,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step => write!(f, "step"),
            Self::Expect => write!(f, "expect"),
        }
    }
}

/// A runtime check observed something other than what the oracle predicted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{check}: have {have}, want {want}")]
pub struct AssertionMismatch {
    /// Failing check.
    pub check: Check,
    /// Observed value (`<nil>` for an empty capture).
    pub have: String,
    /// Expected value.
    pub want: String,
}

impl AssertionMismatch {
    /// Extracts a mismatch from the diagnostic output of a failed program.
    ///
    /// The check kind cannot be recovered from the text; the last
    /// `step`/`expect` trace line before the failure decides it, and
    /// [`Check::Step`] is assumed when tracing was off.
    #[must_use]
    pub fn parse_log(output: &str) -> Option<Self> {
        let mut check = Check::Step;
        for line in output.lines() {
            if line.starts_with("expect ") {
                check = Check::Expect;
            } else if line.starts_with("step ") {
                check = Check::Step;
            }

            let Some(start) = line.find("have ") else {
                continue;
            };
            let Some((have, want)) = line[start + 5..].split_once(", want ") else {
                continue;
            };
            return Some(Self {
                check,
                have: have.trim().to_string(),
                want: want.trim().to_string(),
            });
        }
        None
    }
}

/// Live counterpart of the emitted support functions.
#[derive(Debug, Default)]
pub struct Contract {
    steps: u64,
}

impl Contract {
    /// Creates a contract with the step counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { steps: 0 }
    }

    /// Returns how many steps have been taken.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Takes a step and checks it is number `want`.
    ///
    /// # Errors
    ///
    /// Returns the mismatch if the live counter differs from `want`.
    pub fn step(&mut self, want: u64) -> Result<(), AssertionMismatch> {
        self.steps += 1;
        if self.steps == want {
            Ok(())
        } else {
            Err(AssertionMismatch {
                check: Check::Step,
                have: self.steps.to_string(),
                want: want.to_string(),
            })
        }
    }

    /// Checks a captured fault against `want`; `None` matches `0`.
    ///
    /// # Errors
    ///
    /// Returns the mismatch if the capture differs from `want`.
    pub fn expect(&self, want: u64, captured: Option<u64>) -> Result<(), AssertionMismatch> {
        if captured.unwrap_or(0) == want {
            return Ok(());
        }
        Err(AssertionMismatch {
            check: Check::Expect,
            have: captured.map_or_else(|| "<nil>".to_string(), |n| n.to_string()),
            want: want.to_string(),
        })
    }
}
