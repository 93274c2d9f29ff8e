//! In-process execution of stamped programs.
//!
//! Runs a tree the way the emitted Go program runs and feeds every check
//! through [`Contract`]. A panic carries the literal its `panic(N)` call
//! was emitted with, and `recover()` only sees the panic of the frame that
//! deferred the current call.
//!
//! The interpreter encodes the same defer/recover model as the oracle, so it
//! cannot catch a wrong model; only the Go toolchain backend can. It checks
//! that stamps are consistent with execution order and exercises the
//! contract without a toolchain.

use crate::error::{Error, Result};
use rewind_emit::Contract;
use rewind_tree::{Action, Program, Scope};
use serde::{Deserialize, Serialize};

/// Counters observed during one execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observed {
    /// Steps taken.
    pub steps: u64,
    /// Panics raised.
    pub panics: u64,
    /// Recover calls that returned a panic.
    pub recoveries: u64,
}

/// Executes stamped trees against the runtime contract.
#[derive(Debug, Default)]
pub struct Interpreter {
    contract: Contract,
    observed: Observed,
}

impl Interpreter {
    /// Creates an interpreter with fresh counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a whole program.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, [`Error::Unreached`] if a leaf
    /// without a stamp executes, or [`Error::Escaped`] if a panic leaves
    /// `main`.
    pub fn run_program(mut self, program: &Program) -> Result<Observed> {
        if let Some(fault) = self.invoke(&program.root, None)? {
            return Err(Error::Escaped { fault });
        }
        self.observed.steps = self.contract.steps();
        Ok(self.observed)
    }

    /// Invokes one function literal. `deferrer` is the panic slot of the
    /// frame that deferred this call, if it was deferred.
    fn invoke(&mut self, scope: &Scope, mut deferrer: Option<&mut Option<u64>>) -> Result<Option<u64>> {
        let mut panicking = None;
        let mut defers: Vec<&Action> = Vec::new();

        for entry in &scope.entries {
            if entry.is_deferred() {
                defers.push(entry.action());
                continue;
            }
            self.call(entry.action(), &mut panicking, deferrer.as_deref_mut(), false)?;
            if panicking.is_some() {
                break;
            }
        }

        while let Some(action) = defers.pop() {
            self.call(action, &mut panicking, deferrer.as_deref_mut(), true)?;
        }

        Ok(panicking)
    }

    fn call(
        &mut self,
        action: &Action,
        panicking: &mut Option<u64>,
        deferrer: Option<&mut Option<u64>>,
        deferred: bool,
    ) -> Result<()> {
        let stamp = || action.stamp().ok_or(Error::Unreached { kind: action.kind() });
        match action {
            Action::Step { .. } => self.contract.step(stamp()?)?,
            Action::Signal { .. } => {
                self.observed.panics += 1;
                *panicking = Some(stamp()?);
            }
            Action::Interception { .. } => {
                let recovered = deferrer.and_then(Option::take);
                if recovered.is_some() {
                    self.observed.recoveries += 1;
                }
                self.contract.expect(stamp()?, recovered)?;
            }
            Action::Scope(inner) => {
                let outcome = if deferred {
                    self.invoke(inner, Some(&mut *panicking))?
                } else {
                    self.invoke(inner, None)?
                };
                if outcome.is_some() {
                    *panicking = outcome;
                }
            }
        }
        Ok(())
    }
}
