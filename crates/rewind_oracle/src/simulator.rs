//! Deterministic defer/fault simulation.
//!
//! Walks a tree the way the emitted program will execute and stamps every
//! reached leaf with the number its runtime check must observe.
//!
//! Per scope:
//! 1. immediate entries run in order; deferred ones are only registered;
//! 2. the walk stops as soon as a fault is active in the scope;
//! 3. registered entries run in reverse, whatever stopped the walk;
//! 4. the active fault (or zero) propagates to the caller.
//!
//! An interception reads the *inbound* fault of its scope, not the scope's
//! own active fault. A deferred nested scope receives the deferring scope's
//! active-fault cell as its inbound, so it can capture and clear it.

use crate::error::{Error, Result};
use crate::verify::verify_stamps;
use rewind_tree::{Action, Census, Program, Scope, NO_FAULT};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Step and fault counters threaded through one simulation.
#[derive(Debug, Default)]
pub struct Simulator {
    steps: u64,
    faults: u64,
}

impl Simulator {
    /// Creates a simulator with both counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            steps: 0,
            faults: 0,
        }
    }

    /// Returns the number of steps stamped so far.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Returns the number of faults raised so far.
    #[must_use]
    pub const fn faults(&self) -> u64 {
        self.faults
    }

    /// Simulates one invocation of `scope`.
    ///
    /// `inbound` is the fault that was unwinding when the invocation began;
    /// an interception in this scope stamps it and resets the cell to zero.
    /// Returns the fault still propagating when the invocation ends.
    pub fn simulate(&mut self, scope: &mut Scope, inbound: &mut u64) -> u64 {
        let mut active = NO_FAULT;
        let mut registered: Vec<&mut Action> = Vec::new();

        for entry in &mut scope.entries {
            if entry.is_deferred() {
                registered.push(entry.action_mut());
                continue;
            }
            self.call(entry.action_mut(), &mut active, inbound, false);
            if active != NO_FAULT {
                break;
            }
        }

        while let Some(action) = registered.pop() {
            self.call(action, &mut active, inbound, true);
        }

        active
    }

    fn call(&mut self, action: &mut Action, active: &mut u64, inbound: &mut u64, deferred: bool) {
        match action {
            Action::Step { n } => {
                self.steps += 1;
                *n = Some(self.steps);
            }
            Action::Signal { n } => {
                self.faults += 1;
                *n = Some(self.faults);
                *active = self.faults;
            }
            Action::Interception { n } => {
                *n = Some(*inbound);
                *inbound = NO_FAULT;
            }
            Action::Scope(inner) => {
                let outbound = if deferred {
                    self.simulate(inner, active)
                } else {
                    let mut fresh = NO_FAULT;
                    self.simulate(inner, &mut fresh)
                };
                if outbound != NO_FAULT {
                    *active = outbound;
                }
            }
        }
    }
}

/// Summary of a simulated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
    /// Total steps the program must take.
    pub steps: u64,
    /// Total faults the program must raise.
    pub faults: u64,
    /// What the catch-all interception must capture.
    pub escaped: u64,
    /// Leaf counts of the tree, reached or not.
    pub census: Census,
}

/// Simulates a whole program from its root and checks it is quiescent.
///
/// # Errors
///
/// Returns [`Error::RootNotQuiescent`] if a fault escapes the root or the
/// root's inbound cell is left set, and a verification error if the stamped
/// numbers are not dense and unique.
pub fn simulate_program(program: &mut Program) -> Result<Oracle> {
    let mut simulator = Simulator::new();
    let mut inbound = NO_FAULT;
    let outbound = simulator.simulate(&mut program.root, &mut inbound);

    if inbound != NO_FAULT || outbound != NO_FAULT {
        return Err(Error::RootNotQuiescent { inbound, outbound });
    }

    verify_stamps(&program.root, simulator.steps(), simulator.faults())?;

    let oracle = Oracle {
        steps: simulator.steps(),
        faults: simulator.faults(),
        escaped: program.catch_all().unwrap_or(NO_FAULT),
        census: program.root.census(),
    };
    debug!(
        steps = oracle.steps,
        faults = oracle.faults,
        escaped = oracle.escaped,
        "simulated program"
    );
    Ok(oracle)
}
