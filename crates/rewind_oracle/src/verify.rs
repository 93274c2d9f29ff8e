//! Post-simulation checks on stamped numbers.

use crate::error::{Error, Result};
use rewind_tree::{Action, Scope};

/// Checks that step stamps are exactly `1..=steps`, fault stamps exactly
/// `1..=faults`, and that every interception expects a raised fault or zero.
///
/// # Errors
///
/// Returns [`Error::CounterMismatch`] on a gap or a repeat, and
/// [`Error::UnknownCapture`] for a capture of a fault that never fired.
pub fn verify_stamps(scope: &Scope, steps: u64, faults: u64) -> Result<()> {
    let mut step_stamps = Vec::new();
    let mut fault_stamps = Vec::new();

    for leaf in scope.leaves() {
        match leaf {
            Action::Step { n: Some(n) } => step_stamps.push(*n),
            Action::Signal { n: Some(n) } => fault_stamps.push(*n),
            Action::Interception { n: Some(n) } if *n > faults => {
                return Err(Error::UnknownCapture {
                    captured: *n,
                    faults,
                });
            }
            _ => {}
        }
    }

    check_dense("step", step_stamps, steps)?;
    check_dense("fault", fault_stamps, faults)
}

fn check_dense(counter: &'static str, mut stamped: Vec<u64>, expected: u64) -> Result<()> {
    stamped.sort_unstable();
    let dense = stamped.iter().copied().eq(1..=expected);
    if dense {
        Ok(())
    } else {
        Err(Error::CounterMismatch {
            counter,
            expected,
            stamped,
        })
    }
}
