//! Property-based generators for arbitrary trees.
//!
//! Unlike [`rewind_oracle::Generator`], these strategies ignore the budget
//! and the halt-after-signal rule, so they also produce dead code after an
//! immediate signal. The oracle must stay consistent on those trees too.

use proptest::prelude::*;
use rewind_tree::{Action, Entry, Program, Scope};

/// Strategy for leaf actions.
pub fn leaf() -> impl Strategy<Value = Action> {
    prop_oneof![
        2 => Just(Action::step()),
        1 => Just(Action::signal()),
        3 => Just(Action::interception()),
    ]
}

/// Builds an entry; an interception drawn for a deferred slot stays immediate.
pub fn make_entry(deferred: bool, action: Action) -> Entry {
    if deferred {
        Entry::deferred(action.clone()).unwrap_or_else(|_| Entry::immediate(action))
    } else {
        Entry::immediate(action)
    }
}

/// Strategy for entries, nesting scopes up to a few levels deep.
pub fn entry() -> impl Strategy<Value = Entry> {
    let leaf_entry = (any::<bool>(), leaf()).prop_map(|(deferred, action)| make_entry(deferred, action));
    leaf_entry.prop_recursive(4, 64, 6, |inner| {
        (any::<bool>(), prop::collection::vec(inner, 0..6)).prop_map(|(deferred, entries)| {
            make_entry(deferred, Action::Scope(Scope { entries }))
        })
    })
}

/// Strategy for scopes.
pub fn scope() -> impl Strategy<Value = Scope> {
    prop::collection::vec(entry(), 0..8).prop_map(|entries| Scope { entries })
}

/// Strategy for programs: the catch-all followed by an arbitrary scope body.
pub fn program() -> impl Strategy<Value = Program> {
    scope().prop_map(|body| {
        let mut program = Program::new();
        program.root.entries.extend(body.entries);
        program
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Interpreter;
    use rewind_emit::Emitter;
    use rewind_oracle::{simulate_program, Simulator};
    use rewind_tree::NO_FAULT;

    fn all_unreached(action: &Action) -> bool {
        match action {
            Action::Scope(inner) => inner.leaves().iter().all(|leaf| leaf.stamp().is_none()),
            leaf => leaf.stamp().is_none(),
        }
    }

    fn check_halts(scope: &Scope) -> Result<(), TestCaseError> {
        let fired = scope.entries.iter().position(|entry| {
            !entry.is_deferred() && matches!(entry.action(), Action::Signal { n: Some(_) })
        });
        if let Some(index) = fired {
            for entry in &scope.entries[index + 1..] {
                prop_assert!(all_unreached(entry.action()), "entry after a fired signal ran");
            }
        }
        for entry in &scope.entries {
            if let Action::Scope(inner) = entry.action() {
                check_halts(inner)?;
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn arbitrary_programs_are_quiescent(mut generated in program()) {
            let oracle = simulate_program(&mut generated);
            prop_assert!(oracle.is_ok(), "{:?}", oracle);
        }

        #[test]
        fn nothing_runs_after_an_immediate_signal(mut generated in program()) {
            simulate_program(&mut generated).unwrap();
            check_halts(&generated.root)?;
        }

        #[test]
        fn interpreter_agrees_on_arbitrary_programs(mut generated in program()) {
            let oracle = simulate_program(&mut generated).unwrap();
            let observed = Interpreter::new().run_program(&generated);
            prop_assert!(observed.is_ok(), "{:?}", observed.err());
            prop_assert_eq!(observed.unwrap().steps, oracle.steps);
        }

        #[test]
        fn arbitrary_programs_emit_valid_syntax(mut generated in program()) {
            simulate_program(&mut generated).unwrap();
            prop_assert!(Emitter::new().emit_program(&generated).is_ok());
        }

        #[test]
        fn deferred_capture_clears_parent_fault(steps in 0usize..4) {
            // [deferred { step*, interception }, signal]
            let mut cleanup: Vec<Entry> = (0..steps).map(|_| Entry::immediate(Action::step())).collect();
            cleanup.push(Entry::immediate(Action::interception()));
            let mut scope = Scope {
                entries: vec![
                    make_entry(true, Action::Scope(Scope { entries: cleanup })),
                    Entry::immediate(Action::signal()),
                ],
            };

            let mut inbound = NO_FAULT;
            let outbound = Simulator::new().simulate(&mut scope, &mut inbound);

            prop_assert_eq!(outbound, NO_FAULT);
            let captured = match scope.entries[0].action() {
                Action::Scope(inner) => inner.entries[steps].action().stamp(),
                _ => None,
            };
            prop_assert_eq!(captured, Some(1));
        }
    }

    #[test]
    fn deferred_interception_falls_back_to_immediate() {
        let entry = make_entry(true, Action::interception());
        assert!(!entry.is_deferred());
        assert!(make_entry(true, Action::step()).is_deferred());
    }
}
