//! Typed tree model.
//!
//! A tree is built once by the generator, stamped in place by the simulator
//! and then only read by the emitter. Leaf numbers are `None` until the
//! simulator reaches them; a leaf that stays `None` is dead code.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Fault id meaning "no fault is propagating".
pub const NO_FAULT: u64 = 0;

/// One action of a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Observable marker numbered by the step counter.
    Step {
        /// Expected step number, once simulated.
        n: Option<u64>,
    },
    /// Raises a new fault numbered by the fault counter.
    Signal {
        /// Fault id raised, once simulated.
        n: Option<u64>,
    },
    /// Captures the fault inbound to the enclosing scope and clears it.
    Interception {
        /// Fault id expected to be captured (`0` for none), once simulated.
        n: Option<u64>,
    },
    /// A nested, separately invoked block.
    Scope(Scope),
}

impl Action {
    /// Creates an unstamped step.
    #[must_use]
    pub const fn step() -> Self {
        Self::Step { n: None }
    }

    /// Creates an unstamped signal.
    #[must_use]
    pub const fn signal() -> Self {
        Self::Signal { n: None }
    }

    /// Creates an unstamped interception.
    #[must_use]
    pub const fn interception() -> Self {
        Self::Interception { n: None }
    }

    /// Returns the stamped number of a leaf action.
    ///
    /// Always `None` for a nested scope.
    #[must_use]
    pub const fn stamp(&self) -> Option<u64> {
        match self {
            Self::Step { n } | Self::Signal { n } | Self::Interception { n } => *n,
            Self::Scope(_) => None,
        }
    }

    /// Returns true if this action is a leaf (not a nested scope).
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        !matches!(self, Self::Scope(_))
    }

    /// Returns a short name for logs and diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Step { .. } => "step",
            Self::Signal { .. } => "signal",
            Self::Interception { .. } => "interception",
            Self::Scope(_) => "scope",
        }
    }
}

/// An action registered in a scope, either run immediately or deferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEntry", into = "RawEntry")]
pub struct Entry {
    deferred: bool,
    action: Action,
}

#[derive(Serialize, Deserialize)]
struct RawEntry {
    #[serde(default)]
    deferred: bool,
    action: Action,
}

impl TryFrom<RawEntry> for Entry {
    type Error = Error;

    fn try_from(raw: RawEntry) -> Result<Self> {
        if raw.deferred {
            Self::deferred(raw.action)
        } else {
            Ok(Self::immediate(raw.action))
        }
    }
}

impl From<Entry> for RawEntry {
    fn from(entry: Entry) -> Self {
        Self {
            deferred: entry.deferred,
            action: entry.action,
        }
    }
}

impl Entry {
    /// Creates an entry that runs where it appears.
    #[must_use]
    pub const fn immediate(action: Action) -> Self {
        Self {
            deferred: false,
            action,
        }
    }

    /// Creates an entry that is registered now and run during unwind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeferredInterception`] for an interception.
    pub fn deferred(action: Action) -> Result<Self> {
        if matches!(action, Action::Interception { .. }) {
            return Err(Error::DeferredInterception);
        }
        Ok(Self {
            deferred: true,
            action,
        })
    }

    /// Returns true if this entry is deferred.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Returns the registered action.
    #[must_use]
    pub const fn action(&self) -> &Action {
        &self.action
    }

    /// Returns the registered action for stamping.
    pub fn action_mut(&mut self) -> &mut Action {
        &mut self.action
    }
}

/// Counts of leaf kinds in a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    /// Number of steps.
    pub steps: usize,
    /// Number of signals.
    pub signals: usize,
    /// Number of interceptions.
    pub interceptions: usize,
    /// Number of nested scopes (the scope itself is not counted).
    pub scopes: usize,
    /// Number of deferred entries.
    pub deferred: usize,
}

/// An ordered sequence of entries forming one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Entries in registration order.
    pub entries: Vec<Entry>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Returns the number of direct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the scope has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the budget this scope consumed: one unit per leaf, nested
    /// scopes cost whatever their contents cost.
    #[must_use]
    pub fn cost(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry.action() {
                Action::Scope(inner) => inner.cost(),
                _ => 1,
            })
            .sum()
    }

    /// Returns the nesting depth; an empty or flat scope has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .entries
            .iter()
            .filter_map(|entry| match entry.action() {
                Action::Scope(inner) => Some(inner.depth()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Counts every action in this scope and its descendants.
    #[must_use]
    pub fn census(&self) -> Census {
        let mut census = Census::default();
        self.tally(&mut census);
        census
    }

    fn tally(&self, census: &mut Census) {
        for entry in &self.entries {
            if entry.is_deferred() {
                census.deferred += 1;
            }
            match entry.action() {
                Action::Step { .. } => census.steps += 1,
                Action::Signal { .. } => census.signals += 1,
                Action::Interception { .. } => census.interceptions += 1,
                Action::Scope(inner) => {
                    census.scopes += 1;
                    inner.tally(census);
                }
            }
        }
    }

    /// Returns every leaf action in pre-order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Action> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Action>) {
        for entry in &self.entries {
            match entry.action() {
                Action::Scope(inner) => inner.collect_leaves(out),
                leaf => out.push(leaf),
            }
        }
    }
}

/// A whole generated program.
///
/// The root scope always starts with the catch-all entry
/// `deferred Scope[ Interception ]`, so no fault can escape the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Root scope, catch-all first.
    pub root: Scope,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// Creates a program holding only the catch-all entry.
    #[must_use]
    pub fn new() -> Self {
        let mut catch_all = Scope::new();
        catch_all.push(Entry::immediate(Action::interception()));
        let mut root = Scope::new();
        root.push(Entry {
            deferred: true,
            action: Action::Scope(catch_all),
        });
        Self { root }
    }

    /// Returns what the catch-all interception is expected to capture.
    ///
    /// `None` until the program is simulated.
    #[must_use]
    pub fn catch_all(&self) -> Option<u64> {
        match self.root.entries.first().map(Entry::action) {
            Some(Action::Scope(inner)) => inner.entries.first().and_then(|e| e.action().stamp()),
            _ => None,
        }
    }

    /// Returns the budget consumed by generated entries (the catch-all is free).
    #[must_use]
    pub fn generated_cost(&self) -> usize {
        self.root.cost().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(entries: Vec<Entry>) -> Action {
        Action::Scope(Scope { entries })
    }

    #[test]
    fn deferred_interception_is_rejected() {
        assert!(matches!(
            Entry::deferred(Action::interception()),
            Err(Error::DeferredInterception)
        ));
        assert!(Entry::deferred(Action::step()).is_ok());
        assert!(Entry::deferred(Action::signal()).is_ok());
        assert!(Entry::deferred(nested(vec![])).is_ok());
    }

    #[test]
    fn cost_counts_leaves_through_nesting() {
        let mut scope = Scope::new();
        scope.push(Entry::immediate(Action::step()));
        scope.push(Entry::immediate(nested(vec![
            Entry::immediate(Action::interception()),
            Entry::immediate(nested(vec![Entry::immediate(Action::signal())])),
        ])));
        scope.push(Entry::immediate(nested(vec![])));

        assert_eq!(scope.cost(), 3);
        assert_eq!(scope.depth(), 3);
    }

    #[test]
    fn census_tallies_kinds() {
        let mut scope = Scope::new();
        scope.push(Entry::immediate(Action::step()));
        scope.push(Entry::deferred(Action::step()).unwrap());
        scope.push(Entry::deferred(nested(vec![Entry::immediate(Action::interception())])).unwrap());
        scope.push(Entry::immediate(Action::signal()));

        let census = scope.census();
        assert_eq!(census.steps, 2);
        assert_eq!(census.signals, 1);
        assert_eq!(census.interceptions, 1);
        assert_eq!(census.scopes, 1);
        assert_eq!(census.deferred, 2);
    }

    #[test]
    fn program_starts_with_catch_all() {
        let program = Program::new();
        let first = &program.root.entries[0];

        assert!(first.is_deferred());
        assert!(matches!(first.action(), Action::Scope(s) if s.len() == 1));
        assert_eq!(program.catch_all(), None);
        assert_eq!(program.generated_cost(), 0);
    }

    #[test]
    fn json_rejects_deferred_interception() {
        let input = r#"{"root":{"entries":[{"deferred":true,"action":{"kind":"interception","n":null}}]}}"#;
        assert!(crate::from_json(input).is_err());
    }

    #[test]
    fn json_preserves_stamps() {
        let mut program = Program::new();
        program.root.push(Entry::immediate(Action::Step { n: Some(1) }));
        program.root.push(Entry::deferred(Action::Signal { n: Some(2) }).unwrap());

        let json = crate::to_json(&program).unwrap();
        let parsed = crate::from_json(&json).unwrap();
        assert_eq!(parsed, program);
    }

    proptest::proptest! {
        #[test]
        fn nesting_adds_depth_not_cost(leaves in 0usize..20, levels in 1usize..6) {
            let mut scope = Scope {
                entries: (0..leaves).map(|_| Entry::immediate(Action::step())).collect(),
            };
            for _ in 1..levels {
                scope = Scope { entries: vec![Entry::immediate(nested(scope.entries))] };
            }
            proptest::prop_assert_eq!(scope.cost(), leaves);
            proptest::prop_assert_eq!(scope.depth(), levels);
            proptest::prop_assert_eq!(scope.census().steps, leaves);
        }
    }
}
