//! Budget-bounded random tree generation.
//!
//! The budget is fuel: every leaf burns one unit, and a nested scope borrows a
//! uniformly drawn slice of what is left and refunds whatever it did not use.

use crate::error::{Error, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rewind_tree::{Action, Entry, Program, Scope};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Relative weights of the four entry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindWeights {
    /// Nested scope.
    pub scope: u32,
    /// Interception (falls back to a step in a deferred slot).
    pub interception: u32,
    /// Step.
    pub step: u32,
    /// Signal.
    pub signal: u32,
}

impl Default for KindWeights {
    fn default() -> Self {
        Self {
            scope: 4,
            interception: 3,
            step: 2,
            signal: 1,
        }
    }
}

impl KindWeights {
    fn validate(&self) -> Result<()> {
        if self.interception == 0 && self.step == 0 && self.signal == 0 {
            return Err(Error::InvalidWeights(
                "at least one leaf kind needs a nonzero weight".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Fuel for the whole program.
    pub budget: usize,
    /// Entry kind weights.
    pub weights: KindWeights,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            budget: 100,
            weights: KindWeights::default(),
        }
    }
}

impl GeneratorConfig {
    /// Sets the budget.
    #[must_use]
    pub const fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Sets the kind weights.
    #[must_use]
    pub const fn with_weights(mut self, weights: KindWeights) -> Self {
        self.weights = weights;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Scope,
    Interception,
    Step,
    Signal,
}

const KINDS: [Kind; 4] = [Kind::Scope, Kind::Interception, Kind::Step, Kind::Signal];

/// Random tree generator.
pub struct Generator<R> {
    rng: R,
    kinds: WeightedIndex<u32>,
    budget: usize,
}

impl<R: Rng> Generator<R> {
    /// Creates a generator drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWeights`] if no leaf kind can be drawn.
    pub fn new(rng: R, config: &GeneratorConfig) -> Result<Self> {
        config.weights.validate()?;
        let w = config.weights;
        let kinds = WeightedIndex::new([w.scope, w.interception, w.step, w.signal])
            .map_err(|e| Error::InvalidWeights(e.to_string()))?;
        Ok(Self {
            rng,
            kinds,
            budget: config.budget,
        })
    }

    /// Generates a program: the catch-all entry followed by a random tree.
    ///
    /// # Errors
    ///
    /// Returns an error only if an entry cannot be constructed, which would
    /// be a generator bug.
    pub fn generate(&mut self) -> Result<Program> {
        let mut program = Program::new();
        let mut budget = self.budget;
        self.fill(&mut program.root, &mut budget)?;

        let census = program.root.census();
        debug!(
            budget = self.budget,
            unused = budget,
            depth = program.root.depth(),
            steps = census.steps,
            signals = census.signals,
            interceptions = census.interceptions,
            scopes = census.scopes,
            "generated program"
        );
        Ok(program)
    }

    /// Appends random entries to `scope` until `budget` runs out or an
    /// immediate signal makes the rest of the scope unreachable.
    ///
    /// Unused budget is left in `budget` for the caller.
    ///
    /// # Errors
    ///
    /// Returns an error only if an entry cannot be constructed.
    pub fn fill(&mut self, scope: &mut Scope, budget: &mut usize) -> Result<()> {
        while *budget > 0 {
            let deferred = self.rng.gen_bool(0.5);
            let kind = KINDS[self.kinds.sample(&mut self.rng)];

            let action = match kind {
                Kind::Scope => {
                    let mut sub = self.rng.gen_range(0..*budget);
                    *budget -= sub;
                    let mut inner = Scope::new();
                    self.fill(&mut inner, &mut sub)?;
                    *budget += sub;
                    Action::Scope(inner)
                }
                Kind::Interception if !deferred => {
                    *budget -= 1;
                    Action::interception()
                }
                Kind::Interception | Kind::Step => {
                    *budget -= 1;
                    Action::step()
                }
                Kind::Signal => {
                    *budget -= 1;
                    Action::signal()
                }
            };

            let halts = !deferred && matches!(action, Action::Signal { .. });
            trace!(kind = action.kind(), deferred, remaining = *budget, "entry");
            scope.push(if deferred {
                Entry::deferred(action)?
            } else {
                Entry::immediate(action)
            });

            if halts {
                break;
            }
        }
        Ok(())
    }
}
