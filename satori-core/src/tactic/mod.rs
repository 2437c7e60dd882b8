//! Preprocessing tactics.
//!
//! A [`Goal`] is an ordered bag of assertions, each optionally tagged with a
//! *dependency* term that survives rewriting and is later inverted to
//! interpret unsatisfiable cores. Tactics transform goals into subgoals and
//! may record a [`ModelConverter`](crate::model::ModelConverter) describing
//! how to undo their vocabulary changes on a model.
//!
//! There is no proof machinery anywhere in these types: proof production is
//! unrepresentable rather than unimplemented.

pub mod bitblast;
pub mod bv_sharing;
pub mod card2bv;
pub mod simplify;

pub use bitblast::{BitBlaster, BvModelConverter};
pub use bv_sharing::BvSharingTactic;
pub use card2bv::Card2BvTactic;
pub use simplify::{SimplifyConfig, SimplifyTactic};

use crate::ast::{TermId, TermManager};
use crate::error::Result;
use crate::model::ModelConverter;
use crate::statistics::Statistics;

/// A goal: assertions to be made equisatisfiable and handed to the SAT
/// engine, plus flags recording what the rewrites must preserve.
#[derive(Debug, Clone)]
pub struct Goal {
    assertions: Vec<TermId>,
    deps: Vec<Option<TermId>>,
    models_enabled: bool,
    cores_enabled: bool,
}

impl Goal {
    /// Create an empty goal.
    #[must_use]
    pub fn new(models_enabled: bool, cores_enabled: bool) -> Self {
        Self {
            assertions: Vec::new(),
            deps: Vec::new(),
            models_enabled,
            cores_enabled,
        }
    }

    /// Append an untagged assertion.
    pub fn assert(&mut self, t: TermId) {
        self.assert_with_dep(t, None);
    }

    /// Append an assertion carrying a dependency tag.
    pub fn assert_with_dep(&mut self, t: TermId, dep: Option<TermId>) {
        self.assertions.push(t);
        self.deps.push(dep);
    }

    /// Number of assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    /// Check whether the goal carries no assertions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    /// The `i`-th assertion.
    #[must_use]
    pub fn assertion(&self, i: usize) -> Option<TermId> {
        self.assertions.get(i).copied()
    }

    /// The dependency tag of the `i`-th assertion.
    #[must_use]
    pub fn dep(&self, i: usize) -> Option<TermId> {
        self.deps.get(i).copied().flatten()
    }

    /// Iterate over (assertion, dependency) pairs in assertion order.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, Option<TermId>)> + '_ {
        self.assertions
            .iter()
            .copied()
            .zip(self.deps.iter().copied())
    }

    /// Whether rewrites must keep the goal model-convertible.
    #[must_use]
    pub fn models_enabled(&self) -> bool {
        self.models_enabled
    }

    /// Whether rewrites must preserve dependency tracking for cores.
    #[must_use]
    pub fn cores_enabled(&self) -> bool {
        self.cores_enabled
    }
}

/// What applying a tactic produced.
pub struct TacticApplication {
    /// Rewritten goals. The driver's pipeline requires exactly one.
    pub subgoals: Vec<Goal>,
    /// Optional converter undoing this tactic's vocabulary changes.
    pub converter: Option<Box<dyn ModelConverter>>,
    /// Dependencies this tactic used to derive facts on its own (e.g. an
    /// assumption rewritten to `false`).
    pub dep_core: Vec<TermId>,
}

impl TacticApplication {
    /// An application producing a single subgoal and nothing else.
    #[must_use]
    pub fn single(goal: Goal) -> Self {
        Self {
            subgoals: vec![goal],
            converter: None,
            dep_core: Vec::new(),
        }
    }
}

impl std::fmt::Debug for TacticApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TacticApplication")
            .field("subgoals", &self.subgoals.len())
            .field("has_converter", &self.converter.is_some())
            .field("dep_core", &self.dep_core.len())
            .finish()
    }
}

/// A goal transformer.
pub trait Tactic {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Apply the tactic.
    fn apply(&mut self, goal: &Goal, tm: &mut TermManager) -> Result<TacticApplication>;

    /// Contribute counters to a statistics collection.
    fn collect_statistics(&self, st: &mut Statistics) {
        let _ = st;
    }

    /// Discard accumulated per-run state.
    fn reset(&mut self) {}
}
