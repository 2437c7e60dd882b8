//! Scope-aware atom ↔ variable map.
//!
//! Associates Boolean-skeleton terms with SAT variables. Insertions are
//! recorded on a trail; `push` marks the trail and `pop` replays deletions,
//! so the map always matches the SAT engine's user level. An entry is never
//! lost while the solver sits at or above the level that inserted it.

use rustc_hash::FxHashMap;

use satori_core::TermId;
use satori_sat::Var;

/// The map.
#[derive(Debug, Default)]
pub struct AtomVarMap {
    map: FxHashMap<TermId, Var>,
    trail: Vec<TermId>,
    scopes: Vec<usize>,
}

impl AtomVarMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Variable associated with `t`, if any.
    #[must_use]
    pub fn get(&self, t: TermId) -> Option<Var> {
        self.map.get(&t).copied()
    }

    /// Associate `t` with `v` at the current level.
    pub fn insert(&mut self, t: TermId, v: Var) {
        let prior = self.map.insert(t, v);
        debug_assert!(prior.is_none(), "atom already mapped");
        self.trail.push(t);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check for emptiness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over all (term, variable) entries.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, Var)> + '_ {
        self.map.iter().map(|(&t, &v)| (t, v))
    }

    /// Open a scope.
    pub fn push(&mut self) {
        self.scopes.push(self.trail.len());
    }

    /// Close `n` scopes, removing the entries they inserted.
    pub fn pop(&mut self, n: u32) {
        let n = (n as usize).min(self.scopes.len());
        if n == 0 {
            return;
        }
        let idx = self.scopes.len() - n;
        let mark = self.scopes[idx];
        self.scopes.truncate(idx);
        for t in self.trail.drain(mark..) {
            self.map.remove(&t);
        }
    }

    /// Current scope depth.
    #[must_use]
    pub fn scope_level(&self) -> usize {
        self.scopes.len()
    }
}
