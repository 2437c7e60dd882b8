//! Goal → SAT translation.
//!
//! Converts one preprocessed (purely Boolean) goal into clauses: untagged
//! assertions become hard constraints, assertions tagged with a dependency
//! are internalized to a literal recorded in the per-call dependency map and
//! *not* asserted (the literal is later passed as an assumption).
//!
//! Subformula variables are allocated through the scope-aware atom map, so
//! translation is stable across incremental calls: a subterm seen before
//! reuses its variable, and entries roll back with the scope discipline.

use rustc_hash::FxHashMap;

use satori_core::{Result, SatoriError, TermId, TermKind, TermManager};
use satori_sat::{Lit, Solver, Var};

use crate::atom_map::AtomVarMap;

use satori_core::tactic::Goal;

/// One translation pass over a goal.
pub struct GoalTranslator<'a> {
    sat: &'a mut Solver,
    map: &'a mut AtomVarMap,
    dep2lit: &'a mut FxHashMap<TermId, Lit>,
}

impl<'a> GoalTranslator<'a> {
    /// Borrow the engine, the atom map and the per-call dependency map.
    pub fn new(
        sat: &'a mut Solver,
        map: &'a mut AtomVarMap,
        dep2lit: &'a mut FxHashMap<TermId, Lit>,
    ) -> Self {
        Self { sat, map, dep2lit }
    }

    /// Translate every assertion of `goal`.
    pub fn translate(&mut self, goal: &Goal, tm: &TermManager) -> Result<()> {
        for (assertion, dep) in goal.iter() {
            match dep {
                Some(d) => {
                    let lit = self.literal(assertion, tm)?;
                    self.dep2lit.insert(d, lit);
                }
                None => self.assert_hard(assertion, tm)?,
            }
        }
        Ok(())
    }

    fn assert_hard(&mut self, t: TermId, tm: &TermManager) -> Result<()> {
        let Some(term) = tm.get(t) else {
            return Err(SatoriError::Invariant(format!("unknown term {t:?}")));
        };
        match &term.kind {
            TermKind::True => Ok(()),
            TermKind::False => {
                self.sat.add_clause([]);
                Ok(())
            }
            TermKind::And(args) => {
                let args = args.clone();
                for a in args {
                    self.assert_hard(a, tm)?;
                }
                Ok(())
            }
            TermKind::Or(args) => {
                let args = args.clone();
                let mut clause = Vec::with_capacity(args.len());
                for a in args {
                    clause.push(self.literal(a, tm)?);
                }
                self.sat.add_clause(clause);
                Ok(())
            }
            _ => {
                let l = self.literal(t, tm)?;
                self.sat.add_clause([l]);
                Ok(())
            }
        }
    }

    /// Literal representing the truth of `t`, allocating definition
    /// variables on demand.
    fn literal(&mut self, t: TermId, tm: &TermManager) -> Result<Lit> {
        if let Some(v) = self.map.get(t) {
            return Ok(Lit::pos(v));
        }
        let Some(term) = tm.get(t) else {
            return Err(SatoriError::Invariant(format!("unknown term {t:?}")));
        };
        match &term.kind {
            TermKind::Not(a) => {
                let inner = self.literal(*a, tm)?;
                Ok(inner.negate())
            }
            TermKind::True => {
                let v = self.fresh(t);
                self.sat.add_clause([Lit::pos(v)]);
                Ok(Lit::pos(v))
            }
            TermKind::False => {
                let tt = tm.mk_true();
                let l = self.literal(tt, tm)?;
                Ok(l.negate())
            }
            TermKind::Var(_) => {
                let v = self.fresh(t);
                Ok(Lit::pos(v))
            }
            TermKind::And(args) => {
                let args = args.clone();
                let mut lits = Vec::with_capacity(args.len());
                for a in args {
                    lits.push(self.literal(a, tm)?);
                }
                let v = self.fresh(t);
                let out = Lit::pos(v);
                // v -> each conjunct; all conjuncts -> v
                let mut long: Vec<Lit> = Vec::with_capacity(lits.len() + 1);
                long.push(out);
                for &l in &lits {
                    self.sat.add_clause([out.negate(), l]);
                    long.push(l.negate());
                }
                self.sat.add_clause(long);
                Ok(out)
            }
            TermKind::Or(args) => {
                let args = args.clone();
                let mut lits = Vec::with_capacity(args.len());
                for a in args {
                    lits.push(self.literal(a, tm)?);
                }
                let v = self.fresh(t);
                let out = Lit::pos(v);
                // each disjunct -> v; v -> some disjunct
                let mut long: Vec<Lit> = Vec::with_capacity(lits.len() + 1);
                long.push(out.negate());
                for &l in &lits {
                    self.sat.add_clause([out, l.negate()]);
                    long.push(l);
                }
                self.sat.add_clause(long);
                Ok(out)
            }
            TermKind::Implies(a, b) => {
                let la = self.literal(*a, tm)?;
                let lb = self.literal(*b, tm)?;
                let v = self.fresh(t);
                let out = Lit::pos(v);
                self.sat.add_clause([out, la]);
                self.sat.add_clause([out, lb.negate()]);
                self.sat.add_clause([out.negate(), la.negate(), lb]);
                Ok(out)
            }
            TermKind::Xor(a, b) => {
                let la = self.literal(*a, tm)?;
                let lb = self.literal(*b, tm)?;
                let v = self.fresh(t);
                let out = Lit::pos(v);
                self.sat.add_clause([out.negate(), la, lb]);
                self.sat.add_clause([out.negate(), la.negate(), lb.negate()]);
                self.sat.add_clause([out, la.negate(), lb]);
                self.sat.add_clause([out, la, lb.negate()]);
                Ok(out)
            }
            TermKind::Eq(a, b) if tm.is_bool_sorted(*a) => {
                let la = self.literal(*a, tm)?;
                let lb = self.literal(*b, tm)?;
                let v = self.fresh(t);
                let out = Lit::pos(v);
                self.sat.add_clause([out.negate(), la.negate(), lb]);
                self.sat.add_clause([out.negate(), la, lb.negate()]);
                self.sat.add_clause([out, la, lb]);
                self.sat.add_clause([out, la.negate(), lb.negate()]);
                Ok(out)
            }
            TermKind::Ite(c, th, el) if tm.is_bool_sorted(*th) => {
                let lc = self.literal(*c, tm)?;
                let lt = self.literal(*th, tm)?;
                let le = self.literal(*el, tm)?;
                let v = self.fresh(t);
                let out = Lit::pos(v);
                self.sat.add_clause([out.negate(), lc.negate(), lt]);
                self.sat.add_clause([out.negate(), lc, le]);
                self.sat.add_clause([out, lc.negate(), lt.negate()]);
                self.sat.add_clause([out, lc, le.negate()]);
                Ok(out)
            }
            _ => Err(SatoriError::Tactic {
                tactic: "goal2sat",
                reason: "non-boolean atom reached the translator".into(),
            }),
        }
    }

    fn fresh(&mut self, t: TermId) -> Var {
        let v = self.sat.new_var();
        self.map.insert(t, v);
        v
    }
}
