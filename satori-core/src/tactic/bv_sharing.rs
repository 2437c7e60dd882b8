//! Bit-vector sharing maximization.
//!
//! Associative-commutative bit-vector chains (`bvadd`, `bvmul`, `bvand`,
//! `bvor`, `bvxor`) are collected, their operands sorted by term identity,
//! and the chain rebuilt left-leaning. Hash-consing then makes equal operand
//! prefixes across assertions resolve to the same circuit, so the
//! bit-blaster encodes them once.

use rustc_hash::FxHashMap;

use crate::ast::{TermId, TermKind, TermManager};
use crate::error::Result;
use crate::statistics::Statistics;
use crate::tactic::{Goal, Tactic, TacticApplication};

/// Which AC operator a term belongs to, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcOp {
    Add,
    Mul,
    And,
    Or,
    Xor,
}

/// The sharing tactic.
#[derive(Debug, Default)]
pub struct BvSharingTactic {
    reassociated: u64,
}

impl BvSharingTactic {
    /// Create the tactic.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ac_op(tm: &TermManager, t: TermId) -> Option<AcOp> {
        match tm.get(t).map(|term| &term.kind) {
            Some(TermKind::BvAdd(_, _)) => Some(AcOp::Add),
            Some(TermKind::BvMul(_, _)) => Some(AcOp::Mul),
            Some(TermKind::BvAnd(_, _)) => Some(AcOp::And),
            Some(TermKind::BvOr(_, _)) => Some(AcOp::Or),
            Some(TermKind::BvXor(_, _)) => Some(AcOp::Xor),
            _ => None,
        }
    }

    /// Collect the operand leaves of a maximal same-operator chain.
    fn collect_chain(tm: &TermManager, t: TermId, op: AcOp, out: &mut Vec<TermId>) {
        if Self::ac_op(tm, t) == Some(op) {
            for &c in &tm.children(t) {
                Self::collect_chain(tm, c, op, out);
            }
        } else {
            out.push(t);
        }
    }

    fn rebuild_chain(&mut self, op: AcOp, mut operands: Vec<TermId>, tm: &mut TermManager) -> TermId {
        operands.sort();
        let mut it = operands.into_iter();
        let Some(first) = it.next() else {
            // chains always have at least two operands
            return tm.mk_true();
        };
        let mut acc = first;
        for next in it {
            acc = match op {
                AcOp::Add => tm.mk_bv_add(acc, next),
                AcOp::Mul => tm.mk_bv_mul(acc, next),
                AcOp::And => tm.mk_bv_and(acc, next),
                AcOp::Or => tm.mk_bv_or(acc, next),
                AcOp::Xor => tm.mk_bv_xor(acc, next),
            };
        }
        acc
    }

    fn rewrite(
        &mut self,
        t: TermId,
        tm: &mut TermManager,
        cache: &mut FxHashMap<TermId, TermId>,
    ) -> TermId {
        if let Some(&done) = cache.get(&t) {
            return done;
        }
        let result = if let Some(op) = Self::ac_op(tm, t) {
            let mut operands = Vec::new();
            Self::collect_chain(tm, t, op, &mut operands);
            let operands: Vec<TermId> = operands
                .into_iter()
                .map(|o| self.rewrite(o, tm, cache))
                .collect();
            self.reassociated += 1;
            self.rebuild_chain(op, operands, tm)
        } else {
            let kids = tm.children(t);
            if kids.is_empty() {
                t
            } else {
                let new_kids: Vec<TermId> = kids.iter().map(|&c| self.rewrite(c, tm, cache)).collect();
                if new_kids.as_slice() == kids.as_slice() {
                    t
                } else {
                    tm.clone_with_children(t, &new_kids)
                }
            }
        };
        cache.insert(t, result);
        result
    }
}

impl Tactic for BvSharingTactic {
    fn name(&self) -> &'static str {
        "max-bv-sharing"
    }

    fn apply(&mut self, goal: &Goal, tm: &mut TermManager) -> Result<TacticApplication> {
        let mut out = Goal::new(goal.models_enabled(), goal.cores_enabled());
        let mut cache = FxHashMap::default();
        for (assertion, dep) in goal.iter() {
            let rewritten = self.rewrite(assertion, tm, &mut cache);
            out.assert_with_dep(rewritten, dep);
        }
        Ok(TacticApplication::single(out))
    }

    fn collect_statistics(&self, st: &mut Statistics) {
        st.incr("bv_sharing.reassociated", self.reassociated);
    }
}
