//! Cardinality-to-bit-vector encoding.
//!
//! Rewrites `AtLeast`/`AtMost` constraints into bit-vector comparisons over
//! a binary sum of the argument indicators: each Boolean argument becomes an
//! `ite(b, 1, 0)` summand of width `⌈log₂(n+1)⌉`, wide enough that the sum
//! cannot wrap. The resulting terms are eliminated by the bit-blaster later
//! in the pipeline.

use rustc_hash::FxHashMap;

use crate::ast::{TermId, TermKind, TermManager};
use crate::error::Result;
use crate::statistics::Statistics;
use crate::tactic::{Goal, Tactic, TacticApplication};

/// The cardinality encoder.
#[derive(Debug, Default)]
pub struct Card2BvTactic {
    rewritten: u64,
}

impl Card2BvTactic {
    /// Create the tactic.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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
        let Some(term) = tm.get(t).cloned() else {
            return t;
        };
        let result = match term.kind {
            TermKind::AtLeast { ref args, k } => {
                let args: Vec<TermId> = args.iter().map(|&a| self.rewrite(a, tm, cache)).collect();
                self.rewritten += 1;
                self.encode_at_least(&args, k, tm)
            }
            TermKind::AtMost { ref args, k } => {
                let args: Vec<TermId> = args.iter().map(|&a| self.rewrite(a, tm, cache)).collect();
                self.rewritten += 1;
                self.encode_at_most(&args, k, tm)
            }
            _ => {
                let kids = tm.children(t);
                if kids.is_empty() {
                    t
                } else {
                    let new_kids: Vec<TermId> =
                        kids.iter().map(|&c| self.rewrite(c, tm, cache)).collect();
                    if new_kids.as_slice() == kids.as_slice() {
                        t
                    } else {
                        tm.clone_with_children(t, &new_kids)
                    }
                }
            }
        };
        cache.insert(t, result);
        result
    }

    fn encode_at_least(&self, args: &[TermId], k: u32, tm: &mut TermManager) -> TermId {
        let n = args.len() as u32;
        if k == 0 {
            return tm.mk_true();
        }
        if k > n {
            return tm.mk_false();
        }
        if k == n {
            return tm.mk_and(args.to_vec());
        }
        let (sum, width) = self.indicator_sum(args, tm);
        let bound = tm.mk_bv_const_u64(u64::from(k), width);
        tm.mk_bv_ule(bound, sum)
    }

    fn encode_at_most(&self, args: &[TermId], k: u32, tm: &mut TermManager) -> TermId {
        let n = args.len() as u32;
        if k >= n {
            return tm.mk_true();
        }
        if k == 0 {
            let negated: Vec<TermId> = args.iter().map(|&a| tm.mk_not(a)).collect();
            return tm.mk_and(negated);
        }
        let (sum, width) = self.indicator_sum(args, tm);
        let bound = tm.mk_bv_const_u64(u64::from(k), width);
        tm.mk_bv_ule(sum, bound)
    }

    /// Binary sum of the indicator vectors. The width accommodates the
    /// maximum count `n`, so no summand chain can overflow.
    fn indicator_sum(&self, args: &[TermId], tm: &mut TermManager) -> (TermId, u32) {
        let n = args.len() as u32;
        let width = 32 - n.leading_zeros();
        let one = tm.mk_bv_const_u64(1, width);
        let zero = tm.mk_bv_zero(width);
        let mut sum = zero;
        for &arg in args {
            let indicator = tm.mk_ite(arg, one, zero);
            sum = if sum == zero {
                indicator
            } else {
                tm.mk_bv_add(sum, indicator)
            };
        }
        (sum, width)
    }
}

impl Tactic for Card2BvTactic {
    fn name(&self) -> &'static str {
        "card2bv"
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
        st.incr("card2bv.rewritten", self.rewritten);
    }
}
