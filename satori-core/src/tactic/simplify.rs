//! Bottom-up simplification.
//!
//! One memoized rewriting pass per assertion: constant folding over Booleans
//! and bit-vectors, n-ary flattening, complementary-literal elimination, and
//! the normalizations controlled by [`SimplifyConfig`]. Assertions that
//! simplify to `true` are dropped unless they carry a dependency tag (tagged
//! assertions must stay visible to the translator's dependency map).

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::{TermId, TermKind, TermManager};
use crate::error::{Result, SatoriError};
use crate::statistics::Statistics;
use crate::tactic::{Goal, Tactic, TacticApplication};

/// Simplifier options. The defaults are the profile the incremental driver
/// always runs with; the arithmetic-oriented keys (`som`, `hoist_mul`,
/// `push_ite_bv`) are accepted for interface compatibility and recorded, but
/// this simplifier has no monomial layer for them to act on.
#[derive(Debug, Clone)]
pub struct SimplifyConfig {
    /// Sum-of-monomials normalization (no effect on this operator family).
    pub som: bool,
    /// Fold `ite` terms with constant branches into plain connectives.
    pub pull_cheap_ite: bool,
    /// Push `ite` below bit-vector operators (no effect here).
    pub push_ite_bv: bool,
    /// Enable the step-bounded rewriting loop.
    pub local_ctx: bool,
    /// Maximum number of rewrite steps per pass.
    pub local_ctx_limit: u64,
    /// Flatten nested `and`/`or` chains.
    pub flat: bool,
    /// Hoist multiplications (no effect here).
    pub hoist_mul: bool,
    /// Rewrite conjunctions to negated disjunctions.
    pub elim_and: bool,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            som: true,
            pull_cheap_ite: true,
            push_ite_bv: false,
            local_ctx: true,
            local_ctx_limit: 10_000_000,
            flat: true,
            hoist_mul: false,
            elim_and: true,
        }
    }
}

/// The simplification tactic.
#[derive(Debug, Default)]
pub struct SimplifyTactic {
    config: SimplifyConfig,
    steps: u64,
}

impl SimplifyTactic {
    /// Create the tactic with the default profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the tactic with an explicit configuration.
    #[must_use]
    pub fn with_config(config: SimplifyConfig) -> Self {
        Self { config, steps: 0 }
    }

    /// Simplify a single term.
    pub fn simplify(&mut self, t: TermId, tm: &mut TermManager) -> Result<TermId> {
        let mut cache = FxHashMap::default();
        let limit = tm.limit();
        let mut budget = if self.config.local_ctx {
            self.config.local_ctx_limit
        } else {
            u64::MAX
        };
        let r = self.simp(t, tm, &mut cache, &mut budget);
        if !limit.charge(self.config.local_ctx_limit.saturating_sub(budget).max(1)) {
            return Err(SatoriError::Canceled("simplify"));
        }
        r
    }

    fn simp(
        &mut self,
        t: TermId,
        tm: &mut TermManager,
        cache: &mut FxHashMap<TermId, TermId>,
        budget: &mut u64,
    ) -> Result<TermId> {
        if let Some(&done) = cache.get(&t) {
            return Ok(done);
        }
        if *budget == 0 {
            // out of steps: leave the term as is, correctness is unaffected
            return Ok(t);
        }
        *budget -= 1;
        self.steps += 1;

        let Some(term) = tm.get(t).cloned() else {
            return Ok(t);
        };
        let result = match term.kind {
            TermKind::True | TermKind::False | TermKind::Var(_) | TermKind::BvConst { .. } => t,
            TermKind::Not(a) => {
                let a = self.simp(a, tm, cache, budget)?;
                tm.mk_not(a)
            }
            TermKind::And(ref args) => {
                let args = args.clone();
                self.simp_and(&args, tm, cache, budget)?
            }
            TermKind::Or(ref args) => {
                let args = args.clone();
                self.simp_or(&args, tm, cache, budget)?
            }
            TermKind::Implies(a, b) => {
                let a = self.simp(a, tm, cache, budget)?;
                let b = self.simp(b, tm, cache, budget)?;
                let na = tm.mk_not(a);
                let or = tm.mk_or(vec![na, b]);
                self.simp(or, tm, cache, budget)?
            }
            TermKind::Xor(a, b) => {
                let a = self.simp(a, tm, cache, budget)?;
                let b = self.simp(b, tm, cache, budget)?;
                self.simp_xor(a, b, tm)
            }
            TermKind::Eq(a, b) => {
                let a = self.simp(a, tm, cache, budget)?;
                let b = self.simp(b, tm, cache, budget)?;
                self.simp_eq(a, b, tm)
            }
            TermKind::Ite(c, th, el) => {
                let c = self.simp(c, tm, cache, budget)?;
                let th = self.simp(th, tm, cache, budget)?;
                let el = self.simp(el, tm, cache, budget)?;
                let folded = self.simp_ite(c, th, el, tm);
                if folded != t {
                    self.simp(folded, tm, cache, budget)?
                } else {
                    folded
                }
            }
            TermKind::BvNot(a) => {
                let a = self.simp(a, tm, cache, budget)?;
                match double_bv_not(a, tm) {
                    Some(inner) => inner,
                    None => match tm.bv_const_value(a) {
                        Some((v, w)) => {
                            let folded = bv_mask(w) ^ v.clone();
                            tm.mk_bv_const(folded, w)
                        }
                        None => tm.mk_bv_not(a),
                    },
                }
            }
            TermKind::BvNeg(a) => {
                let a = self.simp(a, tm, cache, budget)?;
                match tm.bv_const_value(a) {
                    Some((v, w)) => {
                        let folded = (bv_modulus(w) - v.clone()) & bv_mask(w);
                        tm.mk_bv_const(folded, w)
                    }
                    None => tm.mk_bv_neg(a),
                }
            }
            TermKind::BvAnd(a, b)
            | TermKind::BvOr(a, b)
            | TermKind::BvXor(a, b)
            | TermKind::BvAdd(a, b)
            | TermKind::BvSub(a, b)
            | TermKind::BvMul(a, b)
            | TermKind::BvShl(a, b)
            | TermKind::BvLshr(a, b)
            | TermKind::BvAshr(a, b) => {
                let sa = self.simp(a, tm, cache, budget)?;
                let sb = self.simp(b, tm, cache, budget)?;
                self.simp_bv_binary(t, sa, sb, tm)
            }
            TermKind::BvConcat(a, b) => {
                let a = self.simp(a, tm, cache, budget)?;
                let b = self.simp(b, tm, cache, budget)?;
                match (tm.bv_const_value(a), tm.bv_const_value(b)) {
                    (Some((va, _)), Some((vb, wb))) => {
                        let value = (va.clone() << wb) | vb.clone();
                        let w = tm.bitvec_width_of(t).unwrap_or(wb);
                        tm.mk_bv_const(value, w)
                    }
                    _ => tm.mk_bv_concat(a, b),
                }
            }
            TermKind::BvExtract { hi, lo, arg } => {
                let arg = self.simp(arg, tm, cache, budget)?;
                let full = tm.bitvec_width_of(arg) == Some(hi - lo + 1);
                if full && lo == 0 {
                    arg
                } else {
                    match tm.bv_const_value(arg) {
                        Some((v, _)) => {
                            let w = hi - lo + 1;
                            tm.mk_bv_const(v.clone() >> lo, w)
                        }
                        None => tm.mk_bv_extract(hi, lo, arg),
                    }
                }
            }
            TermKind::BvUlt(a, b)
            | TermKind::BvUle(a, b)
            | TermKind::BvSlt(a, b)
            | TermKind::BvSle(a, b) => {
                let sa = self.simp(a, tm, cache, budget)?;
                let sb = self.simp(b, tm, cache, budget)?;
                self.simp_bv_compare(t, sa, sb, tm)
            }
            TermKind::AtLeast { ref args, k } => {
                let args = args.clone();
                let args: Vec<TermId> = args
                    .iter()
                    .map(|&a| self.simp(a, tm, cache, budget))
                    .collect::<Result<_>>()?;
                tm.mk_at_least(args, k)
            }
            TermKind::AtMost { ref args, k } => {
                let args = args.clone();
                let args: Vec<TermId> = args
                    .iter()
                    .map(|&a| self.simp(a, tm, cache, budget))
                    .collect::<Result<_>>()?;
                tm.mk_at_most(args, k)
            }
        };
        cache.insert(t, result);
        Ok(result)
    }

    fn simp_and(
        &mut self,
        args: &[TermId],
        tm: &mut TermManager,
        cache: &mut FxHashMap<TermId, TermId>,
        budget: &mut u64,
    ) -> Result<TermId> {
        let mut flat: Vec<TermId> = Vec::with_capacity(args.len());
        let mut seen = FxHashSet::default();
        for &raw in args {
            let a = self.simp(raw, tm, cache, budget)?;
            if tm.is_true(a) {
                continue;
            }
            if tm.is_false(a) {
                return Ok(tm.mk_false());
            }
            let nested = match tm.get(a).map(|term| &term.kind) {
                Some(TermKind::And(inner)) if self.config.flat => Some(inner.clone()),
                _ => None,
            };
            match nested {
                Some(inner) => {
                    for i in inner {
                        if seen.insert(i) {
                            flat.push(i);
                        }
                    }
                }
                None => {
                    if seen.insert(a) {
                        flat.push(a);
                    }
                }
            }
        }
        for &a in &flat {
            let na = tm.mk_not(a);
            if seen.contains(&na) {
                return Ok(tm.mk_false());
            }
        }
        match flat.len() {
            0 => Ok(tm.mk_true()),
            1 => Ok(flat[0]),
            _ => {
                if self.config.elim_and {
                    let negated: Vec<TermId> = flat.iter().map(|&a| tm.mk_not(a)).collect();
                    let or = tm.mk_or(negated);
                    Ok(tm.mk_not(or))
                } else {
                    Ok(tm.mk_and(flat))
                }
            }
        }
    }

    fn simp_or(
        &mut self,
        args: &[TermId],
        tm: &mut TermManager,
        cache: &mut FxHashMap<TermId, TermId>,
        budget: &mut u64,
    ) -> Result<TermId> {
        let mut flat: Vec<TermId> = Vec::with_capacity(args.len());
        let mut seen = FxHashSet::default();
        for &raw in args {
            let a = self.simp(raw, tm, cache, budget)?;
            if tm.is_false(a) {
                continue;
            }
            if tm.is_true(a) {
                return Ok(tm.mk_true());
            }
            let nested = match tm.get(a).map(|term| &term.kind) {
                Some(TermKind::Or(inner)) if self.config.flat => Some(inner.clone()),
                _ => None,
            };
            match nested {
                Some(inner) => {
                    for i in inner {
                        if seen.insert(i) {
                            flat.push(i);
                        }
                    }
                }
                None => {
                    if seen.insert(a) {
                        flat.push(a);
                    }
                }
            }
        }
        for &a in &flat {
            let na = tm.mk_not(a);
            if seen.contains(&na) {
                return Ok(tm.mk_true());
            }
        }
        Ok(tm.mk_or(flat))
    }

    fn simp_xor(&self, a: TermId, b: TermId, tm: &mut TermManager) -> TermId {
        if a == b {
            return tm.mk_false();
        }
        let na = tm.mk_not(a);
        if na == b {
            return tm.mk_true();
        }
        if tm.is_true(a) {
            return tm.mk_not(b);
        }
        if tm.is_false(a) {
            return b;
        }
        if tm.is_true(b) {
            return tm.mk_not(a);
        }
        if tm.is_false(b) {
            return a;
        }
        tm.mk_xor(a, b)
    }

    fn simp_eq(&self, a: TermId, b: TermId, tm: &mut TermManager) -> TermId {
        if a == b {
            return tm.mk_true();
        }
        if tm.is_bool_sorted(a) {
            let na = tm.mk_not(a);
            if na == b {
                return tm.mk_false();
            }
            if tm.is_true(a) {
                return b;
            }
            if tm.is_false(a) {
                return tm.mk_not(b);
            }
            if tm.is_true(b) {
                return a;
            }
            if tm.is_false(b) {
                return tm.mk_not(a);
            }
        } else if let (Some((va, _)), Some((vb, _))) = (tm.bv_const_value(a), tm.bv_const_value(b)) {
            // distinct interned constants of the same width are unequal
            let equal = va == vb;
            return if equal { tm.mk_true() } else { tm.mk_false() };
        }
        tm.mk_eq(a, b)
    }

    fn simp_ite(&self, c: TermId, th: TermId, el: TermId, tm: &mut TermManager) -> TermId {
        // mk_ite folds constant conditions and equal branches
        let folded = tm.mk_ite(c, th, el);
        let Some(TermKind::Ite(c, th, el)) = tm.get(folded).map(|term| term.kind.clone()) else {
            return folded;
        };
        if !self.config.pull_cheap_ite || !tm.is_bool_sorted(th) {
            return folded;
        }
        if tm.is_true(th) {
            return tm.mk_or(vec![c, el]);
        }
        if tm.is_false(th) {
            let nc = tm.mk_not(c);
            return tm.mk_and(vec![nc, el]);
        }
        if tm.is_true(el) {
            let nc = tm.mk_not(c);
            return tm.mk_or(vec![nc, th]);
        }
        if tm.is_false(el) {
            return tm.mk_and(vec![c, th]);
        }
        folded
    }

    fn simp_bv_binary(&self, t: TermId, a: TermId, b: TermId, tm: &mut TermManager) -> TermId {
        let kind = tm.get(t).map(|term| term.kind.clone());
        let ca = tm.bv_const_value(a).map(|(v, w)| (v.clone(), w));
        let cb = tm.bv_const_value(b).map(|(v, w)| (v.clone(), w));

        if let (Some((va, w)), Some((vb, _))) = (&ca, &cb) {
            let folded = match kind {
                Some(TermKind::BvAnd(_, _)) => va.clone() & vb.clone(),
                Some(TermKind::BvOr(_, _)) => va.clone() | vb.clone(),
                Some(TermKind::BvXor(_, _)) => va.clone() ^ vb.clone(),
                Some(TermKind::BvAdd(_, _)) => va.clone() + vb.clone(),
                Some(TermKind::BvSub(_, _)) => va.clone() + (bv_modulus(*w) - vb.clone()),
                Some(TermKind::BvMul(_, _)) => va.clone() * vb.clone(),
                Some(TermKind::BvShl(_, _)) => match vb.to_u64() {
                    Some(s) if s < u64::from(*w) => va.clone() << s,
                    _ => BigUint::zero(),
                },
                Some(TermKind::BvLshr(_, _)) => match vb.to_u64() {
                    Some(s) if s < u64::from(*w) => va.clone() >> s,
                    _ => BigUint::zero(),
                },
                Some(TermKind::BvAshr(_, _)) => {
                    let sign = va.bit(u64::from(*w) - 1);
                    let shifted = match vb.to_u64() {
                        Some(s) if s < u64::from(*w) => {
                            let base = va.clone() >> s;
                            if sign {
                                base | ((bv_mask(*w) >> s) ^ bv_mask(*w))
                            } else {
                                base
                            }
                        }
                        _ => {
                            if sign {
                                bv_mask(*w)
                            } else {
                                BigUint::zero()
                            }
                        }
                    };
                    shifted
                }
                _ => return t,
            };
            return tm.mk_bv_const(folded, *w);
        }

        // identity and absorbing elements
        let a_zero = ca.as_ref().is_some_and(|(v, _)| v.is_zero());
        let b_zero = cb.as_ref().is_some_and(|(v, _)| v.is_zero());
        let b_one = cb.as_ref().is_some_and(|(v, _)| v.is_one());
        match kind {
            Some(TermKind::BvAdd(_, _)) if a_zero => b,
            Some(TermKind::BvAdd(_, _)) if b_zero => a,
            Some(TermKind::BvSub(_, _)) if b_zero => a,
            Some(TermKind::BvMul(_, _)) if a_zero || b_zero => {
                let w = tm.bitvec_width_of(a).unwrap_or(1);
                tm.mk_bv_zero(w)
            }
            Some(TermKind::BvMul(_, _)) if b_one => a,
            Some(TermKind::BvAnd(_, _)) if a_zero || b_zero => {
                let w = tm.bitvec_width_of(a).unwrap_or(1);
                tm.mk_bv_zero(w)
            }
            Some(TermKind::BvOr(_, _)) if a_zero => b,
            Some(TermKind::BvOr(_, _)) if b_zero => a,
            Some(TermKind::BvXor(_, _)) if a_zero => b,
            Some(TermKind::BvXor(_, _)) if b_zero => a,
            Some(TermKind::BvXor(_, _)) if a == b => {
                let w = tm.bitvec_width_of(a).unwrap_or(1);
                tm.mk_bv_zero(w)
            }
            Some(TermKind::BvAnd(_, _)) if a == b => a,
            Some(TermKind::BvOr(_, _)) if a == b => a,
            Some(TermKind::BvShl(_, _) | TermKind::BvLshr(_, _) | TermKind::BvAshr(_, _))
                if b_zero =>
            {
                a
            }
            _ => tm.clone_with_children(t, &[a, b]),
        }
    }

    fn simp_bv_compare(&self, t: TermId, a: TermId, b: TermId, tm: &mut TermManager) -> TermId {
        let kind = tm.get(t).map(|term| term.kind.clone());
        if a == b {
            return match kind {
                Some(TermKind::BvUle(_, _) | TermKind::BvSle(_, _)) => tm.mk_true(),
                _ => tm.mk_false(),
            };
        }
        if let (Some((va, w)), Some((vb, _))) = (tm.bv_const_value(a), tm.bv_const_value(b)) {
            let result = match kind {
                Some(TermKind::BvUlt(_, _)) => va < vb,
                Some(TermKind::BvUle(_, _)) => va <= vb,
                Some(TermKind::BvSlt(_, _)) => signed_value(va, w) < signed_value(vb, w),
                Some(TermKind::BvSle(_, _)) => signed_value(va, w) <= signed_value(vb, w),
                _ => return t,
            };
            return if result { tm.mk_true() } else { tm.mk_false() };
        }
        tm.clone_with_children(t, &[a, b])
    }
}

fn double_bv_not(a: TermId, tm: &TermManager) -> Option<TermId> {
    match tm.get(a).map(|term| &term.kind) {
        Some(TermKind::BvNot(inner)) => Some(*inner),
        _ => None,
    }
}

fn bv_mask(width: u32) -> BigUint {
    (BigUint::one() << width) - BigUint::one()
}

fn bv_modulus(width: u32) -> BigUint {
    BigUint::one() << width
}

fn signed_value(value: &BigUint, width: u32) -> num_bigint::BigInt {
    use num_bigint::BigInt;
    if width > 0 && value.bit(u64::from(width) - 1) {
        BigInt::from(value.clone()) - (BigInt::one() << width)
    } else {
        BigInt::from(value.clone())
    }
}

impl Tactic for SimplifyTactic {
    fn name(&self) -> &'static str {
        "simplify"
    }

    fn apply(&mut self, goal: &Goal, tm: &mut TermManager) -> Result<TacticApplication> {
        let mut out = Goal::new(goal.models_enabled(), goal.cores_enabled());
        for (assertion, dep) in goal.iter() {
            let simplified = self.simplify(assertion, tm)?;
            if tm.is_true(simplified) && dep.is_none() {
                continue;
            }
            out.assert_with_dep(simplified, dep);
        }
        Ok(TacticApplication::single(out))
    }

    fn collect_statistics(&self, st: &mut Statistics) {
        st.incr("simplify.steps", self.steps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simp(tm: &mut TermManager, t: TermId) -> TermId {
        SimplifyTactic::new().simplify(t, tm).expect("simplify")
    }

    #[test]
    fn test_constant_folding() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("x", tm.sorts.bool_sort);
        let tt = tm.mk_true();
        let ff = tm.mk_false();

        let or1 = tm.mk_or(vec![ff, x]);
        assert_eq!(simp(&mut tm, or1), x);

        let or2 = tm.mk_or(vec![tt, x]);
        let r2 = simp(&mut tm, or2);
        assert!(tm.is_true(r2));

        let and1 = tm.mk_and(vec![ff, x]);
        let r3 = simp(&mut tm, and1);
        assert!(tm.is_false(r3));
    }

    #[test]
    fn test_complementary_literals() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("x", tm.sorts.bool_sort);
        let nx = tm.mk_not(x);
        let or = tm.mk_or(vec![x, nx]);
        let r = simp(&mut tm, or);
        assert!(tm.is_true(r));

        let y = tm.mk_var("y", tm.sorts.bool_sort);
        let and = tm.mk_and(vec![x, y, nx]);
        let r2 = simp(&mut tm, and);
        assert!(tm.is_false(r2));
    }

    #[test]
    fn test_implies_becomes_disjunction() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("x", tm.sorts.bool_sort);
        let y = tm.mk_var("y", tm.sorts.bool_sort);
        let imp = tm.mk_implies(x, y);
        let r = simp(&mut tm, imp);
        let nx = tm.mk_not(x);
        let expected = tm.mk_or(vec![nx, y]);
        assert_eq!(r, expected);
    }

    #[test]
    fn test_bv_constant_folding() {
        let mut tm = TermManager::new();
        let a = tm.mk_bv_const_u64(9, 4);
        let b = tm.mk_bv_const_u64(8, 4);
        let sum = tm.mk_bv_add(a, b);
        let r = simp(&mut tm, sum);
        let expected = tm.mk_bv_const_u64(1, 4); // 9 + 8 = 17 = 1 mod 16
        assert_eq!(r, expected);

        let ult = tm.mk_bv_ult(b, a);
        let r2 = simp(&mut tm, ult);
        assert!(tm.is_true(r2));
    }

    #[test]
    fn test_bv_identities() {
        let mut tm = TermManager::new();
        let bv8 = tm.sorts.mk_bitvec(8);
        let x = tm.mk_var("x", bv8);
        let zero = tm.mk_bv_zero(8);
        let one = tm.mk_bv_const_u64(1, 8);

        let add0 = tm.mk_bv_add(x, zero);
        assert_eq!(simp(&mut tm, add0), x);
        let mul1 = tm.mk_bv_mul(x, one);
        assert_eq!(simp(&mut tm, mul1), x);
        let xor_self = tm.mk_bv_xor(x, x);
        assert_eq!(simp(&mut tm, xor_self), zero);
    }

    #[test]
    fn test_tagged_true_assertions_are_kept() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("x", tm.sorts.bool_sort);
        let nx = tm.mk_not(x);
        let taut = tm.mk_or(vec![x, nx]);

        let mut goal = Goal::new(true, true);
        goal.assert(taut);
        goal.assert_with_dep(taut, Some(taut));

        let mut tactic = SimplifyTactic::new();
        let app = tactic.apply(&goal, &mut tm).expect("apply");
        let out = &app.subgoals[0];
        // untagged tautology dropped, tagged one kept
        assert_eq!(out.len(), 1);
        assert_eq!(out.dep(0), Some(taut));
    }
}
