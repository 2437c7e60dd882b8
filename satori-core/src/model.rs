//! Models and model converters.
//!
//! A [`Model`] assigns value terms (`true`, `false`, bit-vector constants)
//! to leaf declarations. The evaluator is total: declarations without an
//! assignment complete to `false` / zero, so evaluation of any term in the
//! operator family always reduces to a value.
//!
//! [`ModelConverter`]s record how preprocessing changed the vocabulary; a
//! chain of converters is applied left-to-right to lift a propositional
//! model back to the original symbols.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};
use rustc_hash::FxHashMap;

use crate::ast::{TermId, TermKind, TermManager};

/// Assignment of value terms to leaf declarations.
#[derive(Debug, Clone, Default)]
pub struct Model {
    assignments: FxHashMap<TermId, TermId>,
}

impl Model {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value recorded for `decl`, if any.
    #[must_use]
    pub fn get(&self, decl: TermId) -> Option<TermId> {
        self.assignments.get(&decl).copied()
    }

    /// Record a value for `decl`.
    pub fn set(&mut self, decl: TermId, value: TermId) {
        self.assignments.insert(decl, value);
    }

    /// Remove the entry for `decl`.
    pub fn remove(&mut self, decl: TermId) {
        self.assignments.remove(&decl);
    }

    /// Number of assigned declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Check whether the model assigns nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Iterate over all (declaration, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, TermId)> + '_ {
        self.assignments.iter().map(|(&d, &v)| (d, v))
    }

    /// Evaluate `t` under this model, completing unassigned declarations to
    /// `false` / zero. Returns a value term: `true`, `false`, or a
    /// bit-vector constant.
    pub fn eval(&self, t: TermId, tm: &mut TermManager) -> TermId {
        let Some(term) = tm.get(t).cloned() else {
            return t;
        };
        match term.kind {
            TermKind::True | TermKind::False | TermKind::BvConst { .. } => t,
            TermKind::Var(_) => match self.get(t) {
                Some(v) => v,
                None => match tm.bitvec_width_of(t) {
                    Some(w) => tm.mk_bv_zero(w),
                    None => tm.mk_false(),
                },
            },
            TermKind::Not(a) => {
                let v = self.eval_bool(a, tm);
                bool_term(tm, !v)
            }
            TermKind::And(args) => {
                let v = args.iter().all(|&a| self.eval_bool(a, tm));
                bool_term(tm, v)
            }
            TermKind::Or(args) => {
                let v = args.iter().any(|&a| self.eval_bool(a, tm));
                bool_term(tm, v)
            }
            TermKind::Implies(a, b) => {
                let v = !self.eval_bool(a, tm) || self.eval_bool(b, tm);
                bool_term(tm, v)
            }
            TermKind::Xor(a, b) => {
                let v = self.eval_bool(a, tm) ^ self.eval_bool(b, tm);
                bool_term(tm, v)
            }
            TermKind::Eq(a, b) => {
                let va = self.eval(a, tm);
                let vb = self.eval(b, tm);
                bool_term(tm, va == vb)
            }
            TermKind::Ite(c, then, els) => {
                if self.eval_bool(c, tm) {
                    self.eval(then, tm)
                } else {
                    self.eval(els, tm)
                }
            }
            TermKind::BvNot(a) => {
                let (va, w) = self.eval_bv(a, tm);
                mk_masked(tm, mask(w) ^ va, w)
            }
            TermKind::BvNeg(a) => {
                let (va, w) = self.eval_bv(a, tm);
                mk_masked(tm, modulus(w) - va, w)
            }
            TermKind::BvAnd(a, b) => self.eval_bv_binop(a, b, tm, |x, y, _| x & y),
            TermKind::BvOr(a, b) => self.eval_bv_binop(a, b, tm, |x, y, _| x | y),
            TermKind::BvXor(a, b) => self.eval_bv_binop(a, b, tm, |x, y, _| x ^ y),
            TermKind::BvAdd(a, b) => self.eval_bv_binop(a, b, tm, |x, y, _| x + y),
            TermKind::BvSub(a, b) => self.eval_bv_binop(a, b, tm, |x, y, w| x + (modulus(w) - y)),
            TermKind::BvMul(a, b) => self.eval_bv_binop(a, b, tm, |x, y, _| x * y),
            TermKind::BvShl(a, b) => self.eval_bv_binop(a, b, tm, |x, y, w| {
                match shift_amount(&y, w) {
                    Some(s) => x << s,
                    None => BigUint::zero(),
                }
            }),
            TermKind::BvLshr(a, b) => self.eval_bv_binop(a, b, tm, |x, y, w| {
                match shift_amount(&y, w) {
                    Some(s) => x >> s,
                    None => BigUint::zero(),
                }
            }),
            TermKind::BvAshr(a, b) => self.eval_bv_binop(a, b, tm, |x, y, w| {
                let sign = x.bit(u64::from(w) - 1);
                match shift_amount(&y, w) {
                    Some(s) => {
                        let shifted = &x >> s;
                        if sign {
                            // fill the vacated high bits with ones
                            let fill = (mask(w) >> s) ^ mask(w);
                            shifted | fill
                        } else {
                            shifted
                        }
                    }
                    None => {
                        if sign {
                            mask(w)
                        } else {
                            BigUint::zero()
                        }
                    }
                }
            }),
            TermKind::BvConcat(hi, lo) => {
                let (vh, _) = self.eval_bv(hi, tm);
                let (vl, wl) = self.eval_bv(lo, tm);
                let w = tm.bitvec_width_of(t).unwrap_or(wl);
                mk_masked(tm, (vh << wl) | vl, w)
            }
            TermKind::BvExtract { hi, lo, arg } => {
                let (va, _) = self.eval_bv(arg, tm);
                let w = hi - lo + 1;
                mk_masked(tm, va >> lo, w)
            }
            TermKind::BvUlt(a, b) => {
                let (va, _) = self.eval_bv(a, tm);
                let (vb, _) = self.eval_bv(b, tm);
                bool_term(tm, va < vb)
            }
            TermKind::BvUle(a, b) => {
                let (va, _) = self.eval_bv(a, tm);
                let (vb, _) = self.eval_bv(b, tm);
                bool_term(tm, va <= vb)
            }
            TermKind::BvSlt(a, b) => {
                let (va, w) = self.eval_bv(a, tm);
                let (vb, _) = self.eval_bv(b, tm);
                bool_term(tm, signed(va, w) < signed(vb, w))
            }
            TermKind::BvSle(a, b) => {
                let (va, w) = self.eval_bv(a, tm);
                let (vb, _) = self.eval_bv(b, tm);
                bool_term(tm, signed(va, w) <= signed(vb, w))
            }
            TermKind::AtLeast { args, k } => {
                let n = args.iter().filter(|&&a| self.eval_bool(a, tm)).count();
                bool_term(tm, n as u32 >= k)
            }
            TermKind::AtMost { args, k } => {
                let n = args.iter().filter(|&&a| self.eval_bool(a, tm)).count();
                bool_term(tm, n as u32 <= k)
            }
        }
    }

    fn eval_bool(&self, t: TermId, tm: &mut TermManager) -> bool {
        let v = self.eval(t, tm);
        tm.is_true(v)
    }

    fn eval_bv(&self, t: TermId, tm: &mut TermManager) -> (BigUint, u32) {
        let v = self.eval(t, tm);
        match tm.bv_const_value(v) {
            Some((value, width)) => (value.clone(), width),
            // non-value result means `t` was not bit-vector sorted; treat as 1-bit zero
            None => (BigUint::zero(), 1),
        }
    }

    fn eval_bv_binop(
        &self,
        a: TermId,
        b: TermId,
        tm: &mut TermManager,
        op: impl Fn(BigUint, BigUint, u32) -> BigUint,
    ) -> TermId {
        let (va, w) = self.eval_bv(a, tm);
        let (vb, _) = self.eval_bv(b, tm);
        mk_masked(tm, op(va, vb, w), w)
    }
}

fn bool_term(tm: &TermManager, v: bool) -> TermId {
    if v {
        tm.mk_true()
    } else {
        tm.mk_false()
    }
}

fn mask(width: u32) -> BigUint {
    (BigUint::one() << width) - BigUint::one()
}

fn modulus(width: u32) -> BigUint {
    BigUint::one() << width
}

fn mk_masked(tm: &mut TermManager, value: BigUint, width: u32) -> TermId {
    tm.mk_bv_const(value, width)
}

/// Shift amount as a machine integer, or `None` when it is at least `width`
/// (the whole vector is shifted out).
fn shift_amount(amount: &BigUint, width: u32) -> Option<u64> {
    let s = amount.to_u64()?;
    if s >= u64::from(width) {
        None
    } else {
        Some(s)
    }
}

fn signed(value: BigUint, width: u32) -> BigInt {
    if width > 0 && value.bit(u64::from(width) - 1) {
        BigInt::from(value) - (BigInt::one() << width)
    } else {
        BigInt::from(value)
    }
}

/// A recorded transformation from a propositional model back towards the
/// original vocabulary. Converters are composed left-to-right in the order
/// they were recorded.
pub trait ModelConverter {
    /// Rewrite `model` in place.
    fn convert(&self, model: &mut Model, tm: &mut TermManager);
}

/// Apply a converter chain in construction order.
pub fn apply_converters(chain: &[Box<dyn ModelConverter>], model: &mut Model, tm: &mut TermManager) {
    for mc in chain {
        mc.convert(model, tm);
    }
}
