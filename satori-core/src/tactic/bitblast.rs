//! Bit-blasting.
//!
//! The [`BitBlaster`] rewrites every bit-vector term into per-bit Boolean
//! terms: ripple-carry adders, a shift-add multiplier, barrel shifters and
//! comparison chains, all expressed through the term manager so the final
//! simplification pass can fold the constant parts away.
//!
//! The rewriter is stateful: its memo tables persist across incremental
//! calls, and bit-vector declarations are entered into a `const2bits` side
//! table mapping each declaration to its fresh Boolean bit variables. Both
//! tables are scope-aware; `push`/`pop` keep them in lockstep with the rest
//! of the solver so entries created inside a scope are forgotten when the
//! scope is left.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;

use crate::ast::{TermId, TermKind, TermManager};
use crate::error::{Result, SatoriError};
use crate::model::{Model, ModelConverter};
use crate::statistics::Statistics;
use crate::tactic::{Goal, Tactic, TacticApplication};

/// The stateful bit-blasting rewriter.
#[derive(Debug, Default)]
pub struct BitBlaster {
    /// Boolean-position rewrite memo.
    formula_cache: FxHashMap<TermId, TermId>,
    /// Bit-vector term → its Boolean bits, LSB first.
    bits_cache: FxHashMap<TermId, Vec<TermId>>,
    /// Bit-vector declaration → its fresh Boolean bit variables.
    const2bits: FxHashMap<TermId, Vec<TermId>>,
    formula_log: Vec<TermId>,
    bits_log: Vec<TermId>,
    const_log: Vec<TermId>,
    scopes: Vec<(usize, usize, usize)>,
    blasted: u64,
}

impl BitBlaster {
    /// Create an empty rewriter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The declaration → bits side table, for model reconstruction.
    #[must_use]
    pub fn const2bits(&self) -> &FxHashMap<TermId, Vec<TermId>> {
        &self.const2bits
    }

    /// Open a scope: entries added from now on are removed by the matching
    /// [`BitBlaster::pop`].
    pub fn push(&mut self) {
        self.scopes.push((
            self.formula_log.len(),
            self.bits_log.len(),
            self.const_log.len(),
        ));
    }

    /// Close `n` scopes, forgetting every entry they introduced.
    pub fn pop(&mut self, n: u32) {
        let n = (n as usize).min(self.scopes.len());
        if n == 0 {
            return;
        }
        let idx = self.scopes.len() - n;
        let (f, b, c) = self.scopes[idx];
        tracing::debug!(
            scopes = n,
            formulas = self.formula_log.len() - f,
            consts = self.const_log.len() - c,
            "dropping blasted entries"
        );
        self.scopes.truncate(idx);
        for key in self.formula_log.drain(f..) {
            self.formula_cache.remove(&key);
        }
        for key in self.bits_log.drain(b..) {
            self.bits_cache.remove(&key);
        }
        for key in self.const_log.drain(c..) {
            self.const2bits.remove(&key);
        }
    }

    /// Rewrite a Boolean-sorted term into one free of bit-vector operators.
    pub fn blast_formula(&mut self, t: TermId, tm: &mut TermManager) -> Result<TermId> {
        if let Some(&done) = self.formula_cache.get(&t) {
            return Ok(done);
        }
        let Some(term) = tm.get(t).cloned() else {
            return Ok(t);
        };
        let result = match term.kind {
            TermKind::True | TermKind::False | TermKind::Var(_) => t,
            TermKind::Not(_)
            | TermKind::And(_)
            | TermKind::Or(_)
            | TermKind::Implies(_, _)
            | TermKind::Xor(_, _) => self.blast_children(t, tm)?,
            TermKind::Ite(_, _, _) => self.blast_children(t, tm)?,
            TermKind::Eq(a, b) => {
                if tm.bitvec_width_of(a).is_some() {
                    let bits_a = self.blast_bits(a, tm)?;
                    let bits_b = self.blast_bits(b, tm)?;
                    self.blasted += 1;
                    let eqs: Vec<TermId> = bits_a
                        .iter()
                        .zip(bits_b.iter())
                        .map(|(&x, &y)| tm.mk_eq(x, y))
                        .collect();
                    tm.mk_and(eqs)
                } else {
                    self.blast_children(t, tm)?
                }
            }
            TermKind::BvUlt(a, b) => {
                let bits_a = self.blast_bits(a, tm)?;
                let bits_b = self.blast_bits(b, tm)?;
                self.blasted += 1;
                ult(&bits_a, &bits_b, tm)
            }
            TermKind::BvUle(a, b) => {
                let bits_a = self.blast_bits(a, tm)?;
                let bits_b = self.blast_bits(b, tm)?;
                self.blasted += 1;
                let gt = ult(&bits_b, &bits_a, tm);
                tm.mk_not(gt)
            }
            TermKind::BvSlt(a, b) => {
                let bits_a = self.blast_bits(a, tm)?;
                let bits_b = self.blast_bits(b, tm)?;
                self.blasted += 1;
                slt(&bits_a, &bits_b, tm)
            }
            TermKind::BvSle(a, b) => {
                let bits_a = self.blast_bits(a, tm)?;
                let bits_b = self.blast_bits(b, tm)?;
                self.blasted += 1;
                let gt = slt(&bits_b, &bits_a, tm);
                tm.mk_not(gt)
            }
            TermKind::AtLeast { .. } | TermKind::AtMost { .. } => {
                return Err(SatoriError::Tactic {
                    tactic: "bitblast",
                    reason: "cardinality operator not eliminated before bit-blasting".into(),
                })
            }
            _ => {
                return Err(SatoriError::Tactic {
                    tactic: "bitblast",
                    reason: "bit-vector term in formula position".into(),
                })
            }
        };
        self.formula_cache.insert(t, result);
        self.formula_log.push(t);
        Ok(result)
    }

    fn blast_children(&mut self, t: TermId, tm: &mut TermManager) -> Result<TermId> {
        let kids = tm.children(t);
        let mut new_kids = Vec::with_capacity(kids.len());
        for &c in &kids {
            new_kids.push(self.blast_formula(c, tm)?);
        }
        if new_kids.as_slice() == kids.as_slice() {
            Ok(t)
        } else {
            Ok(tm.clone_with_children(t, &new_kids))
        }
    }

    /// Rewrite a bit-vector-sorted term into its Boolean bits, LSB first.
    pub fn blast_bits(&mut self, t: TermId, tm: &mut TermManager) -> Result<Vec<TermId>> {
        if let Some(bits) = self.bits_cache.get(&t) {
            return Ok(bits.clone());
        }
        let Some(term) = tm.get(t).cloned() else {
            return Err(SatoriError::Invariant(format!("unknown term {t:?}")));
        };
        let result = match term.kind {
            TermKind::BvConst { ref value, width } => (0..width)
                .map(|i| {
                    if value.bit(u64::from(i)) {
                        tm.mk_true()
                    } else {
                        tm.mk_false()
                    }
                })
                .collect(),
            TermKind::Var(_) => {
                if let Some(bits) = self.const2bits.get(&t) {
                    bits.clone()
                } else {
                    let width = tm.bitvec_width_of(t).unwrap_or(0);
                    let name = tm.var_name(t).unwrap_or("bv").to_string();
                    let bool_sort = tm.sorts.bool_sort;
                    let bits: Vec<TermId> = (0..width)
                        .map(|i| tm.mk_var(&format!("{name}!{i}"), bool_sort))
                        .collect();
                    self.const2bits.insert(t, bits.clone());
                    self.const_log.push(t);
                    bits
                }
            }
            TermKind::BvNot(a) => {
                let bits = self.blast_bits(a, tm)?;
                bits.iter().map(|&b| tm.mk_not(b)).collect()
            }
            TermKind::BvNeg(a) => {
                let bits = self.blast_bits(a, tm)?;
                let inverted: Vec<TermId> = bits.iter().map(|&b| tm.mk_not(b)).collect();
                let cin = tm.mk_true();
                ripple_add(&inverted, &zeros(inverted.len(), tm), cin, tm)
            }
            TermKind::BvAnd(a, b) => self.blast_bitwise(a, b, tm, |tm, x, y| tm.mk_and(vec![x, y]))?,
            TermKind::BvOr(a, b) => self.blast_bitwise(a, b, tm, |tm, x, y| tm.mk_or(vec![x, y]))?,
            TermKind::BvXor(a, b) => self.blast_bitwise(a, b, tm, TermManager::mk_xor)?,
            TermKind::BvAdd(a, b) => {
                let bits_a = self.blast_bits(a, tm)?;
                let bits_b = self.blast_bits(b, tm)?;
                let cin = tm.mk_false();
                ripple_add(&bits_a, &bits_b, cin, tm)
            }
            TermKind::BvSub(a, b) => {
                let bits_a = self.blast_bits(a, tm)?;
                let bits_b = self.blast_bits(b, tm)?;
                let inverted: Vec<TermId> = bits_b.iter().map(|&x| tm.mk_not(x)).collect();
                let cin = tm.mk_true();
                ripple_add(&bits_a, &inverted, cin, tm)
            }
            TermKind::BvMul(a, b) => {
                let bits_a = self.blast_bits(a, tm)?;
                let bits_b = self.blast_bits(b, tm)?;
                multiply(&bits_a, &bits_b, tm)
            }
            TermKind::BvShl(a, b) => {
                let bits_a = self.blast_bits(a, tm)?;
                let bits_b = self.blast_bits(b, tm)?;
                barrel_shift(&bits_a, &bits_b, ShiftKind::Left, tm)
            }
            TermKind::BvLshr(a, b) => {
                let bits_a = self.blast_bits(a, tm)?;
                let bits_b = self.blast_bits(b, tm)?;
                barrel_shift(&bits_a, &bits_b, ShiftKind::LogicalRight, tm)
            }
            TermKind::BvAshr(a, b) => {
                let bits_a = self.blast_bits(a, tm)?;
                let bits_b = self.blast_bits(b, tm)?;
                barrel_shift(&bits_a, &bits_b, ShiftKind::ArithmeticRight, tm)
            }
            TermKind::BvConcat(hi, lo) => {
                let mut bits = self.blast_bits(lo, tm)?;
                bits.extend(self.blast_bits(hi, tm)?);
                bits
            }
            TermKind::BvExtract { hi, lo, arg } => {
                let bits = self.blast_bits(arg, tm)?;
                bits[lo as usize..=hi as usize].to_vec()
            }
            TermKind::Ite(c, th, el) => {
                let cond = self.blast_formula(c, tm)?;
                let bits_t = self.blast_bits(th, tm)?;
                let bits_e = self.blast_bits(el, tm)?;
                bits_t
                    .iter()
                    .zip(bits_e.iter())
                    .map(|(&x, &y)| tm.mk_ite(cond, x, y))
                    .collect()
            }
            _ => {
                return Err(SatoriError::Tactic {
                    tactic: "bitblast",
                    reason: "boolean term in bit-vector position".into(),
                })
            }
        };
        self.blasted += 1;
        self.bits_cache.insert(t, result.clone());
        self.bits_log.push(t);
        Ok(result)
    }

    fn blast_bitwise(
        &mut self,
        a: TermId,
        b: TermId,
        tm: &mut TermManager,
        op: impl Fn(&mut TermManager, TermId, TermId) -> TermId,
    ) -> Result<Vec<TermId>> {
        let bits_a = self.blast_bits(a, tm)?;
        let bits_b = self.blast_bits(b, tm)?;
        Ok(bits_a
            .iter()
            .zip(bits_b.iter())
            .map(|(&x, &y)| op(tm, x, y))
            .collect())
    }
}

fn zeros(n: usize, tm: &TermManager) -> Vec<TermId> {
    vec![tm.mk_false(); n]
}

/// Ripple-carry adder; the carry out of the top bit is discarded.
fn ripple_add(a: &[TermId], b: &[TermId], cin: TermId, tm: &mut TermManager) -> Vec<TermId> {
    let mut carry = cin;
    let mut out = Vec::with_capacity(a.len());
    for (&x, &y) in a.iter().zip(b.iter()) {
        let xy = tm.mk_xor(x, y);
        out.push(tm.mk_xor(xy, carry));
        let and_xy = tm.mk_and(vec![x, y]);
        let and_c = tm.mk_and(vec![carry, xy]);
        carry = tm.mk_or(vec![and_xy, and_c]);
    }
    out
}

/// Shift-add multiplier.
fn multiply(a: &[TermId], b: &[TermId], tm: &mut TermManager) -> Vec<TermId> {
    let w = a.len();
    let mut acc = zeros(w, tm);
    for j in 0..w {
        let mut partial = zeros(w, tm);
        for i in j..w {
            partial[i] = tm.mk_and(vec![b[j], a[i - j]]);
        }
        let cin = tm.mk_false();
        acc = ripple_add(&acc, &partial, cin, tm);
    }
    acc
}

/// Unsigned less-than over bit lists, LSB first.
fn ult(a: &[TermId], b: &[TermId], tm: &mut TermManager) -> TermId {
    let mut lt = tm.mk_false();
    for (&x, &y) in a.iter().zip(b.iter()) {
        let nx = tm.mk_not(x);
        let here = tm.mk_and(vec![nx, y]);
        let eq = tm.mk_eq(x, y);
        let keep = tm.mk_and(vec![eq, lt]);
        lt = tm.mk_or(vec![here, keep]);
    }
    lt
}

/// Signed less-than: sign split plus unsigned comparison when signs agree.
fn slt(a: &[TermId], b: &[TermId], tm: &mut TermManager) -> TermId {
    let Some((&sa, _)) = a.split_last() else {
        return tm.mk_false();
    };
    let Some((&sb, _)) = b.split_last() else {
        return tm.mk_false();
    };
    let nsb = tm.mk_not(sb);
    let neg_pos = tm.mk_and(vec![sa, nsb]);
    let same_sign = tm.mk_eq(sa, sb);
    let unsigned = ult(a, b, tm);
    let same_and_lt = tm.mk_and(vec![same_sign, unsigned]);
    tm.mk_or(vec![neg_pos, same_and_lt])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShiftKind {
    Left,
    LogicalRight,
    ArithmeticRight,
}

/// Barrel shifter staged over the bits of the shift amount.
fn barrel_shift(a: &[TermId], shift: &[TermId], kind: ShiftKind, tm: &mut TermManager) -> Vec<TermId> {
    let w = a.len();
    let mut res = a.to_vec();
    for (k, &sbit) in shift.iter().enumerate() {
        // 2^k >= w shifts everything out
        let overflows = k >= usize::BITS as usize - 1 || (1usize << k) >= w;
        let fill = match kind {
            ShiftKind::Left | ShiftKind::LogicalRight => tm.mk_false(),
            ShiftKind::ArithmeticRight => res[w - 1],
        };
        let mut next = Vec::with_capacity(w);
        for i in 0..w {
            let shifted_in = if overflows {
                fill
            } else {
                let amt = 1usize << k;
                match kind {
                    ShiftKind::Left => {
                        if i >= amt {
                            res[i - amt]
                        } else {
                            fill
                        }
                    }
                    ShiftKind::LogicalRight | ShiftKind::ArithmeticRight => {
                        if i + amt < w {
                            res[i + amt]
                        } else {
                            fill
                        }
                    }
                }
            };
            next.push(tm.mk_ite(sbit, shifted_in, res[i]));
        }
        res = next;
    }
    res
}

impl Tactic for BitBlaster {
    fn name(&self) -> &'static str {
        "bitblast"
    }

    fn apply(&mut self, goal: &Goal, tm: &mut TermManager) -> Result<TacticApplication> {
        let mut out = Goal::new(goal.models_enabled(), goal.cores_enabled());
        for (assertion, dep) in goal.iter() {
            let blasted = self.blast_formula(assertion, tm)?;
            out.assert_with_dep(blasted, dep);
        }
        Ok(TacticApplication::single(out))
    }

    fn collect_statistics(&self, st: &mut Statistics) {
        st.incr("bitblast.terms", self.blasted);
        st.set("bitblast.consts", self.const2bits.len() as u64);
    }
}

/// Reconstructs bit-vector values from the Boolean bit assignment and
/// removes the bit variables from the model. Appended last to the converter
/// chain whenever the blaster's side table is non-empty.
#[derive(Debug)]
pub struct BvModelConverter {
    entries: Vec<(TermId, u32, Vec<TermId>)>,
}

impl BvModelConverter {
    /// Snapshot the blaster's current side table.
    #[must_use]
    pub fn from_table(blaster: &BitBlaster, tm: &TermManager) -> Self {
        let entries = blaster
            .const2bits()
            .iter()
            .map(|(&var, bits)| {
                let width = tm.bitvec_width_of(var).unwrap_or(bits.len() as u32);
                (var, width, bits.clone())
            })
            .collect();
        Self { entries }
    }
}

impl ModelConverter for BvModelConverter {
    fn convert(&self, model: &mut Model, tm: &mut TermManager) {
        for (var, width, bits) in &self.entries {
            let mut value = BigUint::zero();
            for (i, &bit) in bits.iter().enumerate() {
                if model.get(bit).is_some_and(|v| tm.is_true(v)) {
                    value |= BigUint::one() << i;
                }
                model.remove(bit);
            }
            let constant = tm.mk_bv_const(value, *width);
            model.set(*var, constant);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::tactic::simplify::SimplifyTactic;

    /// Blast a closed (constant) formula and fold it down to a truth value.
    fn blast_ground(tm: &mut TermManager, t: TermId) -> TermId {
        let mut blaster = BitBlaster::new();
        let blasted = blaster.blast_formula(t, tm).expect("blast");
        SimplifyTactic::new().simplify(blasted, tm).expect("fold")
    }

    #[test]
    fn test_ground_addition() {
        let mut tm = TermManager::new();
        let a = tm.mk_bv_const_u64(9, 4);
        let b = tm.mk_bv_const_u64(8, 4);
        let one = tm.mk_bv_const_u64(1, 4);
        let sum = tm.mk_bv_add(a, b); // 17 mod 16 = 1
        let eq = tm.mk_eq(sum, one);
        let r = blast_ground(&mut tm, eq);
        assert!(tm.is_true(r));
    }

    #[test]
    fn test_ground_comparisons() {
        let mut tm = TermManager::new();
        let three = tm.mk_bv_const_u64(3, 4);
        let twelve = tm.mk_bv_const_u64(12, 4); // -4 signed
        let ult_t = tm.mk_bv_ult(three, twelve);
        let slt_t = tm.mk_bv_slt(twelve, three);
        let r1 = blast_ground(&mut tm, ult_t);
        let r2 = blast_ground(&mut tm, slt_t);
        assert!(tm.is_true(r1));
        assert!(tm.is_true(r2));
    }

    #[test]
    fn test_ground_mul_and_shift() {
        let mut tm = TermManager::new();
        let five = tm.mk_bv_const_u64(5, 8);
        let six = tm.mk_bv_const_u64(6, 8);
        let thirty = tm.mk_bv_const_u64(30, 8);
        let prod = tm.mk_bv_mul(five, six);
        let eq = tm.mk_eq(prod, thirty);
        let r = blast_ground(&mut tm, eq);
        assert!(tm.is_true(r));

        let two = tm.mk_bv_const_u64(2, 8);
        let twenty = tm.mk_bv_const_u64(20, 8);
        let shifted = tm.mk_bv_shl(five, two);
        let eq2 = tm.mk_eq(shifted, twenty);
        let r2 = blast_ground(&mut tm, eq2);
        assert!(tm.is_true(r2));
    }

    #[test]
    fn test_declaration_bits_are_recorded_and_scoped() {
        let mut tm = TermManager::new();
        let bv4 = tm.sorts.mk_bitvec(4);
        let c = tm.mk_var("c", bv4);
        let d = tm.mk_var("d", bv4);

        let mut blaster = BitBlaster::new();
        let zero = tm.mk_bv_zero(4);
        let eq_c = tm.mk_eq(c, zero);
        blaster.blast_formula(eq_c, &mut tm).expect("blast");
        assert_eq!(blaster.const2bits().len(), 1);

        blaster.push();
        let eq_d = tm.mk_eq(d, zero);
        blaster.blast_formula(eq_d, &mut tm).expect("blast");
        assert_eq!(blaster.const2bits().len(), 2);

        blaster.pop(1);
        assert_eq!(blaster.const2bits().len(), 1);
        assert!(blaster.const2bits().contains_key(&c));
    }

    #[test]
    fn test_model_converter_reconstructs_value() {
        let mut tm = TermManager::new();
        let bv4 = tm.sorts.mk_bitvec(4);
        let c = tm.mk_var("c", bv4);
        let five = tm.mk_bv_const_u64(5, 4);
        let eq = tm.mk_eq(c, five);

        let mut blaster = BitBlaster::new();
        blaster.blast_formula(eq, &mut tm).expect("blast");
        let bits = blaster.const2bits().get(&c).expect("bits for c").clone();

        // assignment for value 5 = 0101
        let mut model = Model::new();
        let tt = tm.mk_true();
        let ff = tm.mk_false();
        model.set(bits[0], tt);
        model.set(bits[1], ff);
        model.set(bits[2], tt);
        model.set(bits[3], ff);

        let converter = BvModelConverter::from_table(&blaster, &tm);
        converter.convert(&mut model, &mut tm);

        assert_eq!(model.get(c), Some(five));
        // bit variables are filtered out
        assert!(model.get(bits[0]).is_none());
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_blasted_formula_matches_bv_semantics() {
        // compare the blasted circuit against direct evaluation on a sweep
        let mut tm = TermManager::new();
        let bv3 = tm.sorts.mk_bitvec(3);
        let x = tm.mk_var("x", bv3);
        let y = tm.mk_var("y", bv3);
        let sum = tm.mk_bv_add(x, y);
        let prod = tm.mk_bv_mul(x, y);
        let ult_t = tm.mk_bv_ult(x, y);
        let formulas = [tm.mk_eq(sum, prod), ult_t];

        let mut blaster = BitBlaster::new();
        let blasted: Vec<TermId> = formulas
            .iter()
            .map(|&f| blaster.blast_formula(f, &mut tm).expect("blast"))
            .collect();
        let xb = blaster.const2bits().get(&x).expect("x bits").clone();
        let yb = blaster.const2bits().get(&y).expect("y bits").clone();

        for vx in 0u64..8 {
            for vy in 0u64..8 {
                let mut model = Model::new();
                let tt = tm.mk_true();
                let ff = tm.mk_false();
                for i in 0..3 {
                    model.set(xb[i], if vx >> i & 1 == 1 { tt } else { ff });
                    model.set(yb[i], if vy >> i & 1 == 1 { tt } else { ff });
                }
                let cx = tm.mk_bv_const_u64(vx, 3);
                let cy = tm.mk_bv_const_u64(vy, 3);
                let mut direct = Model::new();
                direct.set(x, cx);
                direct.set(y, cy);
                for (&f, &b) in formulas.iter().zip(blasted.iter()) {
                    assert_eq!(
                        model.eval(b, &mut tm),
                        direct.eval(f, &mut tm),
                        "mismatch at x={vx} y={vy}"
                    );
                }
            }
        }
    }
}
