//! Hash-consed terms.
//!
//! Terms live in an append-only arena owned by a [`TermManager`] and are
//! referenced by [`TermId`]. Structural interning makes term identity
//! equivalent to structural equality, which the scoped maps in the solver
//! rely on for stable keys.
//!
//! The operator family covers quantifier-free Boolean structure, fixed-width
//! bit-vectors, and cardinality constraints. Constructors perform only the
//! folds needed to keep negation and equality canonical; everything else is
//! the job of the simplification tactic.

use std::sync::Arc;

use lasso::{Rodeo, Spur};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::resource::ResourceLimit;
use crate::sort::{SortId, SortKind, SortStore};

/// Identifier of an interned term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(pub u32);

/// The shape of a term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// Boolean constant true.
    True,
    /// Boolean constant false.
    False,
    /// A named 0-ary declaration (Boolean or bit-vector sorted).
    Var(Spur),
    /// Logical negation.
    Not(TermId),
    /// N-ary conjunction.
    And(Vec<TermId>),
    /// N-ary disjunction.
    Or(Vec<TermId>),
    /// Implication.
    Implies(TermId, TermId),
    /// Exclusive or.
    Xor(TermId, TermId),
    /// Equality. On Booleans this is iff; on bit-vectors, bitwise equality.
    Eq(TermId, TermId),
    /// If-then-else; the branches share a sort.
    Ite(TermId, TermId, TermId),
    /// Bit-vector constant, value masked to `width` bits.
    BvConst {
        /// The (non-negative) value.
        value: BigUint,
        /// Width in bits.
        width: u32,
    },
    /// Bitwise complement.
    BvNot(TermId),
    /// Two's complement negation.
    BvNeg(TermId),
    /// Bitwise and.
    BvAnd(TermId, TermId),
    /// Bitwise or.
    BvOr(TermId, TermId),
    /// Bitwise xor.
    BvXor(TermId, TermId),
    /// Modular addition.
    BvAdd(TermId, TermId),
    /// Modular subtraction.
    BvSub(TermId, TermId),
    /// Modular multiplication.
    BvMul(TermId, TermId),
    /// Left shift (shift amount is a bit-vector term).
    BvShl(TermId, TermId),
    /// Logical right shift.
    BvLshr(TermId, TermId),
    /// Arithmetic right shift.
    BvAshr(TermId, TermId),
    /// Concatenation; the first operand supplies the high bits.
    BvConcat(TermId, TermId),
    /// Bit range extraction, inclusive on both ends.
    BvExtract {
        /// Highest extracted bit index.
        hi: u32,
        /// Lowest extracted bit index.
        lo: u32,
        /// The source term.
        arg: TermId,
    },
    /// Unsigned less-than.
    BvUlt(TermId, TermId),
    /// Unsigned less-or-equal.
    BvUle(TermId, TermId),
    /// Signed less-than.
    BvSlt(TermId, TermId),
    /// Signed less-or-equal.
    BvSle(TermId, TermId),
    /// At least `k` of the arguments are true.
    AtLeast {
        /// Boolean arguments.
        args: Vec<TermId>,
        /// The cardinality bound.
        k: u32,
    },
    /// At most `k` of the arguments are true.
    AtMost {
        /// Boolean arguments.
        args: Vec<TermId>,
        /// The cardinality bound.
        k: u32,
    },
}

/// An interned term: a kind plus its sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    /// The shape of the term.
    pub kind: TermKind,
    /// The sort of the term.
    pub sort: SortId,
}

/// Owner and interner of terms.
#[derive(Debug)]
pub struct TermManager {
    terms: Vec<Term>,
    cache: FxHashMap<Term, TermId>,
    symbols: Rodeo,
    /// The sort store for this manager.
    pub sorts: SortStore,
    limit: Arc<ResourceLimit>,
    fresh_counter: u32,
}

impl Default for TermManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TermManager {
    /// Create a manager with `true` and `false` pre-interned.
    #[must_use]
    pub fn new() -> Self {
        let mut tm = Self {
            terms: Vec::new(),
            cache: FxHashMap::default(),
            symbols: Rodeo::default(),
            sorts: SortStore::new(),
            limit: ResourceLimit::new(),
            fresh_counter: 0,
        };
        let bool_sort = tm.sorts.bool_sort;
        let t = tm.intern(TermKind::True, bool_sort);
        let f = tm.intern(TermKind::False, bool_sort);
        debug_assert_eq!(t, TermId(0));
        debug_assert_eq!(f, TermId(1));
        tm
    }

    /// The shared resource limit polled by tactics and the SAT engine.
    #[must_use]
    pub fn limit(&self) -> Arc<ResourceLimit> {
        Arc::clone(&self.limit)
    }

    fn intern(&mut self, kind: TermKind, sort: SortId) -> TermId {
        let term = Term { kind, sort };
        if let Some(&id) = self.cache.get(&term) {
            return id;
        }
        let id = TermId(self.terms.len() as u32);
        self.terms.push(term.clone());
        self.cache.insert(term, id);
        id
    }

    /// Look up a term by id.
    #[must_use]
    pub fn get(&self, t: TermId) -> Option<&Term> {
        self.terms.get(t.0 as usize)
    }

    /// Sort of a term.
    #[must_use]
    pub fn sort_of(&self, t: TermId) -> Option<SortId> {
        self.get(t).map(|term| term.sort)
    }

    /// Width of a term if it is bit-vector sorted.
    #[must_use]
    pub fn bitvec_width_of(&self, t: TermId) -> Option<u32> {
        self.sort_of(t).and_then(|s| self.sorts.bitvec_width(s))
    }

    /// Check whether `t` is Boolean sorted.
    #[must_use]
    pub fn is_bool_sorted(&self, t: TermId) -> bool {
        self.sort_of(t).is_some_and(|s| self.sorts.is_bool(s))
    }

    /// Number of interned terms.
    #[must_use]
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// The constant `true`.
    #[must_use]
    pub fn mk_true(&self) -> TermId {
        TermId(0)
    }

    /// The constant `false`.
    #[must_use]
    pub fn mk_false(&self) -> TermId {
        TermId(1)
    }

    /// Check for the constant `true`.
    #[must_use]
    pub fn is_true(&self, t: TermId) -> bool {
        t == self.mk_true()
    }

    /// Check for the constant `false`.
    #[must_use]
    pub fn is_false(&self, t: TermId) -> bool {
        t == self.mk_false()
    }

    /// Check whether `t` is a leaf: a 0-ary declaration.
    #[must_use]
    pub fn is_leaf(&self, t: TermId) -> bool {
        matches!(self.get(t).map(|term| &term.kind), Some(TermKind::Var(_)))
    }

    /// Name of a leaf, if `t` is one.
    #[must_use]
    pub fn var_name(&self, t: TermId) -> Option<&str> {
        match self.get(t).map(|term| &term.kind) {
            Some(TermKind::Var(sym)) => Some(self.symbols.resolve(sym)),
            _ => None,
        }
    }

    /// Value and width of a bit-vector constant, if `t` is one.
    #[must_use]
    pub fn bv_const_value(&self, t: TermId) -> Option<(&BigUint, u32)> {
        match self.get(t).map(|term| &term.kind) {
            Some(TermKind::BvConst { value, width }) => Some((value, *width)),
            _ => None,
        }
    }

    /// Intern a named 0-ary declaration.
    pub fn mk_var(&mut self, name: &str, sort: SortId) -> TermId {
        let sym = self.symbols.get_or_intern(name);
        self.intern(TermKind::Var(sym), sort)
    }

    /// Intern a declaration with a unique `prefix!n` name.
    pub fn mk_fresh_var(&mut self, prefix: &str, sort: SortId) -> TermId {
        let n = self.fresh_counter;
        self.fresh_counter += 1;
        let name = format!("{prefix}!{n}");
        self.mk_var(&name, sort)
    }

    /// Negation. Folds constants and double negation so that the negation of
    /// a term is always recognizable by identity.
    pub fn mk_not(&mut self, t: TermId) -> TermId {
        if self.is_true(t) {
            return self.mk_false();
        }
        if self.is_false(t) {
            return self.mk_true();
        }
        if let Some(TermKind::Not(inner)) = self.get(t).map(|term| &term.kind) {
            return *inner;
        }
        let bool_sort = self.sorts.bool_sort;
        self.intern(TermKind::Not(t), bool_sort)
    }

    /// N-ary conjunction. Empty conjunctions are `true`.
    pub fn mk_and(&mut self, args: Vec<TermId>) -> TermId {
        match args.len() {
            0 => self.mk_true(),
            1 => args[0],
            _ => {
                let bool_sort = self.sorts.bool_sort;
                self.intern(TermKind::And(args), bool_sort)
            }
        }
    }

    /// N-ary disjunction. Empty disjunctions are `false`.
    pub fn mk_or(&mut self, args: Vec<TermId>) -> TermId {
        match args.len() {
            0 => self.mk_false(),
            1 => args[0],
            _ => {
                let bool_sort = self.sorts.bool_sort;
                self.intern(TermKind::Or(args), bool_sort)
            }
        }
    }

    /// Implication.
    pub fn mk_implies(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let bool_sort = self.sorts.bool_sort;
        self.intern(TermKind::Implies(lhs, rhs), bool_sort)
    }

    /// Exclusive or.
    pub fn mk_xor(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let bool_sort = self.sorts.bool_sort;
        self.intern(TermKind::Xor(lhs, rhs), bool_sort)
    }

    /// Equality. Identical operands fold to `true`; operands are ordered by
    /// identity so `a = b` and `b = a` intern to the same term.
    pub fn mk_eq(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        if lhs == rhs {
            return self.mk_true();
        }
        let (lhs, rhs) = if lhs.0 <= rhs.0 { (lhs, rhs) } else { (rhs, lhs) };
        let bool_sort = self.sorts.bool_sort;
        self.intern(TermKind::Eq(lhs, rhs), bool_sort)
    }

    /// If-then-else. Folds constant conditions and equal branches.
    pub fn mk_ite(&mut self, cond: TermId, then: TermId, els: TermId) -> TermId {
        if self.is_true(cond) {
            return then;
        }
        if self.is_false(cond) {
            return els;
        }
        if then == els {
            return then;
        }
        let sort = self.sort_of(then).unwrap_or(self.sorts.bool_sort);
        self.intern(TermKind::Ite(cond, then, els), sort)
    }

    /// Bit-vector constant; the value is reduced modulo `2^width`.
    pub fn mk_bv_const(&mut self, value: BigUint, width: u32) -> TermId {
        let mask = (BigUint::one() << width) - BigUint::one();
        let value = value & mask;
        let sort = self.sorts.mk_bitvec(width);
        self.intern(TermKind::BvConst { value, width }, sort)
    }

    /// Bit-vector constant from a machine integer.
    pub fn mk_bv_const_u64(&mut self, value: u64, width: u32) -> TermId {
        self.mk_bv_const(BigUint::from(value), width)
    }

    /// The zero constant of `width` bits.
    pub fn mk_bv_zero(&mut self, width: u32) -> TermId {
        self.mk_bv_const(BigUint::zero(), width)
    }

    fn bv_unary(&mut self, kind: fn(TermId) -> TermKind, arg: TermId) -> TermId {
        let sort = self.sort_of(arg).unwrap_or(self.sorts.bool_sort);
        self.intern(kind(arg), sort)
    }

    fn bv_binary(&mut self, kind: fn(TermId, TermId) -> TermKind, lhs: TermId, rhs: TermId) -> TermId {
        debug_assert_eq!(self.bitvec_width_of(lhs), self.bitvec_width_of(rhs));
        let sort = self.sort_of(lhs).unwrap_or(self.sorts.bool_sort);
        self.intern(kind(lhs, rhs), sort)
    }

    fn bv_predicate(&mut self, kind: fn(TermId, TermId) -> TermKind, lhs: TermId, rhs: TermId) -> TermId {
        debug_assert_eq!(self.bitvec_width_of(lhs), self.bitvec_width_of(rhs));
        let bool_sort = self.sorts.bool_sort;
        self.intern(kind(lhs, rhs), bool_sort)
    }

    /// Bitwise complement.
    pub fn mk_bv_not(&mut self, arg: TermId) -> TermId {
        self.bv_unary(TermKind::BvNot, arg)
    }

    /// Two's complement negation.
    pub fn mk_bv_neg(&mut self, arg: TermId) -> TermId {
        self.bv_unary(TermKind::BvNeg, arg)
    }

    /// Bitwise and.
    pub fn mk_bv_and(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_binary(TermKind::BvAnd, lhs, rhs)
    }

    /// Bitwise or.
    pub fn mk_bv_or(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_binary(TermKind::BvOr, lhs, rhs)
    }

    /// Bitwise xor.
    pub fn mk_bv_xor(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_binary(TermKind::BvXor, lhs, rhs)
    }

    /// Modular addition.
    pub fn mk_bv_add(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_binary(TermKind::BvAdd, lhs, rhs)
    }

    /// Modular subtraction.
    pub fn mk_bv_sub(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_binary(TermKind::BvSub, lhs, rhs)
    }

    /// Modular multiplication.
    pub fn mk_bv_mul(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_binary(TermKind::BvMul, lhs, rhs)
    }

    /// Left shift.
    pub fn mk_bv_shl(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_binary(TermKind::BvShl, lhs, rhs)
    }

    /// Logical right shift.
    pub fn mk_bv_lshr(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_binary(TermKind::BvLshr, lhs, rhs)
    }

    /// Arithmetic right shift.
    pub fn mk_bv_ashr(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_binary(TermKind::BvAshr, lhs, rhs)
    }

    /// Concatenation; `hi` supplies the high bits.
    pub fn mk_bv_concat(&mut self, hi: TermId, lo: TermId) -> TermId {
        let hi_w = self.bitvec_width_of(hi).unwrap_or(0);
        let lo_w = self.bitvec_width_of(lo).unwrap_or(0);
        let sort = self.sorts.mk_bitvec(hi_w + lo_w);
        self.intern(TermKind::BvConcat(hi, lo), sort)
    }

    /// Bit range extraction, inclusive on both ends.
    pub fn mk_bv_extract(&mut self, hi: u32, lo: u32, arg: TermId) -> TermId {
        debug_assert!(hi >= lo);
        debug_assert!(self.bitvec_width_of(arg).is_some_and(|w| hi < w));
        let sort = self.sorts.mk_bitvec(hi - lo + 1);
        self.intern(TermKind::BvExtract { hi, lo, arg }, sort)
    }

    /// Unsigned less-than.
    pub fn mk_bv_ult(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_predicate(TermKind::BvUlt, lhs, rhs)
    }

    /// Unsigned less-or-equal.
    pub fn mk_bv_ule(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_predicate(TermKind::BvUle, lhs, rhs)
    }

    /// Signed less-than.
    pub fn mk_bv_slt(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_predicate(TermKind::BvSlt, lhs, rhs)
    }

    /// Signed less-or-equal.
    pub fn mk_bv_sle(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        self.bv_predicate(TermKind::BvSle, lhs, rhs)
    }

    /// Cardinality: at least `k` of `args` are true.
    pub fn mk_at_least(&mut self, args: Vec<TermId>, k: u32) -> TermId {
        let bool_sort = self.sorts.bool_sort;
        self.intern(TermKind::AtLeast { args, k }, bool_sort)
    }

    /// Cardinality: at most `k` of `args` are true.
    pub fn mk_at_most(&mut self, args: Vec<TermId>, k: u32) -> TermId {
        let bool_sort = self.sorts.bool_sort;
        self.intern(TermKind::AtMost { args, k }, bool_sort)
    }

    /// Direct children of a term, in positional order.
    #[must_use]
    pub fn children(&self, t: TermId) -> SmallVec<[TermId; 3]> {
        let Some(term) = self.get(t) else {
            return SmallVec::new();
        };
        match &term.kind {
            TermKind::True | TermKind::False | TermKind::Var(_) | TermKind::BvConst { .. } => {
                SmallVec::new()
            }
            TermKind::Not(a) | TermKind::BvNot(a) | TermKind::BvNeg(a) => SmallVec::from_slice(&[*a]),
            TermKind::BvExtract { arg, .. } => SmallVec::from_slice(&[*arg]),
            TermKind::Implies(a, b)
            | TermKind::Xor(a, b)
            | TermKind::Eq(a, b)
            | TermKind::BvAnd(a, b)
            | TermKind::BvOr(a, b)
            | TermKind::BvXor(a, b)
            | TermKind::BvAdd(a, b)
            | TermKind::BvSub(a, b)
            | TermKind::BvMul(a, b)
            | TermKind::BvShl(a, b)
            | TermKind::BvLshr(a, b)
            | TermKind::BvAshr(a, b)
            | TermKind::BvConcat(a, b)
            | TermKind::BvUlt(a, b)
            | TermKind::BvUle(a, b)
            | TermKind::BvSlt(a, b)
            | TermKind::BvSle(a, b) => SmallVec::from_slice(&[*a, *b]),
            TermKind::Ite(c, t, e) => SmallVec::from_slice(&[*c, *t, *e]),
            TermKind::And(args)
            | TermKind::Or(args)
            | TermKind::AtLeast { args, .. }
            | TermKind::AtMost { args, .. } => SmallVec::from_slice(args),
        }
    }

    /// Rebuild `t` with replaced children, going through the `mk_*`
    /// constructors so canonical folds apply. `kids` must have the arity of
    /// the original term.
    pub fn clone_with_children(&mut self, t: TermId, kids: &[TermId]) -> TermId {
        let Some(term) = self.get(t).cloned() else {
            return t;
        };
        match term.kind {
            TermKind::True | TermKind::False | TermKind::Var(_) | TermKind::BvConst { .. } => t,
            TermKind::Not(_) => self.mk_not(kids[0]),
            TermKind::And(_) => self.mk_and(kids.to_vec()),
            TermKind::Or(_) => self.mk_or(kids.to_vec()),
            TermKind::Implies(_, _) => self.mk_implies(kids[0], kids[1]),
            TermKind::Xor(_, _) => self.mk_xor(kids[0], kids[1]),
            TermKind::Eq(_, _) => self.mk_eq(kids[0], kids[1]),
            TermKind::Ite(_, _, _) => self.mk_ite(kids[0], kids[1], kids[2]),
            TermKind::BvNot(_) => self.mk_bv_not(kids[0]),
            TermKind::BvNeg(_) => self.mk_bv_neg(kids[0]),
            TermKind::BvAnd(_, _) => self.mk_bv_and(kids[0], kids[1]),
            TermKind::BvOr(_, _) => self.mk_bv_or(kids[0], kids[1]),
            TermKind::BvXor(_, _) => self.mk_bv_xor(kids[0], kids[1]),
            TermKind::BvAdd(_, _) => self.mk_bv_add(kids[0], kids[1]),
            TermKind::BvSub(_, _) => self.mk_bv_sub(kids[0], kids[1]),
            TermKind::BvMul(_, _) => self.mk_bv_mul(kids[0], kids[1]),
            TermKind::BvShl(_, _) => self.mk_bv_shl(kids[0], kids[1]),
            TermKind::BvLshr(_, _) => self.mk_bv_lshr(kids[0], kids[1]),
            TermKind::BvAshr(_, _) => self.mk_bv_ashr(kids[0], kids[1]),
            TermKind::BvConcat(_, _) => self.mk_bv_concat(kids[0], kids[1]),
            TermKind::BvExtract { hi, lo, .. } => self.mk_bv_extract(hi, lo, kids[0]),
            TermKind::BvUlt(_, _) => self.mk_bv_ult(kids[0], kids[1]),
            TermKind::BvUle(_, _) => self.mk_bv_ule(kids[0], kids[1]),
            TermKind::BvSlt(_, _) => self.mk_bv_slt(kids[0], kids[1]),
            TermKind::BvSle(_, _) => self.mk_bv_sle(kids[0], kids[1]),
            TermKind::AtLeast { k, .. } => self.mk_at_least(kids.to_vec(), k),
            TermKind::AtMost { k, .. } => self.mk_at_most(kids.to_vec(), k),
        }
    }

    /// Deep-copy `t` into `dst`, which may be a different manager. `cache`
    /// memoizes already-translated terms and can be reused across calls to
    /// share work between formulas.
    pub fn translate_into(
        &self,
        dst: &mut TermManager,
        t: TermId,
        cache: &mut FxHashMap<TermId, TermId>,
    ) -> TermId {
        if let Some(&done) = cache.get(&t) {
            return done;
        }
        let Some(term) = self.get(t) else {
            return t;
        };
        let kind = term.kind.clone();
        let translated = match kind {
            TermKind::True => dst.mk_true(),
            TermKind::False => dst.mk_false(),
            TermKind::Var(sym) => {
                let name = self.symbols.resolve(&sym).to_string();
                let sort = match self.sorts.get(term.sort).map(|s| s.kind) {
                    Some(SortKind::BitVec(w)) => dst.sorts.mk_bitvec(w),
                    _ => dst.sorts.bool_sort,
                };
                dst.mk_var(&name, sort)
            }
            TermKind::BvConst { value, width } => dst.mk_bv_const(value, width),
            _ => {
                let kids: Vec<TermId> = self
                    .children(t)
                    .iter()
                    .map(|&c| self.translate_into(dst, c, cache))
                    .collect();
                dst.clone_with_children_from(self, t, &kids)
            }
        };
        cache.insert(t, translated);
        translated
    }

    /// Rebuild a term of `src` inside `self` with already-translated
    /// children. Helper for [`TermManager::translate_into`].
    fn clone_with_children_from(&mut self, src: &TermManager, t: TermId, kids: &[TermId]) -> TermId {
        let Some(term) = src.get(t).cloned() else {
            return t;
        };
        match term.kind {
            TermKind::Not(_) => self.mk_not(kids[0]),
            TermKind::And(_) => self.mk_and(kids.to_vec()),
            TermKind::Or(_) => self.mk_or(kids.to_vec()),
            TermKind::Implies(_, _) => self.mk_implies(kids[0], kids[1]),
            TermKind::Xor(_, _) => self.mk_xor(kids[0], kids[1]),
            TermKind::Eq(_, _) => self.mk_eq(kids[0], kids[1]),
            TermKind::Ite(_, _, _) => self.mk_ite(kids[0], kids[1], kids[2]),
            TermKind::BvNot(_) => self.mk_bv_not(kids[0]),
            TermKind::BvNeg(_) => self.mk_bv_neg(kids[0]),
            TermKind::BvAnd(_, _) => self.mk_bv_and(kids[0], kids[1]),
            TermKind::BvOr(_, _) => self.mk_bv_or(kids[0], kids[1]),
            TermKind::BvXor(_, _) => self.mk_bv_xor(kids[0], kids[1]),
            TermKind::BvAdd(_, _) => self.mk_bv_add(kids[0], kids[1]),
            TermKind::BvSub(_, _) => self.mk_bv_sub(kids[0], kids[1]),
            TermKind::BvMul(_, _) => self.mk_bv_mul(kids[0], kids[1]),
            TermKind::BvShl(_, _) => self.mk_bv_shl(kids[0], kids[1]),
            TermKind::BvLshr(_, _) => self.mk_bv_lshr(kids[0], kids[1]),
            TermKind::BvAshr(_, _) => self.mk_bv_ashr(kids[0], kids[1]),
            TermKind::BvConcat(_, _) => self.mk_bv_concat(kids[0], kids[1]),
            TermKind::BvExtract { hi, lo, .. } => self.mk_bv_extract(hi, lo, kids[0]),
            TermKind::BvUlt(_, _) => self.mk_bv_ult(kids[0], kids[1]),
            TermKind::BvUle(_, _) => self.mk_bv_ule(kids[0], kids[1]),
            TermKind::BvSlt(_, _) => self.mk_bv_slt(kids[0], kids[1]),
            TermKind::BvSle(_, _) => self.mk_bv_sle(kids[0], kids[1]),
            TermKind::AtLeast { k, .. } => self.mk_at_least(kids.to_vec(), k),
            TermKind::AtMost { k, .. } => self.mk_at_most(kids.to_vec(), k),
            TermKind::True
            | TermKind::False
            | TermKind::Var(_)
            | TermKind::BvConst { .. } => t,
        }
    }
}
