//! The CDCL search engine.
//!
//! Incrementality is clause-level: `user_push` records the clause count,
//! `user_pop` truncates the clause database and marks the engine for a lazy
//! rebuild (watches, root assignments and learnt state are reconstructed
//! from the surviving clauses at the next `check`). Assumptions are handled
//! minisat-style as pseudo-decisions on the first decision levels, with
//! final-conflict analysis producing the core.

use std::io;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use satori_core::resource::ResourceLimit;
use satori_core::statistics::Statistics;

use crate::wcnf;
use crate::{LBool, Lit, SatResult, Var};

const NO_REASON: u32 = u32::MAX;
const RESTART_BASE: f64 = 100.0;
const LIMIT_POLL_INTERVAL: u64 = 128;

/// Engine parameters.
#[derive(Debug, Clone)]
pub struct SatParams {
    /// Variable elimination toggle. This engine never eliminates variables
    /// (incremental callers depend on stable variable identity), so the flag
    /// is accepted and must stay `false`.
    pub elim_vars: bool,
    /// Abandon the search after this many conflicts (0 = unlimited).
    pub max_conflicts: u64,
}

impl Default for SatParams {
    fn default() -> Self {
        Self {
            elim_vars: false,
            max_conflicts: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Clause {
    lits: SmallVec<[Lit; 4]>,
    learnt: bool,
}

/// The incremental CDCL solver.
#[derive(Debug)]
pub struct Solver {
    params: SatParams,
    clauses: Vec<Clause>,
    /// Watch lists indexed by `Lit::index`; a clause is registered under its
    /// first two literals.
    watches: Vec<Vec<u32>>,
    assigns: Vec<LBool>,
    level: Vec<u32>,
    reason: Vec<u32>,
    phase: Vec<bool>,
    activity: Vec<f64>,
    var_inc: f64,
    seen: Vec<bool>,
    trail: Vec<Lit>,
    trail_lim: Vec<usize>,
    qhead: usize,
    ok: bool,
    dirty: bool,
    user_scopes: Vec<usize>,
    model: Vec<LBool>,
    model_current: bool,
    core: Vec<Lit>,
    limit: Option<Arc<ResourceLimit>>,
    n_conflicts: u64,
    n_decisions: u64,
    n_propagations: u64,
    n_restarts: u64,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create an empty solver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(SatParams::default())
    }

    /// Create a solver with explicit parameters.
    #[must_use]
    pub fn with_params(params: SatParams) -> Self {
        Self {
            params,
            clauses: Vec::new(),
            watches: Vec::new(),
            assigns: Vec::new(),
            level: Vec::new(),
            reason: Vec::new(),
            phase: Vec::new(),
            activity: Vec::new(),
            var_inc: 1.0,
            seen: Vec::new(),
            trail: Vec::new(),
            trail_lim: Vec::new(),
            qhead: 0,
            ok: true,
            dirty: false,
            user_scopes: Vec::new(),
            model: Vec::new(),
            model_current: false,
            core: Vec::new(),
            limit: None,
            n_conflicts: 0,
            n_decisions: 0,
            n_propagations: 0,
            n_restarts: 0,
        }
    }

    /// Replace the parameters. `elim_vars` is ignored by construction.
    pub fn updt_params(&mut self, params: SatParams) {
        self.params = params;
        self.params.elim_vars = false;
    }

    /// Install the shared resource limit polled during search.
    pub fn set_resource_limit(&mut self, limit: Arc<ResourceLimit>) {
        self.limit = Some(limit);
    }

    /// Allocate a fresh variable.
    pub fn new_var(&mut self) -> Var {
        let v = Var(self.assigns.len() as u32);
        self.assigns.push(LBool::Undef);
        self.level.push(0);
        self.reason.push(NO_REASON);
        self.phase.push(false);
        self.activity.push(0.0);
        self.seen.push(false);
        self.watches.push(Vec::new());
        self.watches.push(Vec::new());
        v
    }

    /// Number of allocated variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.assigns.len()
    }

    /// Number of problem (non-learnt) clauses.
    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.iter().filter(|c| !c.learnt).count()
    }

    /// Add a problem clause at the current user level.
    pub fn add_clause<I: IntoIterator<Item = Lit>>(&mut self, lits: I) {
        let mut v: SmallVec<[Lit; 4]> = lits.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        let idx = self.clauses.len() as u32;
        self.clauses.push(Clause {
            lits: v.clone(),
            learnt: false,
        });
        if self.dirty {
            return;
        }
        self.cancel_until(0);
        self.attach_at_root(idx);
    }

    /// Attach a freshly added clause, respecting root-level assignments so
    /// the watch invariant holds for literals the queue already processed.
    fn attach_at_root(&mut self, idx: u32) {
        let lits: SmallVec<[Lit; 4]> = self.clauses[idx as usize].lits.clone();
        if lits.is_empty() {
            self.ok = false;
            return;
        }
        // a root-true literal keeps the clause inert for this user level
        if let Some(&sat_lit) = lits.iter().find(|&&l| self.value_lit(l) == LBool::True) {
            if lits.len() >= 2 {
                let other = lits.iter().copied().find(|&l| l != sat_lit).unwrap_or(sat_lit);
                self.watch_pair(idx, sat_lit, other);
            }
            return;
        }
        let free: SmallVec<[Lit; 4]> = lits
            .iter()
            .copied()
            .filter(|&l| self.value_lit(l) != LBool::False)
            .collect();
        match free.len() {
            0 => self.ok = false,
            1 => {
                if !self.enqueue(free[0], NO_REASON) {
                    self.ok = false;
                }
            }
            _ => self.watch_pair(idx, free[0], free[1]),
        }
    }

    /// Move `a` and `b` into the watched positions of clause `idx` and
    /// register the watches.
    fn watch_pair(&mut self, idx: u32, a: Lit, b: Lit) {
        let c = &mut self.clauses[idx as usize];
        let pa = c.lits.iter().position(|&l| l == a).unwrap_or(0);
        c.lits.swap(0, pa);
        let pb = c.lits.iter().position(|&l| l == b).unwrap_or(1);
        c.lits.swap(1, pb.max(1));
        self.watches[a.index()].push(idx);
        self.watches[b.index()].push(idx);
    }

    /// Open a user scope.
    pub fn user_push(&mut self) {
        self.cancel_until(0);
        self.user_scopes.push(self.clauses.len());
    }

    /// Close `n` user scopes, dropping their clauses. The engine state is
    /// rebuilt lazily from the surviving clauses.
    pub fn user_pop(&mut self, n: u32) {
        let n = (n as usize).min(self.user_scopes.len());
        if n == 0 {
            return;
        }
        let idx = self.user_scopes.len() - n;
        let mark = self.user_scopes[idx];
        self.user_scopes.truncate(idx);
        self.clauses.truncate(mark);
        self.dirty = true;
        self.model_current = false;
    }

    /// Undo all decisions, keeping root assignments and clauses.
    pub fn pop_to_base_level(&mut self) {
        self.cancel_until(0);
    }

    /// Check satisfiability under `assumptions`. With `weights`, the
    /// assumptions are soft: unsatisfiable cores over them are iteratively
    /// relaxed, and the call answers `Sat` iff a model of the hard clauses
    /// exists whose total violated soft weight stays below `max_weight`.
    pub fn check(&mut self, assumptions: &[Lit], weights: Option<&[f64]>, max_weight: f64) -> SatResult {
        self.model_current = false;
        if self.dirty {
            self.rebuild();
        }
        self.cancel_until(0);
        if !self.ok {
            self.core.clear();
            return SatResult::Unsat;
        }
        match weights {
            Some(ws) => self.check_weighted(assumptions, ws, max_weight),
            None => self.solve_with(assumptions),
        }
    }

    /// The model of the last `Sat` answer, indexed by `Var::index`.
    #[must_use]
    pub fn model(&self) -> &[LBool] {
        &self.model
    }

    /// Whether the stored model reflects the current clause set.
    #[must_use]
    pub fn model_is_current(&self) -> bool {
        self.model_current
    }

    /// The failed assumption literals of the last `Unsat` answer.
    #[must_use]
    pub fn core(&self) -> &[Lit] {
        &self.core
    }

    /// Contribute engine counters to a statistics collection.
    pub fn collect_statistics(&self, st: &mut Statistics) {
        st.incr("sat.conflicts", self.n_conflicts);
        st.incr("sat.decisions", self.n_decisions);
        st.incr("sat.propagations", self.n_propagations);
        st.incr("sat.restarts", self.n_restarts);
        st.set("sat.variables", self.num_vars() as u64);
        st.set("sat.clauses", self.num_clauses() as u64);
    }

    /// Write the problem clauses plus weighted soft assumptions in
    /// weighted-DIMACS form.
    pub fn display_wcnf<W: io::Write>(
        &self,
        out: &mut W,
        assumptions: &[Lit],
        weights: &[u64],
    ) -> io::Result<()> {
        let hard: Vec<&[Lit]> = self
            .clauses
            .iter()
            .filter(|c| !c.learnt)
            .map(|c| c.lits.as_slice())
            .collect();
        wcnf::write_wcnf(out, self.num_vars(), &hard, assumptions, weights)
    }

    fn value_lit(&self, l: Lit) -> LBool {
        match self.assigns[l.var().index()] {
            LBool::Undef => LBool::Undef,
            LBool::True => LBool::from_bool(l.is_positive()),
            LBool::False => LBool::from_bool(!l.is_positive()),
        }
    }

    fn decision_level(&self) -> usize {
        self.trail_lim.len()
    }

    fn enqueue(&mut self, p: Lit, reason: u32) -> bool {
        match self.value_lit(p) {
            LBool::True => true,
            LBool::False => false,
            LBool::Undef => {
                let v = p.var().index();
                self.assigns[v] = LBool::from_bool(p.is_positive());
                self.level[v] = self.decision_level() as u32;
                self.reason[v] = reason;
                self.trail.push(p);
                true
            }
        }
    }

    fn cancel_until(&mut self, level: usize) {
        if self.decision_level() <= level {
            return;
        }
        let lim = self.trail_lim[level];
        for i in (lim..self.trail.len()).rev() {
            let p = self.trail[i];
            let v = p.var().index();
            self.assigns[v] = LBool::Undef;
            self.phase[v] = p.is_positive();
            self.reason[v] = NO_REASON;
        }
        self.trail.truncate(lim);
        self.trail_lim.truncate(level);
        self.qhead = self.trail.len();
    }

    /// Reconstruct watches and root assignments from the clause database.
    fn rebuild(&mut self) {
        tracing::debug!(clauses = self.clauses.len(), "rebuilding engine state");
        let n = self.num_vars();
        self.watches = vec![Vec::new(); 2 * n];
        for a in &mut self.assigns {
            *a = LBool::Undef;
        }
        for l in &mut self.level {
            *l = 0;
        }
        for r in &mut self.reason {
            *r = NO_REASON;
        }
        self.trail.clear();
        self.trail_lim.clear();
        self.qhead = 0;
        self.ok = true;
        self.dirty = false;

        // attach everything while all variables are unassigned, then seed
        // the queue with the unit clauses; check() propagates from there
        let mut units: Vec<Lit> = Vec::new();
        for idx in 0..self.clauses.len() {
            let lits = &self.clauses[idx].lits;
            match lits.len() {
                0 => self.ok = false,
                1 => units.push(lits[0]),
                _ => {
                    let (a, b) = (lits[0], lits[1]);
                    self.watches[a.index()].push(idx as u32);
                    self.watches[b.index()].push(idx as u32);
                }
            }
        }
        for u in units {
            if !self.enqueue(u, NO_REASON) {
                self.ok = false;
            }
        }
    }

    fn propagate(&mut self) -> Option<u32> {
        while self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            self.n_propagations += 1;
            let false_lit = p.negate();
            let mut ws = std::mem::take(&mut self.watches[false_lit.index()]);
            let mut i = 0;
            while i < ws.len() {
                let ci = ws[i] as usize;
                {
                    let c = &mut self.clauses[ci];
                    if c.lits[0] == false_lit {
                        c.lits.swap(0, 1);
                    }
                }
                let first = self.clauses[ci].lits[0];
                if self.value_lit(first) == LBool::True {
                    i += 1;
                    continue;
                }
                let len = self.clauses[ci].lits.len();
                let mut replaced = false;
                for k in 2..len {
                    let cand = self.clauses[ci].lits[k];
                    if self.value_lit(cand) != LBool::False {
                        self.clauses[ci].lits.swap(1, k);
                        self.watches[cand.index()].push(ci as u32);
                        ws.swap_remove(i);
                        replaced = true;
                        break;
                    }
                }
                if replaced {
                    continue;
                }
                if self.value_lit(first) == LBool::False {
                    self.watches[false_lit.index()] = ws;
                    self.qhead = self.trail.len();
                    return Some(ci as u32);
                }
                let _ = self.enqueue(first, ci as u32);
                i += 1;
            }
            self.watches[false_lit.index()] = ws;
        }
        None
    }

    fn bump_activity(&mut self, v: Var) {
        self.activity[v.index()] += self.var_inc;
        if self.activity[v.index()] > 1e100 {
            for a in &mut self.activity {
                *a *= 1e-100;
            }
            self.var_inc *= 1e-100;
        }
    }

    fn decay_activity(&mut self) {
        self.var_inc *= 1.0 / 0.95;
    }

    fn pick_branch(&mut self) -> Option<Lit> {
        let mut best: Option<usize> = None;
        for v in 0..self.num_vars() {
            if self.assigns[v] != LBool::Undef {
                continue;
            }
            match best {
                Some(b) if self.activity[b] >= self.activity[v] => {}
                _ => best = Some(v),
            }
        }
        best.map(|v| {
            let var = Var(v as u32);
            if self.phase[v] {
                Lit::pos(var)
            } else {
                Lit::neg(var)
            }
        })
    }

    /// First-UIP conflict analysis. Returns the learnt clause (asserting
    /// literal first, a backjump-level literal second) and the backjump
    /// level.
    fn analyze(&mut self, mut confl: u32) -> (Vec<Lit>, usize) {
        let mut learnt: Vec<Lit> = vec![Lit::pos(Var(0))];
        let mut path_count: u32 = 0;
        let mut expand_reason = false;
        let mut index = self.trail.len();
        let current = self.decision_level() as u32;

        loop {
            let start = usize::from(expand_reason);
            let lits: SmallVec<[Lit; 8]> =
                self.clauses[confl as usize].lits.iter().copied().collect();
            for &q in &lits[start..] {
                let v = q.var();
                if !self.seen[v.index()] && self.level[v.index()] > 0 {
                    self.seen[v.index()] = true;
                    self.bump_activity(v);
                    if self.level[v.index()] >= current {
                        path_count += 1;
                    } else {
                        learnt.push(q);
                    }
                }
            }
            loop {
                index -= 1;
                if self.seen[self.trail[index].var().index()] {
                    break;
                }
            }
            let lit = self.trail[index];
            self.seen[lit.var().index()] = false;
            path_count -= 1;
            if path_count == 0 {
                learnt[0] = lit.negate();
                break;
            }
            confl = self.reason[lit.var().index()];
            debug_assert_ne!(confl, NO_REASON);
            expand_reason = true;
        }
        for &l in &learnt[1..] {
            self.seen[l.var().index()] = false;
        }

        let bt = if learnt.len() == 1 {
            0
        } else {
            let mut max_i = 1;
            for i in 2..learnt.len() {
                if self.level[learnt[i].var().index()] > self.level[learnt[max_i].var().index()] {
                    max_i = i;
                }
            }
            learnt.swap(1, max_i);
            self.level[learnt[1].var().index()] as usize
        };
        (learnt, bt)
    }

    fn learn(&mut self, learnt: Vec<Lit>) {
        if learnt.len() == 1 {
            let ok = self.enqueue(learnt[0], NO_REASON);
            debug_assert!(ok, "asserting literal must be unassigned after backjump");
            return;
        }
        let (l0, l1) = (learnt[0], learnt[1]);
        let idx = self.clauses.len() as u32;
        self.clauses.push(Clause {
            lits: SmallVec::from_vec(learnt),
            learnt: true,
        });
        self.watches[l0.index()].push(idx);
        self.watches[l1.index()].push(idx);
        let ok = self.enqueue(l0, idx);
        debug_assert!(ok, "asserting literal must be unassigned after backjump");
    }

    /// Final-conflict analysis: collect the assumption decisions responsible
    /// for assumption `p` being false.
    fn analyze_final(&mut self, p: Lit) {
        self.core.clear();
        self.core.push(p);
        if self.decision_level() == 0 {
            return;
        }
        self.seen[p.var().index()] = true;
        for i in (self.trail_lim[0]..self.trail.len()).rev() {
            let q = self.trail[i];
            let v = q.var().index();
            if !self.seen[v] {
                continue;
            }
            let r = self.reason[v];
            if r == NO_REASON {
                // decisions above base level are exactly the assumptions
                self.core.push(q);
            } else {
                let lits: SmallVec<[Lit; 8]> =
                    self.clauses[r as usize].lits.iter().copied().collect();
                for &l in &lits[1..] {
                    if self.level[l.var().index()] > 0 {
                        self.seen[l.var().index()] = true;
                    }
                }
            }
            self.seen[v] = false;
        }
        self.seen[p.var().index()] = false;
    }

    fn solve_with(&mut self, assumptions: &[Lit]) -> SatResult {
        debug_assert_eq!(self.decision_level(), 0);
        let mut restarts: u32 = 0;
        let mut conflicts_in_restart: u64 = 0;
        let mut conflicts_total: u64 = 0;
        let mut budget = (luby(2.0, restarts) * RESTART_BASE) as u64;

        loop {
            if let Some(confl) = self.propagate() {
                self.n_conflicts += 1;
                conflicts_in_restart += 1;
                conflicts_total += 1;
                if self.decision_level() == 0 {
                    self.ok = false;
                    self.core.clear();
                    return SatResult::Unsat;
                }
                let (learnt, bt) = self.analyze(confl);
                self.cancel_until(bt);
                self.learn(learnt);
                self.decay_activity();

                if conflicts_total % LIMIT_POLL_INTERVAL == 0 {
                    if let Some(limit) = &self.limit {
                        if !limit.charge(LIMIT_POLL_INTERVAL) {
                            return SatResult::Unknown;
                        }
                    }
                }
                if self.params.max_conflicts > 0 && conflicts_total >= self.params.max_conflicts {
                    return SatResult::Unknown;
                }
                if conflicts_in_restart >= budget {
                    self.n_restarts += 1;
                    restarts += 1;
                    conflicts_in_restart = 0;
                    budget = (luby(2.0, restarts) * RESTART_BASE) as u64;
                    self.cancel_until(0);
                }
            } else {
                let dl = self.decision_level();
                if dl < assumptions.len() {
                    let p = assumptions[dl];
                    match self.value_lit(p) {
                        LBool::True => {
                            // already implied; open an empty level to keep
                            // level and assumption indices aligned
                            self.trail_lim.push(self.trail.len());
                        }
                        LBool::False => {
                            self.analyze_final(p);
                            return SatResult::Unsat;
                        }
                        LBool::Undef => {
                            self.trail_lim.push(self.trail.len());
                            let _ = self.enqueue(p, NO_REASON);
                        }
                    }
                } else if let Some(d) = self.pick_branch() {
                    self.n_decisions += 1;
                    self.trail_lim.push(self.trail.len());
                    let _ = self.enqueue(d, NO_REASON);
                } else {
                    self.model = self.assigns.clone();
                    self.model_current = true;
                    return SatResult::Sat;
                }
            }
        }
    }

    fn check_weighted(&mut self, assumptions: &[Lit], weights: &[f64], max_weight: f64) -> SatResult {
        debug_assert_eq!(assumptions.len(), weights.len());
        let mut active: Vec<(Lit, f64)> = assumptions
            .iter()
            .copied()
            .zip(weights.iter().copied())
            .collect();
        let mut violated = 0.0_f64;
        loop {
            let lits: Vec<Lit> = active.iter().map(|&(l, _)| l).collect();
            match self.solve_with(&lits) {
                SatResult::Sat => return SatResult::Sat,
                SatResult::Unknown => return SatResult::Unknown,
                SatResult::Unsat => {
                    if self.core.is_empty() {
                        return SatResult::Unsat;
                    }
                    // every core needs at least one violated member; greedily
                    // give up the cheapest one and charge its weight
                    let core: FxHashSet<Lit> = self.core.iter().copied().collect();
                    let cheapest = active
                        .iter()
                        .enumerate()
                        .filter(|(_, (l, _))| core.contains(l))
                        .min_by(|(_, (_, w1)), (_, (_, w2))| w1.total_cmp(w2))
                        .map(|(i, _)| i);
                    let Some(i) = cheapest else {
                        return SatResult::Unsat;
                    };
                    let (_, w) = active.remove(i);
                    violated += w;
                    if violated >= max_weight {
                        return SatResult::Unsat;
                    }
                    self.cancel_until(0);
                }
            }
        }
    }
}

/// The Luby restart sequence.
fn luby(y: f64, mut x: u32) -> f64 {
    let mut size: u64 = 1;
    let mut seq: i32 = 0;
    while size < u64::from(x) + 1 {
        seq += 1;
        size = 2 * size + 1;
    }
    while size - 1 != u64::from(x) {
        size = (size - 1) / 2;
        seq -= 1;
        x %= size as u32;
    }
    y.powi(seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(solver_vars: &[Var], i: usize, positive: bool) -> Lit {
        if positive {
            Lit::pos(solver_vars[i])
        } else {
            Lit::neg(solver_vars[i])
        }
    }

    #[test]
    fn test_simple_sat() {
        let mut s = Solver::new();
        let vars: Vec<Var> = (0..2).map(|_| s.new_var()).collect();
        s.add_clause([lit(&vars, 0, true), lit(&vars, 1, true)]);
        s.add_clause([lit(&vars, 0, false)]);
        assert_eq!(s.check(&[], None, 0.0), SatResult::Sat);
        let model = s.model();
        assert!(model[vars[0].index()].is_false());
        assert!(model[vars[1].index()].is_true());
    }

    #[test]
    fn test_simple_unsat() {
        let mut s = Solver::new();
        let x = s.new_var();
        s.add_clause([Lit::pos(x)]);
        s.add_clause([Lit::neg(x)]);
        assert_eq!(s.check(&[], None, 0.0), SatResult::Unsat);
        assert!(s.core().is_empty());
    }

    #[test]
    fn test_assumption_core() {
        let mut s = Solver::new();
        let a = s.new_var();
        let b = s.new_var();
        let x = s.new_var();
        // a -> x, b -> !x
        s.add_clause([Lit::neg(a), Lit::pos(x)]);
        s.add_clause([Lit::neg(b), Lit::neg(x)]);
        let asms = [Lit::pos(a), Lit::pos(b)];
        assert_eq!(s.check(&asms, None, 0.0), SatResult::Unsat);
        let core: Vec<Lit> = s.core().to_vec();
        assert!(core.contains(&Lit::pos(a)));
        assert!(core.contains(&Lit::pos(b)));

        // dropping either assumption restores satisfiability
        assert_eq!(s.check(&[Lit::pos(a)], None, 0.0), SatResult::Sat);
        assert!(s.model()[x.index()].is_true());
    }

    #[test]
    fn test_user_scopes() {
        let mut s = Solver::new();
        let x = s.new_var();
        s.add_clause([Lit::pos(x)]);
        assert_eq!(s.check(&[], None, 0.0), SatResult::Sat);

        s.user_push();
        s.add_clause([Lit::neg(x)]);
        assert_eq!(s.check(&[], None, 0.0), SatResult::Unsat);

        s.user_pop(1);
        assert_eq!(s.check(&[], None, 0.0), SatResult::Sat);
        assert!(s.model()[x.index()].is_true());
    }

    #[test]
    fn test_contradictory_assumptions() {
        let mut s = Solver::new();
        let x = s.new_var();
        let asms = [Lit::pos(x), Lit::neg(x)];
        assert_eq!(s.check(&asms, None, 0.0), SatResult::Unsat);
        let core = s.core();
        assert!(core.contains(&Lit::pos(x)));
        assert!(core.contains(&Lit::neg(x)));
    }

    #[test]
    fn test_pigeonhole_three_in_two() {
        // 3 pigeons, 2 holes: classic small unsat instance that needs search
        let mut s = Solver::new();
        let mut p = [[Var(0); 2]; 3];
        for row in &mut p {
            for cell in row.iter_mut() {
                *cell = s.new_var();
            }
        }
        for row in &p {
            s.add_clause([Lit::pos(row[0]), Lit::pos(row[1])]);
        }
        for hole in 0..2 {
            for i in 0..3 {
                for j in (i + 1)..3 {
                    s.add_clause([Lit::neg(p[i][hole]), Lit::neg(p[j][hole])]);
                }
            }
        }
        assert_eq!(s.check(&[], None, 0.0), SatResult::Unsat);
    }

    #[test]
    fn test_weighted_relaxation() {
        let mut s = Solver::new();
        let x = s.new_var();
        let asms = [Lit::pos(x), Lit::neg(x)];
        let weights = [1.0, 1.0];
        // one of the two soft assumptions must be violated: cost 1
        assert_eq!(s.check(&asms, Some(&weights), 2.0), SatResult::Sat);
        assert_eq!(s.check(&asms, Some(&weights), 1.0), SatResult::Unsat);
    }

    #[test]
    fn test_max_conflicts_gives_unknown() {
        let mut s = Solver::with_params(SatParams {
            elim_vars: false,
            max_conflicts: 1,
        });
        // pigeonhole again, too hard for a single conflict
        let mut p = [[Var(0); 2]; 3];
        for row in &mut p {
            for cell in row.iter_mut() {
                *cell = s.new_var();
            }
        }
        for row in &p {
            s.add_clause([Lit::pos(row[0]), Lit::pos(row[1])]);
        }
        for hole in 0..2 {
            for i in 0..3 {
                for j in (i + 1)..3 {
                    s.add_clause([Lit::neg(p[i][hole]), Lit::neg(p[j][hole])]);
                }
            }
        }
        assert_eq!(s.check(&[], None, 0.0), SatResult::Unknown);
    }
}
