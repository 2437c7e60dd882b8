//! The incremental SAT-backed solver.
//!
//! Sits between the term-level API and the CDCL engine: formulas are
//! collected unasserted, then preprocessed (cardinality encoding,
//! simplification, sharing maximization, bit-blasting, simplification
//! again), translated to clauses through the scope-aware atom map, and
//! checked under per-call assumption literals. Models are lifted back
//! through the recorded converters and the bit-blaster's side table; unsat
//! cores are mapped back to the caller's assumption terms.
//!
//! Scope discipline: `push` first brings the engine up to date with every
//! pending formula, then checkpoints the pending/assumption lists and the
//! head index and pushes the atom map, the bit-blaster and the engine in
//! lockstep. `pop` restores all of them; popping more scopes than exist
//! pops to the base level, so the driver can sit under a higher-level
//! solver stack.

use std::io;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use satori_core::tactic::Goal;
use satori_core::{
    apply_converters, BitBlaster, BvModelConverter, BvSharingTactic, Card2BvTactic, Model,
    ModelConverter, Result, SatoriError, SimplifyTactic, Statistics, Tactic, TacticApplication,
    TermId, TermManager,
};
use satori_sat::{LBool, Lit, SatParams, SatResult, Solver};

use crate::atom_map::AtomVarMap;
use crate::goal2sat::GoalTranslator;

/// Verdict of a `check_sat` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    /// Satisfiable; a model is available through `get_model`.
    Sat,
    /// Unsatisfiable; a core is available through `get_unsat_core`.
    Unsat,
    /// Undetermined; `reason_unknown` explains why.
    Unknown,
}

/// Driver parameters.
#[derive(Debug, Clone, Default)]
pub struct DriverParams {
    /// Run full model reconstruction even when no converter demands it.
    pub optimize_model: bool,
    /// Parameters forwarded to the SAT engine. `elim_vars` is forced off:
    /// the driver requires stable variable identity across calls.
    pub sat: SatParams,
}

/// Description of a recognized parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamDescr {
    /// Parameter name.
    pub name: &'static str,
    /// What it does.
    pub description: &'static str,
}

/// Recognized parameters, including the simplifier profile keys that are
/// pinned to fixed values.
#[must_use]
pub fn collect_param_descrs() -> &'static [ParamDescr] {
    &[
        ParamDescr {
            name: "optimize_model",
            description: "run full model reconstruction even when not strictly needed",
        },
        ParamDescr {
            name: "elim_vars",
            description: "SAT-level variable elimination; forced off for incremental use",
        },
        ParamDescr {
            name: "max_conflicts",
            description: "abandon the SAT search after this many conflicts (0 = unlimited)",
        },
        ParamDescr {
            name: "som",
            description: "simplifier profile key, fixed to true",
        },
        ParamDescr {
            name: "pull_cheap_ite",
            description: "simplifier profile key, fixed to true",
        },
        ParamDescr {
            name: "push_ite_bv",
            description: "simplifier profile key, fixed to false",
        },
        ParamDescr {
            name: "local_ctx",
            description: "simplifier profile key, fixed to true",
        },
        ParamDescr {
            name: "local_ctx_limit",
            description: "simplifier profile key, fixed to 10000000",
        },
        ParamDescr {
            name: "flat",
            description: "simplifier profile key, fixed to true",
        },
        ParamDescr {
            name: "hoist_mul",
            description: "simplifier profile key, fixed to false",
        },
        ParamDescr {
            name: "elim_and",
            description: "simplifier profile key, fixed to true",
        },
    ]
}

enum Internalized {
    Done,
    Unknown,
}

/// The incremental solver front-end.
pub struct IncSatSolver {
    params: DriverParams,
    sat: Solver,
    map: AtomVarMap,
    blaster: BitBlaster,
    card2bv: Card2BvTactic,
    simplify: SimplifyTactic,
    sharing: BvSharingTactic,
    /// Pending formulas; `fmls[..fmls_head]` are reflected in the engine.
    fmls: Vec<TermId>,
    fmls_head: usize,
    /// Labeled assumptions as (label, formula) pairs.
    asmsf: Vec<(TermId, TermId)>,
    fmls_lim: Vec<usize>,
    asms_lim: Vec<usize>,
    fmls_head_lim: Vec<usize>,
    num_scopes: u32,
    /// Per-call SAT assumption buffer, kept in user order.
    asms: Vec<Lit>,
    weights: Vec<f64>,
    core: Vec<TermId>,
    pipeline_dep_core: Vec<TermId>,
    mc_chain: Vec<Box<dyn ModelConverter>>,
    cached_model: Option<Model>,
    unknown_reason: String,
}

impl Default for IncSatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IncSatSolver {
    /// Create a solver with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(DriverParams::default())
    }

    /// Create a solver with explicit parameters.
    #[must_use]
    pub fn with_params(params: DriverParams) -> Self {
        let mut this = Self {
            params: DriverParams::default(),
            sat: Solver::new(),
            map: AtomVarMap::new(),
            blaster: BitBlaster::new(),
            card2bv: Card2BvTactic::new(),
            simplify: SimplifyTactic::new(),
            sharing: BvSharingTactic::new(),
            fmls: Vec::new(),
            fmls_head: 0,
            asmsf: Vec::new(),
            fmls_lim: Vec::new(),
            asms_lim: Vec::new(),
            fmls_head_lim: Vec::new(),
            num_scopes: 0,
            asms: Vec::new(),
            weights: Vec::new(),
            core: Vec::new(),
            pipeline_dep_core: Vec::new(),
            mc_chain: Vec::new(),
            cached_model: None,
            unknown_reason: String::from("no reason given"),
        };
        this.updt_params(params);
        this
    }

    /// Replace the parameters; `elim_vars` stays forced off.
    pub fn updt_params(&mut self, mut params: DriverParams) {
        params.sat.elim_vars = false;
        self.sat.updt_params(params.sat.clone());
        self.params = params;
    }

    /// Append a formula; nothing is translated until the next
    /// `check_sat`/`push`.
    pub fn assert_formula(&mut self, f: TermId) {
        self.fmls.push(f);
    }

    /// Append a labeled formula; `label` is the handle under which the
    /// assertion can later appear in an unsat core. Internally asserts
    /// `label ⇒ formula`.
    pub fn assert_labeled(&mut self, tm: &mut TermManager, f: TermId, label: TermId) {
        self.asmsf.push((label, f));
        let guarded = tm.mk_implies(label, f);
        self.assert_formula(guarded);
    }

    /// Open a scope. Pending formulas are translated first so the recorded
    /// checkpoints match the engine's base.
    pub fn push(&mut self, tm: &mut TermManager) {
        match self.internalize_formulas(tm) {
            Ok(Internalized::Done) => {}
            Ok(Internalized::Unknown) => {
                warn!("preprocessing failed at push; formulas stay pending");
            }
            Err(e) => {
                warn!("internalization error at push: {e}");
            }
        }
        self.sat.user_push();
        self.num_scopes += 1;
        self.fmls_lim.push(self.fmls.len());
        self.asms_lim.push(self.asmsf.len());
        self.fmls_head_lim.push(self.fmls_head);
        self.blaster.push();
        self.map.push();
    }

    /// Close `n` scopes. `n` larger than the current depth pops to base.
    pub fn pop(&mut self, n: u32) {
        let n = n.min(self.num_scopes);
        if n == 0 {
            return;
        }
        self.blaster.pop(n);
        self.map.pop(n);
        self.sat.user_pop(n);
        self.num_scopes -= n;
        for _ in 0..n {
            if let Some(head) = self.fmls_head_lim.pop() {
                self.fmls_head = head;
            }
            if let Some(len) = self.fmls_lim.pop() {
                self.fmls.truncate(len);
            }
            if let Some(len) = self.asms_lim.pop() {
                self.asmsf.truncate(len);
            }
        }
    }

    /// Current scope depth.
    #[must_use]
    pub fn get_scope_level(&self) -> u32 {
        self.num_scopes
    }

    /// Check satisfiability under `assumptions`.
    pub fn check_sat(&mut self, tm: &mut TermManager, assumptions: &[TermId]) -> Result<SolveResult> {
        self.check_sat_weighted(tm, assumptions, None, 0.0)
    }

    /// Check satisfiability under weighted (soft) assumptions. `weights`
    /// must parallel `assumptions`; `max_weight` bounds the admissible
    /// violated weight.
    pub fn check_sat_weighted(
        &mut self,
        tm: &mut TermManager,
        assumptions: &[TermId],
        weights: Option<&[f64]>,
        max_weight: f64,
    ) -> Result<SolveResult> {
        self.weights.clear();
        if let Some(ws) = weights {
            if ws.len() != assumptions.len() {
                return Err(SatoriError::Invariant(
                    "weights must parallel assumptions".into(),
                ));
            }
            self.weights.extend_from_slice(ws);
        }
        self.sat.set_resource_limit(tm.limit());
        self.sat.pop_to_base_level();
        self.cached_model = None;

        match self.internalize_formulas(tm)? {
            Internalized::Done => {}
            Internalized::Unknown => return Ok(SolveResult::Unknown),
        }
        let mut dep2lit = FxHashMap::default();
        match self.internalize_assumptions(tm, assumptions, &mut dep2lit)? {
            Internalized::Done => {}
            Internalized::Unknown => return Ok(SolveResult::Unknown),
        }

        let weights_arg = if self.weights.is_empty() {
            None
        } else {
            Some(self.weights.as_slice())
        };
        let result = self.sat.check(&self.asms, weights_arg, max_weight);
        match result {
            SatResult::Sat => {
                if !assumptions.is_empty() && weights.is_none() {
                    self.check_assumptions(&dep2lit)?;
                }
                Ok(SolveResult::Sat)
            }
            SatResult::Unsat => {
                if assumptions.is_empty() {
                    self.core.clear();
                } else {
                    self.extract_core(&dep2lit)?;
                }
                Ok(SolveResult::Unsat)
            }
            SatResult::Unknown => {
                self.unknown_reason = String::from("sat engine gave up (resource or conflict limit)");
                Ok(SolveResult::Unknown)
            }
        }
    }

    /// The model of the last satisfiable check, lifted to original symbols.
    /// Empty when the engine has no current model.
    pub fn get_model(&mut self, tm: &mut TermManager) -> Result<Option<Model>> {
        if self.cached_model.is_none() {
            self.extract_model(tm)?;
        }
        Ok(self.cached_model.clone())
    }

    /// The unsat core of the last unsatisfiable check, as original labels.
    #[must_use]
    pub fn get_unsat_core(&self) -> &[TermId] {
        &self.core
    }

    /// Why the last check answered `Unknown`.
    #[must_use]
    pub fn reason_unknown(&self) -> &str {
        &self.unknown_reason
    }

    /// Number of pending assertions.
    #[must_use]
    pub fn get_num_assertions(&self) -> usize {
        self.fmls.len()
    }

    /// The `i`-th pending assertion.
    #[must_use]
    pub fn get_assertion(&self, i: usize) -> Option<TermId> {
        self.fmls.get(i).copied()
    }

    /// Number of labeled assumptions.
    #[must_use]
    pub fn get_num_assumptions(&self) -> usize {
        self.asmsf.len()
    }

    /// The `i`-th assumption label.
    #[must_use]
    pub fn get_assumption(&self, i: usize) -> Option<TermId> {
        self.asmsf.get(i).map(|&(label, _)| label)
    }

    /// Clone this solver onto a different term manager, translating the
    /// pending formulas and labeled assumptions. Only legal at base level.
    pub fn translate(&self, src: &TermManager, dst: &mut TermManager) -> Result<IncSatSolver> {
        if self.num_scopes > 0 {
            return Err(SatoriError::TranslateAtNonBase);
        }
        let mut out = IncSatSolver::with_params(self.params.clone());
        let mut cache = FxHashMap::default();
        for &f in &self.fmls {
            let t = src.translate_into(dst, f, &mut cache);
            out.fmls.push(t);
        }
        for &(label, f) in &self.asmsf {
            let l = src.translate_into(dst, label, &mut cache);
            let t = src.translate_into(dst, f, &mut cache);
            out.asmsf.push((l, t));
        }
        Ok(out)
    }

    /// Contribute counters from the engine and every pipeline member.
    pub fn collect_statistics(&self, st: &mut Statistics) {
        self.sat.collect_statistics(st);
        self.card2bv.collect_statistics(st);
        self.simplify.collect_statistics(st);
        self.sharing.collect_statistics(st);
        self.blaster.collect_statistics(st);
        st.set("solver.assertions", self.fmls.len() as u64);
        st.set("solver.scopes", u64::from(self.num_scopes));
    }

    /// Write the translated state plus weighted soft assumptions in
    /// weighted-CNF form, without solving. Weights must be unsigned
    /// integers.
    pub fn display_weighted<W: io::Write>(
        &mut self,
        tm: &mut TermManager,
        out: &mut W,
        assumptions: &[TermId],
        weights: &[f64],
    ) -> Result<()> {
        if weights.len() != assumptions.len() {
            return Err(SatoriError::Invariant(
                "weights must parallel assumptions".into(),
            ));
        }
        for &w in weights {
            if !(w >= 0.0) || w.fract() != 0.0 || w > u64::MAX as f64 {
                return Err(SatoriError::NonIntegralWeight);
            }
        }
        self.weights.clear();
        self.weights.extend_from_slice(weights);
        self.sat.pop_to_base_level();
        match self.internalize_formulas(tm)? {
            Internalized::Done => {}
            Internalized::Unknown => {
                return Err(SatoriError::Invariant(
                    "preprocessing failed while preparing weighted display".into(),
                ))
            }
        }
        let mut dep2lit = FxHashMap::default();
        match self.internalize_assumptions(tm, assumptions, &mut dep2lit)? {
            Internalized::Done => {}
            Internalized::Unknown => {
                return Err(SatoriError::Invariant(
                    "preprocessing failed while preparing weighted display".into(),
                ))
            }
        }
        let quantized: Vec<u64> = self.weights.iter().map(|&w| w as u64).collect();
        self.sat
            .display_wcnf(out, &self.asms, &quantized)
            .map_err(|e| SatoriError::Invariant(format!("weighted display failed: {e}")))
    }

    /// Run the fixed pipeline — card2bv, simplify, max-bv-sharing,
    /// bit-blast, simplify — on `goal` and hand the single resulting
    /// subgoal to the translator. Tactic failures and subgoal-count
    /// surprises downgrade to `Unknown`; internal inconsistencies are real
    /// errors.
    fn internalize_goal(
        &mut self,
        tm: &mut TermManager,
        goal: Goal,
        dep2lit: &mut FxHashMap<TermId, Lit>,
    ) -> Result<Internalized> {
        self.mc_chain.clear();
        self.pipeline_dep_core.clear();
        debug_assert!(goal.models_enabled());

        let app = self.card2bv.apply(&goal, tm);
        let Some(goal) = self.advance_stage("card2bv", app)? else {
            return Ok(Internalized::Unknown);
        };
        let app = self.simplify.apply(&goal, tm);
        let Some(goal) = self.advance_stage("simplify", app)? else {
            return Ok(Internalized::Unknown);
        };
        let app = self.sharing.apply(&goal, tm);
        let Some(goal) = self.advance_stage("max-bv-sharing", app)? else {
            return Ok(Internalized::Unknown);
        };
        let app = self.blaster.apply(&goal, tm);
        let Some(goal) = self.advance_stage("bitblast", app)? else {
            return Ok(Internalized::Unknown);
        };
        let app = self.simplify.apply(&goal, tm);
        let Some(goal) = self.advance_stage("simplify", app)? else {
            return Ok(Internalized::Unknown);
        };

        let mut translator = GoalTranslator::new(&mut self.sat, &mut self.map, dep2lit);
        match translator.translate(&goal, tm) {
            Ok(()) => {
                debug!(
                    assertions = goal.len(),
                    deps = dep2lit.len(),
                    "goal translated"
                );
                Ok(Internalized::Done)
            }
            Err(SatoriError::Tactic { tactic, reason }) => {
                warn!("translation failed in {tactic}: {reason}");
                self.unknown_reason = format!("translation failed: {reason}");
                Ok(Internalized::Unknown)
            }
            Err(e) => Err(e),
        }
    }

    /// Unpack one pipeline stage: enforce the single-subgoal contract and
    /// collect the stage's converter and dependency core.
    fn advance_stage(
        &mut self,
        name: &'static str,
        app: Result<TacticApplication>,
    ) -> Result<Option<Goal>> {
        match app {
            Err(SatoriError::Invariant(e)) => Err(SatoriError::Invariant(e)),
            Err(e) => {
                warn!("tactic {name} failed: {e}");
                self.unknown_reason = format!("tactic {name} failed: {e}");
                Ok(None)
            }
            Ok(mut app) => {
                if app.subgoals.len() != 1 {
                    warn!("tactic {name} produced {} subgoals", app.subgoals.len());
                    self.unknown_reason =
                        format!("pipeline produced {} subgoals", app.subgoals.len());
                    return Ok(None);
                }
                if let Some(mc) = app.converter.take() {
                    self.mc_chain.push(mc);
                }
                self.pipeline_dep_core.append(&mut app.dep_core);
                Ok(app.subgoals.pop())
            }
        }
    }

    fn internalize_formulas(&mut self, tm: &mut TermManager) -> Result<Internalized> {
        if self.fmls_head == self.fmls.len() {
            return Ok(Internalized::Done);
        }
        let mut goal = Goal::new(true, false);
        for &f in &self.fmls[self.fmls_head..] {
            goal.assert(f);
        }
        let mut dep2lit = FxHashMap::default();
        match self.internalize_goal(tm, goal, &mut dep2lit)? {
            Internalized::Done => {
                // the head advances only on success, so a failed call can be
                // replayed and the engine never silently loses formulas
                self.fmls_head = self.fmls.len();
                Ok(Internalized::Done)
            }
            Internalized::Unknown => Ok(Internalized::Unknown),
        }
    }

    fn internalize_assumptions(
        &mut self,
        tm: &mut TermManager,
        assumptions: &[TermId],
        dep2lit: &mut FxHashMap<TermId, Lit>,
    ) -> Result<Internalized> {
        self.asms.clear();
        if assumptions.is_empty() {
            return Ok(Internalized::Done);
        }
        let mut goal = Goal::new(true, true);
        for &a in assumptions {
            goal.assert_with_dep(a, Some(a));
        }
        match self.internalize_goal(tm, goal, dep2lit)? {
            Internalized::Done => {
                self.extract_assumptions(assumptions, dep2lit)?;
                Ok(Internalized::Done)
            }
            Internalized::Unknown => Ok(Internalized::Unknown),
        }
    }

    /// Project the user assumption list onto SAT literals, compacting the
    /// parallel weights by the same projection.
    fn extract_assumptions(
        &mut self,
        assumptions: &[TermId],
        dep2lit: &FxHashMap<TermId, Lit>,
    ) -> Result<()> {
        self.asms.clear();
        let mut j = 0;
        for (i, &a) in assumptions.iter().enumerate() {
            if let Some(&lit) = dep2lit.get(&a) {
                self.asms.push(lit);
                if i != j && !self.weights.is_empty() {
                    self.weights[j] = self.weights[i];
                }
                j += 1;
            }
        }
        if !self.weights.is_empty() {
            self.weights.truncate(j);
        }
        // every dependency must be projected; repeated assumption terms
        // share one map entry, so the buffer may only be longer
        if dep2lit.len() > self.asms.len() {
            return Err(SatoriError::Invariant(
                "assumption projection lost a dependency".into(),
            ));
        }
        Ok(())
    }

    /// Every projected assumption literal must hold in the engine's model.
    fn check_assumptions(&self, dep2lit: &FxHashMap<TermId, Lit>) -> Result<()> {
        let model = self.sat.model();
        for (&dep, &lit) in dep2lit {
            if !lit_true_in(model, lit) {
                return Err(SatoriError::Invariant(format!(
                    "assumption {dep:?} does not evaluate to true in the sat model"
                )));
            }
        }
        Ok(())
    }

    /// Map the engine's core back to original labels, unioning in the
    /// dependency core the pipeline derived on its own.
    fn extract_core(&mut self, dep2lit: &FxHashMap<TermId, Lit>) -> Result<()> {
        let mut lit2dep: FxHashMap<usize, TermId> = FxHashMap::default();
        for (&dep, &lit) in dep2lit {
            lit2dep.insert(lit.index(), dep);
        }
        self.core.clear();
        for &lit in self.sat.core() {
            let Some(&dep) = lit2dep.get(&lit.index()) else {
                return Err(SatoriError::Invariant(format!(
                    "core literal {lit} has no associated assumption"
                )));
            };
            self.core.push(dep);
        }
        for &dep in &self.pipeline_dep_core {
            if !self.core.contains(&dep) {
                self.core.push(dep);
            }
        }
        Ok(())
    }

    /// Lift the engine's assignment through the atom map and the recorded
    /// converters into a model over original symbols.
    fn extract_model(&mut self, tm: &mut TermManager) -> Result<()> {
        if !self.sat.model_is_current() {
            self.cached_model = None;
            return Ok(());
        }
        let assignment = self.sat.model().to_vec();
        let mut model = Model::new();
        for (t, v) in self.map.iter() {
            if !tm.is_leaf(t) {
                continue;
            }
            match assignment.get(v.index()).copied() {
                Some(LBool::True) => {
                    let tt = tm.mk_true();
                    model.set(t, tt);
                }
                Some(LBool::False) => {
                    let ff = tm.mk_false();
                    model.set(t, ff);
                }
                _ => {}
            }
        }
        apply_converters(&self.mc_chain, &mut model, tm);
        if !self.blaster.const2bits().is_empty() {
            let bv = BvModelConverter::from_table(&self.blaster, tm);
            bv.convert(&mut model, tm);
        }

        // only formulas the engine has seen; later asserts are not part of
        // the assignment this model was lifted from
        #[cfg(debug_assertions)]
        for &f in &self.fmls[..self.fmls_head] {
            let value = model.eval(f, tm);
            debug_assert!(
                tm.is_true(value),
                "asserted formula {f:?} does not evaluate to true under the lifted model"
            );
        }

        self.cached_model = Some(model);
        Ok(())
    }
}

fn lit_true_in(model: &[LBool], l: Lit) -> bool {
    match model.get(l.var().index()).copied() {
        Some(LBool::True) => l.is_positive(),
        Some(LBool::False) => !l.is_positive(),
        _ => false,
    }
}
