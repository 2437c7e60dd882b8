//! End-to-end driver scenarios.

use satori_core::{Statistics, TermId, TermManager};
use satori_solver::{collect_param_descrs, IncSatSolver, SolveResult};

fn bool_var(tm: &mut TermManager, name: &str) -> TermId {
    let sort = tm.sorts.bool_sort;
    tm.mk_var(name, sort)
}

#[test]
fn test_disjunction_with_unit() {
    let mut tm = TermManager::new();
    let x = bool_var(&mut tm, "x");
    let y = bool_var(&mut tm, "y");
    let or = tm.mk_or(vec![x, y]);
    let nx = tm.mk_not(x);

    let mut solver = IncSatSolver::new();
    solver.assert_formula(or);
    solver.assert_formula(nx);

    assert_eq!(solver.check_sat(&mut tm, &[]).expect("check"), SolveResult::Sat);
    let model = solver.get_model(&mut tm).expect("extract").expect("model");
    let vy = model.eval(y, &mut tm);
    assert!(tm.is_true(vy));
    let vx = model.eval(x, &mut tm);
    assert!(tm.is_false(vx));
}

#[test]
fn test_plain_contradiction_has_empty_core() {
    let mut tm = TermManager::new();
    let x = bool_var(&mut tm, "x");
    let nx = tm.mk_not(x);

    let mut solver = IncSatSolver::new();
    solver.assert_formula(x);
    solver.assert_formula(nx);

    assert_eq!(
        solver.check_sat(&mut tm, &[]).expect("check"),
        SolveResult::Unsat
    );
    assert!(solver.get_unsat_core().is_empty());
}

#[test]
fn test_labeled_assertions_yield_core() {
    let mut tm = TermManager::new();
    let a = bool_var(&mut tm, "a");
    let b = bool_var(&mut tm, "b");
    let x = bool_var(&mut tm, "x");
    let nx = tm.mk_not(x);

    let mut solver = IncSatSolver::new();
    solver.assert_labeled(&mut tm, x, a);
    solver.assert_labeled(&mut tm, nx, b);
    assert_eq!(solver.get_num_assumptions(), 2);
    assert_eq!(solver.get_assumption(0), Some(a));

    assert_eq!(
        solver.check_sat(&mut tm, &[a, b]).expect("check"),
        SolveResult::Unsat
    );
    let core = solver.get_unsat_core();
    assert_eq!(core.len(), 2);
    assert!(core.contains(&a));
    assert!(core.contains(&b));

    // retracting one assumption restores satisfiability
    assert_eq!(
        solver.check_sat(&mut tm, &[a]).expect("check"),
        SolveResult::Sat
    );
    let model = solver.get_model(&mut tm).expect("extract").expect("model");
    let vx = model.eval(x, &mut tm);
    assert!(tm.is_true(vx));
}

#[test]
fn test_push_pop_scopes_formula() {
    let mut tm = TermManager::new();
    let x = bool_var(&mut tm, "x");

    let mut solver = IncSatSolver::new();
    solver.push(&mut tm);
    solver.assert_formula(x);
    assert_eq!(solver.check_sat(&mut tm, &[]).expect("check"), SolveResult::Sat);
    let model = solver.get_model(&mut tm).expect("extract").expect("model");
    let __v = model.eval(x, &mut tm);
    assert!(tm.is_true(__v));

    solver.pop(1);
    assert_eq!(solver.get_scope_level(), 0);
    assert_eq!(solver.get_num_assertions(), 0);
    assert_eq!(solver.check_sat(&mut tm, &[]).expect("check"), SolveResult::Sat);
    let model = solver.get_model(&mut tm).expect("extract").expect("model");
    // x is gone from the translated state entirely
    assert!(model.get(x).is_none());
}

#[test]
fn test_bitvector_addition_model() {
    let mut tm = TermManager::new();
    let bv4 = tm.sorts.mk_bitvec(4);
    let c = tm.mk_var("c", bv4);
    let one = tm.mk_bv_const_u64(1, 4);
    let two = tm.mk_bv_const_u64(2, 4);
    let sum = tm.mk_bv_add(c, one);
    let eq = tm.mk_eq(sum, two);

    let mut solver = IncSatSolver::new();
    solver.assert_formula(eq);
    assert_eq!(solver.check_sat(&mut tm, &[]).expect("check"), SolveResult::Sat);

    let model = solver.get_model(&mut tm).expect("extract").expect("model");
    assert_eq!(model.get(c), Some(one));
    let __v = model.eval(eq, &mut tm);
    assert!(tm.is_true(__v));
}

#[test]
fn test_cardinality_at_least() {
    let mut tm = TermManager::new();
    let p = bool_var(&mut tm, "p");
    let q = bool_var(&mut tm, "q");
    let r = bool_var(&mut tm, "r");
    let al2 = tm.mk_at_least(vec![p, q, r], 2);
    let np = tm.mk_not(p);

    let mut solver = IncSatSolver::new();
    solver.assert_formula(al2);
    solver.assert_formula(np);
    assert_eq!(solver.check_sat(&mut tm, &[]).expect("check"), SolveResult::Sat);

    let model = solver.get_model(&mut tm).expect("extract").expect("model");
    let __v = model.eval(p, &mut tm);
    assert!(tm.is_false(__v));
    let __v = model.eval(q, &mut tm);
    assert!(tm.is_true(__v));
    let __v = model.eval(r, &mut tm);
    assert!(tm.is_true(__v));
}

#[test]
fn test_balanced_push_pop_restores_observable_state() {
    let mut tm = TermManager::new();
    let x = bool_var(&mut tm, "x");
    let y = bool_var(&mut tm, "y");
    let a = bool_var(&mut tm, "a");

    let mut solver = IncSatSolver::new();
    solver.assert_formula(x);
    let before_assertions = solver.get_num_assertions();
    let before_assumptions = solver.get_num_assumptions();

    solver.push(&mut tm);
    solver.assert_formula(y);
    solver.assert_labeled(&mut tm, y, a);
    solver.push(&mut tm);
    let ny = tm.mk_not(y);
    solver.assert_formula(ny);
    assert_eq!(
        solver.check_sat(&mut tm, &[]).expect("check"),
        SolveResult::Unsat
    );
    solver.pop(2);

    assert_eq!(solver.get_scope_level(), 0);
    assert_eq!(solver.get_num_assertions(), before_assertions);
    assert_eq!(solver.get_num_assumptions(), before_assumptions);
    assert_eq!(solver.check_sat(&mut tm, &[]).expect("check"), SolveResult::Sat);
}

#[test]
fn test_check_sat_is_idempotent() {
    let mut tm = TermManager::new();
    let x = bool_var(&mut tm, "x");
    let y = bool_var(&mut tm, "y");
    let or = tm.mk_or(vec![x, y]);

    let mut solver = IncSatSolver::new();
    solver.assert_formula(or);
    let first = solver.check_sat(&mut tm, &[]).expect("check");
    let second = solver.check_sat(&mut tm, &[]).expect("check");
    assert_eq!(first, SolveResult::Sat);
    assert_eq!(first, second);

    let model = solver.get_model(&mut tm).expect("extract").expect("model");
    let __v = model.eval(or, &mut tm);
    assert!(tm.is_true(__v));
}

#[test]
fn test_pop_beyond_depth_is_clamped() {
    let mut tm = TermManager::new();
    let x = bool_var(&mut tm, "x");

    let mut solver = IncSatSolver::new();
    solver.push(&mut tm);
    solver.assert_formula(x);
    solver.pop(7);
    assert_eq!(solver.get_scope_level(), 0);
    assert_eq!(solver.get_num_assertions(), 0);

    // the solver stays usable
    solver.assert_formula(x);
    assert_eq!(solver.check_sat(&mut tm, &[]).expect("check"), SolveResult::Sat);
}

#[test]
fn test_translate_round_trip() {
    let mut src = TermManager::new();
    let bv4 = src.sorts.mk_bitvec(4);
    let c = src.mk_var("c", bv4);
    let three = src.mk_bv_const_u64(3, 4);
    let lt = src.mk_bv_ult(c, three);
    let a = src.mk_var("a", src.sorts.bool_sort);
    let zero_eq = {
        let zero = src.mk_bv_zero(4);
        src.mk_eq(c, zero)
    };

    let mut solver = IncSatSolver::new();
    solver.assert_formula(lt);
    solver.assert_labeled(&mut src, zero_eq, a);

    let mut dst = TermManager::new();
    let copy = solver.translate(&src, &mut dst).expect("translate");
    let mut copy = copy;

    // both answer the same on the same (per-manager) assumption terms
    let a_src = solver.check_sat(&mut src, &[a]).expect("check");
    let a_dst_term = dst.mk_var("a", dst.sorts.bool_sort);
    let a_dst = copy.check_sat(&mut dst, &[a_dst_term]).expect("check");
    assert_eq!(a_src, SolveResult::Sat);
    assert_eq!(a_src, a_dst);

    assert_eq!(copy.get_num_assertions(), solver.get_num_assertions());
    assert_eq!(copy.get_num_assumptions(), solver.get_num_assumptions());
}

#[test]
fn test_translate_fails_above_base() {
    let mut src = TermManager::new();
    let mut dst = TermManager::new();
    let mut solver = IncSatSolver::new();
    solver.push(&mut src);
    assert!(solver.translate(&src, &mut dst).is_err());
}

#[test]
fn test_weighted_check_relaxes_soft_assumptions() {
    let mut tm = TermManager::new();
    let x = bool_var(&mut tm, "x");
    let nx = tm.mk_not(x);

    let mut solver = IncSatSolver::new();
    // no hard constraints; x and !x soft with weight 1 each
    let weights = [1.0, 1.0];
    assert_eq!(
        solver
            .check_sat_weighted(&mut tm, &[x, nx], Some(&weights), 2.0)
            .expect("check"),
        SolveResult::Sat
    );
    assert_eq!(
        solver
            .check_sat_weighted(&mut tm, &[x, nx], Some(&weights), 1.0)
            .expect("check"),
        SolveResult::Unsat
    );
}

#[test]
fn test_weighted_display() {
    let mut tm = TermManager::new();
    let x = bool_var(&mut tm, "x");
    let y = bool_var(&mut tm, "y");
    let or = tm.mk_or(vec![x, y]);

    let mut solver = IncSatSolver::new();
    solver.assert_formula(or);

    let mut out = Vec::new();
    solver
        .display_weighted(&mut tm, &mut out, &[x], &[3.0])
        .expect("display");
    let text = String::from_utf8(out).expect("utf8");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("p wcnf 2 2 4"));
    assert!(text.lines().count() >= 3);

    // fractional weights are rejected
    let mut out = Vec::new();
    assert!(solver
        .display_weighted(&mut tm, &mut out, &[x], &[1.5])
        .is_err());
}

#[test]
fn test_statistics_and_param_descrs() {
    let mut tm = TermManager::new();
    let x = bool_var(&mut tm, "x");
    let mut solver = IncSatSolver::new();
    solver.assert_formula(x);
    solver.check_sat(&mut tm, &[]).expect("check");

    let mut st = Statistics::new();
    solver.collect_statistics(&mut st);
    assert_eq!(st.get("solver.assertions"), 1);
    assert!(st.get("sat.variables") >= 1);

    let descrs = collect_param_descrs();
    assert!(descrs.iter().any(|d| d.name == "elim_vars"));
    assert!(descrs.iter().any(|d| d.name == "optimize_model"));
}

#[test]
fn test_incremental_assert_between_checks() {
    let mut tm = TermManager::new();
    let x = bool_var(&mut tm, "x");
    let y = bool_var(&mut tm, "y");
    let or = tm.mk_or(vec![x, y]);

    let mut solver = IncSatSolver::new();
    solver.assert_formula(or);
    assert_eq!(solver.check_sat(&mut tm, &[]).expect("check"), SolveResult::Sat);

    let nx = tm.mk_not(x);
    solver.assert_formula(nx);
    assert_eq!(solver.check_sat(&mut tm, &[]).expect("check"), SolveResult::Sat);

    let ny = tm.mk_not(y);
    solver.assert_formula(ny);
    assert_eq!(
        solver.check_sat(&mut tm, &[]).expect("check"),
        SolveResult::Unsat
    );
}

#[test]
fn test_mixed_bv_and_boolean_structure() {
    let mut tm = TermManager::new();
    let bv8 = tm.sorts.mk_bitvec(8);
    let v = tm.mk_var("v", bv8);
    let ten = tm.mk_bv_const_u64(10, 8);
    let twenty = tm.mk_bv_const_u64(20, 8);
    let small = tm.mk_bv_ult(v, ten);
    let big = tm.mk_bv_ult(twenty, v);
    let either = tm.mk_or(vec![small, big]);
    let nsmall = tm.mk_not(small);

    let mut solver = IncSatSolver::new();
    solver.assert_formula(either);
    solver.assert_formula(nsmall);
    assert_eq!(solver.check_sat(&mut tm, &[]).expect("check"), SolveResult::Sat);

    let model = solver.get_model(&mut tm).expect("extract").expect("model");
    let __v = model.eval(big, &mut tm);
    assert!(tm.is_true(__v));
    let __v = model.eval(small, &mut tm);
    assert!(tm.is_false(__v));
}
