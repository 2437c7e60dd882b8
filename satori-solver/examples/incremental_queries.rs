//! Incremental solving walkthrough: assertions, scopes, assumptions,
//! cores and models.
//!
//! Run with: cargo run --example incremental_queries

use satori_core::TermManager;
use satori_solver::{IncSatSolver, SolveResult};

fn main() {
    let mut tm = TermManager::new();
    let mut solver = IncSatSolver::new();

    // x | y, under scope: !x
    let x = tm.mk_var("x", tm.sorts.bool_sort);
    let y = tm.mk_var("y", tm.sorts.bool_sort);
    let or = tm.mk_or(vec![x, y]);
    solver.assert_formula(or);

    solver.push(&mut tm);
    let nx = tm.mk_not(x);
    solver.assert_formula(nx);
    match solver.check_sat(&mut tm, &[]) {
        Ok(SolveResult::Sat) => {
            let model = solver
                .get_model(&mut tm)
                .expect("model extraction")
                .expect("model");
            let vy = model.eval(y, &mut tm);
            println!("scoped check: sat, y = {}", tm.is_true(vy));
        }
        other => println!("scoped check: {other:?}"),
    }
    solver.pop(1);

    // labeled assertions give unsat cores in the caller's vocabulary
    let a = tm.mk_var("a", tm.sorts.bool_sort);
    let b = tm.mk_var("b", tm.sorts.bool_sort);
    solver.assert_labeled(&mut tm, x, a);
    let nx = tm.mk_not(x);
    solver.assert_labeled(&mut tm, nx, b);
    match solver.check_sat(&mut tm, &[a, b]) {
        Ok(SolveResult::Unsat) => {
            println!("assumption check: unsat, core size {}", solver.get_unsat_core().len());
        }
        other => println!("assumption check: {other:?}"),
    }

    // a bit-vector query: c + 1 == 2 over 4 bits
    let bv4 = tm.sorts.mk_bitvec(4);
    let c = tm.mk_var("c", bv4);
    let one = tm.mk_bv_const_u64(1, 4);
    let two = tm.mk_bv_const_u64(2, 4);
    let sum = tm.mk_bv_add(c, one);
    let eq = tm.mk_eq(sum, two);

    let mut bv_solver = IncSatSolver::new();
    bv_solver.assert_formula(eq);
    if let Ok(SolveResult::Sat) = bv_solver.check_sat(&mut tm, &[]) {
        let model = bv_solver
            .get_model(&mut tm)
            .expect("model extraction")
            .expect("model");
        let value = model.eval(c, &mut tm);
        if let Some((v, _)) = tm.bv_const_value(value) {
            println!("bit-vector check: sat, c = {v}");
        }
    }
}
