//! Property-based tests: the engine against exhaustive enumeration.

use proptest::prelude::*;
use satori_sat::{Lit, SatResult, Solver, Var};

type SpecClause = Vec<(usize, bool)>;

fn clause_satisfied(clause: &SpecClause, mask: u32) -> bool {
    clause
        .iter()
        .any(|&(v, positive)| ((mask >> v) & 1 == 1) == positive)
}

fn brute_force(num_vars: usize, clauses: &[SpecClause]) -> Option<u32> {
    (0..(1u32 << num_vars)).find(|&mask| clauses.iter().all(|c| clause_satisfied(c, mask)))
}

fn to_lit(vars: &[Var], v: usize, positive: bool) -> Lit {
    if positive {
        Lit::pos(vars[v])
    } else {
        Lit::neg(vars[v])
    }
}

fn clauses_strategy(num_vars: usize) -> impl Strategy<Value = Vec<SpecClause>> {
    proptest::collection::vec(
        proptest::collection::vec((0..num_vars, proptest::bool::ANY), 1..4),
        0..14,
    )
}

proptest! {
    #[test]
    fn prop_verdict_matches_brute_force(clauses in clauses_strategy(5)) {
        let num_vars = 5;
        let mut solver = Solver::new();
        let vars: Vec<Var> = (0..num_vars).map(|_| solver.new_var()).collect();
        for clause in &clauses {
            solver.add_clause(clause.iter().map(|&(v, p)| to_lit(&vars, v, p)));
        }
        let expected = brute_force(num_vars, &clauses);
        let got = solver.check(&[], None, 0.0);
        prop_assert_eq!(
            got,
            if expected.is_some() { SatResult::Sat } else { SatResult::Unsat }
        );
        if expected.is_some() {
            let model = solver.model();
            for clause in &clauses {
                let ok = clause.iter().any(|&(v, p)| {
                    let val = model[vars[v].index()];
                    if p { val.is_true() } else { val.is_false() }
                });
                prop_assert!(ok, "model violates clause {:?}", clause);
            }
        }
    }

    #[test]
    fn prop_cores_are_sound(
        clauses in clauses_strategy(4),
        assumptions in proptest::collection::vec((0usize..4, proptest::bool::ANY), 0..4),
    ) {
        let num_vars = 4;
        let mut solver = Solver::new();
        let vars: Vec<Var> = (0..num_vars).map(|_| solver.new_var()).collect();
        for clause in &clauses {
            solver.add_clause(clause.iter().map(|&(v, p)| to_lit(&vars, v, p)));
        }
        let asms: Vec<Lit> = assumptions.iter().map(|&(v, p)| to_lit(&vars, v, p)).collect();

        // expected verdict: clauses plus assumption units
        let mut all = clauses.clone();
        for &(v, p) in &assumptions {
            all.push(vec![(v, p)]);
        }
        let expected = brute_force(num_vars, &all);

        match solver.check(&asms, None, 0.0) {
            SatResult::Sat => prop_assert!(expected.is_some()),
            SatResult::Unsat => {
                prop_assert!(expected.is_none());
                // the core must itself be unsatisfiable with the clauses
                let core: Vec<Lit> = solver.core().to_vec();
                for l in &core {
                    prop_assert!(asms.contains(l), "core literal not among assumptions");
                }
                let mut with_core = clauses.clone();
                for l in &core {
                    let v = vars.iter().position(|&x| x == l.var()).expect("core var");
                    with_core.push(vec![(v, l.is_positive())]);
                }
                prop_assert!(brute_force(num_vars, &with_core).is_none(), "core is not unsat");
            }
            SatResult::Unknown => prop_assert!(false, "unexpected unknown"),
        }
    }

    #[test]
    fn prop_user_scopes_restore_verdict(
        base in clauses_strategy(4),
        scoped in clauses_strategy(4),
    ) {
        let num_vars = 4;
        let mut solver = Solver::new();
        let vars: Vec<Var> = (0..num_vars).map(|_| solver.new_var()).collect();
        for clause in &base {
            solver.add_clause(clause.iter().map(|&(v, p)| to_lit(&vars, v, p)));
        }
        let base_verdict = solver.check(&[], None, 0.0);

        solver.user_push();
        for clause in &scoped {
            solver.add_clause(clause.iter().map(|&(v, p)| to_lit(&vars, v, p)));
        }
        let _ = solver.check(&[], None, 0.0);
        solver.user_pop(1);

        prop_assert_eq!(solver.check(&[], None, 0.0), base_verdict);
    }
}
