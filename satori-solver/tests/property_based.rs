//! Property-based tests: the full pipeline against the term evaluator.

use proptest::prelude::*;
use rustc_hash::FxHashMap;
use satori_core::{Model, TermId, TermManager};
use satori_solver::{IncSatSolver, SolveResult};

const NUM_VARS: usize = 4;

/// A clause over variable indices with polarities, plus an optional
/// cardinality constraint; enough structure to exercise every pipeline
/// stage end to end.
#[derive(Debug, Clone)]
struct Instance {
    clauses: Vec<Vec<(usize, bool)>>,
    cardinality: Option<(bool, Vec<usize>, u32)>,
}

fn instance_strategy() -> impl Strategy<Value = Instance> {
    let clauses = proptest::collection::vec(
        proptest::collection::vec((0..NUM_VARS, proptest::bool::ANY), 1..4),
        0..8,
    );
    let card = proptest::option::of((
        proptest::bool::ANY,
        proptest::collection::vec(0..NUM_VARS, 1..NUM_VARS),
        0u32..4,
    ));
    (clauses, card).prop_map(|(clauses, cardinality)| Instance {
        clauses,
        cardinality,
    })
}

fn build_formulas(tm: &mut TermManager, instance: &Instance) -> (Vec<TermId>, Vec<TermId>) {
    let vars: Vec<TermId> = (0..NUM_VARS)
        .map(|i| {
            let sort = tm.sorts.bool_sort;
            tm.mk_var(&format!("v{i}"), sort)
        })
        .collect();
    let mut formulas = Vec::new();
    for clause in &instance.clauses {
        let lits: Vec<TermId> = clause
            .iter()
            .map(|&(v, positive)| {
                if positive {
                    vars[v]
                } else {
                    tm.mk_not(vars[v])
                }
            })
            .collect();
        formulas.push(tm.mk_or(lits));
    }
    if let Some((at_least, ref idxs, k)) = instance.cardinality {
        let args: Vec<TermId> = idxs.iter().map(|&i| vars[i]).collect();
        let f = if at_least {
            tm.mk_at_least(args, k)
        } else {
            tm.mk_at_most(args, k)
        };
        formulas.push(f);
    }
    (vars, formulas)
}

/// Exhaustively search for a valuation satisfying every formula under the
/// term evaluator.
fn brute_force(tm: &mut TermManager, vars: &[TermId], formulas: &[TermId]) -> Option<u32> {
    let tt = tm.mk_true();
    let ff = tm.mk_false();
    (0..(1u32 << vars.len())).find(|&mask| {
        let mut model = Model::new();
        for (i, &v) in vars.iter().enumerate() {
            model.set(v, if (mask >> i) & 1 == 1 { tt } else { ff });
        }
        formulas.iter().all(|&f| {
            let value = model.eval(f, tm);
            tm.is_true(value)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_driver_matches_evaluator(instance in instance_strategy()) {
        let mut tm = TermManager::new();
        let (vars, formulas) = build_formulas(&mut tm, &instance);
        let expected = brute_force(&mut tm, &vars, &formulas);

        let mut solver = IncSatSolver::new();
        for &f in &formulas {
            solver.assert_formula(f);
        }
        let verdict = solver.check_sat(&mut tm, &[]).expect("check");
        prop_assert_eq!(
            verdict,
            if expected.is_some() { SolveResult::Sat } else { SolveResult::Unsat }
        );

        if verdict == SolveResult::Sat {
            let model = solver.get_model(&mut tm).expect("extract").expect("model");
            for &f in &formulas {
                let value = model.eval(f, &mut tm);
                prop_assert!(tm.is_true(value), "lifted model violates a formula");
            }
        }
    }

    #[test]
    fn prop_push_pop_preserves_base_verdict(
        base in instance_strategy(),
        scoped in instance_strategy(),
    ) {
        let mut tm = TermManager::new();
        let (_, base_formulas) = build_formulas(&mut tm, &base);
        let (_, scoped_formulas) = build_formulas(&mut tm, &scoped);

        let mut solver = IncSatSolver::new();
        for &f in &base_formulas {
            solver.assert_formula(f);
        }
        let before = solver.check_sat(&mut tm, &[]).expect("check");
        let assertions_before = solver.get_num_assertions();

        solver.push(&mut tm);
        for &f in &scoped_formulas {
            solver.assert_formula(f);
        }
        let _ = solver.check_sat(&mut tm, &[]).expect("check");
        solver.pop(1);

        prop_assert_eq!(solver.get_scope_level(), 0);
        prop_assert_eq!(solver.get_num_assertions(), assertions_before);
        let after = solver.check_sat(&mut tm, &[]).expect("check");
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_unsat_cores_are_subsets_and_unsat(
        base in instance_strategy(),
        labels in proptest::collection::vec((0..NUM_VARS, proptest::bool::ANY), 1..4),
    ) {
        let mut tm = TermManager::new();
        let (vars, base_formulas) = build_formulas(&mut tm, &base);

        let mut solver = IncSatSolver::new();
        for &f in &base_formulas {
            solver.assert_formula(f);
        }
        // label the assumption "v is positive/negative"
        let mut label_terms = Vec::new();
        let mut labeled: FxHashMap<TermId, TermId> = FxHashMap::default();
        for (i, &(v, positive)) in labels.iter().enumerate() {
            let sort = tm.sorts.bool_sort;
            let label = tm.mk_var(&format!("label{i}"), sort);
            let formula = if positive { vars[v] } else { tm.mk_not(vars[v]) };
            solver.assert_labeled(&mut tm, formula, label);
            label_terms.push(label);
            labeled.insert(label, formula);
        }

        if solver.check_sat(&mut tm, &label_terms).expect("check") == SolveResult::Unsat {
            let core: Vec<TermId> = solver.get_unsat_core().to_vec();
            prop_assert!(!core.is_empty() || brute_force(&mut tm, &vars, &base_formulas).is_none());
            for l in &core {
                prop_assert!(label_terms.contains(l), "core label not among assumptions");
            }
            // base formulas plus the core's guarded formulas stay unsat
            let mut formulas = base_formulas.clone();
            for l in &core {
                formulas.push(labeled[l]);
            }
            prop_assert!(brute_force(&mut tm, &vars, &formulas).is_none(), "core not unsat");
        }
    }
}
