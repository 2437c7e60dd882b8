//! Property-based tests: rewriting must preserve evaluation.

use proptest::prelude::*;
use satori_core::{Card2BvTactic, Goal, Model, SimplifyTactic, Tactic, TermId, TermManager};

const NUM_VARS: usize = 3;

/// Recipe for a Boolean formula over a fixed variable pool; built into a
/// real term per test case.
#[derive(Debug, Clone)]
enum Recipe {
    Var(usize),
    Const(bool),
    Not(Box<Recipe>),
    And(Vec<Recipe>),
    Or(Vec<Recipe>),
    Xor(Box<Recipe>, Box<Recipe>),
    Eq(Box<Recipe>, Box<Recipe>),
    Ite(Box<Recipe>, Box<Recipe>, Box<Recipe>),
    Implies(Box<Recipe>, Box<Recipe>),
    AtLeast(Vec<usize>, u32),
}

fn recipe_strategy() -> impl Strategy<Value = Recipe> {
    let leaf = prop_oneof![
        (0..NUM_VARS).prop_map(Recipe::Var),
        proptest::bool::ANY.prop_map(Recipe::Const),
        (proptest::collection::vec(0..NUM_VARS, 1..NUM_VARS), 0u32..4)
            .prop_map(|(vs, k)| Recipe::AtLeast(vs, k)),
    ];
    leaf.prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|f| Recipe::Not(Box::new(f))),
            proptest::collection::vec(inner.clone(), 2..4).prop_map(Recipe::And),
            proptest::collection::vec(inner.clone(), 2..4).prop_map(Recipe::Or),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Recipe::Xor(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Recipe::Eq(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Recipe::Implies(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone(), inner)
                .prop_map(|(c, t, e)| Recipe::Ite(Box::new(c), Box::new(t), Box::new(e))),
        ]
    })
}

fn build(recipe: &Recipe, vars: &[TermId], tm: &mut TermManager) -> TermId {
    match recipe {
        Recipe::Var(i) => vars[*i],
        Recipe::Const(true) => tm.mk_true(),
        Recipe::Const(false) => tm.mk_false(),
        Recipe::Not(f) => {
            let inner = build(f, vars, tm);
            tm.mk_not(inner)
        }
        Recipe::And(fs) => {
            let args: Vec<TermId> = fs.iter().map(|f| build(f, vars, tm)).collect();
            tm.mk_and(args)
        }
        Recipe::Or(fs) => {
            let args: Vec<TermId> = fs.iter().map(|f| build(f, vars, tm)).collect();
            tm.mk_or(args)
        }
        Recipe::Xor(a, b) => {
            let a = build(a, vars, tm);
            let b = build(b, vars, tm);
            tm.mk_xor(a, b)
        }
        Recipe::Eq(a, b) => {
            let a = build(a, vars, tm);
            let b = build(b, vars, tm);
            tm.mk_eq(a, b)
        }
        Recipe::Implies(a, b) => {
            let a = build(a, vars, tm);
            let b = build(b, vars, tm);
            tm.mk_implies(a, b)
        }
        Recipe::Ite(c, t, e) => {
            let c = build(c, vars, tm);
            let t = build(t, vars, tm);
            let e = build(e, vars, tm);
            tm.mk_ite(c, t, e)
        }
        Recipe::AtLeast(vs, k) => {
            let args: Vec<TermId> = vs.iter().map(|&i| vars[i]).collect();
            tm.mk_at_least(args, *k)
        }
    }
}

fn valuation(mask: u32, vars: &[TermId], tm: &TermManager) -> Model {
    let mut model = Model::new();
    for (i, &v) in vars.iter().enumerate() {
        let value = if (mask >> i) & 1 == 1 {
            tm.mk_true()
        } else {
            tm.mk_false()
        };
        model.set(v, value);
    }
    model
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_simplify_preserves_evaluation(recipe in recipe_strategy()) {
        let mut tm = TermManager::new();
        let sort = tm.sorts.bool_sort;
        let vars: Vec<TermId> = (0..NUM_VARS).map(|i| tm.mk_var(&format!("v{i}"), sort)).collect();
        let formula = build(&recipe, &vars, &mut tm);
        let simplified = SimplifyTactic::new().simplify(formula, &mut tm).expect("simplify");

        for mask in 0..(1u32 << NUM_VARS) {
            let model = valuation(mask, &vars, &tm);
            prop_assert_eq!(
                model.eval(formula, &mut tm),
                model.eval(simplified, &mut tm),
                "divergence at valuation {:03b}",
                mask
            );
        }
    }

    #[test]
    fn prop_card2bv_preserves_evaluation(recipe in recipe_strategy()) {
        let mut tm = TermManager::new();
        let sort = tm.sorts.bool_sort;
        let vars: Vec<TermId> = (0..NUM_VARS).map(|i| tm.mk_var(&format!("v{i}"), sort)).collect();
        let formula = build(&recipe, &vars, &mut tm);

        let mut goal = Goal::new(true, false);
        goal.assert(formula);
        let mut tactic = Card2BvTactic::new();
        let app = tactic.apply(&goal, &mut tm).expect("card2bv");
        prop_assert_eq!(app.subgoals.len(), 1);
        let rewritten = app.subgoals[0].assertion(0).expect("assertion");

        for mask in 0..(1u32 << NUM_VARS) {
            let model = valuation(mask, &vars, &tm);
            prop_assert_eq!(
                model.eval(formula, &mut tm),
                model.eval(rewritten, &mut tm),
                "divergence at valuation {:03b}",
                mask
            );
        }
    }
}
