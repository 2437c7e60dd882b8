//! Satori Solver - the incremental SAT-backed front-end.
//!
//! Accepts quantifier-free Boolean / bit-vector / cardinality formulas,
//! preprocesses and bit-blasts them to clauses for the CDCL engine, and
//! answers satisfiability queries under retractable assumption literals,
//! with push/pop context management, model lift-back and unsat cores in the
//! caller's vocabulary.
//!
//! # Example
//!
//! ```
//! use satori_core::TermManager;
//! use satori_solver::{IncSatSolver, SolveResult};
//!
//! let mut tm = TermManager::new();
//! let x = tm.mk_var("x", tm.sorts.bool_sort);
//! let y = tm.mk_var("y", tm.sorts.bool_sort);
//! let or = tm.mk_or(vec![x, y]);
//! let nx = tm.mk_not(x);
//!
//! let mut solver = IncSatSolver::new();
//! solver.assert_formula(or);
//! solver.assert_formula(nx);
//! assert_eq!(solver.check_sat(&mut tm, &[]).unwrap(), SolveResult::Sat);
//!
//! let model = solver.get_model(&mut tm).unwrap().expect("model");
//! let value = model.eval(y, &mut tm);
//! assert!(tm.is_true(value));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod atom_map;
pub mod goal2sat;
pub mod inc_sat;

pub use atom_map::AtomVarMap;
pub use goal2sat::GoalTranslator;
pub use inc_sat::{collect_param_descrs, DriverParams, IncSatSolver, ParamDescr, SolveResult};
