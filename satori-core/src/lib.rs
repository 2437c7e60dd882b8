//! Satori Core - Terms, Sorts, Models and Preprocessing Tactics.
//!
//! This crate provides the foundation for the Satori solver:
//! - Hash-consed terms with lightweight [`TermId`] references
//! - A two-kinded sort system (Booleans and fixed-width bit-vectors)
//! - Models with a total evaluator and invertible model converters
//! - The preprocessing tactics the incremental driver composes:
//!   cardinality encoding, simplification, sharing maximization and
//!   bit-blasting
//!
//! # Examples
//!
//! ## Creating terms
//!
//! ```
//! use satori_core::TermManager;
//!
//! let mut tm = TermManager::new();
//! let p = tm.mk_var("p", tm.sorts.bool_sort);
//! let q = tm.mk_var("q", tm.sorts.bool_sort);
//! let both = tm.mk_and(vec![p, q]);
//! assert!(tm.is_bool_sorted(both));
//! ```
//!
//! ## Bit-vectors
//!
//! ```
//! use satori_core::TermManager;
//!
//! let mut tm = TermManager::new();
//! let bv4 = tm.sorts.mk_bitvec(4);
//! let c = tm.mk_var("c", bv4);
//! let one = tm.mk_bv_const_u64(1, 4);
//! let sum = tm.mk_bv_add(c, one);
//! assert_eq!(tm.bitvec_width_of(sum), Some(4));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod error;
pub mod model;
pub mod resource;
pub mod sort;
pub mod statistics;
pub mod tactic;

pub use ast::{Term, TermId, TermKind, TermManager};
pub use error::{Result, SatoriError};
pub use model::{apply_converters, Model, ModelConverter};
pub use resource::ResourceLimit;
pub use sort::{Sort, SortId, SortKind, SortStore};
pub use statistics::Statistics;
pub use tactic::{
    BitBlaster, BvModelConverter, BvSharingTactic, Card2BvTactic, Goal, SimplifyConfig,
    SimplifyTactic, Tactic, TacticApplication,
};
