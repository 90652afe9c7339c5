//! # deltalog
//!
//! A stratified, semi-naive Datalog core: fact stores, first-order
//! unification, lattice-ordered merges, and metric-temporal evaluation
//! over interval-valued facts.
//!
//! This crate is a library collaborator, not a complete system. It has no
//! parser and no CLI — callers build a [`engine::ProgramInfo`] directly
//! (declarations plus [`topdown::Clause`] bodies) and hand it to
//! [`engine::bottom_up::eval_program`]. A surface syntax, if one is
//! wanted, is a separate concern layered on top.
//!
//! ## Pipeline
//!
//! ```text
//! ProgramInfo (declarations + clauses, stratified)
//!     ↓
//! engine::bottom_up::eval_program   — one fixpoint per stratum, semi-naive
//!     │     ├─ engine::delta        — per-round delta-rule variants
//!     │     ├─ premise              — per-literal evaluation (positive/
//!     │     │                         negated/equality/inequality/temporal)
//!     │     ├─ inclusion            — type/membership checks on insert
//!     │     └─ lattice              — merge-predicate upsert
//!     ↓
//! populated FactStore / TemporalFactStore per predicate + EvalStats
//! ```
//!
//! `topdown::TopDownContext` offers the same evaluation on demand
//! (SLD-style backward chaining) for predicates nothing has materialized
//! yet — used by negation over deferred predicates and by merge
//! predicates queried before their stratum runs.
//!
//! ## Example
//!
//! ```rust,ignore
//! use deltalog::engine::{bottom_up, Declaration, EvalOptions, ProgramInfo};
//! use deltalog::engine::bottom_up::{StoreMap, TemporalStoreMap};
//! use deltalog::external::ExternalRegistry;
//! use deltalog::cancel::CancelToken;
//!
//! let mut program = ProgramInfo::new();
//! // ... declare predicates, add clauses, set program.strata ...
//!
//! let mut stores: StoreMap = StoreMap::new();
//! let temporal_stores = TemporalStoreMap::new();
//! let externals = ExternalRegistry::new();
//! let stats = bottom_up::eval_program(
//!     &program,
//!     &mut stores,
//!     &temporal_stores,
//!     &externals,
//!     &EvalOptions::default(),
//!     &CancelToken::new(),
//! )?;
//! # Ok::<(), deltalog::error::EvalError>(())
//! ```

pub mod builtins;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod external;
pub mod functional;
pub mod inclusion;
pub mod interval;
pub mod lattice;
pub mod premise;
pub mod store;
pub mod stats;
pub mod subst;
pub mod temporal_eval;
pub mod term;
pub mod topdown;
pub mod transform;
pub mod unify;

pub use config::Config;
pub use engine::{Declaration, EvalOptions, IndexStrategy, ProgramInfo};
pub use error::{EvalError, EvalResult};
pub use stats::EvalStats;
pub use term::{Atom, Constant, PredicateSym, Term, Variable};
