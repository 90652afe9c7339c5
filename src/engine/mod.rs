//! The evaluator: stratified semi-naive bottom-up driver plus a naive
//! reference implementation used to test the two against each other
//! (spec §4 / §5 / §8).

pub mod bottom_up;
pub mod delta;
pub mod naive;

use crate::inclusion::InclusionConstraint;
use crate::lattice::MergeSpec;
use crate::store::{columnar::ColumnarStore, first_arg::FirstArgIndexStore, multi_column::MultiColumnIndexStore, simple::SimpleStore, RemovableStore};
use crate::term::{Mode, PredicateSym};
use crate::topdown::Clause;
use std::collections::HashMap;

/// Which index strategy backs one predicate's store (spec §5: a
/// per-predicate choice).
#[derive(Debug, Clone)]
pub enum IndexStrategy {
    Simple,
    FirstArg,
    MultiColumn(Vec<usize>),
    Columnar,
}

impl IndexStrategy {
    pub fn build(&self, arity: usize) -> Box<dyn RemovableStore> {
        match self {
            IndexStrategy::Simple => Box::new(SimpleStore::new(arity)),
            IndexStrategy::FirstArg => Box::new(FirstArgIndexStore::new(arity)),
            IndexStrategy::MultiColumn(cols) => {
                Box::new(MultiColumnIndexStore::new(arity, cols.clone()))
            }
            IndexStrategy::Columnar => Box::new(ColumnarStore::new(arity)),
        }
    }
}

/// Static metadata about one predicate, set once when the program is
/// assembled.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub predicate: PredicateSym,
    pub index_strategy: IndexStrategy,
    pub merge: Option<MergeSpec>,
    pub inclusion: Vec<InclusionConstraint>,
    pub temporal: bool,
    pub external: bool,
    /// Dispatched via the top-down query context instead of bottom-up
    /// rule evaluation (spec §4.5 / §4.6) — no stratum ever materializes
    /// this predicate's store.
    pub deferred: bool,
    /// Argument modes (`+`/`−`, spec §3), consulted when `deferred` is
    /// set to build the goal passed to [`crate::topdown::TopDownContext::solve`].
    /// Empty for non-deferred predicates.
    pub modes: Vec<Mode>,
}

impl Declaration {
    pub fn new(predicate: PredicateSym) -> Self {
        Declaration {
            predicate,
            index_strategy: IndexStrategy::Simple,
            merge: None,
            inclusion: Vec::new(),
            temporal: false,
            external: false,
            deferred: false,
            modes: Vec::new(),
        }
    }

    /// Mark this predicate `deferred` (spec §4.5), dispatched through
    /// the top-down query context with the given mode vector instead of
    /// being materialized by a stratum.
    pub fn with_deferred(mut self, modes: Vec<Mode>) -> Self {
        debug_assert_eq!(modes.len(), self.predicate.arity);
        self.deferred = true;
        self.modes = modes;
        self
    }
}

/// A fully-assembled, ready-to-evaluate program: declarations, clauses
/// grouped by head predicate, and a stratification (lowest stratum
/// first; every predicate appears in exactly one stratum).
pub struct ProgramInfo {
    pub declarations: HashMap<PredicateSym, Declaration>,
    pub clauses: HashMap<PredicateSym, Vec<Clause>>,
    pub strata: Vec<Vec<PredicateSym>>,
}

impl ProgramInfo {
    pub fn new() -> Self {
        ProgramInfo {
            declarations: HashMap::new(),
            clauses: HashMap::new(),
            strata: Vec::new(),
        }
    }

    pub fn declare(&mut self, declaration: Declaration) {
        self.declarations.insert(declaration.predicate.clone(), declaration);
    }

    pub fn add_clause(&mut self, clause: Clause) {
        self.clauses
            .entry(clause.head.predicate.clone())
            .or_default()
            .push(clause);
    }

    fn clauses_for(&self, predicate: &PredicateSym) -> Vec<&Clause> {
        self.clauses
            .get(predicate)
            .map(|cs| cs.iter().collect())
            .unwrap_or_default()
    }
}

impl Default for ProgramInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct EvalOptions {
    pub limits: crate::config::LimitsConfig,
    pub eval_time: i64,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            limits: crate::config::LimitsConfig::default(),
            eval_time: 0,
        }
    }
}
