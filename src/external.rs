//! External-predicate callbacks (spec §4.5 / §6). A predicate declared
//! `external` has no stored extension and no rules; instead the engine
//! asks a registered [`ExternalPredicate`] whether and how to evaluate
//! each call, which lets the host embed things like a live RPC lookup or
//! a foreign index as if it were an ordinary predicate.

use crate::error::EvalResult;
use crate::subst::Subst;
use crate::term::{Atom, PredicateSym};
use std::collections::HashMap;

/// Host-provided evaluator for one external predicate.
pub trait ExternalPredicate: Send + Sync {
    /// Should this call be pushed down to the external system at all, or
    /// does the engine already have enough bound arguments to skip it
    /// (e.g. a cache hit elsewhere in the substitution)? Most
    /// implementations simply return `true`.
    fn should_pushdown(&self, atom: &Atom, subst: &Subst) -> bool;

    /// Given a call this engine decided to push down, should it actually
    /// run now (vs. deferring to a later round once more arguments are
    /// bound)? Returning `false` defers without erroring.
    fn should_query(&self, atom: &Atom, subst: &Subst) -> bool;

    /// Run the query and return one extended substitution per result
    /// row. Called only when both `should_pushdown` and `should_query`
    /// returned `true`.
    fn execute_query(&self, atom: &Atom, subst: &Subst) -> EvalResult<Vec<Subst>>;
}

/// Registry of external predicates, keyed by predicate symbol.
#[derive(Default)]
pub struct ExternalRegistry {
    callbacks: HashMap<PredicateSym, Box<dyn ExternalPredicate>>,
}

impl ExternalRegistry {
    pub fn new() -> Self {
        ExternalRegistry::default()
    }

    pub fn register(&mut self, predicate: PredicateSym, callback: Box<dyn ExternalPredicate>) {
        self.callbacks.insert(predicate, callback);
    }

    pub fn get(&self, predicate: &PredicateSym) -> Option<&dyn ExternalPredicate> {
        self.callbacks.get(predicate).map(|b| b.as_ref())
    }

    /// Evaluate `atom` against `subst` if an external callback is
    /// registered and both of its gating checks pass; `Ok(None)` means
    /// either no callback is registered or it deferred this call.
    pub fn evaluate(&self, atom: &Atom, subst: &Subst) -> EvalResult<Option<Vec<Subst>>> {
        let Some(callback) = self.get(&atom.predicate) else {
            return Ok(None);
        };
        if !callback.should_pushdown(atom, subst) || !callback.should_query(atom, subst) {
            return Ok(None);
        }
        Ok(Some(callback.execute_query(atom, subst)?))
    }
}
