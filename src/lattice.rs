//! Lattice merge step (spec §4.7). A predicate declared with a merge
//! function treats one column as a lattice value: inserting a fact whose
//! key columns match an existing fact doesn't duplicate the row, it
//! resolves the two value columns against a user-defined Datalog merge
//! predicate `m(prev, new, out)` (modes `(+, +, −)`) through the
//! top-down query context (§4.6). When the merge predicate has no
//! solution, the values are incomparable and both facts are kept.
//!
//! Only a single target (value) column is supported; declaring a merge
//! spec over more raises [`crate::error::EvalError::MergeMultiTargetUnsupported`]
//! at construction time rather than failing silently later.

use crate::error::{EvalError, EvalResult};
use crate::subst::Subst;
use crate::term::{Atom, Constant, Mode, PredicateSym, Term, Variable};

#[derive(Debug, Clone)]
pub struct MergeSpec {
    pub key_columns: Vec<usize>,
    pub value_column: usize,
    /// The 3-ary predicate `m(prev, new, out)` invoked to merge two
    /// competing values for `value_column`.
    pub merge_predicate: PredicateSym,
}

impl MergeSpec {
    pub fn new(
        predicate: &PredicateSym,
        key_columns: Vec<usize>,
        value_column: usize,
        merge_predicate: PredicateSym,
    ) -> EvalResult<Self> {
        if key_columns.contains(&value_column) {
            return Err(EvalError::MergeMultiTargetUnsupported {
                predicate: predicate.clone(),
            });
        }
        debug_assert_eq!(merge_predicate.arity, 3, "merge predicate m(prev,new,out) is always 3-ary");
        Ok(MergeSpec {
            key_columns,
            value_column,
            merge_predicate,
        })
    }

    pub fn key_of(&self, fact: &[Constant]) -> Vec<Constant> {
        self.key_columns.iter().map(|&c| fact[c].clone()).collect()
    }
}

/// The result of resolving the merge predicate against two competing
/// values (spec §4.7).
pub enum MergeOutcome {
    /// The merge predicate produced `out`; the winning row (the one
    /// whose original value column equals `out`, so its other payload
    /// columns are kept) with the value column rewritten to `out`.
    Merged(Vec<Constant>),
    /// The merge predicate had no solution: the two values are
    /// incomparable, both facts are retained.
    Incomparable,
}

/// Resolve `existing` and `incoming` (same key, same predicate) through
/// `spec.merge_predicate` via `solve`, which must behave like
/// [`crate::topdown::TopDownContext::solve`]: given a goal atom and a
/// mode vector, return every substitution that satisfies it.
pub fn merge_fact(
    spec: &MergeSpec,
    existing: &[Constant],
    incoming: &[Constant],
    solve: &dyn Fn(&Atom, &[Mode], &Subst) -> EvalResult<Vec<Subst>>,
) -> EvalResult<MergeOutcome> {
    let out_var = Variable::new("$merge_out");
    let goal = Atom::new(
        spec.merge_predicate.clone(),
        vec![
            Term::Const(existing[spec.value_column].clone()),
            Term::Const(incoming[spec.value_column].clone()),
            Term::Var(out_var.clone()),
        ],
    );
    let modes = [Mode::In, Mode::In, Mode::Out];
    let solutions = solve(&goal, &modes, &Subst::new())?;
    let Some(subst) = solutions.into_iter().next() else {
        return Ok(MergeOutcome::Incomparable);
    };
    let Term::Const(out) = subst.resolve(&Term::Var(out_var)) else {
        return Ok(MergeOutcome::Incomparable);
    };
    let winner = if existing[spec.value_column] == out { existing } else { incoming };
    let mut merged = winner.to_vec();
    merged[spec.value_column] = out;
    Ok(MergeOutcome::Merged(merged))
}
