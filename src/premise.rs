//! Premise evaluation (spec §4.3): the five kinds of literal that can
//! appear in a rule body — positive atom, negated atom, equality,
//! inequality, and temporal literal — each producing zero or more
//! extended substitutions from one incoming substitution.
//!
//! Builtin predicates (§4.4) are dispatched from [`Premise::Positive`]:
//! a positive atom whose predicate name [`crate::builtins::is_builtin_name`]
//! recognizes is decided rather than looked up in a fact store.

use crate::builtins;
use crate::error::EvalResult;
use crate::external::ExternalRegistry;
use crate::store::{FactStore, Pattern};
use crate::subst::Subst;
use crate::temporal_eval::{self, TemporalLiteral};
use crate::term::{Atom, Constant, Term};
use crate::unify::unify_terms;

#[derive(Debug, Clone)]
pub enum Premise {
    Positive(Atom),
    Negated(Atom),
    Equality(Term, Term),
    Inequality(Term, Term),
    Temporal(TemporalLiteral),
}

fn pattern_of(atom: &Atom, subst: &Subst) -> Vec<Option<Constant>> {
    atom.args
        .iter()
        .map(|t| match subst.resolve(t) {
            Term::Const(c) => Some(c),
            Term::Var(_) => None,
        })
        .collect()
}

fn evaluate_builtin(atom: &Atom, subst: &Subst) -> EvalResult<Vec<Subst>> {
    let resolved = subst.resolve_all(&atom.args);
    let args: Option<Vec<Constant>> = resolved.iter().map(|t| t.as_const().cloned()).collect();
    let Some(args) = args else {
        return Ok(Vec::new());
    };
    Ok(match builtins::decide(&atom.predicate, &args)? {
        Some(true) => vec![subst.clone()],
        _ => Vec::new(),
    })
}

fn evaluate_positive(atom: &Atom, store: &dyn FactStore, subst: &Subst) -> EvalResult<Vec<Subst>> {
    let pattern = pattern_of(atom, subst);
    let pattern_refs: Vec<Option<&Constant>> = pattern.iter().map(Option::as_ref).collect();
    let facts = store.query(&pattern_refs as &Pattern<'_>);
    let mut out = Vec::with_capacity(facts.len());
    for fact in facts {
        let fact_terms: Vec<Term> = fact.into_iter().map(Term::Const).collect();
        if let Some(extended) = unify_terms(&atom.args, &fact_terms, subst) {
            out.push(extended);
        }
    }
    Ok(out)
}

fn evaluate_negated(atom: &Atom, store: &dyn FactStore, subst: &Subst) -> EvalResult<Vec<Subst>> {
    // Stratified negation requires the negated atom to be fully ground by
    // the time it's evaluated (spec §4.3); callers schedule premises so
    // this always holds for a well-stratified program.
    let resolved: Vec<Constant> = subst
        .resolve_all(&atom.args)
        .into_iter()
        .filter_map(|t| t.as_const().cloned())
        .collect();
    if resolved.len() != atom.args.len() {
        return Ok(Vec::new());
    }
    Ok(if store.contains(&resolved) {
        Vec::new()
    } else {
        vec![subst.clone()]
    })
}

fn evaluate_equality(a: &Term, b: &Term, subst: &Subst) -> Vec<Subst> {
    crate::unify::unify_term(a, b, subst).into_iter().collect()
}

fn evaluate_inequality(a: &Term, b: &Term, subst: &Subst) -> Vec<Subst> {
    match (subst.resolve(a), subst.resolve(b)) {
        (Term::Const(x), Term::Const(y)) if x != y => vec![subst.clone()],
        (Term::Const(_), Term::Const(_)) => Vec::new(),
        // Either side still unbound: inequality can't be decided yet.
        _ => Vec::new(),
    }
}

/// Evaluate one premise against `subst`. `store` is the fact store for
/// the premise's predicate when it's a [`Premise::Positive`] or
/// [`Premise::Negated`] atom; `temporal_store` backs
/// [`Premise::Temporal`]. Neither is consulted for the other variants.
///
/// `externals` is consulted for a [`Premise::Positive`] atom alongside
/// (not instead of) its store, since an external predicate may have no
/// store at all (spec §4.5) — results from both are unioned.
///
/// `deferred` is asked first, for both atom variants: it models a
/// predicate dispatched through the top-down query context rather than
/// any stratum's store (spec §4.5/§4.6). `Ok(Some(_))` short-circuits
/// the rest of this function; `Ok(None)` means "not deferred, evaluate
/// normally."
pub fn evaluate(
    premise: &Premise,
    store: Option<&dyn FactStore>,
    temporal_store: Option<&crate::store::temporal::TemporalFactStore>,
    externals: &ExternalRegistry,
    deferred: &dyn Fn(&Premise, &Subst) -> EvalResult<Option<Vec<Subst>>>,
    subst: &Subst,
    eval_time: i64,
) -> EvalResult<Vec<Subst>> {
    match premise {
        Premise::Positive(atom) => {
            if builtins::is_builtin_name(&atom.predicate.name) {
                return evaluate_builtin(atom, subst);
            }
            if let Some(results) = deferred(premise, subst)? {
                return Ok(results);
            }
            let mut out = match store {
                Some(s) => evaluate_positive(atom, s, subst)?,
                None => Vec::new(),
            };
            if let Some(results) = externals.evaluate(atom, subst)? {
                out.extend(results);
            }
            Ok(out)
        }
        Premise::Negated(atom) => {
            if let Some(results) = deferred(premise, subst)? {
                return Ok(results);
            }
            let store = store.expect("negated atom premise requires a fact store");
            evaluate_negated(atom, store, subst)
        }
        Premise::Equality(a, b) => Ok(evaluate_equality(a, b, subst)),
        Premise::Inequality(a, b) => Ok(evaluate_inequality(a, b, subst)),
        Premise::Temporal(lit) => {
            let temporal_store = temporal_store.expect("temporal premise requires a temporal store");
            temporal_eval::evaluate(lit, temporal_store, subst, eval_time)
        }
    }
}

/// A `deferred` callback that never defers, for call sites with no
/// deferred predicates in scope (tests, top-down's own store lookups).
pub fn no_deferred(_premise: &Premise, _subst: &Subst) -> EvalResult<Option<Vec<Subst>>> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::simple::SimpleStore;
    use crate::store::WritableStore;
    use crate::term::{PredicateSym, Variable};

    #[test]
    fn positive_atom_binds_from_store() {
        let mut store = SimpleStore::new(2);
        store.insert(vec![Constant::Number(1), Constant::Number(2)]);
        let atom = Atom::new(
            PredicateSym::new("edge", 2),
            vec![Term::Var(Variable::new("X")), Term::Const(Constant::Number(2))],
        );
        let results = evaluate_positive(&atom, &store, &Subst::new()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].resolve(&Term::Var(Variable::new("X"))),
            Term::Const(Constant::Number(1))
        );
    }

    #[test]
    fn negated_atom_requires_ground_args() {
        let store = SimpleStore::new(1);
        let atom = Atom::new(
            PredicateSym::new("banned", 1),
            vec![Term::Var(Variable::new("X"))],
        );
        assert!(evaluate_negated(&atom, &store, &Subst::new()).unwrap().is_empty());
    }

    #[test]
    fn negated_atom_succeeds_when_absent() {
        let store = SimpleStore::new(1);
        let atom = Atom::new(
            PredicateSym::new("banned", 1),
            vec![Term::Const(Constant::Number(1))],
        );
        assert_eq!(evaluate_negated(&atom, &store, &Subst::new()).unwrap().len(), 1);
    }

    #[test]
    fn inequality_requires_both_ground() {
        let x = Term::Var(Variable::new("X"));
        let one = Term::Const(Constant::Number(1));
        assert!(evaluate_inequality(&x, &one, &Subst::new()).is_empty());
        assert_eq!(
            evaluate_inequality(&one, &Term::Const(Constant::Number(2)), &Subst::new()).len(),
            1
        );
    }
}
