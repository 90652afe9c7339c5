//! # Unifier
//!
//! First-order unification of term sequences against a [`Subst`].
//! Occurs-check is deliberately not performed: every term that reaches
//! unification during evaluation is either a constant (built-in
//! arguments are pre-evaluated before they get here) or a variable, so
//! no unification ever has to walk into a term containing itself.
//!
//! "Cannot unify" is not an error — per spec §4.1 it simply yields no
//! extended substitution, so every function here returns `Option<Subst>`
//! rather than `Result`.

use crate::subst::Subst;
use crate::term::Term;

/// Unify two terms under `subst`. Constants unify iff structurally equal;
/// a variable unifies with anything, adding a binding; the wildcard `_`
/// unifies with anything and never binds.
pub fn unify_term(a: &Term, b: &Term, subst: &Subst) -> Option<Subst> {
    let ra = subst.resolve(a);
    let rb = subst.resolve(b);
    match (&ra, &rb) {
        (Term::Const(ca), Term::Const(cb)) => {
            if ca == cb {
                Some(subst.clone())
            } else {
                None
            }
        }
        (Term::Var(v), _) if v.is_wildcard() => Some(subst.clone()),
        (_, Term::Var(v)) if v.is_wildcard() => Some(subst.clone()),
        (Term::Var(v), _) => Some(subst.extend(v.clone(), rb)),
        (_, Term::Var(v)) => Some(subst.extend(v.clone(), ra)),
    }
}

/// Unify two equal-length term sequences left to right, threading the
/// substitution through each position. Fails (returns `None`) as soon as
/// any position fails, or if the sequences differ in length.
pub fn unify_terms(l: &[Term], r: &[Term], subst: &Subst) -> Option<Subst> {
    if l.len() != r.len() {
        return None;
    }
    let mut current = subst.clone();
    for (a, b) in l.iter().zip(r.iter()) {
        current = unify_term(a, b, &current)?;
    }
    Some(current)
}
