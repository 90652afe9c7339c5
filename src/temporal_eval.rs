//! Metric-temporal-logic modal operators over the [`TemporalFactStore`]
//! (spec §4.8): `◇⁻`/`□⁻` (sometime/always in the past window), `◇⁺`/`□⁺`
//! (sometime/always in the future window), and the bare temporal literal
//! (holds at the current evaluation instant).
//!
//! Because [`crate::interval::coalesce`] keeps each key's intervals
//! maximal and non-overlapping, `□` reduces to "one stored interval
//! contains the whole query window" and `◇` reduces to "some stored
//! interval overlaps the query window" — no need to walk and union a set
//! of overlapping intervals at query time.

use crate::error::{EvalError, EvalResult};
use crate::interval::{Interval, ResolvedInterval, TemporalBound};
use crate::store::temporal::TemporalFactStore;
use crate::subst::Subst;
use crate::term::{Atom, Constant, Term};
use crate::unify::unify_terms;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalOp {
    DiamondPast,
    BoxPast,
    DiamondFuture,
    BoxFuture,
}

/// A temporal literal appearing in a rule body. `op = None` is the bare
/// literal: "`atom` holds at the evaluation instant".
#[derive(Debug, Clone)]
pub struct TemporalLiteral {
    pub op: Option<ModalOp>,
    pub atom: Atom,
    pub window: Interval,
}

fn resolve_bound(
    bound: &TemporalBound,
    eval_time: i64,
    subst: &Subst,
) -> Option<i64> {
    match bound {
        TemporalBound::Timestamp(t) => Some(*t),
        TemporalBound::Duration(d) => Some(eval_time + d),
        TemporalBound::NegativeInfinity => Some(i64::MIN),
        TemporalBound::PositiveInfinity => Some(i64::MAX),
        TemporalBound::NowPlaceholder => Some(eval_time),
        TemporalBound::VariableBound(v) => match subst.resolve(&Term::Var(v.clone())) {
            Term::Const(Constant::Time(t)) => Some(t),
            _ => None,
        },
    }
}

/// Resolve a literal's window to `[qs, qe]`. Returns `None` (not an
/// error) if a variable bound is still unresolved — the literal then
/// simply contributes no solutions this round, since it may become
/// resolvable once its variable is bound by a later premise in a
/// different join order.
fn resolve_window(window: &Interval, eval_time: i64, subst: &Subst) -> Option<(i64, i64)> {
    let qs = resolve_bound(&window.start, eval_time, subst)?;
    let qe = resolve_bound(&window.end, eval_time, subst)?;
    Some((qs, qe))
}

/// Resolve a rule head's output interval. Unlike [`resolve_window`], an
/// unresolved variable bound here is a hard error (spec §7): the head
/// fact cannot be stored without a concrete validity interval.
pub fn resolve_head_interval(
    window: &Interval,
    eval_time: i64,
    subst: &Subst,
    predicate: &crate::term::PredicateSym,
) -> EvalResult<ResolvedInterval> {
    let describe = |bound: &TemporalBound| -> EvalResult<i64> {
        resolve_bound(bound, eval_time, subst).ok_or_else(|| {
            let variable = match bound {
                TemporalBound::VariableBound(v) => v.to_string(),
                _ => "<bound>".to_string(),
            };
            EvalError::UnresolvedTemporalVariable {
                predicate: predicate.clone(),
                variable,
            }
        })
    };
    Ok(ResolvedInterval::new(
        describe(&window.start)?,
        describe(&window.end)?,
    ))
}

fn resolve_pattern(atom: &Atom, subst: &Subst) -> Vec<Option<Constant>> {
    atom.args
        .iter()
        .map(|t| match subst.resolve(t) {
            Term::Const(c) => Some(c),
            Term::Var(_) => None,
        })
        .collect()
}

fn candidates(
    store: &TemporalFactStore,
    pattern: &[Option<Constant>],
    qs: i64,
    qe: i64,
) -> Vec<(Vec<Constant>, ResolvedInterval)> {
    if pattern.iter().all(Option::is_some) {
        let key: Vec<Constant> = pattern.iter().map(|o| o.clone().unwrap()).collect();
        store
            .intervals_in_range(&key, qs, qe)
            .into_iter()
            .map(|iv| (key.clone(), iv))
            .collect()
    } else {
        store
            .all_in_range(qs, qe)
            .into_iter()
            .filter(|(key, _)| {
                pattern
                    .iter()
                    .zip(key)
                    .all(|(p, k)| p.as_ref().map_or(true, |pc| pc == k))
            })
            .collect()
    }
}

/// Evaluate a temporal literal against `subst`, returning one extended
/// substitution per qualifying candidate (binding any previously-unbound
/// atom arguments to the matched key).
pub fn evaluate(
    lit: &TemporalLiteral,
    store: &TemporalFactStore,
    subst: &Subst,
    eval_time: i64,
) -> EvalResult<Vec<Subst>> {
    let Some((qs, qe)) = resolve_window(&lit.window, eval_time, subst) else {
        return Ok(Vec::new());
    };
    let pattern = resolve_pattern(&lit.atom, subst);
    let qualifies = |interval: &ResolvedInterval| -> bool {
        match lit.op {
            None => interval.contains_point(eval_time.clamp(qs, qe)) || interval.overlaps(&ResolvedInterval::new(qs, qe)),
            Some(ModalOp::DiamondPast) | Some(ModalOp::DiamondFuture) => {
                interval.overlaps(&ResolvedInterval::new(qs, qe))
            }
            Some(ModalOp::BoxPast) | Some(ModalOp::BoxFuture) => {
                interval.contains_interval(&ResolvedInterval::new(qs, qe))
            }
        }
    };

    let mut out = Vec::new();
    for (key, interval) in candidates(store, &pattern, qs, qe) {
        if !qualifies(&interval) {
            continue;
        }
        let key_terms: Vec<Term> = key.into_iter().map(Term::Const).collect();
        if let Some(extended) = unify_terms(&lit.atom.args, &key_terms, subst) {
            out.push(extended);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{PredicateSym, Variable};

    fn atom(var: &str) -> Atom {
        Atom::new(
            PredicateSym::new("logged_in", 1),
            vec![Term::Var(Variable::new(var))],
        )
    }

    #[test]
    fn bare_literal_checks_point_containment() {
        let mut store = TemporalFactStore::new(1, 100);
        let key = vec![Constant::string("alice")];
        store.insert(key, ResolvedInterval::new(0, 100)).unwrap();

        let lit = TemporalLiteral {
            op: None,
            atom: atom("X"),
            window: Interval {
                start: TemporalBound::NowPlaceholder,
                end: TemporalBound::NowPlaceholder,
            },
        };
        let results = evaluate(&lit, &store, &Subst::new(), 50).unwrap();
        assert_eq!(results.len(), 1);

        let results = evaluate(&lit, &store, &Subst::new(), 500).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn diamond_past_finds_overlap_in_window() {
        let mut store = TemporalFactStore::new(1, 100);
        let key = vec![Constant::string("alice")];
        store.insert(key, ResolvedInterval::new(0, 10)).unwrap();

        let lit = TemporalLiteral {
            op: Some(ModalOp::DiamondPast),
            atom: atom("X"),
            window: Interval {
                start: TemporalBound::Duration(-1000),
                end: TemporalBound::NowPlaceholder,
            },
        };
        let results = evaluate(&lit, &store, &Subst::new(), 5).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn box_past_requires_full_coverage() {
        let mut store = TemporalFactStore::new(1, 100);
        let key = vec![Constant::string("alice")];
        store.insert(key, ResolvedInterval::new(0, 5)).unwrap();

        let lit = TemporalLiteral {
            op: Some(ModalOp::BoxPast),
            atom: atom("X"),
            window: Interval {
                start: TemporalBound::Timestamp(0),
                end: TemporalBound::Timestamp(10),
            },
        };
        assert!(evaluate(&lit, &store, &Subst::new(), 10).unwrap().is_empty());

        let lit_ok = TemporalLiteral {
            window: Interval {
                start: TemporalBound::Timestamp(1),
                end: TemporalBound::Timestamp(4),
            },
            ..lit
        };
        assert_eq!(evaluate(&lit_ok, &store, &Subst::new(), 10).unwrap().len(), 1);
    }

    #[test]
    fn unresolved_variable_bound_yields_no_solutions_not_error() {
        let store = TemporalFactStore::new(1, 100);
        let lit = TemporalLiteral {
            op: None,
            atom: atom("X"),
            window: Interval {
                start: TemporalBound::VariableBound(Variable::new("T")),
                end: TemporalBound::VariableBound(Variable::new("T")),
            },
        };
        assert!(evaluate(&lit, &store, &Subst::new(), 0).unwrap().is_empty());
    }

    #[test]
    fn head_interval_resolution_errors_on_unbound_variable() {
        let window = Interval {
            start: TemporalBound::VariableBound(Variable::new("T")),
            end: TemporalBound::NowPlaceholder,
        };
        let err = resolve_head_interval(&window, 0, &Subst::new(), &PredicateSym::new("p", 1));
        assert!(matches!(err, Err(EvalError::UnresolvedTemporalVariable { .. })));
    }
}
