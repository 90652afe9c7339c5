//! Delta-rule synthesis and application (spec §4.5). Semi-naive
//! evaluation only re-derives facts that couldn't have been derived
//! before: for each clause, for each position holding a positive atom
//! over a predicate in the current stratum, build a "delta variant"
//! where that one position reads the *delta* store (facts new last
//! round) and every other stratum-predicate position reads the *full*
//! store (everything derived so far). Summing over all variants is
//! exactly the set of facts that became newly derivable because of last
//! round's additions.

use crate::builtins::is_builtin_name;
use crate::engine::ProgramInfo;
use crate::error::EvalResult;
use crate::external::ExternalRegistry;
use crate::functional::DefaultFunctionalEvaluator;
use crate::premise::Premise;
use crate::store::temporal::TemporalFactStore;
use crate::store::FactStore;
use crate::subst::Subst;
use crate::term::{Atom, Mode, PredicateSym, Term};
use crate::topdown::{Clause, TopDownContext};
use std::collections::HashSet;

/// The body positions of `clause` whose positive atom belongs to
/// `stratum` — the positions a delta variant can pivot on.
pub fn recursive_positions(clause: &Clause, stratum: &HashSet<PredicateSym>) -> Vec<usize> {
    clause
        .body
        .iter()
        .enumerate()
        .filter_map(|(i, premise)| match premise {
            Premise::Positive(atom) if stratum.contains(&atom.predicate) => Some(i),
            _ => None,
        })
        .collect()
}

/// Builds the `deferred` callback [`crate::premise::evaluate`] consults
/// before touching any store: a predicate declared `deferred` (spec
/// §4.5) is dispatched through a fresh [`TopDownContext`] built from the
/// same store lookups as the surrounding evaluation, with its declared
/// mode vector enforced. Everything else falls through (`Ok(None)`).
pub(crate) fn deferred_dispatch<'a>(
    program: &'a ProgramInfo,
    full_store_for: &'a dyn Fn(&PredicateSym) -> Option<&'a dyn FactStore>,
    temporal_store_for: &'a dyn Fn(&PredicateSym) -> Option<&'a TemporalFactStore>,
    eval_time: i64,
    max_depth: usize,
) -> impl Fn(&Premise, &Subst) -> EvalResult<Option<Vec<Subst>>> + 'a {
    move |premise, subst| {
        let atom = match premise {
            Premise::Positive(atom) => atom,
            Premise::Negated(atom) => atom,
            _ => return Ok(None),
        };
        let Some(decl) = program.declarations.get(&atom.predicate) else {
            return Ok(None);
        };
        if !decl.deferred {
            return Ok(None);
        }
        let clauses_for = |p: &PredicateSym| program.clauses_for(p);
        let ctx = TopDownContext::new(&clauses_for, full_store_for, temporal_store_for, eval_time, max_depth);
        match premise {
            Premise::Positive(_) => Ok(Some(ctx.solve(atom, &decl.modes, subst)?)),
            Premise::Negated(_) => {
                let resolved = subst.resolve_all(&atom.args);
                let ground: Option<Vec<_>> = resolved.iter().map(|t| t.as_const().cloned()).collect();
                let Some(ground) = ground else {
                    return Ok(Some(Vec::new()));
                };
                let ground_atom = Atom::new(atom.predicate.clone(), ground.into_iter().map(Term::Const).collect());
                let all_in = vec![Mode::In; decl.modes.len()];
                let results = ctx.solve(&ground_atom, &all_in, &Subst::new())?;
                Ok(Some(if results.is_empty() { vec![subst.clone()] } else { Vec::new() }))
            }
            _ => unreachable!(),
        }
    }
}

/// Evaluate `clause`'s body left to right. `delta_position`, when set,
/// is the one body position read from `delta_store_for` instead of
/// `full_store_for`; `None` means a plain naive (round-1) evaluation.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_clause_variant(
    program: &ProgramInfo,
    clause: &Clause,
    delta_position: Option<usize>,
    full_store_for: &dyn Fn(&PredicateSym) -> Option<&dyn FactStore>,
    delta_store_for: &dyn Fn(&PredicateSym) -> Option<&dyn FactStore>,
    temporal_store_for: &dyn Fn(&PredicateSym) -> Option<&TemporalFactStore>,
    externals: &ExternalRegistry,
    eval_time: i64,
    max_topdown_depth: usize,
) -> EvalResult<Vec<Subst>> {
    let deferred = deferred_dispatch(program, full_store_for, temporal_store_for, eval_time, max_topdown_depth);
    let mut frontier = vec![Subst::new()];
    for (i, premise) in clause.body.iter().enumerate() {
        if frontier.is_empty() {
            break;
        }
        let predicate = match premise {
            Premise::Positive(atom) if !is_builtin_name(&atom.predicate.name) => {
                Some(&atom.predicate)
            }
            Premise::Negated(atom) => Some(&atom.predicate),
            _ => None,
        };
        let store = predicate.and_then(|p| {
            if delta_position == Some(i) {
                delta_store_for(p)
            } else {
                full_store_for(p)
            }
        });
        let temporal = match premise {
            Premise::Temporal(lit) => temporal_store_for(&lit.atom.predicate),
            _ => None,
        };

        let mut next = Vec::new();
        for subst in &frontier {
            next.extend(crate::premise::evaluate(
                premise, store, temporal, externals, &deferred, subst, eval_time,
            )?);
        }
        frontier = next;
    }
    if frontier.is_empty() || clause.transform.is_empty() {
        return Ok(frontier);
    }
    crate::transform::apply_all(&clause.transform, &DefaultFunctionalEvaluator, frontier)
}
