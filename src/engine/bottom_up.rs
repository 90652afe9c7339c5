//! The stratified semi-naive bottom-up driver (spec §4 / §5).
//!
//! Strata are evaluated in order. Within a stratum: round 1 is a plain
//! naive join over every clause (correct because every stratum-local
//! store starts empty, so any clause referencing one only matches once
//! earlier rounds have populated it); rounds 2+ only re-run clauses that
//! have at least one positive atom over this stratum, pivoting the
//! delta-rule construction in [`crate::engine::delta`] on each such atom
//! in turn. The stratum is done when a round derives nothing new.

use super::{EvalOptions, ProgramInfo};
use crate::cancel::CancelToken;
use crate::engine::delta::{evaluate_clause_variant, recursive_positions};
use crate::error::{EvalError, EvalResult};
use crate::external::ExternalRegistry;
use crate::lattice::{merge_fact, MergeOutcome};
use crate::stats::{EvalStats, StratumStats};
use crate::store::temporal::TemporalFactStore;
use crate::store::{FactStore, RemovableStore, WritableStore};
use crate::subst::Subst;
use crate::term::{Atom, Constant, Mode, PredicateSym, Term};
use crate::topdown::{Clause, TopDownContext};
use crate::transform::ClauseTransform;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

pub type StoreMap = HashMap<PredicateSym, Box<dyn RemovableStore>>;
pub type TemporalStoreMap = HashMap<PredicateSym, TemporalFactStore>;

/// A clause is a DO-transform clause (spec §4.5) when its transform
/// chain contains a [`ClauseTransform::Do`]. Such a clause is evaluated
/// once after its stratum reaches a fixpoint, not folded into the
/// ordinary per-round join (see the post-fixpoint pass in
/// [`eval_program`]).
fn is_do_transform_clause(clause: &Clause) -> bool {
    clause.transform.iter().any(|t| matches!(t, ClauseTransform::Do { .. }))
}

/// Insert `args` into `stores[predicate]`, respecting that predicate's
/// merge spec and inclusion constraints. Returns `true` iff the store's
/// content actually changed (a plain new fact, or a merge that altered
/// the value column) — the signal semi-naive uses to grow `delta`.
///
/// A merge spec's `prev`/`new` resolution runs through a real Datalog
/// merge predicate (spec §4.7) via a freshly built [`TopDownContext`],
/// so this needs `temporal_stores`/`eval_time` alongside the stores it
/// mutates. External predicates play no part in merge resolution (spec
/// §4.5's hook is bottom-up only), so `upsert` takes no registry.
#[allow(clippy::too_many_arguments)]
pub(crate) fn upsert(
    program: &ProgramInfo,
    stores: &mut StoreMap,
    temporal_stores: &TemporalStoreMap,
    predicate: &PredicateSym,
    args: Vec<Constant>,
    eval_time: i64,
    max_topdown_depth: usize,
) -> EvalResult<bool> {
    if let Some(decl) = program.declarations.get(predicate) {
        if !decl.inclusion.is_empty() {
            let atom = Atom::new(
                predicate.clone(),
                args.iter().cloned().map(Term::Const).collect(),
            );
            let lookup = |p: &PredicateSym| stores.get(p).map(|s| s.as_ref() as &dyn FactStore);
            crate::inclusion::check_fact(&atom, &decl.inclusion, &lookup)?;
        }
        if let Some(merge) = decl.merge.clone() {
            let key = merge.key_of(&args);
            let key_pattern: Vec<Option<Constant>> = (0..args.len())
                .map(|c| {
                    if merge.key_columns.contains(&c) {
                        Some(key[merge.key_columns.iter().position(|&k| k == c).unwrap()].clone())
                    } else {
                        None
                    }
                })
                .collect();

            let existing_fact = {
                let store = stores
                    .get(predicate)
                    .expect("store must exist for a declared predicate");
                let pattern_refs: Vec<Option<&Constant>> = key_pattern.iter().map(Option::as_ref).collect();
                store.query(&pattern_refs).into_iter().next()
            };

            return Ok(match existing_fact {
                Some(existing_fact) => {
                    let clauses_for = |p: &PredicateSym| program.clauses_for(p);
                    let store_for = |p: &PredicateSym| stores.get(p).map(|s| s.as_ref() as &dyn FactStore);
                    let temporal_for = |p: &PredicateSym| temporal_stores.get(p);
                    let ctx = TopDownContext::new(&clauses_for, &store_for, &temporal_for, eval_time, max_topdown_depth);
                    let solve = |goal: &Atom, modes: &[Mode], subst: &Subst| ctx.solve(goal, modes, subst);
                    let outcome = merge_fact(&merge, &existing_fact, &args, &solve)?;
                    match outcome {
                        MergeOutcome::Merged(merged) if merged == existing_fact => false,
                        MergeOutcome::Merged(merged) => {
                            let store = stores
                                .get_mut(predicate)
                                .expect("store must exist for a declared predicate");
                            store.remove(&existing_fact);
                            store.insert(merged);
                            true
                        }
                        MergeOutcome::Incomparable => {
                            let store = stores
                                .get_mut(predicate)
                                .expect("store must exist for a declared predicate");
                            store.insert(args)
                        }
                    }
                }
                None => {
                    let store = stores
                        .get_mut(predicate)
                        .expect("store must exist for a declared predicate");
                    store.insert(args)
                }
            });
        }
    }
    let store = stores
        .get_mut(predicate)
        .expect("store must exist for a declared predicate");
    Ok(store.insert(args))
}

/// Evaluate every stratum of `program` in order, seeded by `stores`
/// (already populated with any extensional/base facts) and
/// `temporal_stores`. Mutates `stores` in place and returns collected
/// statistics.
pub fn eval_program(
    program: &ProgramInfo,
    stores: &mut StoreMap,
    temporal_stores: &TemporalStoreMap,
    externals: &ExternalRegistry,
    options: &EvalOptions,
    cancel: &CancelToken,
) -> EvalResult<EvalStats> {
    for (predicate, declaration) in &program.declarations {
        stores
            .entry(predicate.clone())
            .or_insert_with(|| declaration.index_strategy.build(predicate.arity));
    }

    let mut stats = EvalStats::default();
    let mut total_created = 0usize;

    for stratum in &program.strata {
        cancel.check()?;
        let started = Instant::now();
        let stratum_set: HashSet<PredicateSym> = stratum.iter().cloned().collect();
        let all_clauses: Vec<_> = stratum.iter().flat_map(|p| program.clauses_for(p)).collect();
        let (do_clauses, clauses): (Vec<_>, Vec<_>) =
            all_clauses.into_iter().partition(|c| is_do_transform_clause(c));

        let mut delta_stores: StoreMap = stratum
            .iter()
            .map(|p| (p.clone(), crate::engine::IndexStrategy::Simple.build(p.arity)))
            .collect();

        let mut round = 0usize;
        let mut stratum_derived = 0usize;
        loop {
            cancel.check()?;
            round += 1;
            if round > options.limits.max_rounds_per_stratum {
                return Err(EvalError::CreatedFactLimitExceeded {
                    predicate: stratum[0].clone(),
                    created: total_created,
                    limit: options.limits.max_created_facts,
                });
            }

            let mut new_delta: HashMap<PredicateSym, Vec<Vec<Constant>>> =
                stratum.iter().map(|p| (p.clone(), Vec::new())).collect();

            for clause in &clauses {
                if externals.get(&clause.head.predicate).is_some() {
                    return Err(EvalError::InvalidExternalRegistration {
                        predicate: clause.head.predicate.clone(),
                        reason: "a predicate with rules cannot also be external".into(),
                    });
                }
                let recursive = recursive_positions(clause, &stratum_set);
                if round > 1 && recursive.is_empty() {
                    continue;
                }
                let variants: Vec<Option<usize>> = if round == 1 {
                    vec![None]
                } else {
                    recursive.iter().map(|&i| Some(i)).collect()
                };

                for variant in variants {
                    let full_for =
                        |p: &PredicateSym| stores.get(p).map(|s| s.as_ref() as &dyn FactStore);
                    let delta_for = |p: &PredicateSym| {
                        delta_stores.get(p).map(|s| s.as_ref() as &dyn FactStore)
                    };
                    let temporal_for = |p: &PredicateSym| temporal_stores.get(p);

                    let substs = evaluate_clause_variant(
                        program,
                        clause,
                        variant,
                        &full_for,
                        &delta_for,
                        &temporal_for,
                        externals,
                        options.eval_time,
                        options.limits.max_topdown_depth,
                    )?;
                    if substs.len() > options.limits.max_intermediate_solutions {
                        return Err(EvalError::IntermediateSolutionLimitExceeded {
                            predicate: clause.head.predicate.clone(),
                            produced: substs.len(),
                            limit: options.limits.max_intermediate_solutions,
                        });
                    }

                    for subst in substs {
                        let resolved: Option<Vec<Constant>> = subst
                            .resolve_all(&clause.head.args)
                            .into_iter()
                            .map(|t| t.as_const().cloned())
                            .collect();
                        let Some(args) = resolved else { continue };

                        if stores
                            .get(&clause.head.predicate)
                            .is_some_and(|s| s.contains(&args))
                        {
                            continue;
                        }
                        if upsert(
                            program,
                            stores,
                            temporal_stores,
                            &clause.head.predicate,
                            args.clone(),
                            options.eval_time,
                            options.limits.max_topdown_depth,
                        )? {
                            total_created += 1;
                            if total_created > options.limits.max_created_facts {
                                return Err(EvalError::CreatedFactLimitExceeded {
                                    predicate: clause.head.predicate.clone(),
                                    created: total_created,
                                    limit: options.limits.max_created_facts,
                                });
                            }
                            new_delta
                                .get_mut(&clause.head.predicate)
                                .expect("delta bucket exists for every stratum predicate")
                                .push(args);
                        }
                    }
                }
            }

            let round_derived: usize = new_delta.values().map(Vec::len).sum();
            stratum_derived += round_derived;
            tracing::debug!(stratum = ?stratum, round, round_derived, "semi-naive round complete");
            if round_derived == 0 {
                break;
            }

            delta_stores = stratum
                .iter()
                .map(|p| (p.clone(), crate::engine::IndexStrategy::Simple.build(p.arity)))
                .collect();
            for (predicate, facts) in new_delta {
                let store = delta_stores
                    .get_mut(&predicate)
                    .expect("delta bucket exists for every stratum predicate");
                for fact in facts {
                    store.insert(fact);
                }
            }
        }

        // Post-fixpoint DO-transforms (spec §4.5): each such clause scans
        // its single body atom's facts once the stratum's ordinary join
        // has settled, then groups/aggregates — never re-run per round.
        for clause in &do_clauses {
            if externals.get(&clause.head.predicate).is_some() {
                return Err(EvalError::InvalidExternalRegistration {
                    predicate: clause.head.predicate.clone(),
                    reason: "a predicate with rules cannot also be external".into(),
                });
            }
            let full_for = |p: &PredicateSym| stores.get(p).map(|s| s.as_ref() as &dyn FactStore);
            let no_delta = |_: &PredicateSym| None;
            let temporal_for = |p: &PredicateSym| temporal_stores.get(p);

            let substs = evaluate_clause_variant(
                program,
                clause,
                None,
                &full_for,
                &no_delta,
                &temporal_for,
                externals,
                options.eval_time,
                options.limits.max_topdown_depth,
            )?;
            if substs.len() > options.limits.max_intermediate_solutions {
                return Err(EvalError::IntermediateSolutionLimitExceeded {
                    predicate: clause.head.predicate.clone(),
                    produced: substs.len(),
                    limit: options.limits.max_intermediate_solutions,
                });
            }
            for subst in substs {
                let resolved: Option<Vec<Constant>> = subst
                    .resolve_all(&clause.head.args)
                    .into_iter()
                    .map(|t| t.as_const().cloned())
                    .collect();
                let Some(args) = resolved else { continue };
                if stores
                    .get(&clause.head.predicate)
                    .is_some_and(|s| s.contains(&args))
                {
                    continue;
                }
                if upsert(
                    program,
                    stores,
                    temporal_stores,
                    &clause.head.predicate,
                    args,
                    options.eval_time,
                    options.limits.max_topdown_depth,
                )? {
                    total_created += 1;
                    if total_created > options.limits.max_created_facts {
                        return Err(EvalError::CreatedFactLimitExceeded {
                            predicate: clause.head.predicate.clone(),
                            created: total_created,
                            limit: options.limits.max_created_facts,
                        });
                    }
                    stratum_derived += 1;
                }
            }
        }

        stats.strata.push(StratumStats {
            predicates: stratum.clone(),
            rounds: round,
            facts_derived: stratum_derived,
            elapsed: started.elapsed(),
        });
    }

    Ok(stats)
}
