//! A naive reference evaluator: each stratum is brought to a fixpoint
//! by repeatedly evaluating every clause in the stratum against the
//! full stores and inserting whatever comes out, stopping only when a
//! full pass adds nothing. No delta bookkeeping — this exists to be
//! checked against [`crate::engine::bottom_up::eval_program`] for
//! semi-naive/naive equivalence, not to be fast.

use super::{EvalOptions, ProgramInfo};
use crate::cancel::CancelToken;
use crate::engine::bottom_up::{upsert, StoreMap, TemporalStoreMap};
use crate::engine::delta::deferred_dispatch;
use crate::error::{EvalError, EvalResult};
use crate::external::ExternalRegistry;
use crate::functional::DefaultFunctionalEvaluator;
use crate::premise::evaluate;
use crate::store::FactStore;
use crate::subst::Subst;
use crate::term::{Constant, PredicateSym};

#[allow(clippy::too_many_arguments)]
fn evaluate_clause_naive(
    program: &ProgramInfo,
    clause: &crate::topdown::Clause,
    store_for: &dyn Fn(&PredicateSym) -> Option<&dyn FactStore>,
    temporal_store_for: &dyn Fn(&PredicateSym) -> Option<&crate::store::temporal::TemporalFactStore>,
    externals: &ExternalRegistry,
    eval_time: i64,
    max_topdown_depth: usize,
) -> EvalResult<Vec<Subst>> {
    let deferred = deferred_dispatch(program, store_for, temporal_store_for, eval_time, max_topdown_depth);
    let mut frontier = vec![Subst::new()];
    for premise in &clause.body {
        if frontier.is_empty() {
            break;
        }
        let predicate = match premise {
            crate::premise::Premise::Positive(atom)
                if !crate::builtins::is_builtin_name(&atom.predicate.name) =>
            {
                Some(&atom.predicate)
            }
            crate::premise::Premise::Negated(atom) => Some(&atom.predicate),
            _ => None,
        };
        let store = predicate.and_then(|p| store_for(p));
        let temporal = match premise {
            crate::premise::Premise::Temporal(lit) => temporal_store_for(&lit.atom.predicate),
            _ => None,
        };
        let mut next = Vec::new();
        for subst in &frontier {
            next.extend(evaluate(premise, store, temporal, externals, &deferred, subst, eval_time)?);
        }
        frontier = next;
    }
    if frontier.is_empty() || clause.transform.is_empty() {
        return Ok(frontier);
    }
    crate::transform::apply_all(&clause.transform, &DefaultFunctionalEvaluator, frontier)
}

/// Evaluate every stratum of `program` to a naive fixpoint. Same
/// contract as [`crate::engine::bottom_up::eval_program`] minus the
/// statistics (a naive pass's round count is not meaningful to report
/// since it is always exactly "until nothing changes").
pub fn eval_program(
    program: &ProgramInfo,
    stores: &mut StoreMap,
    temporal_stores: &TemporalStoreMap,
    externals: &ExternalRegistry,
    options: &EvalOptions,
    cancel: &CancelToken,
) -> EvalResult<()> {
    for (predicate, declaration) in &program.declarations {
        stores
            .entry(predicate.clone())
            .or_insert_with(|| declaration.index_strategy.build(predicate.arity));
    }

    let mut total_created = 0usize;

    for stratum in &program.strata {
        cancel.check()?;
        let clauses: Vec<_> = stratum.iter().flat_map(|p| program.clauses_for(p)).collect();

        loop {
            cancel.check()?;
            let mut changed = false;

            for clause in &clauses {
                if externals.get(&clause.head.predicate).is_some() {
                    return Err(EvalError::InvalidExternalRegistration {
                        predicate: clause.head.predicate.clone(),
                        reason: "a predicate with rules cannot also be external".into(),
                    });
                }
                let store_for =
                    |p: &PredicateSym| stores.get(p).map(|s| s.as_ref() as &dyn FactStore);
                let temporal_for = |p: &PredicateSym| temporal_stores.get(p);

                let substs = evaluate_clause_naive(
                    program,
                    clause,
                    &store_for,
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
                        changed = true;
                        total_created += 1;
                        if total_created > options.limits.max_created_facts {
                            return Err(EvalError::CreatedFactLimitExceeded {
                                predicate: clause.head.predicate.clone(),
                                created: total_created,
                                limit: options.limits.max_created_facts,
                            });
                        }
                    }
                }
            }

            if !changed {
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use crate::engine::bottom_up::{StoreMap, TemporalStoreMap};
    use crate::engine::{Declaration, IndexStrategy};
    use crate::premise::Premise;
    use crate::store::simple::SimpleStore;
    use crate::store::WritableStore;
    use crate::term::{Atom, Term, Variable};
    use crate::topdown::Clause;
    use std::collections::HashMap;

    #[test]
    fn naive_reaches_same_fixpoint_as_semi_naive() {
        let edge = PredicateSym::new("edge", 2);
        let path = PredicateSym::new("path", 2);
        let mut program = ProgramInfo::new();
        program.declare(Declaration::new(edge.clone()));
        program.declare(Declaration::new(path.clone()));
        program.add_clause(Clause::new(
            Atom::new(path.clone(), vec![Term::Var(Variable::new("X")), Term::Var(Variable::new("Y"))]),
            vec![Premise::Positive(Atom::new(
                edge.clone(),
                vec![Term::Var(Variable::new("X")), Term::Var(Variable::new("Y"))],
            ))],
        ));
        program.add_clause(Clause::new(
            Atom::new(path.clone(), vec![Term::Var(Variable::new("X")), Term::Var(Variable::new("Z"))]),
            vec![
                Premise::Positive(Atom::new(path.clone(), vec![Term::Var(Variable::new("X")), Term::Var(Variable::new("Y"))])),
                Premise::Positive(Atom::new(edge.clone(), vec![Term::Var(Variable::new("Y")), Term::Var(Variable::new("Z"))])),
            ],
        ));
        program.strata = vec![vec![edge.clone()], vec![path.clone()]];

        let mut naive_stores: StoreMap = HashMap::new();
        let mut edge_store = SimpleStore::new(2);
        for (a, b) in [(1, 2), (2, 3), (3, 4)] {
            edge_store.insert(vec![Constant::Number(a), Constant::Number(b)]);
        }
        naive_stores.insert(edge.clone(), Box::new(edge_store));

        let mut semi_stores: StoreMap = HashMap::new();
        let mut edge_store2 = SimpleStore::new(2);
        for (a, b) in [(1, 2), (2, 3), (3, 4)] {
            edge_store2.insert(vec![Constant::Number(a), Constant::Number(b)]);
        }
        semi_stores.insert(edge.clone(), Box::new(edge_store2));

        let externals = ExternalRegistry::new();
        let options = EvalOptions {
            limits: LimitsConfig::default(),
            eval_time: 0,
        };
        let cancel = CancelToken::new();
        let temporal_stores = TemporalStoreMap::new();

        eval_program(&program, &mut naive_stores, &temporal_stores, &externals, &options, &cancel).unwrap();
        crate::engine::bottom_up::eval_program(
            &program,
            &mut semi_stores,
            &temporal_stores,
            &externals,
            &options,
            &cancel,
        )
        .unwrap();

        let naive_path = naive_stores.get(&path).unwrap();
        let semi_path = semi_stores.get(&path).unwrap();
        assert_eq!(naive_path.len(), semi_path.len());
        assert_eq!(naive_path.len(), 6);
        for fact in naive_path.all() {
            assert!(semi_path.contains(&fact));
        }
    }
}
