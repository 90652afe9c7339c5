//! LET-transform and DO-transform (spec §4.9).
//!
//! A LET-transform binds a variable to a [`FuncExpr`]'s value in every
//! substitution produced so far. A DO-transform groups the substitutions
//! produced by the rule body so far by a set of key variables, reduces
//! each group with an [`AggregateFn`], and emits one substitution per
//! group with the aggregate result bound to a fresh variable.

use crate::error::EvalResult;
use crate::functional::{apply_aggregate, AggregateFn, FuncExpr, FunctionalEvaluator};
use crate::subst::Subst;
use crate::term::{Term, Variable};
use std::collections::HashMap;

/// A transform attached to a clause, applied to the frontier of body
/// substitutions before the head is resolved (spec §4.9).
#[derive(Debug, Clone)]
pub enum ClauseTransform {
    Let {
        target: Variable,
        expr: FuncExpr,
    },
    /// `do group_by(group_vars), let T1=f1(P1), let T2=f2(P2), ...` — one
    /// grouping pass producing every aggregate in `reductions` together,
    /// since they're all reduced over the same groups (spec §8 scenario
    /// 3 binds `Count`, `Sum`, and `Max` out of a single `group_by`).
    Do {
        group_vars: Vec<Variable>,
        reductions: Vec<(Variable, AggregateFn, Variable)>,
    },
}

impl ClauseTransform {
    pub fn apply(
        &self,
        evaluator: &dyn FunctionalEvaluator,
        substs: Vec<Subst>,
    ) -> EvalResult<Vec<Subst>> {
        match self {
            ClauseTransform::Let { target, expr } => apply_let(target, expr, evaluator, substs),
            ClauseTransform::Do {
                group_vars,
                reductions,
            } => apply_do(group_vars, reductions, substs),
        }
    }
}

/// Apply a sequence of transforms in order, each consuming the previous
/// one's output frontier.
pub fn apply_all(
    transforms: &[ClauseTransform],
    evaluator: &dyn FunctionalEvaluator,
    mut substs: Vec<Subst>,
) -> EvalResult<Vec<Subst>> {
    for transform in transforms {
        substs = transform.apply(evaluator, substs)?;
    }
    Ok(substs)
}

/// Bind `target := expr` in every incoming substitution.
pub fn apply_let(
    target: &Variable,
    expr: &FuncExpr,
    evaluator: &dyn FunctionalEvaluator,
    substs: Vec<Subst>,
) -> EvalResult<Vec<Subst>> {
    substs
        .into_iter()
        .map(|s| {
            let value = evaluator.eval(expr, &s)?;
            Ok(s.extend(target.clone(), Term::Const(value)))
        })
        .collect()
}

/// Group `substs` by the ground values of `group_vars`, reduce each
/// group's rows once per `(project, func, target)` in `reductions`, and
/// bind every result into one representative substitution per group
/// (the first substitution seen for that key — per spec §4.9, a
/// DO-transform only ever exposes the group key variables and the
/// aggregate results to the rest of the rule).
pub fn apply_do(
    group_vars: &[Variable],
    reductions: &[(Variable, AggregateFn, Variable)],
    substs: Vec<Subst>,
) -> EvalResult<Vec<Subst>> {
    let mut groups: HashMap<Vec<crate::term::Constant>, (Subst, Vec<Subst>)> = HashMap::new();

    for s in substs {
        let Some(key) = s.as_const_list(group_vars) else {
            continue;
        };
        let key_values: Vec<_> = key.into_iter().map(|(_, c)| c).collect();
        let entry = groups
            .entry(key_values)
            .or_insert_with(|| (s.clone(), Vec::new()));
        entry.1.push(s);
    }

    groups
        .into_values()
        .map(|(mut representative, rows)| {
            for (project, func, target) in reductions {
                let values: Vec<crate::term::Constant> = rows
                    .iter()
                    .filter_map(|s| match s.resolve(&Term::Var(project.clone())) {
                        Term::Const(c) => Some(c),
                        Term::Var(_) => None,
                    })
                    .collect();
                let aggregate = apply_aggregate(*func, &values)?;
                representative = representative.extend(target.clone(), Term::Const(aggregate));
            }
            Ok(representative)
        })
        .collect()
}
