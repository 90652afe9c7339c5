//! Inclusion / type constraints (spec §4.10). A declaration can attach
//! one or more [`InclusionConstraint`]s to a predicate's columns; every
//! fact inserted for that predicate must satisfy all of them, or the
//! insert is rejected with [`crate::error::EvalError::InclusionCheckFailed`]
//! carrying one diagnostic string per failing constraint.

use crate::error::{EvalError, EvalResult};
use crate::store::FactStore;
use crate::term::{Atom, Constant, PredicateSym};

#[derive(Debug, Clone)]
pub enum InclusionConstraint {
    /// Column `column` must be a `Constant::Name`.
    IsName { column: usize },
    /// Column `column` must be a `Constant::Number`.
    IsNumber { column: usize },
    /// Column `column` must be one of the given constants.
    OneOf { column: usize, allowed: Vec<Constant> },
    /// Column `column`'s value must already appear as column
    /// `target_column` of some fact in `target`.
    MemberOf {
        column: usize,
        target: PredicateSym,
        target_column: usize,
    },
}

fn describe_failure(constraint: &InclusionConstraint, value: &Constant) -> String {
    match constraint {
        InclusionConstraint::IsName { column } => {
            format!("column {column} value {value} is not a name")
        }
        InclusionConstraint::IsNumber { column } => {
            format!("column {column} value {value} is not a number")
        }
        InclusionConstraint::OneOf { column, allowed } => format!(
            "column {column} value {value} is not one of {allowed:?}"
        ),
        InclusionConstraint::MemberOf {
            column,
            target,
            target_column,
        } => format!(
            "column {column} value {value} is not present in column {target_column} of {target}"
        ),
    }
}

fn satisfies(
    constraint: &InclusionConstraint,
    value: &Constant,
    lookup: &dyn Fn(&PredicateSym) -> Option<&dyn FactStore>,
) -> bool {
    match constraint {
        InclusionConstraint::IsName { .. } => matches!(value, Constant::Name(_)),
        InclusionConstraint::IsNumber { .. } => matches!(value, Constant::Number(_)),
        InclusionConstraint::OneOf { allowed, .. } => allowed.contains(value),
        InclusionConstraint::MemberOf {
            target,
            target_column,
            ..
        } => match lookup(target) {
            Some(store) => store
                .all()
                .iter()
                .any(|fact| fact.get(*target_column) == Some(value)),
            None => false,
        },
    }
}

fn column_of(constraint: &InclusionConstraint) -> usize {
    match constraint {
        InclusionConstraint::IsName { column }
        | InclusionConstraint::IsNumber { column }
        | InclusionConstraint::OneOf { column, .. }
        | InclusionConstraint::MemberOf { column, .. } => *column,
    }
}

/// Check `fact` against every constraint declared for its predicate.
/// `lookup` resolves a [`MemberOf`](InclusionConstraint::MemberOf)
/// constraint's target store; it is only called for that variant.
pub fn check_fact(
    fact: &Atom,
    constraints: &[InclusionConstraint],
    lookup: &dyn Fn(&PredicateSym) -> Option<&dyn FactStore>,
) -> EvalResult<()> {
    let values = fact.as_fact().expect("inclusion check requires a ground fact");
    let mut reasons = Vec::new();
    for constraint in constraints {
        let column = column_of(constraint);
        let Some(&value) = values.get(column) else {
            reasons.push(format!("column {column} out of range for arity {}", values.len()));
            continue;
        };
        if !satisfies(constraint, value, lookup) {
            reasons.push(describe_failure(constraint, value));
        }
    }
    if reasons.is_empty() {
        Ok(())
    } else {
        Err(EvalError::InclusionCheckFailed {
            fact: fact.clone(),
            reasons,
        })
    }
}
