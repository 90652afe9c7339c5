//! Built-in predicates (spec §4.4): comparisons, structural matchers, and
//! `within_distance`. A built-in never binds a new variable — both its
//! arguments must already be ground by the time it is decided — and
//! "does not hold" is a plain `false`, never an [`EvalError`].

use crate::error::{EvalError, EvalResult};
use crate::term::{Constant, PredicateSym};

/// Decide a built-in predicate against its already-ground arguments.
/// Returns `Ok(None)` if `predicate` is not a recognized built-in.
pub fn decide(predicate: &PredicateSym, args: &[Constant]) -> EvalResult<Option<bool>> {
    let result = match (predicate.name.as_ref(), args) {
        ("eq", [a, b]) => a == b,
        ("neq", [a, b]) => a != b,
        ("lt", [a, b]) => compare(a, b)? == std::cmp::Ordering::Less,
        ("le", [a, b]) => compare(a, b)? != std::cmp::Ordering::Greater,
        ("gt", [a, b]) => compare(a, b)? == std::cmp::Ordering::Greater,
        ("ge", [a, b]) => compare(a, b)? != std::cmp::Ordering::Less,
        ("is_list", [a]) => a.as_list().is_some(),
        ("list_len_lt", [a, b]) => list_len(predicate, a)? < list_len(predicate, b)?,
        ("list_len_le", [a, b]) => list_len(predicate, a)? <= list_len(predicate, b)?,
        ("is_map", [Constant::Map(_)]) => true,
        ("is_map", [_]) => false,
        ("is_struct", [Constant::Struct(_)]) => true,
        ("is_struct", [_]) => false,
        ("list_contains", [list, needle]) => list
            .as_list()
            .ok_or_else(|| EvalError::BuiltinFailed {
                predicate: predicate.clone(),
                message: "list_contains requires a list first argument".into(),
            })?
            .iter()
            .any(|item| *item == needle),
        ("map_contains_key", [Constant::Map(fields), key]) => fields.get(key).is_some(),
        ("within_distance", [a, b, max_dist]) => {
            let a = a.as_float().ok_or_else(|| numeric_error(predicate, "a"))?;
            let b = b.as_float().ok_or_else(|| numeric_error(predicate, "b"))?;
            let max_dist = max_dist
                .as_float()
                .ok_or_else(|| numeric_error(predicate, "max_dist"))?;
            (a - b).abs() <= max_dist
        }
        _ => return Ok(None),
    };
    Ok(Some(result))
}

fn list_len(predicate: &PredicateSym, value: &Constant) -> EvalResult<usize> {
    value.as_list().map(|items| items.len()).ok_or_else(|| EvalError::BuiltinFailed {
        predicate: predicate.clone(),
        message: "list_len_lt/list_len_le require list arguments".into(),
    })
}

fn numeric_error(predicate: &PredicateSym, arg: &str) -> EvalError {
    EvalError::BuiltinFailed {
        predicate: predicate.clone(),
        message: format!("argument `{arg}` is not numeric"),
    }
}

fn compare(a: &Constant, b: &Constant) -> EvalResult<std::cmp::Ordering> {
    match (a, b) {
        (Constant::Number(x), Constant::Number(y)) => Ok(x.cmp(y)),
        (Constant::Time(x), Constant::Time(y)) => Ok(x.cmp(y)),
        (Constant::String(x), Constant::String(y)) => Ok(x.cmp(y)),
        _ => {
            let (Some(x), Some(y)) = (a.as_float(), b.as_float()) else {
                return Err(EvalError::BuiltinFailed {
                    predicate: PredicateSym::new("lt", 2),
                    message: format!("cannot order {a} against {b}"),
                });
            };
            Ok(x.total_cmp(&y))
        }
    }
}

/// True for every predicate name this module recognizes, used by the
/// declaration checker to forbid shadowing a built-in with a user rule.
pub fn is_builtin_name(name: &str) -> bool {
    matches!(
        name,
        "eq" | "neq"
            | "lt"
            | "le"
            | "gt"
            | "ge"
            | "is_list"
            | "is_map"
            | "is_struct"
            | "list_contains"
            | "map_contains_key"
            | "within_distance"
            | "list_len_lt"
            | "list_len_le"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str, arity: usize) -> PredicateSym {
        PredicateSym::new(name, arity)
    }

    #[test]
    fn numeric_comparisons() {
        let args = [Constant::Number(1), Constant::Number(2)];
        assert_eq!(decide(&p("lt", 2), &args).unwrap(), Some(true));
        assert_eq!(decide(&p("gt", 2), &args).unwrap(), Some(false));
        assert_eq!(decide(&p("le", 2), &args).unwrap(), Some(true));
    }

    #[test]
    fn unknown_predicate_returns_none() {
        let args = [Constant::Number(1)];
        assert_eq!(decide(&p("frobnicate", 1), &args).unwrap(), None);
    }

    #[test]
    fn list_contains_checks_membership() {
        let list = Constant::list_from([Constant::Number(1), Constant::Number(2)]);
        let args = [list, Constant::Number(2)];
        assert_eq!(decide(&p("list_contains", 2), &args).unwrap(), Some(true));
    }

    #[test]
    fn list_len_lt_compares_list_lengths() {
        let short = Constant::list_from([Constant::Number(1)]);
        let long = Constant::list_from([Constant::Number(1), Constant::Number(2)]);
        let args = [short.clone(), long.clone()];
        assert_eq!(decide(&p("list_len_lt", 2), &args).unwrap(), Some(true));
        assert_eq!(decide(&p("list_len_le", 2), &[long, short]).unwrap(), Some(false));
    }

    #[test]
    fn within_distance_checks_absolute_difference() {
        let args = [Constant::Number(10), Constant::Number(13), Constant::Number(5)];
        assert_eq!(decide(&p("within_distance", 3), &args).unwrap(), Some(true));
        let args = [Constant::Number(10), Constant::Number(20), Constant::Number(5)];
        assert_eq!(decide(&p("within_distance", 3), &args).unwrap(), Some(false));
    }
}
