//! Functional expressions and aggregate reduction (spec §4.9's
//! LET-transform and DO-transform build on both of these).
//!
//! A [`FuncExpr`] is evaluated against a fully-resolved [`Subst`] to
//! produce one [`Constant`] — arithmetic, list/pair/map/struct
//! construction, and projection out of them. [`AggregateFn`] instead
//! reduces a *sequence* of constants (one group's worth of bindings) to
//! one constant, for `group_by`/`aggregate_by`.

use crate::error::{EvalError, EvalResult};
use crate::subst::Subst;
use crate::term::{Constant, Fields, OrderedFloat, Term};

/// A functional expression over ground terms.
#[derive(Debug, Clone, PartialEq)]
pub enum FuncExpr {
    Term(Term),
    Add(Box<FuncExpr>, Box<FuncExpr>),
    Sub(Box<FuncExpr>, Box<FuncExpr>),
    Mul(Box<FuncExpr>, Box<FuncExpr>),
    Div(Box<FuncExpr>, Box<FuncExpr>),
    Mod(Box<FuncExpr>, Box<FuncExpr>),
    Neg(Box<FuncExpr>),
    ListCons(Box<FuncExpr>, Box<FuncExpr>),
    ListHead(Box<FuncExpr>),
    ListTail(Box<FuncExpr>),
    Pair(Box<FuncExpr>, Box<FuncExpr>),
    MapNew(Vec<(FuncExpr, FuncExpr)>),
    StructNew(Vec<(FuncExpr, FuncExpr)>),
    /// Field/key projection: `expr[key]`.
    Project(Box<FuncExpr>, Box<FuncExpr>),
    /// Length of a cons-list, as a `Constant::Number`.
    ListLen(Box<FuncExpr>),
}

/// Evaluates a [`FuncExpr`] to a ground [`Constant`]. A trait so the
/// engine can be extended with additional functions without touching
/// the evaluator core (mirrors how [`crate::external::ExternalPredicate`]
/// is pluggable).
pub trait FunctionalEvaluator {
    fn eval(&self, expr: &FuncExpr, subst: &Subst) -> EvalResult<Constant>;
}

#[derive(Debug, Default)]
pub struct DefaultFunctionalEvaluator;

impl FunctionalEvaluator for DefaultFunctionalEvaluator {
    fn eval(&self, expr: &FuncExpr, subst: &Subst) -> EvalResult<Constant> {
        eval_expr(expr, subst)
    }
}

fn ctx(message: impl Into<String>) -> EvalError {
    EvalError::FunctionalEvalFailed {
        context: "functional".into(),
        message: message.into(),
    }
}

fn resolve_const(expr: &FuncExpr, subst: &Subst) -> EvalResult<Constant> {
    match expr {
        FuncExpr::Term(term) => match subst.resolve(term) {
            Term::Const(c) => Ok(c),
            Term::Var(v) => Err(ctx(format!("unbound variable {v} in functional expression"))),
        },
        other => eval_expr(other, subst),
    }
}

fn eval_expr(expr: &FuncExpr, subst: &Subst) -> EvalResult<Constant> {
    match expr {
        FuncExpr::Term(_) => resolve_const(expr, subst),
        FuncExpr::Add(a, b) => arith(a, b, subst, |x, y| x + y, |x, y| x + y),
        FuncExpr::Sub(a, b) => arith(a, b, subst, |x, y| x - y, |x, y| x - y),
        FuncExpr::Mul(a, b) => arith(a, b, subst, |x, y| x * y, |x, y| x * y),
        FuncExpr::Div(a, b) => {
            let (av, bv) = (resolve_const(a, subst)?, resolve_const(b, subst)?);
            match (&av, &bv) {
                (Constant::Number(x), Constant::Number(y)) => {
                    if *y == 0 {
                        Err(ctx("division by zero"))
                    } else {
                        Ok(Constant::Number(x / y))
                    }
                }
                _ => {
                    let x = av.as_float().ok_or_else(|| ctx("non-numeric operand to /"))?;
                    let y = bv.as_float().ok_or_else(|| ctx("non-numeric operand to /"))?;
                    Ok(Constant::Float64(OrderedFloat(x / y)))
                }
            }
        }
        FuncExpr::Mod(a, b) => {
            let x = resolve_const(a, subst)?
                .as_number()
                .ok_or_else(|| ctx("mod requires integer operands"))?;
            let y = resolve_const(b, subst)?
                .as_number()
                .ok_or_else(|| ctx("mod requires integer operands"))?;
            if y == 0 {
                return Err(ctx("modulo by zero"));
            }
            Ok(Constant::Number(x % y))
        }
        FuncExpr::Neg(a) => match resolve_const(a, subst)? {
            Constant::Number(n) => Ok(Constant::Number(-n)),
            Constant::Float64(f) => Ok(Constant::Float64(OrderedFloat(-f.0))),
            _ => Err(ctx("negation requires a numeric operand")),
        },
        FuncExpr::ListCons(head, tail) => {
            let head = resolve_const(head, subst)?;
            let tail = resolve_const(tail, subst)?;
            Ok(Constant::ListCons(Box::new(head), Box::new(tail)))
        }
        FuncExpr::ListHead(list) => match resolve_const(list, subst)? {
            Constant::ListCons(head, _) => Ok(*head),
            _ => Err(ctx("list_head requires a non-empty list")),
        },
        FuncExpr::ListTail(list) => match resolve_const(list, subst)? {
            Constant::ListCons(_, tail) => Ok(*tail),
            _ => Err(ctx("list_tail requires a non-empty list")),
        },
        FuncExpr::Pair(a, b) => {
            let a = resolve_const(a, subst)?;
            let b = resolve_const(b, subst)?;
            Ok(Constant::Pair(Box::new(a), Box::new(b)))
        }
        FuncExpr::MapNew(entries) => {
            let entries = entries
                .iter()
                .map(|(k, v)| Ok((resolve_const(k, subst)?, resolve_const(v, subst)?)))
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(Constant::Map(Fields::new(entries)))
        }
        FuncExpr::StructNew(entries) => {
            let entries = entries
                .iter()
                .map(|(k, v)| Ok((resolve_const(k, subst)?, resolve_const(v, subst)?)))
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(Constant::Struct(Fields::new(entries)))
        }
        FuncExpr::Project(base, key) => {
            let base = resolve_const(base, subst)?;
            let key = resolve_const(key, subst)?;
            match &base {
                Constant::Map(fields) | Constant::Struct(fields) => fields
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| ctx(format!("key {key} not present"))),
                _ => Err(ctx("projection requires a map or struct")),
            }
        }
        FuncExpr::ListLen(list) => {
            let value = resolve_const(list, subst)?;
            let items = value.as_list().ok_or_else(|| ctx("list_len requires a list"))?;
            Ok(Constant::Number(items.len() as i64))
        }
    }
}

fn arith(
    a: &FuncExpr,
    b: &FuncExpr,
    subst: &Subst,
    int_op: impl Fn(i64, i64) -> i64,
    float_op: impl Fn(f64, f64) -> f64,
) -> EvalResult<Constant> {
    let av = resolve_const(a, subst)?;
    let bv = resolve_const(b, subst)?;
    match (&av, &bv) {
        (Constant::Number(x), Constant::Number(y)) => Ok(Constant::Number(int_op(*x, *y))),
        _ => {
            let x = av.as_float().ok_or_else(|| ctx("non-numeric operand"))?;
            let y = bv.as_float().ok_or_else(|| ctx("non-numeric operand"))?;
            Ok(Constant::Float64(OrderedFloat(float_op(x, y))))
        }
    }
}

/// A `group_by`/`aggregate_by` reduction function (spec §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Count,
    Sum,
    Min,
    Max,
    Collect,
    GroupSize,
    /// Builds a `Constant::Map` out of the group's rows; each row's
    /// projected value must itself be a `Constant::Pair(key, value)`
    /// (typically produced by a preceding `let KV = pair(K, V)`).
    GroupMap,
}

/// Reduce one group's values. `values` is the projected column for every
/// row in the group, in arbitrary order (aggregates here are all
/// order-independent).
pub fn apply_aggregate(func: AggregateFn, values: &[Constant]) -> EvalResult<Constant> {
    match func {
        AggregateFn::Count | AggregateFn::GroupSize => Ok(Constant::Number(values.len() as i64)),
        AggregateFn::Collect => Ok(Constant::list_from(values.iter().cloned())),
        AggregateFn::Sum => {
            if values.is_empty() {
                return Ok(Constant::Number(0));
            }
            if values.iter().all(|v| matches!(v, Constant::Number(_))) {
                let total: i64 = values.iter().filter_map(Constant::as_number).sum();
                Ok(Constant::Number(total))
            } else {
                let total: f64 = values
                    .iter()
                    .map(|v| v.as_float().ok_or_else(|| ctx("sum requires numeric values")))
                    .collect::<EvalResult<Vec<_>>>()?
                    .into_iter()
                    .sum();
                Ok(Constant::Float64(OrderedFloat(total)))
            }
        }
        AggregateFn::Min | AggregateFn::Max => {
            if values.is_empty() {
                return Err(ctx("min/max over an empty group"));
            }
            let mut floats: Vec<(f64, &Constant)> = values
                .iter()
                .map(|v| Ok((v.as_float().ok_or_else(|| ctx("min/max requires numeric values"))?, v)))
                .collect::<EvalResult<Vec<_>>>()?;
            floats.sort_by(|a, b| a.0.total_cmp(&b.0));
            let picked = if func == AggregateFn::Min {
                floats.first()
            } else {
                floats.last()
            };
            Ok(picked.expect("checked non-empty above").1.clone())
        }
        AggregateFn::GroupMap => {
            let entries = values
                .iter()
                .map(|v| match v {
                    Constant::Pair(k, val) => Ok(((**k).clone(), (**val).clone())),
                    _ => Err(ctx("group_map requires pair-valued rows, e.g. project pair(K, V)")),
                })
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(Constant::Map(Fields::new(entries)))
        }
    }
}
