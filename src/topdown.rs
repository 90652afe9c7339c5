//! SLD-style top-down (backward-chaining) evaluation (spec §4.6).
//!
//! The bottom-up driver in [`crate::engine`] materializes ordinary IDB
//! predicates stratum by stratum. A few things can't wait for that:
//! negation whose argument isn't yet materialized, and a merge predicate
//! consulted lazily from another rule's body. [`TopDownContext::solve`]
//! answers those on demand via plain SLD resolution, falling back to a
//! predicate's fact store when one already exists instead of
//! re-deriving it from rules.

use crate::error::{EvalError, EvalResult};
use crate::functional::{DefaultFunctionalEvaluator, FuncExpr};
use crate::premise::Premise;
use crate::store::FactStore;
use crate::store::temporal::TemporalFactStore;
use crate::subst::Subst;
use crate::temporal_eval::TemporalLiteral;
use crate::term::{Atom, Mode, PredicateSym, Term, Variable};
use crate::transform::ClauseTransform;
use crate::unify::unify_terms;
use std::cell::Cell;

/// One rule: `head :- body |> transform*`.
#[derive(Debug, Clone)]
pub struct Clause {
    pub head: Atom,
    pub body: Vec<Premise>,
    /// LET/DO-transforms applied, in order, to the body's frontier of
    /// substitutions before the head is resolved (spec §4.9).
    pub transform: Vec<ClauseTransform>,
}

impl Clause {
    pub fn new(head: Atom, body: Vec<Premise>) -> Self {
        Clause {
            head,
            body,
            transform: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Vec<ClauseTransform>) -> Self {
        self.transform = transform;
        self
    }
}

pub struct TopDownContext<'a> {
    pub clauses_for: &'a dyn Fn(&PredicateSym) -> Vec<&'a Clause>,
    pub store_for: &'a dyn Fn(&PredicateSym) -> Option<&'a dyn FactStore>,
    pub temporal_store_for: &'a dyn Fn(&PredicateSym) -> Option<&'a TemporalFactStore>,
    pub eval_time: i64,
    pub max_depth: usize,
    fresh_counter: Cell<u64>,
}

impl<'a> TopDownContext<'a> {
    pub fn new(
        clauses_for: &'a dyn Fn(&PredicateSym) -> Vec<&'a Clause>,
        store_for: &'a dyn Fn(&PredicateSym) -> Option<&'a dyn FactStore>,
        temporal_store_for: &'a dyn Fn(&PredicateSym) -> Option<&'a TemporalFactStore>,
        eval_time: i64,
        max_depth: usize,
    ) -> Self {
        TopDownContext {
            clauses_for,
            store_for,
            temporal_store_for,
            eval_time,
            max_depth,
            fresh_counter: Cell::new(0),
        }
    }

    fn fresh_suffix(&self) -> u64 {
        let id = self.fresh_counter.get();
        self.fresh_counter.set(id + 1);
        id
    }

    /// Solve `goal` against `subst` under the declared mode vector
    /// (spec §4.6): every `Mode::In` position must already be ground in
    /// `goal`/`subst`, or this returns [`EvalError::TopDownModeViolation`].
    /// Returns one extended substitution per way the goal can be
    /// satisfied. Used for deferred-predicate dispatch and lattice merge
    /// predicates (spec §4.5/§4.7) — never for external-predicate
    /// callbacks, which are a bottom-up-only hook.
    pub fn solve(&self, goal: &Atom, modes: &[Mode], subst: &Subst) -> EvalResult<Vec<Subst>> {
        for (i, mode) in modes.iter().enumerate() {
            if *mode == Mode::In && !matches!(subst.resolve(&goal.args[i]), Term::Const(_)) {
                return Err(EvalError::TopDownModeViolation {
                    predicate: goal.predicate.clone(),
                    position: i,
                });
            }
        }
        self.solve_positive(goal, subst, 0)
    }

    fn solve_positive(&self, atom: &Atom, subst: &Subst, depth: usize) -> EvalResult<Vec<Subst>> {
        if depth > self.max_depth {
            tracing::warn!(predicate = %atom.predicate, depth, "top-down recursion depth exceeded, giving up on this goal");
            return Ok(Vec::new());
        }
        if crate::builtins::is_builtin_name(&atom.predicate.name) {
            return crate::premise::evaluate(
                &Premise::Positive(atom.clone()),
                None,
                None,
                &crate::external::ExternalRegistry::new(),
                &crate::premise::no_deferred,
                subst,
                self.eval_time,
            );
        }
        if let Some(store) = (self.store_for)(&atom.predicate) {
            return crate::premise::evaluate(
                &Premise::Positive(atom.clone()),
                Some(store),
                None,
                &crate::external::ExternalRegistry::new(),
                &crate::premise::no_deferred,
                subst,
                self.eval_time,
            );
        }
        let mut out = Vec::new();
        for clause in (self.clauses_for)(&atom.predicate) {
            let renamed = rename_apart(clause, self.fresh_suffix());
            let Some(unified) = unify_terms(&renamed.head.args, &atom.args, subst) else {
                continue;
            };
            let solved = self.solve_body(&renamed.body, unified, depth + 1)?;
            out.extend(if renamed.transform.is_empty() {
                solved
            } else {
                crate::transform::apply_all(&renamed.transform, &DefaultFunctionalEvaluator, solved)?
            });
        }
        Ok(out)
    }

    fn solve_body(&self, body: &[Premise], start: Subst, depth: usize) -> EvalResult<Vec<Subst>> {
        let mut frontier = vec![start];
        for premise in body {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for subst in &frontier {
                next.extend(self.solve_premise(premise, subst, depth)?);
            }
            frontier = next;
        }
        Ok(frontier)
    }

    fn solve_premise(&self, premise: &Premise, subst: &Subst, depth: usize) -> EvalResult<Vec<Subst>> {
        match premise {
            Premise::Positive(atom) => self.solve_positive(atom, subst, depth),
            Premise::Negated(atom) => {
                let resolved = subst.resolve_all(&atom.args);
                if resolved.iter().any(|t| matches!(t, Term::Var(_))) {
                    return Ok(Vec::new());
                }
                let ground_atom = Atom::new(atom.predicate.clone(), resolved);
                let results = self.solve_positive(&ground_atom, &Subst::new(), depth + 1)?;
                Ok(if results.is_empty() {
                    vec![subst.clone()]
                } else {
                    Vec::new()
                })
            }
            Premise::Equality(a, b) => Ok(crate::unify::unify_term(a, b, subst).into_iter().collect()),
            Premise::Inequality(a, b) => {
                Ok(match (subst.resolve(a), subst.resolve(b)) {
                    (Term::Const(x), Term::Const(y)) if x != y => vec![subst.clone()],
                    _ => Vec::new(),
                })
            }
            Premise::Temporal(lit) => {
                let Some(store) = (self.temporal_store_for)(&lit.atom.predicate) else {
                    return Err(crate::error::EvalError::NoTemporalStoreConfigured {
                        predicate: lit.atom.predicate.clone(),
                    });
                };
                crate::temporal_eval::evaluate(lit, store, subst, self.eval_time)
            }
        }
    }
}

fn rename_apart(clause: &Clause, suffix: u64) -> Clause {
    let rename = |v: &Variable| -> Variable {
        if v.is_wildcard() {
            v.clone()
        } else {
            Variable::new(format!("{v}#{suffix}"))
        }
    };
    let rename_term = |t: &Term| -> Term {
        match t {
            Term::Var(v) => Term::Var(rename(v)),
            Term::Const(c) => Term::Const(c.clone()),
        }
    };
    let rename_atom = |a: &Atom| -> Atom {
        Atom::new(a.predicate.clone(), a.args.iter().map(rename_term).collect())
    };
    let rename_temporal = |lit: &TemporalLiteral| -> TemporalLiteral {
        TemporalLiteral {
            op: lit.op,
            atom: rename_atom(&lit.atom),
            window: lit.window.clone(),
        }
    };
    fn rename_func_expr(expr: &FuncExpr, rename_term: &dyn Fn(&Term) -> Term) -> FuncExpr {
        let recur = |e: &FuncExpr| rename_func_expr(e, rename_term);
        let recur_pairs = |pairs: &[(FuncExpr, FuncExpr)]| -> Vec<(FuncExpr, FuncExpr)> {
            pairs.iter().map(|(k, v)| (recur(k), recur(v))).collect()
        };
        match expr {
            FuncExpr::Term(t) => FuncExpr::Term(rename_term(t)),
            FuncExpr::Add(a, b) => FuncExpr::Add(Box::new(recur(a)), Box::new(recur(b))),
            FuncExpr::Sub(a, b) => FuncExpr::Sub(Box::new(recur(a)), Box::new(recur(b))),
            FuncExpr::Mul(a, b) => FuncExpr::Mul(Box::new(recur(a)), Box::new(recur(b))),
            FuncExpr::Div(a, b) => FuncExpr::Div(Box::new(recur(a)), Box::new(recur(b))),
            FuncExpr::Mod(a, b) => FuncExpr::Mod(Box::new(recur(a)), Box::new(recur(b))),
            FuncExpr::Neg(a) => FuncExpr::Neg(Box::new(recur(a))),
            FuncExpr::ListCons(h, t) => FuncExpr::ListCons(Box::new(recur(h)), Box::new(recur(t))),
            FuncExpr::ListHead(l) => FuncExpr::ListHead(Box::new(recur(l))),
            FuncExpr::ListTail(l) => FuncExpr::ListTail(Box::new(recur(l))),
            FuncExpr::ListLen(l) => FuncExpr::ListLen(Box::new(recur(l))),
            FuncExpr::Pair(a, b) => FuncExpr::Pair(Box::new(recur(a)), Box::new(recur(b))),
            FuncExpr::MapNew(entries) => FuncExpr::MapNew(recur_pairs(entries)),
            FuncExpr::StructNew(entries) => FuncExpr::StructNew(recur_pairs(entries)),
            FuncExpr::Project(base, key) => FuncExpr::Project(Box::new(recur(base)), Box::new(recur(key))),
        }
    }
    let rename_transform = |t: &ClauseTransform| -> ClauseTransform {
        match t {
            ClauseTransform::Let { target, expr } => ClauseTransform::Let {
                target: rename(target),
                expr: rename_func_expr(expr, &rename_term),
            },
            ClauseTransform::Do {
                group_vars,
                reductions,
            } => ClauseTransform::Do {
                group_vars: group_vars.iter().map(&rename).collect(),
                reductions: reductions
                    .iter()
                    .map(|(project, func, target)| (rename(project), *func, rename(target)))
                    .collect(),
            },
        }
    };

    let head = rename_atom(&clause.head);
    let body = clause
        .body
        .iter()
        .map(|premise| match premise {
            Premise::Positive(a) => Premise::Positive(rename_atom(a)),
            Premise::Negated(a) => Premise::Negated(rename_atom(a)),
            Premise::Equality(a, b) => Premise::Equality(rename_term(a), rename_term(b)),
            Premise::Inequality(a, b) => Premise::Inequality(rename_term(a), rename_term(b)),
            Premise::Temporal(lit) => Premise::Temporal(rename_temporal(lit)),
        })
        .collect();
    let transform = clause.transform.iter().map(rename_transform).collect();
    Clause { head, body, transform }
}
