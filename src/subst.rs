//! # Union-Find Substitution
//!
//! A persistent (non-destructive) substitution from variables to terms.
//! Each `extend` returns a logically new substitution that shares
//! structure with its parent via an `Rc`-linked binding chain — no branch
//! of search can ever observe or corrupt another branch's bindings,
//! without needing to clone a `HashMap` on every step.
//!
//! Design note: the chain holds `Variable` keys directly (cheap `Arc<str>`
//! clones) rather than a separate integer arena. There are no back
//! references, so there is no cycle to worry about (see DESIGN.md).

use crate::term::{Term, Variable};
use std::rc::Rc;

struct Node {
    var: Variable,
    term: Term,
    parent: Option<Rc<Node>>,
}

/// An immutable substitution. Cloning is `O(1)`.
#[derive(Clone, Default)]
pub struct Subst(Option<Rc<Node>>);

impl Subst {
    pub fn new() -> Self {
        Subst(None)
    }

    /// Extend with `var -> term`, shadowing any earlier binding for `var`.
    /// Returns a new substitution; `self` is untouched.
    pub fn extend(&self, var: Variable, term: Term) -> Subst {
        if var.is_wildcard() {
            return self.clone();
        }
        Subst(Some(Rc::new(Node {
            var,
            term,
            parent: self.0.clone(),
        })))
    }

    /// The most recently added binding for `var`, if any. Does not
    /// recursively resolve variable chains — use [`Subst::resolve`] for that.
    pub fn get(&self, var: &Variable) -> Option<Term> {
        let mut cur = &self.0;
        while let Some(node) = cur {
            if &node.var == var {
                return Some(node.term.clone());
            }
            cur = &node.parent;
        }
        None
    }

    /// Walk a term to its representative: follow variable bindings until
    /// reaching a constant or an unbound variable.
    pub fn resolve(&self, term: &Term) -> Term {
        let mut current = term.clone();
        let mut steps = 0usize;
        loop {
            match &current {
                Term::Const(_) => return current,
                Term::Var(v) if v.is_wildcard() => return current,
                Term::Var(v) => match self.get(v) {
                    Some(next) => current = next,
                    None => return current,
                },
            }
            steps += 1;
            if steps > 10_000 {
                // A binding chain this long can only be a logic error in the
                // caller (e.g. a var bound to itself); bail rather than loop.
                return current;
            }
        }
    }

    /// Resolve a whole argument list.
    pub fn resolve_all(&self, terms: &[Term]) -> Vec<Term> {
        terms.iter().map(|t| self.resolve(t)).collect()
    }

    /// If every variable in `vars` resolves to a constant, return the
    /// `(Variable, Constant)` pairs; otherwise `None`.
    pub fn as_const_list(&self, vars: &[Variable]) -> Option<Vec<(Variable, crate::term::Constant)>> {
        let mut out = Vec::with_capacity(vars.len());
        for v in vars {
            match self.resolve(&Term::Var(v.clone())) {
                Term::Const(c) => out.push((v.clone(), c)),
                Term::Var(_) => return None,
            }
        }
        Some(out)
    }
}
