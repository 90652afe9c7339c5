//! Fact store indexed on the first argument column. Good for predicates
//! that are almost always queried with the first column bound, e.g.
//! `edge(X, _)` joins driven by a bound source node.

use super::{matches_pattern, Fact, FactStore, Pattern, RemovableStore, WritableStore};
use crate::term::Constant;
use std::collections::HashMap;

pub struct FirstArgIndexStore {
    arity: usize,
    by_first: HashMap<Constant, Vec<Fact>>,
    len: usize,
}

impl FirstArgIndexStore {
    pub fn new(arity: usize) -> Self {
        assert!(arity >= 1, "first-arg index requires arity >= 1");
        FirstArgIndexStore {
            arity,
            by_first: HashMap::new(),
            len: 0,
        }
    }
}

impl FactStore for FirstArgIndexStore {
    fn arity(&self) -> usize {
        self.arity
    }

    fn len(&self) -> usize {
        self.len
    }

    fn contains(&self, fact: &[Constant]) -> bool {
        self.by_first
            .get(&fact[0])
            .is_some_and(|bucket| bucket.iter().any(|f| f.as_slice() == fact))
    }

    fn query(&self, pattern: &Pattern<'_>) -> Vec<Fact> {
        match pattern.first().and_then(|p| *p) {
            Some(key) => self
                .by_first
                .get(key)
                .into_iter()
                .flatten()
                .filter(|f| matches_pattern(f, pattern))
                .cloned()
                .collect(),
            None => self
                .by_first
                .values()
                .flatten()
                .filter(|f| matches_pattern(f, pattern))
                .cloned()
                .collect(),
        }
    }

    fn all(&self) -> Vec<Fact> {
        self.by_first.values().flatten().cloned().collect()
    }
}

impl WritableStore for FirstArgIndexStore {
    fn insert(&mut self, fact: Fact) -> bool {
        debug_assert_eq!(fact.len(), self.arity);
        let bucket = self.by_first.entry(fact[0].clone()).or_default();
        if bucket.iter().any(|f| f == &fact) {
            return false;
        }
        bucket.push(fact);
        self.len += 1;
        true
    }
}

impl RemovableStore for FirstArgIndexStore {
    fn remove(&mut self, fact: &[Constant]) -> bool {
        let Some(bucket) = self.by_first.get_mut(&fact[0]) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|f| f.as_slice() != fact);
        let removed = bucket.len() != before;
        if removed {
            self.len -= 1;
        }
        removed
    }
}
