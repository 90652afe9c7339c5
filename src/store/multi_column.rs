//! Fact store indexed on an arbitrary, caller-chosen subset of columns.
//! Useful for predicates joined on a composite key, e.g. `(tenant, user)`.

use super::{matches_pattern, Fact, FactStore, Pattern, RemovableStore, WritableStore};
use crate::term::Constant;
use std::collections::HashMap;

pub struct MultiColumnIndexStore {
    arity: usize,
    columns: Vec<usize>,
    by_key: HashMap<Vec<Constant>, Vec<Fact>>,
    len: usize,
}

impl MultiColumnIndexStore {
    pub fn new(arity: usize, columns: Vec<usize>) -> Self {
        assert!(!columns.is_empty(), "multi-column index needs >= 1 column");
        assert!(
            columns.iter().all(|&c| c < arity),
            "index column out of range for arity {arity}"
        );
        MultiColumnIndexStore {
            arity,
            columns,
            by_key: HashMap::new(),
            len: 0,
        }
    }

    fn key_of(&self, fact: &[Constant]) -> Vec<Constant> {
        self.columns.iter().map(|&c| fact[c].clone()).collect()
    }

    /// The key to probe when querying, if every indexed column is bound
    /// in `pattern`.
    fn bound_key(&self, pattern: &Pattern<'_>) -> Option<Vec<Constant>> {
        self.columns
            .iter()
            .map(|&c| pattern[c].cloned())
            .collect::<Option<Vec<_>>>()
    }
}

impl FactStore for MultiColumnIndexStore {
    fn arity(&self) -> usize {
        self.arity
    }

    fn len(&self) -> usize {
        self.len
    }

    fn contains(&self, fact: &[Constant]) -> bool {
        self.by_key
            .get(&self.key_of(fact))
            .is_some_and(|bucket| bucket.iter().any(|f| f.as_slice() == fact))
    }

    fn query(&self, pattern: &Pattern<'_>) -> Vec<Fact> {
        match self.bound_key(pattern) {
            Some(key) => self
                .by_key
                .get(&key)
                .into_iter()
                .flatten()
                .filter(|f| matches_pattern(f, pattern))
                .cloned()
                .collect(),
            None => self
                .by_key
                .values()
                .flatten()
                .filter(|f| matches_pattern(f, pattern))
                .cloned()
                .collect(),
        }
    }

    fn all(&self) -> Vec<Fact> {
        self.by_key.values().flatten().cloned().collect()
    }
}

impl WritableStore for MultiColumnIndexStore {
    fn insert(&mut self, fact: Fact) -> bool {
        debug_assert_eq!(fact.len(), self.arity);
        let key = self.key_of(&fact);
        let bucket = self.by_key.entry(key).or_default();
        if bucket.iter().any(|f| f == &fact) {
            return false;
        }
        bucket.push(fact);
        self.len += 1;
        true
    }
}

impl RemovableStore for MultiColumnIndexStore {
    fn remove(&mut self, fact: &[Constant]) -> bool {
        let key = self.key_of(fact);
        let Some(bucket) = self.by_key.get_mut(&key) else {
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
