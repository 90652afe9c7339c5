//! Unindexed fact store: a flat `Vec` plus a `HashSet` for dedup/contains.
//! The right default for small or rarely-queried predicates (spec §5).

use super::{matches_pattern, Fact, FactStore, Pattern, RemovableStore, WritableStore};
use crate::term::Constant;
use std::collections::HashSet;

pub struct SimpleStore {
    arity: usize,
    facts: Vec<Fact>,
    index: HashSet<Fact>,
}

impl SimpleStore {
    pub fn new(arity: usize) -> Self {
        SimpleStore {
            arity,
            facts: Vec::new(),
            index: HashSet::new(),
        }
    }
}

impl FactStore for SimpleStore {
    fn arity(&self) -> usize {
        self.arity
    }

    fn len(&self) -> usize {
        self.facts.len()
    }

    fn contains(&self, fact: &[Constant]) -> bool {
        self.index.contains(fact)
    }

    fn query(&self, pattern: &Pattern<'_>) -> Vec<Fact> {
        self.facts
            .iter()
            .filter(|f| matches_pattern(f, pattern))
            .cloned()
            .collect()
    }

    fn all(&self) -> Vec<Fact> {
        self.facts.clone()
    }
}

impl WritableStore for SimpleStore {
    fn insert(&mut self, fact: Fact) -> bool {
        debug_assert_eq!(fact.len(), self.arity);
        if self.index.insert(fact.clone()) {
            self.facts.push(fact);
            true
        } else {
            false
        }
    }
}

impl RemovableStore for SimpleStore {
    fn remove(&mut self, fact: &[Constant]) -> bool {
        if self.index.remove(fact) {
            self.facts.retain(|f| f.as_slice() != fact);
            true
        } else {
            false
        }
    }
}
