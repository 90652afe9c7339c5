//! Temporal fact store: for each ground key (a predicate's non-temporal
//! arguments), an [`IntervalTree`] of the times the fact held. Distinct
//! from the plain stores in this module — a temporal fact isn't "present
//! or absent", it's present over zero or more intervals, so it gets its
//! own narrower API rather than forcing [`FactStore`] semantics onto time.

use crate::interval::{coalesce, IntervalTree, ResolvedInterval};
use crate::term::Constant;
use std::collections::HashMap;

pub struct TemporalFactStore {
    arity: usize,
    trees: HashMap<u64, IntervalTree>,
    keys: HashMap<u64, Vec<Constant>>,
    interval_cap: usize,
}

fn key_hash(key: &[Constant]) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    for c in key {
        c.hash64().hash(&mut hasher);
    }
    hasher.finish()
}

impl TemporalFactStore {
    pub fn new(arity: usize, interval_cap: usize) -> Self {
        TemporalFactStore {
            arity,
            trees: HashMap::new(),
            keys: HashMap::new(),
            interval_cap,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Record that `key` held during `interval`. Returns `Err` if this
    /// would push the key's interval count past the configured cap,
    /// mirroring [`crate::error::EvalError::IntervalLimitExceeded`].
    pub fn insert(&mut self, key: Vec<Constant>, interval: ResolvedInterval) -> Result<(), usize> {
        debug_assert_eq!(key.len(), self.arity);
        let hash = key_hash(&key);
        let tree = self.trees.entry(hash).or_default();
        tree.insert(interval);
        coalesce(tree);
        if tree.len() > self.interval_cap {
            return Err(tree.len());
        }
        self.keys.entry(hash).or_insert(key);
        Ok(())
    }

    /// Did `key` hold at instant `t`?
    pub fn holds_at(&self, key: &[Constant], t: i64) -> bool {
        let hash = key_hash(key);
        self.trees
            .get(&hash)
            .is_some_and(|tree| !tree.query_point(t).is_empty())
    }

    /// The intervals over which `key` held, overlapping `[qs, qe]`.
    pub fn intervals_in_range(&self, key: &[Constant], qs: i64, qe: i64) -> Vec<ResolvedInterval> {
        let hash = key_hash(key);
        self.trees
            .get(&hash)
            .map(|tree| tree.query_range(qs, qe))
            .unwrap_or_default()
    }

    /// Every `(key, interval)` pair overlapping `[qs, qe]`, for keys
    /// unbound in the calling literal.
    pub fn all_in_range(&self, qs: i64, qe: i64) -> Vec<(Vec<Constant>, ResolvedInterval)> {
        let mut out = Vec::new();
        for (hash, tree) in &self.trees {
            if let Some(key) = self.keys.get(hash) {
                for interval in tree.query_range(qs, qe) {
                    out.push((key.clone(), interval));
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.trees.values().map(IntervalTree::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_at_reflects_inserted_interval() {
        let mut store = TemporalFactStore::new(1, 100);
        let key = vec![Constant::string("alice")];
        store
            .insert(key.clone(), ResolvedInterval::new(0, 100))
            .unwrap();
        assert!(store.holds_at(&key, 50));
        assert!(!store.holds_at(&key, 200));
    }

    #[test]
    fn interval_cap_is_enforced() {
        let mut store = TemporalFactStore::new(1, 1);
        let key = vec![Constant::string("alice")];
        store.insert(key.clone(), ResolvedInterval::new(0, 10)).unwrap();
        // disjoint interval pushes count to 2, past cap of 1.
        assert!(store.insert(key, ResolvedInterval::new(20, 30)).is_err());
    }

    #[test]
    fn overlapping_inserts_coalesce_and_stay_under_cap() {
        let mut store = TemporalFactStore::new(1, 1);
        let key = vec![Constant::string("alice")];
        store.insert(key.clone(), ResolvedInterval::new(0, 10)).unwrap();
        store.insert(key.clone(), ResolvedInterval::new(5, 15)).unwrap();
        assert_eq!(store.intervals_in_range(&key, 0, 15).len(), 1);
    }
}
