//! A writable view that reads `base` ∪ `out` but only ever writes into
//! `out`, deduping new facts against `base` so a semi-naive round never
//! re-derives (and re-counts against the created-fact limit) a fact the
//! previous stratum already produced.

use super::{Fact, FactStore, Pattern, WritableStore};
use crate::term::Constant;

pub struct TeeingStore<'b, O> {
    base: &'b dyn FactStore,
    out: O,
}

impl<'b, O: WritableStore> TeeingStore<'b, O> {
    pub fn new(base: &'b dyn FactStore, out: O) -> Self {
        debug_assert_eq!(base.arity(), out.arity());
        TeeingStore { base, out }
    }

    pub fn into_out(self) -> O {
        self.out
    }

    pub fn out(&self) -> &O {
        &self.out
    }
}

impl<O: WritableStore> FactStore for TeeingStore<'_, O> {
    fn arity(&self) -> usize {
        self.base.arity()
    }

    fn len(&self) -> usize {
        self.all().len()
    }

    fn contains(&self, fact: &[Constant]) -> bool {
        self.base.contains(fact) || self.out.contains(fact)
    }

    fn query(&self, pattern: &Pattern<'_>) -> Vec<Fact> {
        let mut hits = self.base.query(pattern);
        for fact in self.out.query(pattern) {
            if !self.base.contains(&fact) {
                hits.push(fact);
            }
        }
        hits
    }

    fn all(&self) -> Vec<Fact> {
        let mut all = self.base.all();
        for fact in self.out.all() {
            if !self.base.contains(&fact) {
                all.push(fact);
            }
        }
        all
    }
}

impl<O: WritableStore> WritableStore for TeeingStore<'_, O> {
    /// Returns `true` iff the fact is new to both `base` and `out` — the
    /// signal the bottom-up driver uses to decide whether this fact
    /// belongs in the next round's delta.
    fn insert(&mut self, fact: Fact) -> bool {
        if self.base.contains(&fact) {
            return false;
        }
        self.out.insert(fact)
    }
}
