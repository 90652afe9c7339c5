//! # Fact stores
//!
//! A fact store holds the ground tuples for one predicate's extension.
//! The engine is store-agnostic: it only ever goes through the
//! [`FactStore`]/[`WritableStore`]/[`RemovableStore`] trait layer, so the
//! caller can pick an index strategy per predicate (spec §5's "index
//! strategy is a per-predicate choice, not a global one").
//!
//! `Fact` is a bare constant tuple — the predicate symbol lives in the
//! map that owns the store, not in the store itself.

pub mod columnar;
pub mod first_arg;
pub mod merged;
pub mod multi_column;
pub mod simple;
pub mod teeing;
pub mod temporal;

use crate::term::Constant;

pub type Fact = Vec<Constant>;

/// A per-argument-position query pattern: `Some(c)` constrains that
/// column to `c`, `None` leaves it free.
pub type Pattern<'a> = [Option<&'a Constant>];

/// Read-only access to a predicate's extension.
pub trait FactStore {
    fn arity(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn contains(&self, fact: &[Constant]) -> bool;

    /// All facts matching `pattern`. `pattern.len()` must equal `arity()`.
    fn query(&self, pattern: &Pattern<'_>) -> Vec<Fact>;

    /// Every fact in the store, in no particular order.
    fn all(&self) -> Vec<Fact>;
}

/// A store that accepts new facts.
pub trait WritableStore: FactStore {
    /// Insert `fact`, returning `true` iff it was not already present.
    fn insert(&mut self, fact: Fact) -> bool;
}

/// A store that additionally accepts retraction.
pub trait RemovableStore: WritableStore {
    /// Remove `fact`, returning `true` iff it was present.
    fn remove(&mut self, fact: &[Constant]) -> bool;
}

/// Does `fact` match `pattern`? Shared by every index strategy's
/// fallback linear scan.
pub(crate) fn matches_pattern(fact: &[Constant], pattern: &Pattern<'_>) -> bool {
    fact.len() == pattern.len()
        && fact
            .iter()
            .zip(pattern.iter())
            .all(|(c, p)| p.map_or(true, |want| want == c))
}
