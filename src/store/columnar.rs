//! Column-oriented fact store: one `Vec<Constant>` per argument position
//! rather than one `Vec<Constant>` per row. Rows are identified by index,
//! which keeps per-column scans (e.g. projecting a single output column)
//! cache-friendly; removal is a swap-remove across every column.

use super::{Fact, FactStore, Pattern, RemovableStore, WritableStore};
use crate::term::Constant;
use std::collections::HashSet;

pub struct ColumnarStore {
    arity: usize,
    columns: Vec<Vec<Constant>>,
    index: HashSet<Fact>,
}

impl ColumnarStore {
    pub fn new(arity: usize) -> Self {
        ColumnarStore {
            arity,
            columns: (0..arity).map(|_| Vec::new()).collect(),
            index: HashSet::new(),
        }
    }

    fn row(&self, i: usize) -> Fact {
        self.columns.iter().map(|col| col[i].clone()).collect()
    }

    fn row_matches(&self, i: usize, pattern: &Pattern<'_>) -> bool {
        pattern
            .iter()
            .enumerate()
            .all(|(c, want)| want.map_or(true, |w| w == &self.columns[c][i]))
    }
}

impl FactStore for ColumnarStore {
    fn arity(&self) -> usize {
        self.arity
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn contains(&self, fact: &[Constant]) -> bool {
        self.index.contains(fact)
    }

    fn query(&self, pattern: &Pattern<'_>) -> Vec<Fact> {
        let n = self.columns.first().map_or(0, Vec::len);
        (0..n)
            .filter(|&i| self.row_matches(i, pattern))
            .map(|i| self.row(i))
            .collect()
    }

    fn all(&self) -> Vec<Fact> {
        let n = self.columns.first().map_or(0, Vec::len);
        (0..n).map(|i| self.row(i)).collect()
    }
}

impl WritableStore for ColumnarStore {
    fn insert(&mut self, fact: Fact) -> bool {
        debug_assert_eq!(fact.len(), self.arity);
        if !self.index.insert(fact.clone()) {
            return false;
        }
        for (col, value) in self.columns.iter_mut().zip(fact) {
            col.push(value);
        }
        true
    }
}

impl RemovableStore for ColumnarStore {
    fn remove(&mut self, fact: &[Constant]) -> bool {
        if !self.index.remove(fact) {
            return false;
        }
        let n = self.columns.first().map_or(0, Vec::len);
        if let Some(i) = (0..n).find(|&i| self.row(i).as_slice() == fact) {
            for col in &mut self.columns {
                col.swap_remove(i);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(a: i64, b: i64) -> Fact {
        vec![Constant::Number(a), Constant::Number(b)]
    }

    #[test]
    fn insert_and_query_round_trip() {
        let mut store = ColumnarStore::new(2);
        store.insert(fact(1, 2));
        store.insert(fact(3, 4));
        let one = Constant::Number(1);
        let hits = store.query(&[Some(&one), None]);
        assert_eq!(hits, vec![fact(1, 2)]);
    }

    #[test]
    fn remove_swaps_out_row_across_all_columns() {
        let mut store = ColumnarStore::new(2);
        store.insert(fact(1, 2));
        store.insert(fact(3, 4));
        assert!(store.remove(&fact(1, 2)));
        assert_eq!(store.all(), vec![fact(3, 4)]);
    }
}
