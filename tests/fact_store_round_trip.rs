//! Round-trip for fact stores (spec §8): for any store index strategy,
//! `insert(a)` makes `contains(a)` true, `remove(a)` makes it false again,
//! and `len()` always equals the number of facts inserted minus removed.

use deltalog::store::columnar::ColumnarStore;
use deltalog::store::first_arg::FirstArgIndexStore;
use deltalog::store::multi_column::MultiColumnIndexStore;
use deltalog::store::simple::SimpleStore;
use deltalog::store::{FactStore, RemovableStore, WritableStore};
use deltalog::term::Constant;

fn facts(n: i64) -> Vec<Vec<Constant>> {
    (0..n)
        .map(|i| vec![Constant::Number(i % 4), Constant::Number(i)])
        .collect()
}

fn round_trip(mut store: Box<dyn RemovableStore>) {
    let rows = facts(20);

    for fact in &rows {
        assert!(!store.contains(fact));
        assert!(store.insert(fact.clone()));
        assert!(store.contains(fact));
    }
    assert_eq!(store.len(), rows.len());

    // inserting an existing fact again is a no-op
    assert!(!store.insert(rows[0].clone()));
    assert_eq!(store.len(), rows.len());

    let mut removed = 0;
    for fact in rows.iter().step_by(2) {
        assert!(store.remove(fact));
        assert!(!store.contains(fact));
        removed += 1;
    }
    assert_eq!(store.len(), rows.len() - removed);

    // removing something already gone is a no-op
    assert!(!store.remove(&rows[0]));
    assert_eq!(store.len(), rows.len() - removed);

    for fact in rows.iter().skip(1).step_by(2) {
        assert!(store.contains(fact));
    }
}

#[test]
fn simple_store_round_trips() {
    round_trip(Box::new(SimpleStore::new(2)));
}

#[test]
fn first_arg_index_store_round_trips() {
    round_trip(Box::new(FirstArgIndexStore::new(2)));
}

#[test]
fn multi_column_index_store_round_trips() {
    round_trip(Box::new(MultiColumnIndexStore::new(2, vec![0])));
}

#[test]
fn columnar_store_round_trips() {
    round_trip(Box::new(ColumnarStore::new(2)));
}
