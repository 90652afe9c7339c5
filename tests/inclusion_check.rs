//! Seed scenario 6 (spec §8): `palette(Name,R,G,B)` with inclusion
//! constraint `color(R,G,B)` — a fact whose `(R,G,B)` isn't already a
//! `color` fact is rejected.

use deltalog::inclusion::{check_fact, InclusionConstraint};
use deltalog::store::simple::SimpleStore;
use deltalog::store::{FactStore, WritableStore};
use deltalog::term::{Atom, Constant, PredicateSym, Term};

fn palette_fact(name: &str, r: i64, g: i64, b: i64) -> Atom {
    Atom::new(
        PredicateSym::new("palette", 4),
        vec![
            Term::Const(Constant::string(name)),
            Term::Const(Constant::Number(r)),
            Term::Const(Constant::Number(g)),
            Term::Const(Constant::Number(b)),
        ],
    )
}

#[test]
fn palette_passes_when_its_color_is_already_known() {
    let mut color_store = SimpleStore::new(3);
    color_store.insert(vec![Constant::Number(13), Constant::Number(23), Constant::Number(33)]);

    let color = PredicateSym::new("color", 3);
    let constraints = vec![
        InclusionConstraint::MemberOf { column: 1, target: color.clone(), target_column: 0 },
        InclusionConstraint::MemberOf { column: 2, target: color.clone(), target_column: 1 },
        InclusionConstraint::MemberOf { column: 3, target: color.clone(), target_column: 2 },
    ];
    let lookup = |p: &PredicateSym| -> Option<&dyn FactStore> {
        if *p == color {
            Some(&color_store as &dyn FactStore)
        } else {
            None
        }
    };

    assert!(check_fact(&palette_fact("kind of blue", 13, 23, 33), &constraints, &lookup).is_ok());
}

#[test]
fn palette_fails_when_its_color_is_unknown() {
    let mut color_store = SimpleStore::new(3);
    color_store.insert(vec![Constant::Number(13), Constant::Number(23), Constant::Number(33)]);

    let color = PredicateSym::new("color", 3);
    let constraints = vec![
        InclusionConstraint::MemberOf { column: 1, target: color.clone(), target_column: 0 },
        InclusionConstraint::MemberOf { column: 2, target: color.clone(), target_column: 1 },
        InclusionConstraint::MemberOf { column: 3, target: color.clone(), target_column: 2 },
    ];
    let lookup = |p: &PredicateSym| -> Option<&dyn FactStore> {
        if *p == color {
            Some(&color_store as &dyn FactStore)
        } else {
            None
        }
    };

    assert!(check_fact(&palette_fact("black", 0, 0, 0), &constraints, &lookup).is_err());
}
