//! Seed scenario 3 (spec §8): `foo(Y,Count,Sum,Max) :- bar(Y,Z,A) |> do
//! group_by(Y), let Count=count(), let Sum=sum(Z), let Max=max(A).`

use deltalog::cancel::CancelToken;
use deltalog::config::LimitsConfig;
use deltalog::engine::bottom_up::{self, StoreMap, TemporalStoreMap};
use deltalog::engine::{Declaration, EvalOptions, ProgramInfo};
use deltalog::external::ExternalRegistry;
use deltalog::functional::AggregateFn;
use deltalog::premise::Premise;
use deltalog::store::simple::SimpleStore;
use deltalog::store::{RemovableStore, WritableStore};
use deltalog::term::{Atom, Constant, PredicateSym, Term, Variable};
use deltalog::topdown::Clause;
use deltalog::transform::ClauseTransform;
use std::collections::HashMap;

fn v(name: &str) -> Term {
    Term::Var(Variable::new(name))
}

#[test]
fn group_by_produces_count_sum_and_max_per_group() {
    let bar = PredicateSym::new("bar", 3);
    let foo = PredicateSym::new("foo", 4);

    let mut program = ProgramInfo::new();
    program.declare(Declaration::new(bar.clone()));
    program.declare(Declaration::new(foo.clone()));

    program.add_clause(
        Clause::new(
            Atom::new(foo.clone(), vec![v("Y"), v("Count"), v("Sum"), v("Max")]),
            vec![Premise::Positive(Atom::new(bar.clone(), vec![v("Y"), v("Z"), v("A")]))],
        )
        .with_transform(vec![ClauseTransform::Do {
            group_vars: vec![Variable::new("Y")],
            reductions: vec![
                (Variable::new("Z"), AggregateFn::Count, Variable::new("Count")),
                (Variable::new("Z"), AggregateFn::Sum, Variable::new("Sum")),
                (Variable::new("A"), AggregateFn::Max, Variable::new("Max")),
            ],
        }]),
    );
    program.strata = vec![vec![bar.clone()], vec![foo.clone()]];

    let mut bar_store = SimpleStore::new(3);
    for (y, z, a) in [("a", 11, 100), ("a", 11, 150), ("b", 3, 200)] {
        bar_store.insert(vec![Constant::string(y), Constant::Number(z), Constant::Number(a)]);
    }

    let mut stores: StoreMap = HashMap::new();
    stores.insert(bar.clone(), Box::new(bar_store) as Box<dyn RemovableStore>);

    let externals = ExternalRegistry::new();
    let options = EvalOptions {
        limits: LimitsConfig::default(),
        eval_time: 0,
    };
    let cancel = CancelToken::new();
    let temporal_stores = TemporalStoreMap::new();

    bottom_up::eval_program(&program, &mut stores, &temporal_stores, &externals, &options, &cancel).unwrap();

    let foo_store = stores.get(&foo).unwrap();
    assert_eq!(foo_store.len(), 2);
    assert!(foo_store.contains(&[
        Constant::string("a"),
        Constant::Number(2),
        Constant::Number(22),
        Constant::Number(150),
    ]));
    assert!(foo_store.contains(&[
        Constant::string("b"),
        Constant::Number(1),
        Constant::Number(3),
        Constant::Number(200),
    ]));
}
