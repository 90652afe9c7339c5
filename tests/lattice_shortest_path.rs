//! Seed scenario 4 (spec §8): a genuine `shorter(P1, P2, P)` merge
//! predicate (`len(P1) < len(P2)` ? `P1` : `P2`) resolved through the
//! top-down query context (§4.6/§4.7), not hand-rolled comparison logic
//! baked into the store layer.

use deltalog::cancel::CancelToken;
use deltalog::config::LimitsConfig;
use deltalog::engine::bottom_up::{self, StoreMap, TemporalStoreMap};
use deltalog::engine::{Declaration, EvalOptions, IndexStrategy, ProgramInfo};
use deltalog::external::ExternalRegistry;
use deltalog::functional::FuncExpr;
use deltalog::lattice::MergeSpec;
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

fn path_of(nodes: &[&str]) -> Constant {
    Constant::list_from(nodes.iter().map(|n| Constant::string(*n)))
}

/// `shorter(P1, P2, P)`: `P` is whichever of `P1`/`P2` is not longer.
fn declare_shorter_predicate(program: &mut ProgramInfo) -> PredicateSym {
    let shorter = PredicateSym::new("shorter", 3);
    let list_len_lt = PredicateSym::new("list_len_lt", 2);
    let list_len_le = PredicateSym::new("list_len_le", 2);

    // shorter(P1, P2, P) :- list_len_lt(P1, P2), P = P1.
    program.add_clause(Clause::new(
        Atom::new(shorter.clone(), vec![v("P1"), v("P2"), v("P")]),
        vec![
            Premise::Positive(Atom::new(list_len_lt.clone(), vec![v("P1"), v("P2")])),
            Premise::Equality(v("P"), v("P1")),
        ],
    ));
    // shorter(P1, P2, P) :- list_len_le(P2, P1), P = P2.
    program.add_clause(Clause::new(
        Atom::new(shorter.clone(), vec![v("P1"), v("P2"), v("P")]),
        vec![
            Premise::Positive(Atom::new(list_len_le.clone(), vec![v("P2"), v("P1")])),
            Premise::Equality(v("P"), v("P2")),
        ],
    ));
    shorter
}

#[test]
fn shortest_path_merge_keeps_the_shorter_route() {
    let edge = PredicateSym::new("edge", 2);
    let shortest_path = PredicateSym::new("shortest_path", 3);

    let mut program = ProgramInfo::new();
    program.declare(Declaration::new(edge.clone()));
    let shorter = declare_shorter_predicate(&mut program);
    program.declare(Declaration {
        predicate: shortest_path.clone(),
        index_strategy: IndexStrategy::Simple,
        merge: Some(MergeSpec::new(&shortest_path, vec![0, 1], 2, shorter).unwrap()),
        inclusion: Vec::new(),
        temporal: false,
        external: false,
        deferred: false,
        modes: Vec::new(),
    });

    // shortest_path(X, Y, Path) :- edge(X, Y) |> let Path = [Y, X].
    program.add_clause(
        Clause::new(
            Atom::new(shortest_path.clone(), vec![v("X"), v("Y"), v("Path")]),
            vec![Premise::Positive(Atom::new(edge.clone(), vec![v("X"), v("Y")]))],
        )
        .with_transform(vec![ClauseTransform::Let {
            target: Variable::new("Path"),
            expr: FuncExpr::ListCons(
                Box::new(FuncExpr::Term(v("Y"))),
                Box::new(FuncExpr::ListCons(
                    Box::new(FuncExpr::Term(v("X"))),
                    Box::new(FuncExpr::Term(Term::Const(Constant::ListNil))),
                )),
            ),
        }]),
    );

    // shortest_path(X, Z, NewPath) :- shortest_path(X, Y, Path), edge(Y, Z)
    //   |> let NewPath = cons(Z, Path).
    program.add_clause(
        Clause::new(
            Atom::new(shortest_path.clone(), vec![v("X"), v("Z"), v("NewPath")]),
            vec![
                Premise::Positive(Atom::new(shortest_path.clone(), vec![v("X"), v("Y"), v("Path")])),
                Premise::Positive(Atom::new(edge.clone(), vec![v("Y"), v("Z")])),
            ],
        )
        .with_transform(vec![ClauseTransform::Let {
            target: Variable::new("NewPath"),
            expr: FuncExpr::ListCons(Box::new(FuncExpr::Term(v("Z"))), Box::new(FuncExpr::Term(v("Path")))),
        }]),
    );

    program.strata = vec![vec![edge.clone()], vec![shortest_path.clone()]];

    let mut edge_store = SimpleStore::new(2);
    for (a, b) in [("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")] {
        edge_store.insert(vec![Constant::string(a), Constant::string(b)]);
    }

    let mut stores: StoreMap = HashMap::new();
    stores.insert(edge.clone(), Box::new(edge_store) as Box<dyn RemovableStore>);

    let externals = ExternalRegistry::new();
    let options = EvalOptions {
        limits: LimitsConfig::default(),
        eval_time: 0,
    };
    let cancel = CancelToken::new();
    let temporal_stores = TemporalStoreMap::new();

    bottom_up::eval_program(&program, &mut stores, &temporal_stores, &externals, &options, &cancel).unwrap();

    let store = stores.get(&shortest_path).unwrap();
    assert!(store.contains(&[Constant::string("a"), Constant::string("d"), path_of(&["d", "a"])]));
    assert!(!store.all().iter().any(|fact| {
        fact[0] == Constant::string("a") && fact[1] == Constant::string("d") && fact[2] == path_of(&["d", "c", "b", "a"])
    }));
}
