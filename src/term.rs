//! # Term & Substitution Layer
//!
//! Ground constants, variables, predicate symbols, atoms, and the
//! variable-or-constant `Term` wrapper rules are built from.
//!
//! Constants are a tagged sum type; equality is structural and every
//! variant carries a stable 64-bit hash via [`Constant::hash64`]. Lists
//! are right-nested cons cells, pairs/tuples of arity >= 3 desugar to
//! right-nested [`Constant::Pair`], and Map/Struct are set-like over
//! their entries — order never affects equality or hash.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A 64-bit float wrapper with a total order and a stable hash, needed
/// because `f64` implements neither `Eq` nor `Hash`.
#[derive(Debug, Clone, Copy)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}
impl Eq for OrderedFloat {}
impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}
impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Set-like key/value entries backing `Constant::Map` and `Constant::Struct`.
///
/// Equality and hashing ignore entry order: two field lists are equal
/// iff they contain the same (key, value) pairs, and the hash is the
/// XOR of each entry's own stable hash.
#[derive(Debug, Clone)]
pub struct Fields(pub Arc<Vec<(Constant, Constant)>>);

impl Fields {
    pub fn new(mut entries: Vec<(Constant, Constant)>) -> Self {
        entries.sort_by_key(|(k, v)| (k.hash64(), v.hash64()));
        Fields(Arc::new(entries))
    }

    pub fn entries(&self) -> &[(Constant, Constant)] {
        &self.0
    }

    pub fn get(&self, key: &Constant) -> Option<&Constant> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        self.0
            .iter()
            .all(|entry| other.0.iter().any(|o| o == entry))
    }
}
impl Eq for Fields {}
impl Hash for Fields {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self
            .0
            .iter()
            .fold(0u64, |acc, (k, v)| acc ^ (k.hash64().rotate_left(1) ^ v.hash64()));
        combined.hash(state);
    }
}

/// A ground value. Variants match spec §3's data model exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Hierarchical path beginning with `/`, e.g. `/alice/friends`.
    Name(Arc<str>),
    /// Signed 64-bit integer.
    Number(i64),
    /// 64-bit float.
    Float64(OrderedFloat),
    /// UTF-8 string.
    String(Arc<str>),
    /// Raw byte string.
    Bytes(Arc<[u8]>),
    /// Nanoseconds since the Unix epoch.
    Time(i64),
    /// Empty list.
    ListNil,
    /// Right-nested list cell.
    ListCons(Box<Constant>, Box<Constant>),
    /// A 2-tuple; arity >= 3 tuples desugar to right-nested pairs.
    Pair(Box<Constant>, Box<Constant>),
    /// Set-like mapping from key-constants to value-constants.
    Map(Fields),
    /// Set-like struct, distinguished from `Map` only by tag.
    Struct(Fields),
}

impl Constant {
    pub fn name(s: impl Into<Arc<str>>) -> Self {
        Constant::Name(s.into())
    }

    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Constant::String(s.into())
    }

    pub fn list_from(items: impl IntoIterator<Item = Constant>) -> Self {
        let mut items: Vec<_> = items.into_iter().collect();
        let mut acc = Constant::ListNil;
        while let Some(item) = items.pop() {
            acc = Constant::ListCons(Box::new(item), Box::new(acc));
        }
        acc
    }

    /// Build an arity-n tuple; arity 2 is a bare `Pair`, arity >= 3 desugars
    /// to a right-nested chain of pairs per spec §3.
    pub fn tuple_from(items: Vec<Constant>) -> Self {
        assert!(items.len() >= 2, "tuple requires at least two elements");
        let mut iter = items.into_iter().rev();
        let mut acc = iter.next().expect("checked above");
        for item in iter {
            acc = Constant::Pair(Box::new(item), Box::new(acc));
        }
        acc
    }

    pub fn as_list(&self) -> Option<Vec<&Constant>> {
        let mut out = Vec::new();
        let mut cur = self;
        loop {
            match cur {
                Constant::ListNil => return Some(out),
                Constant::ListCons(head, tail) => {
                    out.push(head.as_ref());
                    cur = tail.as_ref();
                }
                _ => return None,
            }
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Constant::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Constant::Float64(f) => Some(f.0),
            Constant::Number(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<i64> {
        match self {
            Constant::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// A stable 64-bit hash: deterministic within and across process runs,
    /// since `DefaultHasher::new()` always starts from the same fixed key.
    pub fn hash64(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Name(n) => write!(f, "{n}"),
            Constant::Number(n) => write!(f, "{n}"),
            Constant::Float64(x) => write!(f, "{}", x.0),
            Constant::String(s) => write!(f, "{s:?}"),
            Constant::Bytes(b) => write!(f, "b{b:?}"),
            Constant::Time(t) => write!(f, "@{t}"),
            Constant::ListNil => write!(f, "[]"),
            Constant::ListCons(..) => {
                write!(f, "[")?;
                if let Some(items) = self.as_list() {
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{item}")?;
                    }
                }
                write!(f, "]")
            }
            Constant::Pair(a, b) => write!(f, "({a}, {b})"),
            Constant::Map(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.entries().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Constant::Struct(fields) => {
                write!(f, "struct{{")?;
                for (i, (k, v)) in fields.entries().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A variable symbol. `_` is the wildcard, which never binds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable(pub Arc<str>);

impl Variable {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Variable(name.into())
    }

    pub fn wildcard() -> Self {
        Variable(Arc::from("_"))
    }

    pub fn is_wildcard(&self) -> bool {
        &*self.0 == "_"
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A variable-or-constant argument position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Var(Variable),
    Const(Constant),
}

impl Term {
    pub fn is_ground(&self) -> bool {
        matches!(self, Term::Const(_))
    }

    pub fn as_const(&self) -> Option<&Constant> {
        match self {
            Term::Const(c) => Some(c),
            Term::Var(_) => None,
        }
    }
}

impl From<Constant> for Term {
    fn from(c: Constant) -> Self {
        Term::Const(c)
    }
}
impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Term::Var(v)
    }
}

/// The prefix reserved for synthetic delta-predicates (§3 invariants).
/// Delta predicate symbols are never exposed outside the engine.
pub const DELTA_PREFIX: &str = "$delta$";

/// A predicate symbol: name plus fixed arity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredicateSym {
    pub name: Arc<str>,
    pub arity: usize,
}

impl PredicateSym {
    pub fn new(name: impl Into<Arc<str>>, arity: usize) -> Self {
        PredicateSym {
            name: name.into(),
            arity,
        }
    }

    pub fn is_delta(&self) -> bool {
        self.name.starts_with(DELTA_PREFIX)
    }

    /// The synthetic delta-predicate standing for "newly derived facts of
    /// this predicate in the previous round" (§4.5).
    pub fn delta_of(&self) -> PredicateSym {
        PredicateSym::new(format!("{DELTA_PREFIX}{}", self.name), self.arity)
    }
}

impl fmt::Display for PredicateSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A predicate symbol applied to a fixed-arity argument list. A `Fact` is
/// an atom whose arguments are all `Term::Const`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub predicate: PredicateSym,
    pub args: Vec<Term>,
}

impl Atom {
    pub fn new(predicate: PredicateSym, args: Vec<Term>) -> Self {
        debug_assert_eq!(predicate.arity, args.len());
        Atom { predicate, args }
    }

    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }

    pub fn as_fact(&self) -> Option<Vec<&Constant>> {
        if self.is_ground() {
            Some(self.args.iter().map(|t| t.as_const().unwrap()).collect())
        } else {
            None
        }
    }

    /// A stable hash over the atom's constant arguments, used to key the
    /// temporal store's per-atom interval index. Only meaningful for
    /// ground atoms.
    pub fn atom_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.predicate.hash(&mut hasher);
        for arg in &self.args {
            if let Term::Const(c) = arg {
                c.hash64().hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match arg {
                Term::Var(v) => write!(f, "{v}")?,
                Term::Const(c) => write!(f, "{c}")?,
            }
        }
        write!(f, ")")
    }
}

/// One argument position's declared direction (spec §3 / §4.6): `In`
/// positions must already be ground when a goal atom is solved against
/// this mode vector, `Out` positions are produced by the solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    In,
    Out,
}
