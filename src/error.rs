//! Error types for the deltalog core (spec §7).
//!
//! Unification failure is deliberately NOT a variant here — per §4.1/§4.3
//! it is a local, silent "zero solutions for this branch" outcome, never
//! a propagated error. Every other kind in §7 gets its own variant so
//! callers can match on exactly what went wrong.

use crate::term::{Atom, PredicateSym};
use thiserror::Error;

/// Errors the core can raise while evaluating a program.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// An external callback was registered for a predicate lacking the
    /// `external` flag, or lacking a declaration entirely.
    #[error("predicate {predicate} cannot take an external callback: {reason}")]
    InvalidExternalRegistration {
        predicate: PredicateSym,
        reason: String,
    },

    /// The functional expression evaluator failed on ground arguments.
    #[error("functional evaluation failed in {context}: {message}")]
    FunctionalEvalFailed { context: String, message: String },

    /// A built-in predicate's decider returned an error (as opposed to
    /// simply failing to produce solutions).
    #[error("built-in predicate {predicate} failed: {message}")]
    BuiltinFailed {
        predicate: PredicateSym,
        message: String,
    },

    /// The created-fact cap for this `eval` call was exceeded.
    #[error(
        "created-fact limit exceeded while evaluating clause for {predicate}: {created} created, limit {limit}"
    )]
    CreatedFactLimitExceeded {
        predicate: PredicateSym,
        created: usize,
        limit: usize,
    },

    /// A single clause produced more intermediate substitutions than the
    /// configured per-clause cap.
    #[error(
        "intermediate-solution limit exceeded for clause heading {predicate}: {produced} produced, limit {limit}"
    )]
    IntermediateSolutionLimitExceeded {
        predicate: PredicateSym,
        produced: usize,
        limit: usize,
    },

    /// A temporal literal was encountered but no temporal store is
    /// configured for this evaluation.
    #[error("temporal literal for {predicate} requires a temporal store, none configured")]
    NoTemporalStoreConfigured { predicate: PredicateSym },

    /// A temporal bound variable was still unbound when the engine tried
    /// to resolve a rule head's interval.
    #[error("unresolved temporal bound variable {variable} while resolving head time for {predicate}")]
    UnresolvedTemporalVariable {
        predicate: PredicateSym,
        variable: String,
    },

    /// The per-(predicate, atom-hash) interval cap was exceeded.
    #[error("interval limit exceeded for {predicate} atom: {count} intervals, limit {limit}")]
    IntervalLimitExceeded {
        predicate: PredicateSym,
        count: usize,
        limit: usize,
    },

    /// The lattice merge step only supports a single target column today.
    #[error("merge predicate for {predicate} targets more than one column, which is unsupported")]
    MergeMultiTargetUnsupported { predicate: PredicateSym },

    /// A top-down goal's input (`+`) position wasn't ground, violating
    /// the caller-declared mode vector (spec §4.6).
    #[error("top-down goal for {predicate} violates its declared mode: position {position} is an input but isn't ground")]
    TopDownModeViolation {
        predicate: PredicateSym,
        position: usize,
    },

    /// Evaluation was canceled via a [`crate::cancel::CancelToken`].
    #[error("evaluation canceled")]
    Canceled,

    /// Several independent failures occurred in one batch (e.g. multiple
    /// transform emissions in the same round) and are reported together.
    #[error("{} errors occurred: {}", .0.len(), join_errors(.0))]
    Composite(Vec<EvalError>),

    /// Catch-all for inclusion/type-check failures, carrying the
    /// per-alternative diagnostics (spec §4.10).
    #[error("fact {fact} failed inclusion check: {reasons:?}")]
    InclusionCheckFailed { fact: Atom, reasons: Vec<String> },
}

fn join_errors(errors: &[EvalError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl EvalError {
    pub fn composite(errors: Vec<EvalError>) -> EvalError {
        EvalError::Composite(errors)
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
