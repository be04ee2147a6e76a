//! Error and warning model (spec §7).
//!
//! Recoverable failures (`TranslationFailure`, `CompletionFailure`,
//! `SimplificationFailure`) propagate through `Result`/`?`, grounded in
//! `teiesti-anthem-next`'s `thiserror`-derived task error enums. `LogicFailure`
//! (a broken internal invariant, not a user error) panics through the
//! adapted panic hook in [crate::panic], mirroring `clausy`'s
//! `debug_assert!`/`unreachable!` + custom-hook discipline, since an internal
//! contract violation is a bug to surface loudly, not a value to propagate.

use std::fmt;

use thiserror::Error;

/// A source location, carried by every [TranslationFailure] (spec §6 source-AST boundary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Location {
    pub(crate) file: String,
    pub(crate) line_start: usize,
    pub(crate) col_start: usize,
    pub(crate) line_end: usize,
    pub(crate) col_end: usize,
}

impl Location {
    pub(crate) fn unknown() -> Self {
        Self {
            file: String::from("<unknown>"),
            line_start: 0,
            col_start: 0,
            line_end: 0,
            col_end: 0,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line_start, self.col_start)
    }
}

/// Unsupported source construct or violated precondition; fatal for the
/// current rule/input, never for the whole program.
#[derive(Debug, Error)]
pub(crate) enum TranslationFailure {
    #[error("{location} unsupported operator `{operator}` in choose-value construction")]
    UnsupportedOperator { location: Location, operator: String },

    #[error("{location} head aggregate must have no guards, exactly one element, no condition, and no negation")]
    UnsupportedHeadAggregate { location: Location },

    #[error("{location} double negation is not permitted in a rule head")]
    DoubleNegationInHead { location: Location },

    #[error("{location} {message}")]
    Other { location: Location, message: String },
}

impl TranslationFailure {
    pub(crate) fn location(&self) -> &Location {
        match self {
            TranslationFailure::UnsupportedOperator { location, .. }
            | TranslationFailure::UnsupportedHeadAggregate { location }
            | TranslationFailure::DoubleNegationInHead { location }
            | TranslationFailure::Other { location, .. } => location,
        }
    }
}

/// Raised by [crate::completion] when a contract required for grouping by
/// head predicate is violated.
#[derive(Debug, Error)]
pub(crate) enum CompletionFailure {
    #[error("scoped formula's top-level connective is not Implies, an integrity-constraint negation, or a fact")]
    NotAConditional,

    #[error("conditional's consequent does not normalize to a single predicate atom")]
    ConsequentNotAtom,
}

/// Raised by [crate::simplify] when a rewrite rule's precondition is violated
/// by a malformed input (should not occur for well-formed formulas).
#[derive(Debug, Error)]
pub(crate) enum SimplificationFailure {
    #[error("equality helper encountered formulas of incompatible shape")]
    IncompatibleShape,
}

/// Raised by [crate::hidden] when a hidden predicate's completed definition
/// does not match one of the four replacement-pattern shapes (spec §4.7 step 2).
#[derive(Debug, Error)]
pub(crate) enum HiddenEliminationFailure {
    #[error("hidden predicate `{name}`'s completed definition has an unsupported shape for a replacement pattern")]
    UnsupportedDefinitionShape { name: String },
}

/// Non-fatal diagnostics (spec §7): logged through [crate::driver::Logger], never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Warning {
    /// A `#show` statement names a predicate that is never otherwise used.
    UnusedShow(String),
    /// An `#external` statement names a predicate that never occurs in a rule.
    UnmatchedExternal(String),
    /// Hidden-predicate elimination skipped a predicate because its definition
    /// circularly refers to itself (spec §4.7 step 3).
    CircularHiddenPredicateSkipped(String),
    /// Negation or a choice rule raised the output semantics to the logic of
    /// here-and-there (spec §4.9).
    SemanticsDowngradedToHereAndThere,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::UnusedShow(name) => write!(f, "#show statement for `{name}` never matches a used predicate"),
            Warning::UnmatchedExternal(name) => {
                write!(f, "#external statement for `{name}` never matches a used predicate")
            }
            Warning::CircularHiddenPredicateSkipped(name) => {
                write!(f, "hidden predicate `{name}` has a circular definition; elimination skipped")
            }
            Warning::SemanticsDowngradedToHereAndThere => {
                write!(f, "negation or a choice rule requires the logic of here-and-there")
            }
        }
    }
}

/// Panics to signal an internal invariant violation (spec §7 `LogicFailure`).
///
/// Unlike [TranslationFailure], this never carries a source location: it
/// indicates a bug in this crate, not a malformed user program.
macro_rules! logic_failure {
    ($($arg:tt)*) => {
        panic!("logic failure: {}", format!($($arg)*))
    };
}
pub(crate) use logic_failure;
