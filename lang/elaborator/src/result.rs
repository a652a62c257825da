use std::convert::Infallible;

use miette::Diagnostic;
use thiserror::Error;

use lumen_lang_ast::{Level, MetavarError, Print};

/// The result type specialized to elaboration errors.
pub type ElabResult<T = ()> = Result<T, Box<ElabError>>;

/// All errors that can be emitted while unifying universe levels and managing the elaboration state.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ElabError {
    #[error("Unknown universe level metavariable {mvar}")]
    #[diagnostic(code("E-001"))]
    UnknownLevelMVar { mvar: String },
    #[error("Unknown metavariable {mvar}")]
    #[diagnostic(code("E-002"))]
    UnknownExprMVar { mvar: String },
    #[error("Universe level metavariable {mvar} has already been assigned")]
    #[diagnostic(code("E-003"))]
    LevelMVarAlreadyAssigned { mvar: String },
    #[error("Cannot decrement universe level {level}")]
    #[diagnostic(code("E-004"), help("Only levels of the form `u+1` can be decremented"))]
    CannotDecrementLevel { level: String },
    /// Raised instead of answering `false` when a level constraint is stuck on a read-only metavariable
    /// and the caller asked for stuck constraints to be reported.
    #[error("Universe level constraint is stuck:\n  1: {lhs}\n  2: {rhs}\n")]
    #[diagnostic(code("E-005"))]
    DefEqStuck { lhs: String, rhs: String },
    #[error("Could not solve universe level constraint:\n  1: {lhs}\n  2: {rhs}\n")]
    #[diagnostic(
        code("E-006"),
        help("Consider adding explicit universe level annotations")
    )]
    UnresolvedLevelConstraint { lhs: String, rhs: String },
    #[error("Invalid elaborator configuration: {message}")]
    #[diagnostic(code("E-007"))]
    Config { message: String },
    #[error("An unexpected internal error occurred: {message}")]
    #[diagnostic(code("E-XXX"))]
    /// This error should not occur.
    /// Some internal invariant has been violated.
    Impossible { message: String },
}

impl ElabError {
    pub fn cannot_decrement(level: &Level) -> Box<Self> {
        Self::CannotDecrementLevel { level: level.print_to_string(None) }.into()
    }

    pub fn def_eq_stuck(lhs: &Level, rhs: &Level) -> Box<Self> {
        Self::DefEqStuck { lhs: lhs.print_to_string(None), rhs: rhs.print_to_string(None) }.into()
    }

    pub fn unresolved(lhs: &Level, rhs: &Level) -> Box<Self> {
        Self::UnresolvedLevelConstraint {
            lhs: lhs.print_to_string(None),
            rhs: rhs.print_to_string(None),
        }
        .into()
    }
}

impl From<MetavarError> for ElabError {
    fn from(err: MetavarError) -> Self {
        match err {
            MetavarError::UnknownLevelMVar(id) => Self::UnknownLevelMVar { mvar: id.to_string() },
            MetavarError::UnknownExprMVar(id) => Self::UnknownExprMVar { mvar: id.to_string() },
            MetavarError::LevelAlreadyAssigned(id) => {
                Self::LevelMVarAlreadyAssigned { mvar: id.to_string() }
            }
        }
    }
}

impl From<MetavarError> for Box<ElabError> {
    fn from(err: MetavarError) -> Self {
        Box::new(ElabError::from(err))
    }
}

impl From<Infallible> for ElabError {
    fn from(inf: Infallible) -> Self {
        match inf {}
    }
}

impl From<Infallible> for Box<ElabError> {
    fn from(inf: Infallible) -> Self {
        Box::new(ElabError::from(inf))
    }
}
