use miette::Diagnostic;
use thiserror::Error;

use lumen_lang_ast::MetavarError;
use lumen_lang_elaborator::ElabError;

pub type DriverResult<T = ()> = Result<T, DriverError>;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("The file is present, but does not contain the specified byte index.")]
    #[diagnostic(code("D-001"))]
    IndexTooLarge { given: usize, max: usize },
    #[error("The file is present, but does not contain the specified line index.")]
    #[diagnostic(code("D-002"))]
    LineTooLarge { given: usize, max: usize },
    #[error(
        "The given index is contained in the file, but is not a boundary of a UTF-8 code point."
    )]
    #[diagnostic(code("D-003"))]
    InvalidCharBoundary { given: usize },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Elab(#[from] Box<ElabError>),
}

impl From<ElabError> for DriverError {
    fn from(err: ElabError) -> Self {
        DriverError::Elab(Box::new(err))
    }
}

impl From<MetavarError> for DriverError {
    fn from(err: MetavarError) -> Self {
        DriverError::from(ElabError::from(err))
    }
}
