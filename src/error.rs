use thiserror::Error;

use crate::parser::ParseError;

/// Shape violations detected by the engine.
///
/// These describe constructs the analysis does not support, never runtime
/// failures of the analysed program. Each variant carries the offending
/// construct rendered in surface syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unsupported operation `{0}`: left operand of `*` must be a constant")]
    UnsupportedOperation(String),

    #[error("unsupported comparison `{0}`")]
    UnsupportedComparison(String),

    #[error("unsupported if condition `{0}`")]
    UnsupportedPattern(String),

    #[error("nested if inside `if {0}` is not supported")]
    UnsupportedNesting(String),

    #[error("path limit of {limit} exceeded")]
    PathLimitExceeded { limit: usize },
}

/// Any failure while checking program text end to end.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
