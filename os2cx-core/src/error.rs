use thiserror::Error;

use crate::directive::error::{ConfigurationError, StatementError};
use crate::evaluator::EvaluatorError;

/// Fatal conditions of a pipeline stage. None of them is recovered locally;
/// each aborts the stage and discards its partial results.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// A statement that could not be read as a directive, with the statement text.
    #[error("in line {statement}: {source}")]
    MalformedStatement {
        statement: String,
        source: StatementError,
    },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),
    #[error("Operation aborted")]
    Interrupted,
}

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InternalResult<T> = Result<T, Error>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}
