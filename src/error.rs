//! Crate-wide error taxonomy (spec §7): `InvalidArgument` for bad inputs,
//! `LogicError` for API misuse, `RuntimeError` for recoverable user-caused
//! failures discovered mid-operation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BayesNetError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("logic error: {0}")]
    LogicError(String),
    #[error("runtime error: {0}")]
    RuntimeError(String),
}

pub type Result<T> = std::result::Result<T, BayesNetError>;
