//! Error types for the checked arithmetic layer and table loading.
//!
//! The default arithmetic API never returns these: it saturates or returns the
//! documented legacy value. Only the `checked_*` functions and the table/config
//! plumbing surface a [`FixedError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixedError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("{operation} is undefined for a zero argument")]
    DomainError { operation: &'static str },

    #[error("{operation} result does not fit in 32 bits")]
    Overflow { operation: &'static str },

    #[error("reciprocal table violates its contract: {reason}")]
    InvalidTable { reason: String },

    #[error("unsupported table file: {reason}")]
    TableFormat { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),
}

pub type Result<T> = std::result::Result<T, FixedError>;
