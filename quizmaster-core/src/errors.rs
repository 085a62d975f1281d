use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("invalid input: {0}")]
    Invalid(&'static str),
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),
    #[error("storage error: {0}")]
    Storage(&'static str),
}
