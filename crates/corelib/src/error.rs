//! Errors shared by the math layer.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("matrix is singular (determinant is zero)")]
    SingularMatrix,
}

pub type CoreResult<T> = Result<T, CoreError>;
