// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Column index {index} out of range (row has {len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unexpected output: expected {expected}, found {found}")]
    UnexpectedOutput {
        expected: &'static str,
        found: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, DomainError>;
