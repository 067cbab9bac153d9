// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Stages never translate one variant into another: whatever the inner
/// handler returns is what the caller sees.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Execution error: {0}")]
    Execution(String),
}

impl AppError {
    /// True for errors surfaced by the database driver
    pub fn is_database(&self) -> bool {
        matches!(self, AppError::Database(_))
    }

    /// Short variant name, used when reporting caught errors
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Domain(_) => "DomainError",
            AppError::Validation(_) => "ValidationError",
            AppError::Database(_) => "DatabaseError",
            AppError::Config(_) => "ConfigError",
            AppError::InvalidState(_) => "InvalidStateError",
            AppError::Execution(_) => "ExecutionError",
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String)

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_are_flagged() {
        assert!(AppError::Database("no such table: x".into()).is_database());
        assert!(!AppError::Validation("missing".into()).is_database());
        assert!(!AppError::Execution("boom".into()).is_database());
    }

    #[test]
    fn test_domain_errors_convert() {
        let err: AppError = crate::domain::DomainError::UnexpectedOutput {
            expected: "rows",
            found: "empty",
        }
        .into();
        assert_eq!(err.kind(), "DomainError");
        assert!(!err.is_database());
    }

    #[test]
    fn test_kind_and_display() {
        let err = AppError::Database("near \"INVALID\": syntax error".into());
        assert_eq!(err.kind(), "DatabaseError");
        assert_eq!(
            err.to_string(),
            "Database error: near \"INVALID\": syntax error"
        );
    }
}
