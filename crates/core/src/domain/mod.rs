// Domain Layer - Values, rows and call arguments

pub mod error;
pub mod query;
pub mod value;

// Re-exports
pub use error::DomainError;
pub use query::{normalize_query, QueryOutput, QueryRequest};
pub use value::{Row, SqlValue};
