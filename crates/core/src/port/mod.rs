// Port Layer - Interfaces for external dependencies

pub mod connection;
pub mod id_provider; // For deterministic call ids in tests
pub mod time_provider;

// Re-exports
pub use connection::{Connection, ConnectionProvider};
pub use id_provider::IdProvider;
pub use time_provider::TimeProvider;
