// querywrap Infrastructure - SQLite Adapter
// Implements: ConnectionProvider / Connection, schema migrations, sample data

mod config;
mod connection;
mod error;
mod migration;
mod rows;
mod seed;
mod transaction;

pub use config::{DatabaseConfig, DEFAULT_DATABASE_URL};
pub use connection::{SqliteConnectionProvider, SqliteQueryConnection};
pub use error::map_sqlx_error;
pub use migration::run_migrations;
pub use seed::{seed_sample_users, SAMPLE_USERS};

// Note: sqlx::Error conversion is handled by map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
