// Database configuration

use std::time::Duration;

/// Default database location (relative to the working directory)
pub const DEFAULT_DATABASE_URL: &str = "sqlite:users.db";

/// How to reach the database file
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `sqlite:path`, `sqlite://path`, a bare path, or `sqlite::memory:`
    pub database_url: String,

    /// How long a statement waits on a locked database
    pub busy_timeout: Duration,

    /// Create the file on first open
    pub create_if_missing: bool,
}

impl DatabaseConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            busy_timeout: Duration::from_secs(5),
            create_if_missing: true,
        }
    }
}
