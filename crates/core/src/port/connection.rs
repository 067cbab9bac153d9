// Connection ports
// A connection is opened per call and owned by that call until closed.

use crate::domain::{Row, SqlValue};
use crate::error::Result;
use async_trait::async_trait;

/// An open link to the database
#[async_trait]
pub trait Connection: Send {
    /// Run a statement and collect every result row
    async fn fetch_all(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>>;

    /// Run a statement and return the number of affected rows
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Start a transaction
    async fn begin(&mut self) -> Result<()>;

    /// Commit the open transaction
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the open transaction
    async fn rollback(&mut self) -> Result<()>;

    /// Release the handle
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens a fresh connection to the configured database (no pooling)
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn open(&self) -> Result<Box<dyn Connection>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Counters shared by a mock provider and every connection it opened
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct ConnectionStats {
        pub opened: usize,
        pub closed: usize,
        pub begins: usize,
        pub commits: usize,
        pub rollbacks: usize,
        pub statements: Vec<String>,
    }

    #[derive(Debug, Clone, Default)]
    struct Failures {
        open: Option<String>,
        close: Option<String>,
        commit: Option<String>,
        rollback: Option<String>,
    }

    /// Mock provider. Statements starting with `INVALID` fail like a
    /// driver syntax error; everything else returns the configured rows.
    pub struct MockConnectionProvider {
        stats: Arc<Mutex<ConnectionStats>>,
        rows: Arc<Vec<Row>>,
        rows_affected: u64,
        failures: Failures,
    }

    impl MockConnectionProvider {
        pub fn new(rows: Vec<Row>) -> Self {
            Self {
                stats: Arc::new(Mutex::new(ConnectionStats::default())),
                rows: Arc::new(rows),
                rows_affected: 1,
                failures: Failures::default(),
            }
        }

        pub fn with_rows_affected(mut self, n: u64) -> Self {
            self.rows_affected = n;
            self
        }

        pub fn failing_open(mut self, message: impl Into<String>) -> Self {
            self.failures.open = Some(message.into());
            self
        }

        pub fn failing_close(mut self, message: impl Into<String>) -> Self {
            self.failures.close = Some(message.into());
            self
        }

        pub fn failing_commit(mut self, message: impl Into<String>) -> Self {
            self.failures.commit = Some(message.into());
            self
        }

        pub fn failing_rollback(mut self, message: impl Into<String>) -> Self {
            self.failures.rollback = Some(message.into());
            self
        }

        pub fn stats(&self) -> ConnectionStats {
            self.stats.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConnectionProvider for MockConnectionProvider {
        async fn open(&self) -> Result<Box<dyn Connection>> {
            if let Some(msg) = &self.failures.open {
                return Err(AppError::Database(msg.clone()));
            }
            self.stats.lock().unwrap().opened += 1;
            Ok(Box::new(MockConnection {
                stats: self.stats.clone(),
                rows: self.rows.clone(),
                rows_affected: self.rows_affected,
                failures: self.failures.clone(),
            }))
        }
    }

    pub struct MockConnection {
        stats: Arc<Mutex<ConnectionStats>>,
        rows: Arc<Vec<Row>>,
        rows_affected: u64,
        failures: Failures,
    }

    impl MockConnection {
        fn record(&self, sql: &str) -> Result<()> {
            self.stats.lock().unwrap().statements.push(sql.to_string());
            if sql.trim_start().starts_with("INVALID") {
                return Err(AppError::Database(
                    "near \"INVALID\": syntax error".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Connection for MockConnection {
        async fn fetch_all(&mut self, sql: &str, _params: &[SqlValue]) -> Result<Vec<Row>> {
            self.record(sql)?;
            Ok(self.rows.as_ref().clone())
        }

        async fn execute(&mut self, sql: &str, _params: &[SqlValue]) -> Result<u64> {
            self.record(sql)?;
            Ok(self.rows_affected)
        }

        async fn begin(&mut self) -> Result<()> {
            self.stats.lock().unwrap().begins += 1;
            Ok(())
        }

        async fn commit(&mut self) -> Result<()> {
            if let Some(msg) = &self.failures.commit {
                return Err(AppError::Database(msg.clone()));
            }
            self.stats.lock().unwrap().commits += 1;
            Ok(())
        }

        async fn rollback(&mut self) -> Result<()> {
            self.stats.lock().unwrap().rollbacks += 1;
            if let Some(msg) = &self.failures.rollback {
                return Err(AppError::Database(msg.clone()));
            }
            Ok(())
        }

        async fn close(self: Box<Self>) -> Result<()> {
            self.stats.lock().unwrap().closed += 1;
            if let Some(msg) = &self.failures.close {
                return Err(AppError::Database(msg.clone()));
            }
            Ok(())
        }
    }
}
