//! Shared setup: a migrated, seeded SQLite file in a temp directory and a
//! provider wrapper that counts opens and closes.

#![allow(dead_code)]

use async_trait::async_trait;
use querywrap_core::domain::{Row, SqlValue};
use querywrap_core::port::{Connection, ConnectionProvider};
use querywrap_core::Result;
use querywrap_infra_sqlite::{
    run_migrations, seed_sample_users, DatabaseConfig, SqliteConnectionProvider,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestDb {
    // Keeps the directory alive for the duration of the test
    _dir: TempDir,
    pub provider: Arc<CountingProvider>,
}

pub async fn seeded_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("users.db").display());
    let inner = SqliteConnectionProvider::new(&DatabaseConfig::new(url)).unwrap();

    run_migrations(&inner).await.unwrap();
    assert_eq!(seed_sample_users(&inner).await.unwrap(), 4);

    TestDb {
        _dir: dir,
        provider: Arc::new(CountingProvider::new(inner)),
    }
}

impl TestDb {
    /// Read through a fresh, uncounted connection
    pub async fn select(&self, sql: &str, params: &[SqlValue]) -> Vec<Row> {
        let mut conn = self.provider.inner.open().await.unwrap();
        let rows = conn.fetch_all(sql, params).await.unwrap();
        conn.close().await.unwrap();
        rows
    }
}

pub struct CountingProvider {
    inner: SqliteConnectionProvider,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl CountingProvider {
    fn new(inner: SqliteConnectionProvider) -> Self {
        Self {
            inner,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionProvider for CountingProvider {
    async fn open(&self) -> Result<Box<dyn Connection>> {
        let inner = self.inner.open().await?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingConnection {
            inner,
            closed: self.closed.clone(),
        }))
    }
}

struct CountingConnection {
    inner: Box<dyn Connection>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl Connection for CountingConnection {
    async fn fetch_all(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        self.inner.fetch_all(sql, params).await
    }

    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        self.inner.execute(sql, params).await
    }

    async fn begin(&mut self) -> Result<()> {
        self.inner.begin().await
    }

    async fn commit(&mut self) -> Result<()> {
        self.inner.commit().await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.inner.rollback().await
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.closed.fetch_add(1, Ordering::SeqCst);
        this.inner.close().await
    }
}
