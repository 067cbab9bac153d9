// SQLite Connection Setup

use crate::config::DatabaseConfig;
use crate::error::map_sqlx_error;
use crate::rows::{decode_row, prepare};
use crate::transaction;
use async_trait::async_trait;
use querywrap_core::domain::{Row, SqlValue};
use querywrap_core::error::Result;
use querywrap_core::port::{Connection, ConnectionProvider};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection as _};
use std::str::FromStr;
use tracing::debug;

/// Opens one new SQLite connection per call (no pool)
#[derive(Debug, Clone)]
pub struct SqliteConnectionProvider {
    options: SqliteConnectOptions,
}

impl SqliteConnectionProvider {
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(map_sqlx_error)?
            .busy_timeout(config.busy_timeout)
            .create_if_missing(config.create_if_missing)
            .foreign_keys(true);

        Ok(Self { options })
    }

    /// Raw driver connection, for schema and seed work inside this crate
    pub(crate) async fn connect_raw(&self) -> Result<SqliteConnection> {
        self.options.connect().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl ConnectionProvider for SqliteConnectionProvider {
    async fn open(&self) -> Result<Box<dyn Connection>> {
        let conn = self.connect_raw().await?;
        Ok(Box::new(SqliteQueryConnection { conn }))
    }
}

/// A single open SQLite connection behind the Connection port
pub struct SqliteQueryConnection {
    conn: SqliteConnection,
}

#[async_trait]
impl Connection for SqliteQueryConnection {
    async fn fetch_all(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let rows = prepare(sql, params)
            .fetch_all(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        debug!(rows = rows.len(), "Statement returned rows");
        rows.iter().map(decode_row).collect()
    }

    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let result = prepare(sql, params)
            .execute(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn begin(&mut self) -> Result<()> {
        transaction::begin(&mut self.conn).await
    }

    async fn commit(&mut self) -> Result<()> {
        transaction::commit(&mut self.conn).await
    }

    async fn rollback(&mut self) -> Result<()> {
        transaction::rollback(&mut self.conn).await
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn.close().await.map_err(map_sqlx_error)
    }
}
