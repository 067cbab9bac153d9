// Schema migrations, tracked in `schema_version`

use crate::connection::SqliteConnectionProvider;
use crate::error::map_sqlx_error;
use querywrap_core::error::Result;
use sqlx::{Connection, SqliteConnection};
use tracing::info;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Every migration, ascending by version
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "users table",
    sql: include_str!("../migrations/001_create_users.sql"),
}];

/// Bring the schema up to the latest version.
///
/// Each pending migration runs in its own transaction; already applied
/// versions are skipped, so running this twice is harmless.
pub async fn run_migrations(provider: &SqliteConnectionProvider) -> Result<()> {
    let mut conn = provider.connect_raw().await?;

    let current = current_version(&mut conn).await?;
    info!(current_version = current, "Checking database schema");

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!(
            version = migration.version,
            "Applying migration {:03}: {}", migration.version, migration.name
        );
        apply(&mut conn, migration.sql).await?;
    }

    conn.close().await.map_err(map_sqlx_error)?;
    Ok(())
}

async fn current_version(conn: &mut SqliteConnection) -> Result<i64> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
    )
    .fetch_one(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    if tracked == 0 {
        return Ok(0);
    }

    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(version.unwrap_or(0))
}

async fn apply(conn: &mut SqliteConnection, sql: &str) -> Result<()> {
    let mut tx = conn.begin().await.map_err(map_sqlx_error)?;
    for statement in statements(sql) {
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
    }
    tx.commit().await.map_err(map_sqlx_error)
}

/// Split a script on `;`, dropping `--` comment lines and empty statements
fn statements(sql: &str) -> impl Iterator<Item = String> + '_ {
    sql.split(';')
        .map(|chunk| {
            chunk
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|statement| !statement.is_empty())
}
