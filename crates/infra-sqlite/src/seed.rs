// Sample data for the users table

use crate::connection::SqliteConnectionProvider;
use crate::error::map_sqlx_error;
use querywrap_core::error::Result;
use sqlx::Connection;
use tracing::info;

/// `(name, email, age)` rows loaded by [`seed_sample_users`]
pub const SAMPLE_USERS: [(&str, &str, i64); 4] = [
    ("Alice Johnson", "alice@example.com", 28),
    ("Bob Smith", "bob@example.com", 35),
    ("Carol Davis", "carol@example.com", 22),
    ("David Wilson", "david@example.com", 41),
];

/// Replace the contents of `users` with [`SAMPLE_USERS`].
///
/// Runs in one transaction; returns the number of inserted rows.
pub async fn seed_sample_users(provider: &SqliteConnectionProvider) -> Result<u64> {
    let mut conn = provider.connect_raw().await?;
    let mut tx = conn.begin().await.map_err(map_sqlx_error)?;

    sqlx::query("DELETE FROM users")
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

    let mut inserted = 0;
    for (name, email, age) in SAMPLE_USERS {
        inserted += sqlx::query("INSERT INTO users (name, email, age) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(age)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();
    }

    tx.commit().await.map_err(map_sqlx_error)?;
    conn.close().await.map_err(map_sqlx_error)?;

    info!(users = inserted, "Sample users loaded");
    Ok(inserted)
}
