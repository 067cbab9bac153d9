// SQLite transaction control on a single connection
// Plain statements: the Connection port owns begin/commit/rollback.

use crate::error::map_sqlx_error;
use querywrap_core::error::Result;
use sqlx::SqliteConnection;

pub(crate) async fn begin(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query("BEGIN")
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

pub(crate) async fn commit(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query("COMMIT")
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

pub(crate) async fn rollback(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query("ROLLBACK")
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}
