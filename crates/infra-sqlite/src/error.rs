// sqlx::Error -> AppError

use querywrap_core::error::AppError;

/// Convert a driver error into `AppError::Database`, keeping the SQLite
/// message and naming the common result codes
pub fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            // SQLite error codes: https://www.sqlite.org/rescode.html
            match db_err.code() {
                Some(code) => match code.as_ref() {
                    "2067" | "1555" => AppError::Database(format!(
                        "Unique constraint violation: {}",
                        db_err.message()
                    )),
                    "787" | "3850" => AppError::Database(format!(
                        "Foreign key constraint violation: {}",
                        db_err.message()
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                    _ => AppError::Database(db_err.message().to_string()),
                },
                None => AppError::Database(db_err.message().to_string()),
            }
        }
        sqlx::Error::Configuration(e) => AppError::Config(e.to_string()),
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        _ => {
            // Connection, IO, protocol, decode errors
            AppError::Database(err.to_string())
        }
    }
}
