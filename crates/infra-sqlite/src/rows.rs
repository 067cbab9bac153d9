// Parameter binding and row decoding

use crate::error::map_sqlx_error;
use querywrap_core::domain::{Row, SqlValue};
use querywrap_core::error::Result;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row as _, Sqlite, TypeInfo, ValueRef};

pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Build a query with every param bound positionally
pub(crate) fn prepare<'q>(sql: &'q str, params: &'q [SqlValue]) -> SqliteQuery<'q> {
    params
        .iter()
        .fold(sqlx::query(sql), |query, param| match param {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Integer(v) => query.bind(*v),
            SqlValue::Real(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
            SqlValue::Blob(v) => query.bind(v.as_slice()),
        })
}

/// Decode a row by the storage class of each value (not the declared type)
pub(crate) fn decode_row(row: &SqliteRow) -> Result<Row> {
    let values = (0..row.len())
        .map(|index| decode_value(row, index))
        .collect::<Result<Vec<_>>>()?;
    Ok(Row::new(values))
}

fn decode_value(row: &SqliteRow, index: usize) -> Result<SqlValue> {
    let raw = row.try_get_raw(index).map_err(map_sqlx_error)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage_class = raw.type_info().name().to_string();

    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => SqlValue::Integer(
            row.try_get_unchecked::<i64, _>(index)
                .map_err(map_sqlx_error)?,
        ),
        "REAL" | "NUMERIC" => SqlValue::Real(
            row.try_get_unchecked::<f64, _>(index)
                .map_err(map_sqlx_error)?,
        ),
        "BLOB" => SqlValue::Blob(
            row.try_get_unchecked::<Vec<u8>, _>(index)
                .map_err(map_sqlx_error)?,
        ),
        _ => SqlValue::Text(
            row.try_get_unchecked::<String, _>(index)
                .map_err(map_sqlx_error)?,
        ),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Connection;

    #[tokio::test]
    async fn test_decode_every_storage_class() {
        let mut conn = sqlx::SqliteConnection::connect("sqlite::memory:")
            .await
            .unwrap();

        let params = vec![
            SqlValue::Integer(42),
            SqlValue::Real(1.5),
            SqlValue::from("text"),
            SqlValue::Blob(vec![1, 2, 3]),
            SqlValue::Null,
        ];
        let rows = prepare("SELECT ?, ?, ?, ?, ?", &params)
            .fetch_all(&mut conn)
            .await
            .unwrap();

        let row = decode_row(&rows[0]).unwrap();
        assert_eq!(row.values(), params.as_slice());
    }

    #[tokio::test]
    async fn test_decode_literals() {
        let mut conn = sqlx::SqliteConnection::connect("sqlite::memory:")
            .await
            .unwrap();

        let rows = sqlx::query("SELECT 1, 'a', NULL, CURRENT_TIMESTAMP")
            .fetch_all(&mut conn)
            .await
            .unwrap();

        let row = decode_row(&rows[0]).unwrap();
        assert_eq!(row.get_i64(0).unwrap(), 1);
        assert_eq!(row.get_str(1).unwrap(), "a");
        assert!(row.get(2).unwrap().is_null());
        assert!(row.get_str(3).is_ok());
    }
}
