//! End-to-end user operations against a real SQLite file

mod common;

use common::seeded_db;
use querywrap_core::application::{QueryCache, RetryPolicy, UserQueries};
use querywrap_core::domain::SqlValue;
use querywrap_core::AppError;
use std::sync::Arc;
use std::time::Duration;

fn user_queries(db: &common::TestDb) -> (UserQueries, Arc<QueryCache>) {
    let cache = Arc::new(QueryCache::new());
    let policy = RetryPolicy::new(3, Duration::from_millis(10)).unwrap();
    (
        UserQueries::new(db.provider.clone(), cache.clone(), policy),
        cache,
    )
}

#[tokio::test]
async fn test_fetch_all_users_returns_seeded_rows() {
    let db = seeded_db().await;
    let (queries, _) = user_queries(&db);

    let users = queries.fetch_all_users("SELECT * FROM users").await.unwrap();

    assert_eq!(users.len(), 4);
    assert_eq!(users[0].get_str(1).unwrap(), "Alice Johnson");
    assert_eq!(users[3].get_i64(3).unwrap(), 41);
    assert_eq!((db.provider.opened(), db.provider.closed()), (1, 1));
}

#[tokio::test]
async fn test_execute_query_binds_params() {
    let db = seeded_db().await;
    let (queries, _) = user_queries(&db);

    let young = queries
        .execute_query(
            "SELECT name FROM users WHERE age < ? ORDER BY age",
            vec![SqlValue::Integer(30)],
        )
        .await
        .unwrap();

    let names: Vec<&str> = young.iter().map(|r| r.get_str(0).unwrap()).collect();
    assert_eq!(names, vec!["Carol Davis", "Alice Johnson"]);
}

#[tokio::test]
async fn test_update_user_changes_one_row() {
    let db = seeded_db().await;
    let (queries, _) = user_queries(&db);

    let affected = queries
        .update_user(
            "UPDATE users SET age = ? WHERE name = ?",
            vec![SqlValue::Integer(29), SqlValue::from("Alice Johnson")],
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let rows = db
        .select(
            "SELECT age FROM users WHERE name = ?",
            &[SqlValue::from("Alice Johnson")],
        )
        .await;
    assert_eq!(rows[0].get_i64(0).unwrap(), 29);
}

#[tokio::test]
async fn test_malformed_query_surfaces_database_error() {
    let db = seeded_db().await;
    let (queries, _) = user_queries(&db);

    let err = queries.fetch_all_users("INVALID SQL QUERY").await.unwrap_err();

    assert!(matches!(err, AppError::Database(ref m) if m.contains("syntax error")));
    assert_eq!(db.provider.closed(), 1);
}

#[tokio::test]
async fn test_missing_table_surfaces_database_error() {
    let db = seeded_db().await;
    let (queries, _) = user_queries(&db);

    let err = queries
        .fetch_all_users("SELECT * FROM non_existent_table")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Database(ref m) if m.contains("no such table")));
}

#[tokio::test]
async fn test_update_violating_unique_email_is_rolled_back() {
    let db = seeded_db().await;
    let (queries, _) = user_queries(&db);

    let err = queries
        .update_user(
            "UPDATE users SET email = ?",
            vec![SqlValue::from("same@example.com")],
        )
        .await
        .unwrap_err();
    assert!(err.is_database());

    let rows = db
        .select("SELECT COUNT(*) FROM users WHERE email LIKE '%@example.com'", &[])
        .await;
    assert_eq!(rows[0].get_i64(0).unwrap(), 4);
}

#[tokio::test]
async fn test_get_user_by_id_and_update_email() {
    let db = seeded_db().await;
    let (queries, _) = user_queries(&db);

    let user = queries.get_user_by_id(1).await.unwrap().unwrap();
    assert_eq!(user.get_str(2).unwrap(), "alice@example.com");

    let affected = queries
        .update_user_email(1, "Crawford_Cartwright@hotmail.com")
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let user = queries.get_user_by_id(1).await.unwrap().unwrap();
    assert_eq!(user.get_str(2).unwrap(), "Crawford_Cartwright@hotmail.com");

    assert!(queries.get_user_by_id(999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_email_to_taken_address_keeps_original() {
    let db = seeded_db().await;
    let (queries, _) = user_queries(&db);

    let err = queries
        .update_user_email(2, "alice@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(ref m) if m.contains("UNIQUE")));

    let bob = queries.get_user_by_id(2).await.unwrap().unwrap();
    assert_eq!(bob.get_str(2).unwrap(), "bob@example.com");
}

#[tokio::test]
async fn test_fetch_users_with_retry() {
    let db = seeded_db().await;
    let (queries, _) = user_queries(&db);

    let users = queries.fetch_users_with_retry().await.unwrap();
    assert_eq!(users.len(), 4);
}

#[tokio::test]
async fn test_cache_returns_identical_result_and_skips_database() {
    let db = seeded_db().await;
    let (queries, cache) = user_queries(&db);

    let first = queries.fetch_users_with_cache("SELECT * FROM users").await.unwrap();

    // A write after the first call is not visible through the cache
    queries
        .update_user_email(1, "changed@example.com")
        .await
        .unwrap();

    let second = queries.fetch_users_with_cache("SELECT * FROM users").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second[0].get_str(2).unwrap(), "alice@example.com");
    assert_eq!(cache.len().await, 1);

    // Different text, different slot
    let fresh = queries.fetch_users_with_cache("SELECT *  FROM users").await.unwrap();
    assert!(!Arc::ptr_eq(&first, &fresh));
    assert_eq!(fresh[0].get_str(2).unwrap(), "changed@example.com");
}
