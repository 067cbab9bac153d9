// Demo scenarios, run in order against the seeded users table

use crate::output::{Printer, USER_COLUMNS};
use anyhow::{Context, Result};
use querywrap_core::application::UserQueries;
use querywrap_core::domain::SqlValue;
use std::sync::Arc;
use tracing::warn;

const ALL_USERS: &str = "SELECT * FROM users";
const NEW_EMAIL: &str = "Crawford_Cartwright@hotmail.com";

pub async fn run_all(queries: &UserQueries, printer: &Printer) -> Result<()> {
    logged_queries(queries, printer).await?;
    user_by_id(queries, printer).await?;
    retried_fetch(queries, printer).await?;
    cached_fetch(queries, printer).await?;
    Ok(())
}

/// Logging + connection stages, including the failures they report
async fn logged_queries(queries: &UserQueries, printer: &Printer) -> Result<()> {
    printer.heading("Fetch all users");
    let users = queries
        .fetch_all_users(ALL_USERS)
        .await
        .context("fetch_all_users failed")?;
    printer.rows(USER_COLUMNS, &users)?;

    printer.heading("Users younger than 30");
    let young = queries
        .execute_query(
            "SELECT name, age FROM users WHERE age < ?",
            vec![SqlValue::Integer(30)],
        )
        .await
        .context("execute_query failed")?;
    printer.rows(&["name", "age"], &young)?;

    printer.heading("Update Alice Johnson's age");
    let affected = queries
        .update_user(
            "UPDATE users SET age = ? WHERE name = ?",
            vec![SqlValue::Integer(29), SqlValue::from("Alice Johnson")],
        )
        .await
        .context("update_user failed")?;
    printer.affected(affected);

    printer.heading("Malformed SQL");
    report_failure(queries.fetch_all_users("INVALID SQL QUERY").await, printer);

    printer.heading("Missing table");
    report_failure(
        queries
            .fetch_all_users("SELECT * FROM non_existent_table")
            .await,
        printer,
    );

    Ok(())
}

/// Connection + transaction stages on built-in statements
async fn user_by_id(queries: &UserQueries, printer: &Printer) -> Result<()> {
    printer.heading("Get user by id");
    let user = queries
        .get_user_by_id(1)
        .await
        .context("get_user_by_id failed")?;
    printer.rows(USER_COLUMNS, user.as_slice())?;

    printer.heading("Update user email");
    let affected = queries
        .update_user_email(1, NEW_EMAIL)
        .await
        .context("update_user_email failed")?;
    printer.affected(affected);

    let user = queries
        .get_user_by_id(1)
        .await
        .context("get_user_by_id failed")?;
    printer.rows(USER_COLUMNS, user.as_slice())?;

    Ok(())
}

async fn retried_fetch(queries: &UserQueries, printer: &Printer) -> Result<()> {
    printer.heading("Fetch users with retry");
    let users = queries
        .fetch_users_with_retry()
        .await
        .context("fetch_users_with_retry failed after every attempt")?;
    printer.rows(USER_COLUMNS, &users)?;
    Ok(())
}

async fn cached_fetch(queries: &UserQueries, printer: &Printer) -> Result<()> {
    printer.heading("Fetch users with cache (first call)");
    let first = queries
        .fetch_users_with_cache(ALL_USERS)
        .await
        .context("fetch_users_with_cache failed")?;
    printer.rows(USER_COLUMNS, &first)?;

    printer.heading("Fetch users with cache (second call)");
    let second = queries
        .fetch_users_with_cache(ALL_USERS)
        .await
        .context("fetch_users_with_cache failed")?;
    printer.rows(USER_COLUMNS, &second)?;

    if Arc::ptr_eq(&first, &second) {
        printer.note("second call was served from the cache");
    } else {
        warn!("Cached call returned a fresh result");
    }
    Ok(())
}

fn report_failure<T>(result: querywrap_core::Result<T>, printer: &Printer) {
    match result {
        Err(err) => printer.expected_error(&err),
        Ok(_) => warn!("Statement expected to fail succeeded"),
    }
}
