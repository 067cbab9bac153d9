// Leaf handlers - the statement execution at the bottom of a pipeline

use super::pipeline::{CallContext, Handler};
use crate::domain::{QueryOutput, QueryRequest};
use crate::error::{AppError, Result};
use async_trait::async_trait;

fn required_query(req: &QueryRequest) -> Result<&str> {
    match req.query() {
        Some(q) if !q.trim().is_empty() => Ok(q),
        _ => Err(AppError::Validation(format!(
            "{} requires a SQL query",
            req.operation
        ))),
    }
}

/// Runs the request's query and returns every row
pub struct SelectRows;

#[async_trait]
impl Handler for SelectRows {
    async fn call(&self, ctx: &mut CallContext) -> Result<QueryOutput> {
        let (req, conn) = ctx.split()?;
        let sql = required_query(req)?;
        let rows = conn.fetch_all(sql, &req.params).await?;
        Ok(QueryOutput::rows(rows))
    }
}

/// Runs the request's query and returns the affected row count
pub struct ExecuteStatement;

#[async_trait]
impl Handler for ExecuteStatement {
    async fn call(&self, ctx: &mut CallContext) -> Result<QueryOutput> {
        let (req, conn) = ctx.split()?;
        let sql = required_query(req)?;
        let affected = conn.execute(sql, &req.params).await?;
        Ok(QueryOutput::RowsAffected(affected))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Execute,
}

/// Handler with built-in SQL; only the request's params are used
pub struct FixedStatement {
    sql: String,
    kind: StatementKind,
}

impl FixedStatement {
    pub fn select(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            kind: StatementKind::Select,
        }
    }

    pub fn execute(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            kind: StatementKind::Execute,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

#[async_trait]
impl Handler for FixedStatement {
    async fn call(&self, ctx: &mut CallContext) -> Result<QueryOutput> {
        let (req, conn) = ctx.split()?;
        match self.kind {
            StatementKind::Select => {
                let rows = conn.fetch_all(&self.sql, &req.params).await?;
                Ok(QueryOutput::rows(rows))
            }
            StatementKind::Execute => {
                let affected = conn.execute(&self.sql, &req.params).await?;
                Ok(QueryOutput::RowsAffected(affected))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::connection::ConnectionStage;
    use crate::application::pipeline::Pipeline;
    use crate::domain::{Row, SqlValue};
    use crate::port::connection::mocks::MockConnectionProvider;
    use std::sync::Arc;

    fn provider() -> Arc<MockConnectionProvider> {
        Arc::new(
            MockConnectionProvider::new(vec![
                Row::new(vec![SqlValue::Integer(1), SqlValue::from("Alice Johnson")]),
                Row::new(vec![SqlValue::Integer(2), SqlValue::from("Bob Smith")]),
            ])
            .with_rows_affected(1),
        )
    }

    fn connected(provider: Arc<MockConnectionProvider>, leaf: impl Handler + 'static) -> Pipeline {
        Pipeline::builder()
            .stage(ConnectionStage::new(provider))
            .build(Arc::new(leaf))
    }

    #[tokio::test]
    async fn test_select_rows() {
        let provider = provider();
        let out = connected(provider.clone(), SelectRows)
            .execute(QueryRequest::new("fetch_all_users").with_query("SELECT * FROM users"))
            .await
            .unwrap();

        assert_eq!(out.into_rows().unwrap().len(), 2);
        assert_eq!(provider.stats().statements, vec!["SELECT * FROM users"]);
    }

    #[tokio::test]
    async fn test_select_rows_requires_query() {
        let provider = provider();
        let err = connected(provider.clone(), SelectRows)
            .execute(QueryRequest::new("fetch_all_users"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(provider.stats().statements.is_empty());
    }

    #[tokio::test]
    async fn test_execute_statement() {
        let out = connected(provider(), ExecuteStatement)
            .execute(
                QueryRequest::new("update_user")
                    .with_query("UPDATE users SET age = ? WHERE name = ?")
                    .bind(29)
                    .bind("Alice Johnson"),
            )
            .await
            .unwrap();

        assert_eq!(out.rows_affected().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fixed_statement_ignores_query_argument() {
        let provider = provider();
        let leaf = FixedStatement::select("SELECT * FROM users WHERE id = ?");
        assert_eq!(leaf.sql(), "SELECT * FROM users WHERE id = ?");

        connected(provider.clone(), leaf)
            .execute(QueryRequest::new("get_user_by_id").bind(1))
            .await
            .unwrap();

        assert_eq!(
            provider.stats().statements,
            vec!["SELECT * FROM users WHERE id = ?"]
        );
    }

    #[tokio::test]
    async fn test_handlers_need_a_connection() {
        let pipeline = Pipeline::builder().build(Arc::new(SelectRows));
        let err = pipeline
            .execute(QueryRequest::new("fetch_all_users").with_query("SELECT 1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
    }
}
