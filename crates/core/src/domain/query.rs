// Query call arguments and outputs

use super::error::{DomainError, Result};
use super::value::{Row, SqlValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Arguments of one pipeline call
///
/// `query` is the explicit query argument read by the logging and cache
/// stages. Handlers with built-in SQL leave it empty and only use `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Name of the operation, used as the function identifier in logs
    pub operation: String,

    #[serde(default)]
    pub query: Option<String>,

    #[serde(default)]
    pub params: Vec<SqlValue>,
}

impl QueryRequest {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            query: None,
            params: Vec::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_params<I, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

/// Result of a pipeline call
///
/// Rows are shared so that a cached result is handed out as the same object.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Rows(Arc<Vec<Row>>),
    RowsAffected(u64),
    Empty,
}

impl QueryOutput {
    pub fn rows(rows: Vec<Row>) -> Self {
        QueryOutput::Rows(Arc::new(rows))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            QueryOutput::Rows(_) => "rows",
            QueryOutput::RowsAffected(_) => "rows_affected",
            QueryOutput::Empty => "empty",
        }
    }

    pub fn into_rows(self) -> Result<Arc<Vec<Row>>> {
        match self {
            QueryOutput::Rows(rows) => Ok(rows),
            other => Err(DomainError::UnexpectedOutput {
                expected: "rows",
                found: other.kind(),
            }),
        }
    }

    pub fn rows_affected(&self) -> Result<u64> {
        match self {
            QueryOutput::RowsAffected(n) => Ok(*n),
            other => Err(DomainError::UnexpectedOutput {
                expected: "rows_affected",
                found: other.kind(),
            }),
        }
    }
}

/// Collapse all whitespace runs into single spaces (single-line log form)
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}
