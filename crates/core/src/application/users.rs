// User operations - one prebuilt pipeline per operation

use super::cache::{CacheStage, QueryCache};
use super::connection::ConnectionStage;
use super::constants::{SELECT_ALL_USERS_SQL, SELECT_USER_BY_ID_SQL, UPDATE_USER_EMAIL_SQL};
use super::handlers::{ExecuteStatement, FixedStatement, SelectRows};
use super::logging::LoggingStage;
use super::pipeline::Pipeline;
use super::retry::{RetryPolicy, RetryStage};
use super::transaction::TransactionStage;
use crate::domain::{QueryRequest, Row, SqlValue};
use crate::error::Result;
use crate::port::ConnectionProvider;
use std::sync::Arc;

/// Operations on the `users` table
///
/// | operation | stages |
/// |---|---|
/// | `fetch_all_users` | logging, connection |
/// | `execute_query` | logging, connection |
/// | `update_user` | logging, connection, transaction |
/// | `get_user_by_id` | connection |
/// | `update_user_email` | connection, transaction |
/// | `fetch_users_with_retry` | connection, retry |
/// | `fetch_users_with_cache` | connection, cache |
pub struct UserQueries {
    fetch_all_users: Pipeline,
    execute_query: Pipeline,
    update_user: Pipeline,
    get_user_by_id: Pipeline,
    update_user_email: Pipeline,
    fetch_users_with_retry: Pipeline,
    fetch_users_with_cache: Pipeline,
}

impl UserQueries {
    pub fn new(
        provider: Arc<dyn ConnectionProvider>,
        cache: Arc<QueryCache>,
        retry_policy: RetryPolicy,
    ) -> Self {
        let connected = || Pipeline::builder().stage(ConnectionStage::new(provider.clone()));
        let logged = || {
            Pipeline::builder()
                .stage(LoggingStage::default())
                .stage(ConnectionStage::new(provider.clone()))
        };

        Self {
            fetch_all_users: logged().build(Arc::new(SelectRows)),
            execute_query: logged().build(Arc::new(SelectRows)),
            update_user: logged()
                .stage(TransactionStage)
                .build(Arc::new(ExecuteStatement)),
            get_user_by_id: connected()
                .build(Arc::new(FixedStatement::select(SELECT_USER_BY_ID_SQL))),
            update_user_email: connected()
                .stage(TransactionStage)
                .build(Arc::new(FixedStatement::execute(UPDATE_USER_EMAIL_SQL))),
            fetch_users_with_retry: connected()
                .stage(RetryStage::new(retry_policy))
                .build(Arc::new(FixedStatement::select(SELECT_ALL_USERS_SQL))),
            fetch_users_with_cache: connected()
                .stage(CacheStage::new(cache))
                .build(Arc::new(SelectRows)),
        }
    }

    pub async fn fetch_all_users(&self, query: &str) -> Result<Arc<Vec<Row>>> {
        let req = QueryRequest::new("fetch_all_users").with_query(query);
        Ok(self.fetch_all_users.execute(req).await?.into_rows()?)
    }

    pub async fn execute_query(&self, query: &str, params: Vec<SqlValue>) -> Result<Arc<Vec<Row>>> {
        let req = QueryRequest::new("execute_query")
            .with_query(query)
            .with_params(params);
        Ok(self.execute_query.execute(req).await?.into_rows()?)
    }

    /// Returns the number of affected rows
    pub async fn update_user(&self, query: &str, params: Vec<SqlValue>) -> Result<u64> {
        let req = QueryRequest::new("update_user")
            .with_query(query)
            .with_params(params);
        Ok(self.update_user.execute(req).await?.rows_affected()?)
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> Result<Option<Row>> {
        let req = QueryRequest::new("get_user_by_id").bind(user_id);
        let rows = self.get_user_by_id.execute(req).await?.into_rows()?;
        Ok(rows.first().cloned())
    }

    pub async fn update_user_email(&self, user_id: i64, new_email: &str) -> Result<u64> {
        let req = QueryRequest::new("update_user_email")
            .bind(new_email)
            .bind(user_id);
        Ok(self.update_user_email.execute(req).await?.rows_affected()?)
    }

    pub async fn fetch_users_with_retry(&self) -> Result<Arc<Vec<Row>>> {
        let req = QueryRequest::new("fetch_users_with_retry");
        Ok(self.fetch_users_with_retry.execute(req).await?.into_rows()?)
    }

    pub async fn fetch_users_with_cache(&self, query: &str) -> Result<Arc<Vec<Row>>> {
        let req = QueryRequest::new("fetch_users_with_cache").with_query(query);
        Ok(self.fetch_users_with_cache.execute(req).await?.into_rows()?)
    }
}
