// Transaction stage - commit on success, rollback on failure

use super::pipeline::{CallContext, Handler, Stage};
use crate::domain::QueryOutput;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Runs the inner handler inside a transaction on the attached connection.
///
/// Must sit inside a connection stage. The inner handler's error is always
/// the one returned; a failed rollback is only logged.
pub struct TransactionStage;

impl Stage for TransactionStage {
    fn name(&self) -> &'static str {
        "transaction"
    }

    fn wrap(&self, inner: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(WithTransaction { inner })
    }
}

struct WithTransaction {
    inner: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for WithTransaction {
    async fn call(&self, ctx: &mut CallContext) -> Result<QueryOutput> {
        let call_id = ctx.call_id().to_string();
        ctx.connection()?.begin().await?;
        debug!(%call_id, "Transaction started");

        match self.inner.call(ctx).await {
            Ok(output) => {
                let committed = ctx.connection()?.commit().await;
                if let Err(commit_err) = committed {
                    error!(%call_id, error = %commit_err, "Commit failed");
                    let rolled_back = ctx.connection()?.rollback().await;
                    if let Err(rollback_err) = rolled_back {
                        error!(
                            %call_id,
                            error = %rollback_err,
                            "Rollback after failed commit also failed"
                        );
                    }
                    return Err(commit_err);
                }
                debug!(%call_id, "Transaction committed");
                Ok(output)
            }
            Err(err) => {
                let rolled_back = match ctx.connection() {
                    Ok(conn) => conn.rollback().await,
                    Err(_) => Ok(()),
                };
                if let Err(rollback_err) = rolled_back {
                    error!(%call_id, error = %rollback_err, "Rollback failed");
                }
                warn!(%call_id, error = %err, "Transaction failed: {}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::connection::ConnectionStage;
    use crate::application::pipeline::Pipeline;
    use crate::domain::QueryRequest;
    use crate::error::AppError;
    use crate::port::connection::mocks::MockConnectionProvider;

    struct UpdateEmail {
        fail_after_write: bool,
    }

    #[async_trait]
    impl Handler for UpdateEmail {
        async fn call(&self, ctx: &mut CallContext) -> Result<QueryOutput> {
            let (req, conn) = ctx.split()?;
            let n = conn
                .execute("UPDATE users SET email = ? WHERE id = ?", &req.params)
                .await?;
            if self.fail_after_write {
                return Err(AppError::Execution("email rejected".to_string()));
            }
            Ok(QueryOutput::RowsAffected(n))
        }
    }

    fn pipeline(provider: Arc<MockConnectionProvider>, fail_after_write: bool) -> Pipeline {
        Pipeline::builder()
            .stage(ConnectionStage::new(provider))
            .stage(TransactionStage)
            .build(Arc::new(UpdateEmail { fail_after_write }))
    }

    fn request() -> QueryRequest {
        QueryRequest::new("update_user_email")
            .bind("Crawford_Cartwright@hotmail.com")
            .bind(1)
    }

    #[tokio::test]
    async fn test_commit_on_success() {
        let provider = Arc::new(MockConnectionProvider::new(vec![]));
        let out = pipeline(provider.clone(), false)
            .execute(request())
            .await
            .unwrap();

        assert_eq!(out, QueryOutput::RowsAffected(1));
        let stats = provider.stats();
        assert_eq!((stats.begins, stats.commits, stats.rollbacks), (1, 1, 0));
    }

    #[tokio::test]
    async fn test_rollback_on_failure_preserves_error() {
        let provider = Arc::new(MockConnectionProvider::new(vec![]));
        let err = pipeline(provider.clone(), true)
            .execute(request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "ExecutionError");
        assert_eq!(err.to_string(), "Execution error: email rejected");

        let stats = provider.stats();
        assert_eq!((stats.begins, stats.commits, stats.rollbacks), (1, 0, 1));
        assert_eq!(stats.closed, 1);
    }

    #[tokio::test]
    async fn test_failed_rollback_keeps_original_error() {
        let provider =
            Arc::new(MockConnectionProvider::new(vec![]).failing_rollback("cannot rollback"));
        let err = pipeline(provider.clone(), true)
            .execute(request())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Execution(_)));
    }

    #[tokio::test]
    async fn test_failed_commit_is_returned() {
        let provider =
            Arc::new(MockConnectionProvider::new(vec![]).failing_commit("database is locked"));
        let err = pipeline(provider.clone(), false)
            .execute(request())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(ref m) if m == "database is locked"));
        assert_eq!(provider.stats().rollbacks, 1);
    }

    #[tokio::test]
    async fn test_requires_connection_stage() {
        let pipeline = Pipeline::builder()
            .stage(TransactionStage)
            .build(Arc::new(UpdateEmail {
                fail_after_write: false,
            }));

        let err = pipeline.execute(request()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }
}
