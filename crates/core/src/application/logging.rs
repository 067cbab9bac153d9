// Logging stage - query diagnostics around each call

use super::pipeline::{CallContext, Handler, Stage};
use crate::domain::{normalize_query, QueryOutput};
use crate::error::Result;
use crate::port::time_provider::SystemTimeProvider;
use crate::port::TimeProvider;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Logs the call's query before execution and the outcome after it.
///
/// Purely an observer: request, output and error pass through untouched.
pub struct LoggingStage {
    time_provider: Arc<dyn TimeProvider>,
}

impl LoggingStage {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }
}

impl Default for LoggingStage {
    fn default() -> Self {
        Self::new(Arc::new(SystemTimeProvider))
    }
}

impl Stage for LoggingStage {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn wrap(&self, inner: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(WithLogging {
            time_provider: self.time_provider.clone(),
            inner,
        })
    }
}

struct WithLogging {
    time_provider: Arc<dyn TimeProvider>,
    inner: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for WithLogging {
    async fn call(&self, ctx: &mut CallContext) -> Result<QueryOutput> {
        let timestamp = self.time_provider.now_rfc3339();
        let call_id = ctx.call_id().to_string();
        let operation = ctx.request().operation.clone();
        let query = ctx.request().query.clone();

        match query.as_deref() {
            Some(q) => info!(
                %timestamp,
                %call_id,
                %operation,
                query = %normalize_query(q),
                "Executing SQL in {}",
                operation
            ),
            None => warn!(
                %timestamp,
                %call_id,
                %operation,
                "{} called but no query parameter found",
                operation
            ),
        }

        match self.inner.call(ctx).await {
            Ok(output) => {
                info!(
                    %timestamp,
                    %call_id,
                    %operation,
                    "Query in {} completed successfully",
                    operation
                );
                Ok(output)
            }
            Err(err) => {
                let failed_query = query.as_deref().unwrap_or("<none>");
                if err.is_database() {
                    error!(
                        %timestamp, %call_id, %operation, error = %err,
                        "Database error in {}", operation
                    );
                } else {
                    error!(
                        %timestamp, %call_id, %operation, error = %err,
                        "Unexpected error in {}", operation
                    );
                }
                error!(%timestamp, %call_id, query = %failed_query, "Failed query");
                Err(err)
            }
        }
    }
}
