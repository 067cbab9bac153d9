// Connection stage - one open and one close per call

use super::pipeline::{CallContext, Handler, Stage};
use crate::domain::QueryOutput;
use crate::error::Result;
use crate::port::ConnectionProvider;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opens a connection before the inner handler runs and closes it on every
/// exit path, including panics (the panic is resumed after the close).
pub struct ConnectionStage {
    provider: Arc<dyn ConnectionProvider>,
}

impl ConnectionStage {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider }
    }
}

impl Stage for ConnectionStage {
    fn name(&self) -> &'static str {
        "connection"
    }

    fn wrap(&self, inner: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(WithConnection {
            provider: self.provider.clone(),
            inner,
        })
    }
}

struct WithConnection {
    provider: Arc<dyn ConnectionProvider>,
    inner: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for WithConnection {
    async fn call(&self, ctx: &mut CallContext) -> Result<QueryOutput> {
        let conn = self.provider.open().await?;
        debug!(call_id = %ctx.call_id(), operation = %ctx.request().operation, "Connection opened");

        let previous = ctx.attach(conn);
        let outcome = AssertUnwindSafe(self.inner.call(ctx)).catch_unwind().await;
        let conn = ctx.restore(previous);

        let closed = match conn {
            Some(conn) => conn.close().await,
            None => Ok(()),
        };
        debug!(call_id = %ctx.call_id(), "Connection closed");

        match outcome {
            Ok(Ok(output)) => {
                closed?;
                Ok(output)
            }
            Ok(Err(err)) => {
                if let Err(close_err) = closed {
                    warn!(
                        call_id = %ctx.call_id(),
                        error = %close_err,
                        "Failed to close connection after error"
                    );
                }
                Err(err)
            }
            Err(panic) => {
                if let Err(close_err) = closed {
                    warn!(
                        call_id = %ctx.call_id(),
                        error = %close_err,
                        "Failed to close connection after panic"
                    );
                }
                std::panic::resume_unwind(panic)
            }
        }
    }
}
