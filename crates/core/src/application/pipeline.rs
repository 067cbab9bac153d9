// Pipeline - ordered stages composed around a leaf handler

use crate::domain::{QueryOutput, QueryRequest};
use crate::error::{AppError, Result};
use crate::port::id_provider::UuidProvider;
use crate::port::{Connection, IdProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Per-call state threaded through every stage
pub struct CallContext {
    call_id: String,
    request: QueryRequest,
    connection: Option<Box<dyn Connection>>,
}

impl CallContext {
    pub fn new(call_id: impl Into<String>, request: QueryRequest) -> Self {
        Self {
            call_id: call_id.into(),
            request,
            connection: None,
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn request(&self) -> &QueryRequest {
        &self.request
    }

    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    /// The connection attached by an outer connection stage
    pub fn connection(&mut self) -> Result<&mut dyn Connection> {
        match self.connection.as_deref_mut() {
            Some(conn) => Ok(conn),
            None => Err(AppError::InvalidState(format!(
                "{} requires an open connection (add a connection stage)",
                self.request.operation
            ))),
        }
    }

    /// Request and connection together, for leaf handlers
    pub fn split(&mut self) -> Result<(&QueryRequest, &mut dyn Connection)> {
        match self.connection.as_deref_mut() {
            Some(conn) => Ok((&self.request, conn)),
            None => Err(AppError::InvalidState(format!(
                "{} requires an open connection (add a connection stage)",
                self.request.operation
            ))),
        }
    }

    /// Attach a connection, returning the one it replaces
    pub(crate) fn attach(&mut self, conn: Box<dyn Connection>) -> Option<Box<dyn Connection>> {
        self.connection.replace(conn)
    }

    pub(crate) fn restore(
        &mut self,
        previous: Option<Box<dyn Connection>>,
    ) -> Option<Box<dyn Connection>> {
        std::mem::replace(&mut self.connection, previous)
    }
}

/// Anything that can serve one call
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, ctx: &mut CallContext) -> Result<QueryOutput>;
}

/// Wraps a handler in cross-cutting behavior
pub trait Stage: Send + Sync {
    /// Stage name, for diagnostics
    fn name(&self) -> &'static str;

    fn wrap(&self, inner: Arc<dyn Handler>) -> Arc<dyn Handler>;
}

/// Collects stages outermost-first and composes them once
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Arc<dyn Stage>>,
    id_provider: Option<Arc<dyn IdProvider>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; earlier stages wrap later ones
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn id_provider(mut self, id_provider: Arc<dyn IdProvider>) -> Self {
        self.id_provider = Some(id_provider);
        self
    }

    pub fn build(self, leaf: Arc<dyn Handler>) -> Pipeline {
        let stage_names: Vec<&'static str> = self.stages.iter().map(|s| s.name()).collect();

        let handler = self
            .stages
            .iter()
            .rev()
            .fold(leaf, |inner, stage| stage.wrap(inner));

        debug!(stages = ?stage_names, "Pipeline composed");

        Pipeline {
            handler,
            stage_names,
            id_provider: self.id_provider.unwrap_or_else(|| Arc::new(UuidProvider)),
        }
    }
}

/// A composed chain of stages, ready to execute requests
pub struct Pipeline {
    handler: Arc<dyn Handler>,
    stage_names: Vec<&'static str>,
    id_provider: Arc<dyn IdProvider>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Stage names, outermost first
    pub fn stage_names(&self) -> &[&'static str] {
        &self.stage_names
    }

    pub async fn execute(&self, request: QueryRequest) -> Result<QueryOutput> {
        let mut ctx = CallContext::new(self.id_provider.generate_id(), request);
        self.handler.call(&mut ctx).await
    }
}
