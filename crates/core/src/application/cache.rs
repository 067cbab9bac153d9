// Query cache - results memoized by exact query text

use super::pipeline::{CallContext, Handler, Stage};
use crate::domain::QueryOutput;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Results keyed by the literal query string.
///
/// Entries live as long as the cache and are never evicted. Bound parameter
/// values are not part of the key, so the same text with different params
/// shares one entry. Concurrent misses for one key both execute; the last
/// insert wins.
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<String, QueryOutput>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, query: &str) -> Option<QueryOutput> {
        self.entries.read().await.get(query).cloned()
    }

    pub async fn insert(&self, query: impl Into<String>, output: QueryOutput) {
        self.entries.write().await.insert(query.into(), output);
    }

    pub async fn contains(&self, query: &str) -> bool {
        self.entries.read().await.contains_key(query)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Serves repeated queries from a shared [`QueryCache`]
pub struct CacheStage {
    cache: Arc<QueryCache>,
}

impl CacheStage {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self { cache }
    }
}

impl Stage for CacheStage {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn wrap(&self, inner: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(WithCache {
            cache: self.cache.clone(),
            inner,
        })
    }
}

struct WithCache {
    cache: Arc<QueryCache>,
    inner: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for WithCache {
    async fn call(&self, ctx: &mut CallContext) -> Result<QueryOutput> {
        let query = match ctx.request().query() {
            Some(q) if !q.is_empty() => q.to_string(),
            _ => {
                return Err(AppError::Validation(
                    "Missing SQL query for caching".to_string(),
                ))
            }
        };

        if let Some(hit) = self.cache.get(&query).await {
            info!(call_id = %ctx.call_id(), "[CACHE HIT] Returning cached result");
            return Ok(hit);
        }

        info!(call_id = %ctx.call_id(), "[CACHE MISS] Executing and caching result");
        let output = self.inner.call(ctx).await?;
        self.cache.insert(query, output.clone()).await;
        Ok(output)
    }
}
