use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{Cache, LlmClient, LlmClientError};
use crate::domain::ModelDescriptor;

pub const MODELS_CACHE_KEY: &str = "openrouter.models";
pub const DEFAULT_MODELS_TTL: Duration = Duration::from_secs(60 * 60);

/// Read-through view of the upstream model list.
///
/// Concurrent misses each refetch and the last write wins; failures are
/// never cached.
pub struct ModelCatalog<L>
where
    L: LlmClient,
{
    llm_client: Arc<L>,
    cache: Arc<dyn Cache<Vec<ModelDescriptor>>>,
    ttl: Duration,
}

impl<L> ModelCatalog<L>
where
    L: LlmClient,
{
    pub fn new(
        llm_client: Arc<L>,
        cache: Arc<dyn Cache<Vec<ModelDescriptor>>>,
        ttl: Duration,
    ) -> Self {
        Self {
            llm_client,
            cache,
            ttl,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn models(&self) -> Result<Vec<ModelDescriptor>, LlmClientError> {
        if let Some(models) = self.cache.get(MODELS_CACHE_KEY).await {
            return Ok(models);
        }

        let mut models = self.llm_client.list_models().await?;
        models.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(count = models.len(), "Refreshed model catalog");

        self.cache
            .put(MODELS_CACHE_KEY, models.clone(), self.ttl)
            .await;
        Ok(models)
    }

    pub async fn refresh(&self) -> Result<Vec<ModelDescriptor>, LlmClientError> {
        self.cache.invalidate(MODELS_CACHE_KEY).await;
        self.models().await
    }
}
