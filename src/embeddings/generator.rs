//! Embedding service with remote-first, local-fallback generation

use async_trait::async_trait;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::client::EmbeddingClient;
use super::client::EmbeddingProvider;
use super::Embedder;
use crate::config::AppConfig;
use crate::errors::ExplorerError;
use crate::errors::Result;
use crate::retry::with_backoff;
use crate::retry::RetryPolicy;

/// Service for generating embeddings
///
/// Uses Jina when a key is configured and falls back to the local Ollama model
/// when the remote call keeps failing.
pub struct EmbeddingService {
    remote: Option<EmbeddingClient>,
    local: EmbeddingClient,
    dimension: usize,
    retry: RetryPolicy,
}

impl EmbeddingService {
    /// Create a new embedding service
    pub fn new(config: &AppConfig) -> Result<Self> {
        let embeddings = &config.embeddings;
        let remote = if embeddings.jina_api_key.trim().is_empty() {
            info!("Jina API key not found, using local embedding model: {}", embeddings.local_model);
            None
        } else {
            info!("Using Jina AI for embeddings: {}", embeddings.jina_model);
            Some(EmbeddingClient::new(
                EmbeddingProvider::Jina,
                embeddings.jina_model.clone(),
                embeddings.jina_endpoint.clone(),
                Some(embeddings.jina_api_key.clone()),
            )?)
        };

        let local = EmbeddingClient::new(
            EmbeddingProvider::Ollama,
            embeddings.local_model.clone(),
            embeddings.local_endpoint.clone(),
            None,
        )?;

        Ok(Self::from_clients(
            remote,
            local,
            embeddings.dimension,
            RetryPolicy::from(&config.retry),
        ))
    }

    /// Create from existing clients
    #[must_use]
    pub const fn from_clients(
        remote: Option<EmbeddingClient>,
        local: EmbeddingClient,
        dimension: usize,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            remote,
            local,
            dimension,
            retry,
        }
    }

    /// Provider that is tried first
    #[must_use]
    pub fn primary_provider(&self) -> EmbeddingProvider {
        self.remote
            .as_ref()
            .map_or(EmbeddingProvider::Ollama, EmbeddingClient::provider)
    }

    async fn generate_with(&self, client: &EmbeddingClient, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let name = format!("{} embedding", client.provider().name());
        with_backoff(&self.retry, &name, || client.generate_batch(texts)).await
    }

    fn check_dimensions(&self, embeddings: &[Vec<f32>]) -> Result<()> {
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimension) {
            return Err(ExplorerError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let embeddings = match &self.remote {
            Some(remote) => {
                debug!("Embedding {} texts with {}", inputs.len(), remote.model());
                match self.generate_with(remote, &inputs).await {
                    Ok(embeddings) => embeddings,
                    Err(e) => {
                        warn!("Remote embedding failed: {}. Falling back to local model.", e);
                        self.generate_with(&self.local, &inputs).await?
                    }
                }
            }
            None => {
                debug!("Embedding {} texts with local model", inputs.len());
                self.generate_with(&self.local, &inputs).await?
            }
        };

        self.check_dimensions(&embeddings)?;
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
