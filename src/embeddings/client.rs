//! Embedding API clients for the supported providers

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::errors::ExplorerError;
use crate::errors::Result;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Jina AI embeddings API (OpenAI-compatible request/response shape)
    Jina,
    /// Ollama local embeddings
    Ollama,
}

impl EmbeddingProvider {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jina => "Jina",
            Self::Ollama => "Ollama",
        }
    }
}

/// Client for generating embeddings from one provider
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    provider: EmbeddingProvider,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    /// - Jina provider without an API key
    pub fn new(
        provider: EmbeddingProvider,
        model: String,
        endpoint: String,
        api_key: Option<String>,
    ) -> Result<Self> {
        if provider == EmbeddingProvider::Jina && api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ExplorerError::Config("Jina API key not provided".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ExplorerError::Http(e.to_string()))?;

        Ok(Self {
            provider,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    #[must_use]
    pub const fn provider(&self) -> EmbeddingProvider {
        self.provider
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate embeddings for multiple texts in one request
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Non-success status codes (surfaced as `Upstream`, retryable for 429/5xx)
    /// - Malformed responses or a count that does not match the input
    pub async fn generate_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = match self.provider {
            EmbeddingProvider::Jina => self.generate_batch_jina(texts).await?,
            EmbeddingProvider::Ollama => self.generate_batch_ollama(texts).await?,
        };

        if embeddings.len() != texts.len() {
            return Err(ExplorerError::Embedding(format!(
                "{} returned {} embeddings for {} inputs",
                self.provider.name(),
                embeddings.len(),
                texts.len()
            )));
        }
        Ok(embeddings)
    }

    /// Generate embeddings in batch using the Jina API
    async fn generate_batch_jina(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ExplorerError::Config("Jina API key not provided".to_string()))?;

        #[derive(Serialize)]
        struct JinaRequest<'a> {
            input: &'a [&'a str],
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct JinaResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            #[serde(default)]
            index: Option<usize>,
            embedding: Vec<f32>,
        }

        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling Jina embeddings API: {} items", texts.len());

        let request = JinaRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let response = check_status(response, self.provider).await?;

        let mut result: JinaResponse = response
            .json()
            .await
            .map_err(|e| ExplorerError::Embedding(format!("Failed to parse response: {e}")))?;

        // Items carry their input position; order by it when present
        result.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    /// Generate embeddings in batch using the Ollama API
    async fn generate_batch_ollama(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            input: &'a [&'a str],
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embeddings: Vec<Vec<f32>>,
        }

        let url = format!("{}/api/embed", self.endpoint);
        debug!("Calling Ollama embeddings API: {} ({} items)", url, texts.len());

        let request = OllamaRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let response = check_status(response, self.provider).await?;

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ExplorerError::Embedding(format!("Failed to parse response: {e}")))?;

        Ok(result.embeddings)
    }
}

async fn check_status(
    response: reqwest::Response,
    provider: EmbeddingProvider,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ExplorerError::Upstream {
        service: provider.name(),
        status: status.as_u16(),
        message: error_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jina_requires_api_key() {
        let result = EmbeddingClient::new(
            EmbeddingProvider::Jina,
            "jina-embeddings-v2-base-en".to_string(),
            "https://api.jina.ai/v1".to_string(),
            None,
        );
        assert!(matches!(result, Err(ExplorerError::Config(_))));
    }

    #[test]
    fn test_endpoint_trailing_slash_is_trimmed() {
        let client = EmbeddingClient::new(
            EmbeddingProvider::Ollama,
            "nomic-embed-text".to_string(),
            "http://localhost:11434/".to_string(),
            None,
        )
        .unwrap();
        assert_eq!(client.endpoint, "http://localhost:11434");
        assert_eq!(client.provider(), EmbeddingProvider::Ollama);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_network() {
        let client = EmbeddingClient::new(
            EmbeddingProvider::Ollama,
            "nomic-embed-text".to_string(),
            "http://127.0.0.1:9".to_string(),
            None,
        )
        .unwrap();
        assert!(client.generate_batch(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_jina_embedding() {
        let client = EmbeddingClient::new(
            EmbeddingProvider::Jina,
            "jina-embeddings-v2-base-en".to_string(),
            "https://api.jina.ai/v1".to_string(),
            std::env::var("JINA_API_KEY").ok(),
        )
        .unwrap();

        let embeddings = client.generate_batch(&["Hello, world!"]).await.unwrap();
        assert_eq!(embeddings[0].len(), 768);
    }
}
