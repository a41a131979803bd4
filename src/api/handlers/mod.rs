/// API request handlers
use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::api::types::ApiError;
use crate::api::types::HealthConfig;
use crate::api::types::HealthResponse;
use crate::api::types::RootResponse;
use crate::api::types::ServiceHealthResponse;
use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::errors::ExplorerError;
use crate::errors::Result;
use crate::index::SimilarityIndex;
use crate::ingest::IngestionPipeline;
use crate::ingest::RecursiveSplitter;
use crate::llm::Generator;
use crate::llm::GroqClient;
use crate::rag::QueryService;
use crate::retry::RetryPolicy;

pub mod documents;
pub mod query;
pub mod upload;

pub use documents::*;
pub use query::*;
pub use upload::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub query_service: Arc<QueryService>,
    pub ingestion: Arc<IngestionPipeline>,
    pub index: Arc<dyn SimilarityIndex>,
}

impl AppState {
    /// Assemble state around existing collaborators
    ///
    /// # Errors
    /// - `Validation` when the configured chunking parameters are invalid
    pub fn new(
        config: AppConfig,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn SimilarityIndex>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let splitter =
            RecursiveSplitter::new(config.documents.chunk_size, config.documents.chunk_overlap)?;
        let ingestion = IngestionPipeline::new(embedder.clone(), index.clone(), splitter);
        let query_service = QueryService::with_config(&config, embedder, index.clone(), generator);
        Ok(Self {
            config: Arc::new(config),
            query_service: Arc::new(query_service),
            ingestion: Arc::new(ingestion),
            index,
        })
    }

    /// Build every collaborator from configuration
    ///
    /// # Errors
    /// - Client construction or chunking configuration errors
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(&config)?);
        let index = crate::index::from_config(&config)?;
        let generator: Arc<dyn Generator> =
            Arc::new(GroqClient::new(&config.llm, RetryPolicy::from(&config.retry))?);
        Self::new(config, embedder, index, generator)
    }

    /// Convert a failure into a response, exposing details only under debug logging
    pub fn api_error(&self, context: &str, err: &ExplorerError) -> ApiError {
        ApiError::from_error(context, err, self.config.debug_enabled())
    }
}

/// Service banner (GET /)
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        service: "KnowledgeExplorer API".to_string(),
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health with key status and effective configuration (GET /health)
pub async fn service_health(State(state): State<AppState>) -> Json<ServiceHealthResponse> {
    let config = &state.config;
    Json(ServiceHealthResponse {
        status: "healthy".to_string(),
        api_keys: config.validate_api_keys(),
        config: HealthConfig {
            chunk_size: config.chunk_size(),
            chunk_overlap: config.chunk_overlap(),
            groq_model: config.llm_model().to_string(),
            pinecone_index: config.index_name().to_string(),
        },
    })
}

/// Health check handler (GET /api/health)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
