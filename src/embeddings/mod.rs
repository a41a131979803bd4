//! Embeddings generation module
//!
//! This module turns text into fixed-length vectors using:
//! - Jina AI (remote, `jina-embeddings-v2-base-en` by default)
//! - Ollama (local models, used directly or as the fallback when the remote call fails)
//!
//! # Examples
//!
//! ```rust,no_run
//! use knowledge_explorer::embeddings::{Embedder, EmbeddingService};
//! use knowledge_explorer::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.embed_one("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;

use async_trait::async_trait;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use generator::EmbeddingService;

use crate::errors::ExplorerError;
use crate::errors::Result;

/// Default embedding dimension (jina-embeddings-v2-base-en, nomic-embed-text)
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Anything that can map text to vectors of a fixed dimension
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts in one call; output order matches input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ExplorerError::Embedding("No embedding in response".to_string()))
    }

    /// Length of every vector this embedder produces
    fn dimension(&self) -> usize;
}
