//! Similarity index over embedded document chunks
//!
//! [`SimilarityIndex`] is the narrow interface the ingestion and query pipelines use.
//! Two backends are provided:
//! - [`PineconeIndex`]: Pinecone serverless index over its REST API
//! - [`InMemoryIndex`]: process-local cosine search, used without a Pinecone key and in tests

pub mod memory;
pub mod pinecone;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tracing::warn;

pub use memory::InMemoryIndex;
pub use pinecone::PineconeIndex;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::retry::RetryPolicy;

/// Metadata attached to every stored vector
pub type Metadata = Map<String, Value>;

/// The persisted unit of the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Metadata,
}

/// A raw nearest-neighbour match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Metadata filter applied to queries and deletions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataFilter {
    /// Exact match on the `filename` metadata field
    FilenameEquals(String),
}

impl MetadataFilter {
    /// Whether a record's metadata satisfies the filter
    #[must_use]
    pub fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            Self::FilenameEquals(name) => {
                metadata.get("filename").and_then(Value::as_str) == Some(name.as_str())
            }
        }
    }

    /// Pinecone filter expression
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::FilenameEquals(name) => serde_json::json!({ "filename": { "$eq": name } }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceStats {
    #[serde(rename = "vectorCount", default)]
    pub vector_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub total_vector_count: u64,
    pub dimension: usize,
    pub namespaces: HashMap<String, NamespaceStats>,
}

/// A storage backend for vectors with metadata-aware similarity search
///
/// Operations other than `ensure_initialized` fail with
/// [`ExplorerError::NotInitialized`](crate::errors::ExplorerError::NotInitialized)
/// until the index has been created or connected.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Whether the index is connected in this process
    fn is_initialized(&self) -> bool;

    /// Create the index with `dimension` if absent, then connect. Idempotent.
    async fn ensure_initialized(&self, dimension: usize) -> Result<()>;

    /// Store records, returning how many the backend accepted
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize>;

    /// Return up to `top_k` matches ordered by descending score, metadata included
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>>;

    /// Remove every record whose `filename` equals `filename`
    async fn delete_by_filename(&self, filename: &str) -> Result<()>;

    /// Remove every record
    async fn clear(&self) -> Result<()>;

    async fn stats(&self) -> Result<IndexStats>;
}

/// Build the configured backend: Pinecone when a key is present, otherwise in-memory
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn SimilarityIndex>> {
    if config.index.api_key.trim().is_empty() {
        warn!("Pinecone API key not found. Using in-memory index; documents will not persist.");
        return Ok(Arc::new(InMemoryIndex::new()));
    }
    Ok(Arc::new(PineconeIndex::new(
        &config.index,
        RetryPolicy::from(&config.retry),
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_filter_matches_exact_name() {
        let filter = MetadataFilter::FilenameEquals("report.pdf".to_string());
        let mut metadata = Metadata::new();
        metadata.insert("filename".to_string(), Value::from("report.pdf"));
        assert!(filter.matches(&metadata));

        metadata.insert("filename".to_string(), Value::from("report.pdf.bak"));
        assert!(!filter.matches(&metadata));
        assert!(!filter.matches(&Metadata::new()));
    }

    #[test]
    fn test_filename_filter_json() {
        let filter = MetadataFilter::FilenameEquals("notes.txt".to_string());
        assert_eq!(
            filter.to_json(),
            serde_json::json!({"filename": {"$eq": "notes.txt"}})
        );
    }

    #[test]
    fn test_from_config_without_key_is_in_memory() {
        let index = from_config(&AppConfig::default()).unwrap();
        assert!(!index.is_initialized());
    }
}
