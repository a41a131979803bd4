//! Ingestion pipeline: load -> split -> embed -> upsert

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use tracing::info;
use tracing::warn;
use uuid::Uuid;

use super::loader::load_document;
use super::loader::LoadedPage;
use super::splitter::RecursiveSplitter;
use crate::embeddings::Embedder;
use crate::errors::ExplorerError;
use crate::errors::Result;
use crate::index::Metadata;
use crate::index::SimilarityIndex;
use crate::index::VectorRecord;

/// Characters of chunk text stored in index metadata
pub const TEXT_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Success,
    Warning,
    Error,
}

/// Outcome of ingesting one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResult {
    pub filename: String,
    pub status: IngestStatus,
    pub chunks: usize,
    #[serde(default)]
    pub upserted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IngestResult {
    #[must_use]
    pub fn error(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: IngestStatus::Error,
            chunks: 0,
            upserted: 0,
            message: Some(message.into()),
        }
    }
}

/// A split segment of a loaded page, ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub metadata: Metadata,
}

impl Chunk {
    #[must_use]
    pub fn chunk_id(&self) -> &str {
        self.metadata
            .get("chunk_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Split every page and label chunks `"<doc_index>_<chunk_index>"`
///
/// Loader metadata (source, page) is carried onto every chunk of the page.
#[must_use]
pub fn chunk_pages(splitter: &RecursiveSplitter, pages: &[LoadedPage]) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for (doc_index, page) in pages.iter().enumerate() {
        let splits = splitter.split_text(&page.text);
        let total_chunks = splits.len();
        for (chunk_index, text) in splits.into_iter().enumerate() {
            let mut metadata = Metadata::new();
            metadata.insert(
                "chunk_id".to_string(),
                Value::from(format!("{doc_index}_{chunk_index}")),
            );
            metadata.insert("doc_index".to_string(), Value::from(doc_index));
            metadata.insert("chunk_index".to_string(), Value::from(chunk_index));
            metadata.insert("total_chunks".to_string(), Value::from(total_chunks));
            for (key, value) in &page.metadata {
                metadata.insert(key.clone(), value.clone());
            }
            chunks.push(Chunk { text, metadata });
        }
    }
    chunks
}

/// Record id that encodes the chunk and stays unique across re-uploads of the same name
#[must_use]
pub fn record_id(filename: &str, chunk_id: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{filename}_{chunk_id}_{}", &suffix[..8])
}

fn text_preview(text: &str) -> String {
    text.chars().take(TEXT_PREVIEW_CHARS).collect()
}

/// Build one index record per chunk
///
/// # Errors
/// - `Validation` when the number of vectors differs from the number of chunks
pub fn build_records(
    filename: &str,
    chunks: &[Chunk],
    embeddings: Vec<Vec<f32>>,
) -> Result<Vec<VectorRecord>> {
    if chunks.len() != embeddings.len() {
        return Err(ExplorerError::Validation(format!(
            "{} embeddings for {} chunks",
            embeddings.len(),
            chunks.len()
        )));
    }

    Ok(chunks
        .iter()
        .zip(embeddings)
        .map(|(chunk, values)| {
            let mut metadata = chunk.metadata.clone();
            metadata.insert("filename".to_string(), Value::from(filename));
            metadata.insert("text".to_string(), Value::from(text_preview(&chunk.text)));
            VectorRecord {
                id: record_id(filename, chunk.chunk_id()),
                values,
                metadata,
            }
        })
        .collect())
}

/// Turns uploaded files into indexed vectors
#[derive(Clone)]
pub struct IngestionPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn SimilarityIndex>,
    splitter: RecursiveSplitter,
}

impl IngestionPipeline {
    #[must_use]
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn SimilarityIndex>,
        splitter: RecursiveSplitter,
    ) -> Self {
        info!(
            "Text splitter initialized: chunk_size={}, chunk_overlap={}",
            splitter.chunk_size(),
            splitter.chunk_overlap()
        );
        Self {
            embedder,
            index,
            splitter,
        }
    }

    /// Ingest one file; failures are contained in the returned result
    pub async fn ingest(&self, path: &Path, filename: &str) -> IngestResult {
        info!("Starting ingestion pipeline for: {}", filename);
        match self.try_ingest(path, filename).await {
            Ok(result) => result,
            Err(e) => {
                error!("Ingestion failed for {}: {}", filename, e);
                IngestResult::error(filename, e.to_string())
            }
        }
    }

    /// Ingest files sequentially, one result per file in input order
    pub async fn ingest_files(&self, files: &[(PathBuf, String)]) -> Vec<IngestResult> {
        let mut results = Vec::with_capacity(files.len());
        for (path, filename) in files {
            results.push(self.ingest(path, filename).await);
        }
        results
    }

    async fn try_ingest(&self, path: &Path, filename: &str) -> Result<IngestResult> {
        let owned = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || load_document(&owned))
            .await
            .map_err(|e| ExplorerError::DocumentLoad(format!("loader task failed: {e}")))??;

        let chunks = chunk_pages(&self.splitter, &pages);
        info!("Created {} chunks from {}", chunks.len(), filename);
        if chunks.is_empty() {
            warn!("No chunks generated for {}", filename);
            return Ok(IngestResult {
                filename: filename.to_string(),
                status: IngestStatus::Warning,
                chunks: 0,
                upserted: 0,
                message: Some("No content extracted".to_string()),
            });
        }

        info!("Generating embeddings for {} chunks", chunks.len());
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;
        let records = build_records(filename, &chunks, embeddings)?;

        if !self.index.is_initialized() {
            self.index.ensure_initialized(self.embedder.dimension()).await?;
        }
        info!("Upserting {} vectors", records.len());
        let upserted = self.index.upsert(&records).await?;

        info!("Ingestion complete for {}", filename);
        Ok(IngestResult {
            filename: filename.to_string(),
            status: IngestStatus::Success,
            chunks: chunks.len(),
            upserted,
            message: None,
        })
    }
}
