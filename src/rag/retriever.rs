//! Retrieval of relevant chunks from the similarity index

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use tracing::info;

use super::RetrievedDocument;
use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::index::IndexMatch;
use crate::index::MetadataFilter;
use crate::index::SimilarityIndex;

/// Retriever for relevance-filtered semantic search
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn SimilarityIndex>,
    min_score: f32,
    overfetch_factor: usize,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn SimilarityIndex>,
        min_score: f32,
        overfetch_factor: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            min_score,
            overfetch_factor: overfetch_factor.max(1),
        }
    }

    #[must_use]
    pub const fn min_score(&self) -> f32 {
        self.min_score
    }

    /// Embed the question and return up to `top_k` chunks scoring at least `min_score`
    ///
    /// # Errors
    /// - Embedding failures
    /// - Index initialization or query failures, including dimension mismatches
    pub async fn retrieve(
        &self,
        question: &str,
        top_k: usize,
        filename_filter: Option<&str>,
    ) -> Result<Vec<RetrievedDocument>> {
        let preview: String = question.chars().take(100).collect();
        debug!("Embedding question: {}", preview);
        let vector = self.embedder.embed_one(question).await?;

        if !self.index.is_initialized() {
            self.index.ensure_initialized(vector.len()).await?;
        }

        let filter = filename_filter.map(|name| {
            info!("Filtering by filename: {}", name);
            MetadataFilter::FilenameEquals(name.to_string())
        });

        let fetch = top_k.saturating_mul(self.overfetch_factor);
        info!(
            "Querying index for top {} results (min_score: {})",
            fetch, self.min_score
        );
        let matches = self.index.query(&vector, fetch, filter.as_ref()).await?;

        let documents = select_relevant(matches, top_k, self.min_score);
        info!(
            "Retrieved {} high-relevance documents (>= {})",
            documents.len(),
            self.min_score
        );
        Ok(documents)
    }
}

/// Keep matches scoring at least `min_score`, in index order, stopping at `top_k`
#[must_use]
pub fn select_relevant(
    matches: Vec<IndexMatch>,
    top_k: usize,
    min_score: f32,
) -> Vec<RetrievedDocument> {
    let mut documents = Vec::with_capacity(top_k.min(matches.len()));
    for m in matches {
        if documents.len() >= top_k {
            break;
        }
        if m.score < min_score {
            debug!("Skipping low-relevance result (score: {:.3})", m.score);
            continue;
        }
        documents.push(unpack(m));
    }
    documents
}

fn metadata_str(m: &IndexMatch, key: &str) -> Option<String> {
    m.metadata.get(key).and_then(Value::as_str).map(str::to_string)
}

fn unpack(m: IndexMatch) -> RetrievedDocument {
    RetrievedDocument {
        text: metadata_str(&m, "text").unwrap_or_default(),
        filename: metadata_str(&m, "filename").unwrap_or_else(|| "unknown".to_string()),
        chunk_id: metadata_str(&m, "chunk_id").unwrap_or_default(),
        id: m.id,
        score: m.score,
        metadata: m.metadata,
    }
}
