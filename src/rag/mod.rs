//! RAG (Retrieval-Augmented Generation) module
//!
//! This module answers questions over the uploaded document corpus:
//! - Keyword classification of document-referencing questions
//! - Similarity retrieval with a relevance threshold
//! - Context assembly and prompt construction
//! - Blocking or streamed answer generation with source citations
//!
//! # Examples
//!
//! ```rust,no_run
//! use knowledge_explorer::config::AppConfig;
//! use knowledge_explorer::rag::{QueryOptions, QueryService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = QueryService::from_config(&config)?;
//!
//!     let result = service
//!         .answer("Summarize the uploaded report", &QueryOptions::default())
//!         .await?;
//!     println!("Answer: {}", result.answer);
//!     println!("Sources: {} chunks", result.sources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod context;
pub mod events;
pub mod pipeline;
pub mod prompts;
pub mod retriever;

use serde::Deserialize;
use serde::Serialize;

pub use classifier::KeywordClassifier;
pub use classifier::QuestionClassifier;
pub use context::truncate_str;
pub use context::ContextAssembler;
pub use events::QueryEvent;
pub use pipeline::PreparedQuery;
pub use pipeline::QueryService;
pub use retriever::Retriever;

use crate::index::Metadata;

/// How a question was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Not a document question, or no documents indexed
    General,
    /// Documents were searched but none passed the relevance threshold
    GeneralFallback,
    /// Answered from retrieved chunks
    Rag,
}

impl QueryMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::GeneralFallback => "general_fallback",
            Self::Rag => "rag",
        }
    }
}

/// A similarity match with its metadata unpacked
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedDocument {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub filename: String,
    pub chunk_id: String,
    pub metadata: Metadata,
}

/// The part of a retrieved chunk shown to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub filename: String,
    pub chunk_id: String,
    pub score: f32,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMetadata {
    pub mode: QueryMode,
    pub retrieved_docs: usize,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<SourceCitation>,
    pub metadata: QueryMetadata,
}

/// Per-query knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub top_k: usize,
    /// Search documents even when the question does not look document-related
    pub force_documents: bool,
    /// Restrict retrieval to chunks of one file
    pub filename_filter: Option<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            force_documents: false,
            filename_filter: None,
        }
    }
}

impl QueryOptions {
    #[must_use]
    pub fn with_top_k(top_k: usize) -> Self {
        Self {
            top_k,
            ..Self::default()
        }
    }
}
