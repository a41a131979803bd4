//! Query orchestration: Classify -> Retrieve -> Prompt -> Generate
//!
//! Both delivery modes share [`QueryService::prepare`], which makes the routing decision and
//! builds the prompt. [`QueryService::answer`] generates the whole answer at once;
//! [`QueryService::answer_stream`] frames fragments as [`QueryEvent`]s.

use std::sync::Arc;

use futures::Stream;
use futures::StreamExt;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::context::citation_suffix;
use super::events::StreamMetadata;
use super::prompts::build_general_prompt;
use super::prompts::build_rag_prompt;
use super::ContextAssembler;
use super::KeywordClassifier;
use super::QueryEvent;
use super::QueryMetadata;
use super::QueryMode;
use super::QueryOptions;
use super::QueryResult;
use super::QuestionClassifier;
use super::Retriever;
use super::SourceCitation;
use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::errors::ExplorerError;
use crate::errors::Result;
use crate::index::SimilarityIndex;
use crate::llm::Generator;
use crate::llm::GroqClient;
use crate::retry::RetryPolicy;

/// Routing outcome plus everything needed to generate and package the answer
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub prompt: String,
    pub mode: QueryMode,
    pub sources: Vec<SourceCitation>,
    pub metadata: QueryMetadata,
}

impl PreparedQuery {
    fn stream_metadata(&self) -> StreamMetadata {
        StreamMetadata {
            mode: self.mode,
            sources: self.sources.clone(),
            retrieved_docs: self.metadata.retrieved_docs,
            question: self.metadata.question.clone(),
            message: self.metadata.message.clone(),
            top_k: self.metadata.top_k,
        }
    }

    fn general(question: &str, mode: QueryMode, message: &str) -> Self {
        Self {
            prompt: build_general_prompt(question),
            mode,
            sources: Vec::new(),
            metadata: QueryMetadata {
                mode,
                retrieved_docs: 0,
                question: question.to_string(),
                message: Some(message.to_string()),
                top_k: None,
            },
        }
    }
}

/// The query orchestrator
#[derive(Clone)]
pub struct QueryService {
    classifier: Arc<dyn QuestionClassifier>,
    retriever: Retriever,
    index: Arc<dyn SimilarityIndex>,
    generator: Arc<dyn Generator>,
    context_assembler: ContextAssembler,
}

impl QueryService {
    /// Create from existing collaborators
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn SimilarityIndex>,
        generator: Arc<dyn Generator>,
        classifier: Arc<dyn QuestionClassifier>,
        min_score: f32,
        overfetch_factor: usize,
    ) -> Self {
        let retriever = Retriever::new(embedder, index.clone(), min_score, overfetch_factor);
        Self {
            classifier,
            retriever,
            index,
            generator,
            context_assembler: ContextAssembler,
        }
    }

    /// Wire collaborators from configuration with the keyword classifier
    pub fn with_config(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn SimilarityIndex>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self::new(
            embedder,
            index,
            generator,
            Arc::new(KeywordClassifier::default()),
            config.retrieval.min_relevance_score,
            config.retrieval.overfetch_factor,
        )
    }

    /// Build every collaborator from configuration
    ///
    /// # Errors
    /// - Embedding, index or LLM client construction errors
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(config)?);
        let index = crate::index::from_config(config)?;
        let generator: Arc<dyn Generator> =
            Arc::new(GroqClient::new(&config.llm, RetryPolicy::from(&config.retry))?);
        Ok(Self::with_config(config, embedder, index, generator))
    }

    /// Whether the index holds any vectors; an index that does not exist yet holds none
    async fn has_documents(&self) -> Result<bool> {
        match self.index.stats().await {
            Ok(stats) => {
                info!("Documents available: {} vectors", stats.total_vector_count);
                Ok(stats.total_vector_count > 0)
            }
            Err(ExplorerError::NotInitialized(reason)) => {
                debug!("Index not initialized ({}); treating as empty", reason);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Decide how to answer and build the prompt
    ///
    /// The index is only consulted when the question looks document-related or documents
    /// are forced.
    ///
    /// # Errors
    /// - `Validation` for `top_k == 0`
    /// - Index stats, embedding or retrieval failures on the document path
    pub async fn prepare(&self, question: &str, options: &QueryOptions) -> Result<PreparedQuery> {
        if options.top_k == 0 {
            return Err(ExplorerError::Validation("top_k must be at least 1".to_string()));
        }

        let is_doc_question = self.classifier.classify(question);
        info!(
            "Question type: {}",
            if is_doc_question { "document-related" } else { "general" }
        );

        let use_documents =
            (is_doc_question || options.force_documents) && self.has_documents().await?;
        if !use_documents {
            info!("Using general AI knowledge (no document retrieval)");
            return Ok(PreparedQuery::general(
                question,
                QueryMode::General,
                "Answered using general AI knowledge",
            ));
        }

        info!("Using RAG pipeline with documents");
        let documents = self
            .retriever
            .retrieve(question, options.top_k, options.filename_filter.as_deref())
            .await?;

        if documents.is_empty() {
            warn!("No relevant documents found, falling back to general knowledge");
            return Ok(PreparedQuery::general(
                question,
                QueryMode::GeneralFallback,
                "No relevant documents found. Answered using general knowledge.",
            ));
        }

        let context = self.context_assembler.assemble(&documents);
        let sources = self.context_assembler.citations(&documents);
        Ok(PreparedQuery {
            prompt: build_rag_prompt(question, &context),
            mode: QueryMode::Rag,
            metadata: QueryMetadata {
                mode: QueryMode::Rag,
                retrieved_docs: documents.len(),
                question: question.to_string(),
                message: None,
                top_k: Some(options.top_k),
            },
            sources,
        })
    }

    /// Answer in one response; a citation line is appended when the answer lacks one
    ///
    /// # Errors
    /// - Any failure from [`Self::prepare`] or generation, unretried at this layer
    pub async fn answer(&self, question: &str, options: &QueryOptions) -> Result<QueryResult> {
        let prepared = self.prepare(question, options).await.map_err(|e| {
            error!("Query pipeline failed: {}", e);
            e
        })?;

        info!("Generating answer with LLM");
        let mut answer = self.generator.generate(&prepared.prompt).await.map_err(|e| {
            error!("Query pipeline failed: {}", e);
            e
        })?;
        info!("Generated answer ({} chars)", answer.chars().count());

        if let Some(citation) = citation_suffix(&answer, &prepared.sources) {
            answer.push_str(&citation);
        }

        Ok(QueryResult {
            answer,
            sources: prepared.sources,
            metadata: prepared.metadata,
        })
    }

    /// Answer as an event stream ending in exactly one `done` or `error` event
    ///
    /// The citation line, when needed, is sent as the last `message` so the concatenated
    /// messages always equal the `done` answer. Dropping the stream drops the generation call.
    pub fn answer_stream(
        &self,
        question: String,
        options: QueryOptions,
    ) -> impl Stream<Item = QueryEvent> + Send + 'static {
        let service = self.clone();
        async_stream::stream! {
            let prepared = match service.prepare(&question, &options).await {
                Ok(prepared) => prepared,
                Err(e) => {
                    error!("Stream query pipeline failed: {}", e);
                    yield QueryEvent::error(e);
                    return;
                }
            };
            yield QueryEvent::Metadata(prepared.stream_metadata());

            info!("Streaming answer with LLM ({})", prepared.mode.as_str());
            let mut tokens = match service.generator.stream(&prepared.prompt).await {
                Ok(response) => response.into_stream(),
                Err(e) => {
                    error!("SSE streaming error: {}", e);
                    yield QueryEvent::error(e);
                    return;
                }
            };

            let mut answer = String::new();
            let mut token_count = 0;
            while let Some(next) = tokens.next().await {
                match next {
                    Ok(token) => {
                        answer.push_str(&token);
                        token_count += 1;
                        yield QueryEvent::Message(token);
                    }
                    Err(e) => {
                        error!("SSE streaming error after {} tokens: {}", token_count, e);
                        yield QueryEvent::error(e);
                        return;
                    }
                }
            }

            if let Some(citation) = citation_suffix(&answer, &prepared.sources) {
                answer.push_str(&citation);
                token_count += 1;
                yield QueryEvent::Message(citation);
            }

            debug!("Stream complete: {} fragments", token_count);
            yield QueryEvent::done(answer, token_count);
        }
    }
}
