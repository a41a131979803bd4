//! Shared fakes for integration tests
#![allow(dead_code)]

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use knowledge_explorer::config::AppConfig;
use knowledge_explorer::embeddings::Embedder;
use knowledge_explorer::errors::ExplorerError;
use knowledge_explorer::errors::Result;
use knowledge_explorer::index::IndexMatch;
use knowledge_explorer::index::IndexStats;
use knowledge_explorer::index::InMemoryIndex;
use knowledge_explorer::index::MetadataFilter;
use knowledge_explorer::index::SimilarityIndex;
use knowledge_explorer::index::VectorRecord;
use knowledge_explorer::llm::Generator;
use knowledge_explorer::llm::StreamingResponse;
use knowledge_explorer::rag::QueryService;

/// Weight of the always-present component, so no text embeds to a zero vector
const BIAS: f32 = 0.1;

/// Bag-of-words embedder over a fixed vocabulary
///
/// Slot `i` is 1.0 when vocabulary word `i` occurs in the text (lowercased, split on
/// non-alphanumerics); the last slot is a constant bias.
pub struct KeywordEmbedder {
    vocabulary: Vec<String>,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| (*w).to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let mut vector: Vec<f32> = self
            .vocabulary
            .iter()
            .map(|v| if words.contains(&v.as_str()) { 1.0 } else { 0.0 })
            .collect();
        vector.push(BIAS);
        vector
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.vocabulary.len() + 1
    }
}

/// In-memory index that counts every call made to it
#[derive(Default)]
pub struct CountingIndex {
    inner: InMemoryIndex,
    calls: AtomicUsize,
}

impl CountingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SimilarityIndex for CountingIndex {
    fn is_initialized(&self) -> bool {
        self.touch();
        self.inner.is_initialized()
    }

    async fn ensure_initialized(&self, dimension: usize) -> Result<()> {
        self.touch();
        self.inner.ensure_initialized(dimension).await
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        self.touch();
        self.inner.upsert(records).await
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>> {
        self.touch();
        self.inner.query(vector, top_k, filter).await
    }

    async fn delete_by_filename(&self, filename: &str) -> Result<()> {
        self.touch();
        self.inner.delete_by_filename(filename).await
    }

    async fn clear(&self) -> Result<()> {
        self.touch();
        self.inner.clear().await
    }

    async fn stats(&self) -> Result<IndexStats> {
        self.touch();
        self.inner.stats().await
    }
}

/// Generator that replays fixed fragments and records every prompt
pub struct ScriptedGenerator {
    tokens: Vec<String>,
    fail_after: Option<usize>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| (*t).to_string()).collect(),
            fail_after: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Stream `n` fragments, then fail
    pub fn failing_after(tokens: &[&str], n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::new(tokens)
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn record(&self, prompt: &str) {
        self.prompts.lock().unwrap().push(prompt.to_string());
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.record(prompt);
        if self.fail_after.is_some() {
            return Err(ExplorerError::Llm("scripted failure".to_string()));
        }
        Ok(self.tokens.concat())
    }

    async fn stream(&self, prompt: &str) -> Result<StreamingResponse> {
        self.record(prompt);
        let mut items: Vec<Result<String>> = self.tokens.iter().cloned().map(Ok).collect();
        if let Some(n) = self.fail_after {
            items.truncate(n);
            items.push(Err(ExplorerError::Llm("stream interrupted".to_string())));
        }
        Ok(StreamingResponse::new(Box::pin(futures::stream::iter(items))))
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Generator without credentials
pub struct UnavailableGenerator;

#[async_trait]
impl Generator for UnavailableGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(ExplorerError::LlmUnavailable("GROQ_API_KEY not configured".to_string()))
    }

    async fn stream(&self, _prompt: &str) -> Result<StreamingResponse> {
        Err(ExplorerError::LlmUnavailable("GROQ_API_KEY not configured".to_string()))
    }

    fn is_available(&self) -> bool {
        false
    }
}

pub const VOCABULARY: &[&str] = &["capital", "france", "paris", "pasta", "cooking", "report"];

pub fn test_config() -> AppConfig {
    AppConfig::default()
}

pub struct Harness {
    pub embedder: Arc<KeywordEmbedder>,
    pub index: Arc<CountingIndex>,
    pub generator: Arc<ScriptedGenerator>,
    pub service: QueryService,
}

/// Query service over fakes, with the default relevance threshold of 0.7
pub fn harness(tokens: &[&str]) -> Harness {
    harness_with(ScriptedGenerator::new(tokens))
}

pub fn harness_with(generator: ScriptedGenerator) -> Harness {
    let embedder = Arc::new(KeywordEmbedder::new(VOCABULARY));
    let index = Arc::new(CountingIndex::new());
    let generator = Arc::new(generator);
    let service = QueryService::with_config(
        &test_config(),
        embedder.clone(),
        index.clone(),
        generator.clone(),
    );
    Harness {
        embedder,
        index,
        generator,
        service,
    }
}

/// Store chunk texts directly, as ingestion would, under `filename`
pub async fn seed(harness: &Harness, filename: &str, texts: &[&str]) {
    let records: Vec<VectorRecord> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let mut metadata = serde_json::Map::new();
            metadata.insert("text".to_string(), serde_json::json!(text));
            metadata.insert("filename".to_string(), serde_json::json!(filename));
            metadata.insert("chunk_id".to_string(), serde_json::json!(format!("0_{i}")));
            VectorRecord {
                id: format!("{filename}_0_{i}"),
                values: harness.embedder.vector(text),
                metadata,
            }
        })
        .collect();
    harness
        .index
        .ensure_initialized(harness.embedder.dimension())
        .await
        .unwrap();
    harness.index.upsert(&records).await.unwrap();
}
