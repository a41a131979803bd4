use std::path::Path;

use config::Config;
use config::File;
use config::FileFormat;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::ExplorerError;
use crate::errors::Result;

/// Environment variables recognised as overrides, paired with the config key they set
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("LOG_LEVEL", "logging.level"),
    ("GROQ_API_KEY", "llm.api_key"),
    ("GROQ_ENDPOINT", "llm.endpoint"),
    ("GROQ_MODEL", "llm.model"),
    ("GROQ_TEMPERATURE", "llm.temperature"),
    ("GROQ_MAX_TOKENS", "llm.max_tokens"),
    ("JINA_API_KEY", "embeddings.jina_api_key"),
    ("JINA_MODEL", "embeddings.jina_model"),
    ("LOCAL_EMBEDDING_ENDPOINT", "embeddings.local_endpoint"),
    ("LOCAL_EMBEDDING_MODEL", "embeddings.local_model"),
    ("EMBEDDING_DIMENSION", "embeddings.dimension"),
    ("PINECONE_API_KEY", "index.api_key"),
    ("PINECONE_ENV", "index.region"),
    ("PINECONE_INDEX", "index.name"),
    ("CHUNK_SIZE", "documents.chunk_size"),
    ("CHUNK_OVERLAP", "documents.chunk_overlap"),
    ("UPLOAD_DIR", "documents.upload_dir"),
    ("MAX_UPLOAD_SIZE", "documents.max_upload_size"),
    ("MIN_RELEVANCE_SCORE", "retrieval.min_relevance_score"),
    ("RETRIEVAL_OVERFETCH_FACTOR", "retrieval.overfetch_factor"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_enable_cors() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_log_dir() -> String {
    "logs".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Jina AI key; when empty the local model is used directly
    #[serde(default)]
    pub jina_api_key: String,
    pub jina_endpoint: String,
    pub jina_model: String,
    pub local_endpoint: String,
    pub local_model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: String,
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

fn default_llm_model() -> String {
    "mixtral-8x7b-32768".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Pinecone key; when empty an in-process index is used
    #[serde(default)]
    pub api_key: String,
    pub region: String,
    pub cloud: String,
    pub name: String,
    pub control_endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub upload_dir: String,
    /// Maximum accepted size of a single uploaded file, in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub min_relevance_score: f32,
    pub overfetch_factor: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

/// Which provider keys are present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiKeyStatus {
    pub groq: bool,
    pub pinecone: bool,
    pub jina: bool,
}

impl ApiKeyStatus {
    #[must_use]
    pub const fn all_present(&self) -> bool {
        self.groq && self.pinecone && self.jina
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
    pub index: IndexConfig,
    pub documents: DocumentsConfig,
    pub retrieval: RetrievalConfig,
    pub retry: RetryConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present), `.env` and the process environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration using an explicit TOML path; a missing file is not an error
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        // .env values never replace variables that are already exported
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {}", e);
            }
        }
        Self::from_sources(path, |name| std::env::var(name).ok())
    }

    /// Layer defaults, the TOML file and environment lookups
    ///
    /// `lookup` resolves an environment variable name; tests pass a map instead of the process env.
    pub fn from_sources<P, F>(path: P, lookup: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let defaults = Config::try_from(&Self::default())?;

        let mut builder = Config::builder().add_source(defaults);
        if path.exists() {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = lookup(var) {
                builder = builder.set_override(*key, value)?;
            }
        }

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.logging.level = config.logging.level.to_lowercase();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file without consulting the environment
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Err(ExplorerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Config file not found: {}", path.as_ref().display()),
            )));
        }
        Self::from_sources(path, |_| None)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.documents.chunk_size == 0 {
            return Err(ExplorerError::Config("chunk_size must be positive".to_string()));
        }
        if self.documents.chunk_overlap >= self.documents.chunk_size {
            return Err(ExplorerError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.documents.chunk_overlap, self.documents.chunk_size
            )));
        }
        if !self.retrieval.min_relevance_score.is_finite() {
            return Err(ExplorerError::Config(
                "min_relevance_score must be a finite number".to_string(),
            ));
        }
        if self.retrieval.overfetch_factor == 0 {
            return Err(ExplorerError::Config("overfetch_factor must be at least 1".to_string()));
        }
        if self.retrieval.default_top_k == 0
            || self.retrieval.default_top_k > self.retrieval.max_top_k
        {
            return Err(ExplorerError::Config(format!(
                "default_top_k must be within 1..={}",
                self.retrieval.max_top_k
            )));
        }
        if self.embeddings.dimension == 0 {
            return Err(ExplorerError::Config("embedding dimension must be positive".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ExplorerError::Config("retry.max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Report which provider API keys are configured
    #[must_use]
    pub fn validate_api_keys(&self) -> ApiKeyStatus {
        ApiKeyStatus {
            groq: !self.llm.api_key.trim().is_empty(),
            pinecone: !self.index.api_key.trim().is_empty(),
            jina: !self.embeddings.jina_api_key.trim().is_empty(),
        }
    }

    /// Create the upload directory if it doesn't exist
    pub fn ensure_upload_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.documents.upload_dir)?;
        Ok(())
    }

    /// Render the effective configuration as TOML with keys masked
    pub fn to_masked_toml(&self) -> Result<String> {
        let mut masked = self.clone();
        for key in [
            &mut masked.llm.api_key,
            &mut masked.index.api_key,
            &mut masked.embeddings.jina_api_key,
        ] {
            if !key.is_empty() {
                *key = "********".to_string();
            }
        }
        toml::to_string_pretty(&masked).map_err(|e| ExplorerError::Config(e.to_string()))
    }

    /// Whether internal error details may be exposed in API responses
    #[must_use]
    pub fn debug_enabled(&self) -> bool {
        matches!(self.logging.level.as_str(), "debug" | "trace")
    }

    /// Get server bind address
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get chunk size in characters
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.documents.chunk_size
    }

    /// Get chunk overlap in characters
    #[must_use]
    pub const fn chunk_overlap(&self) -> usize {
        self.documents.chunk_overlap
    }

    /// Get minimum relevance score for retrieved chunks
    #[must_use]
    pub const fn min_relevance_score(&self) -> f32 {
        self.retrieval.min_relevance_score
    }

    /// Get embedding dimension
    #[must_use]
    pub const fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Get LLM model
    #[must_use]
    pub fn llm_model(&self) -> &str {
        &self.llm.model
    }

    /// Get index name
    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index.name
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                enable_cors: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_dir: default_log_dir(),
            },
            embeddings: EmbeddingsConfig {
                jina_api_key: String::new(),
                jina_endpoint: "https://api.jina.ai/v1".to_string(),
                jina_model: "jina-embeddings-v2-base-en".to_string(),
                local_endpoint: "http://localhost:11434".to_string(),
                local_model: "nomic-embed-text".to_string(),
                dimension: 768,
            },
            llm: LlmConfig {
                api_key: String::new(),
                endpoint: "https://api.groq.com/openai/v1".to_string(),
                model: default_llm_model(),
                temperature: 0.7,
                max_tokens: 2048,
            },
            index: IndexConfig {
                api_key: String::new(),
                region: "us-west1-gcp".to_string(),
                cloud: "aws".to_string(),
                name: "knowledge-explorer".to_string(),
                control_endpoint: "https://api.pinecone.io".to_string(),
            },
            documents: DocumentsConfig {
                chunk_size: 1000,
                chunk_overlap: 200,
                upload_dir: "./uploads".to_string(),
                max_upload_size: 10 * 1024 * 1024,
            },
            retrieval: RetrievalConfig {
                min_relevance_score: 0.7,
                overfetch_factor: 2,
                default_top_k: 5,
                max_top_k: 20,
            },
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 2000,
                max_delay_ms: 10_000,
            },
        }
    }
}
