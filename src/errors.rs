use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{service} API error ({status}): {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Vector index not initialized: {0}")]
    NotInitialized(String),

    #[error("Embedding dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("LLM service unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Unsupported file type: {0}. Only PDF and TXT are supported.")]
    UnsupportedFileType(String),

    #[error("File too large: {size} bytes (maximum {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to load document: {0}")]
    DocumentLoad(String),
}

impl ExplorerError {
    /// Whether a gateway call that failed with this error may be attempted again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Errors the caller caused; these are reported immediately and never retried.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::UnsupportedFileType(_) | Self::FileTooLarge { .. }
        )
    }

    /// HTTP status used when this error reaches the API surface
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        if self.is_validation() {
            return 400;
        }
        match self {
            Self::NotInitialized(_) | Self::LlmUnavailable(_) => 503,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for ExplorerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
