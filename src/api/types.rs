//! API request and response types

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::config::ApiKeyStatus;
use crate::config::RetrievalConfig;
use crate::errors::ExplorerError;
use crate::errors::Result;
use crate::index::NamespaceStats;
use crate::rag::QueryOptions;

/// Service banner for `GET /`
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub service: String,
    pub status: String,
    pub version: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Effective settings reported by `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub groq_model: String,
    pub pinecone_index: String,
}

/// Detailed health with provider key status
#[derive(Debug, Serialize)]
pub struct ServiceHealthResponse {
    pub status: String,
    pub api_keys: ApiKeyStatus,
    pub config: HealthConfig,
}

/// Blocking query request
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub force_documents: bool,
    /// Restrict retrieval to one document
    #[serde(default)]
    pub filename: Option<String>,
}

/// Streaming query parameters
#[derive(Debug, Deserialize)]
pub struct StreamQueryParams {
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub force_documents: bool,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Validate request fields and turn them into query options
///
/// # Errors
/// - `Validation` for a blank question or `top_k` outside `1..=max_top_k`
pub fn query_options(
    retrieval: &RetrievalConfig,
    question: &str,
    top_k: Option<usize>,
    force_documents: bool,
    filename: Option<&str>,
) -> Result<QueryOptions> {
    if question.trim().is_empty() {
        return Err(ExplorerError::Validation(
            "question must not be empty".to_string(),
        ));
    }

    let top_k = top_k.unwrap_or(retrieval.default_top_k);
    if !(1..=retrieval.max_top_k).contains(&top_k) {
        return Err(ExplorerError::Validation(format!(
            "top_k must be between 1 and {}",
            retrieval.max_top_k
        )));
    }

    Ok(QueryOptions {
        top_k,
        force_documents,
        filename_filter: filename
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string),
    })
}

/// One file in the upload directory
#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Upload directory listing
#[derive(Debug, Serialize)]
pub struct UploadStatusResponse {
    pub exists: bool,
    pub file_count: usize,
    pub files: Vec<UploadedFile>,
}

/// Index statistics
#[derive(Debug, Serialize)]
pub struct DocumentStatsResponse {
    pub total_vectors: u64,
    pub dimensions: usize,
    pub namespaces: HashMap<String, NamespaceStats>,
}

/// Outcome of a delete operation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: String,
    pub message: String,
}

impl DeleteResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

/// Error body returned by every blocking endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: Option<String>,
}

/// Structured API error
///
/// Validation errors carry their own message; anything else gets a generic one, with the
/// internal message in `detail` only when debug output is enabled.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn from_error(context: &str, err: &ExplorerError, expose_detail: bool) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error = if err.is_validation() {
            err.to_string()
        } else if status == StatusCode::SERVICE_UNAVAILABLE {
            format!("{context}: service unavailable")
        } else {
            context.to_string()
        };
        Self {
            status,
            body: ErrorBody {
                error,
                detail: expose_detail.then(|| err.to_string()),
            },
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.body.error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
