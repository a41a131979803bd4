/// Document management handlers
use std::collections::HashMap;

use axum::extract::Path;
use axum::extract::State;
use axum::Json;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::AppState;
use crate::api::types::ApiError;
use crate::api::types::DeleteResponse;
use crate::api::types::DocumentStatsResponse;
use crate::errors::ExplorerError;

/// Index statistics (GET /api/documents/stats)
///
/// An index that has not been created yet reports zero vectors.
pub async fn document_stats(
    State(state): State<AppState>,
) -> Result<Json<DocumentStatsResponse>, ApiError> {
    info!("GET /api/documents/stats");

    match state.index.stats().await {
        Ok(stats) => {
            info!("Stats requested: {} vectors", stats.total_vector_count);
            Ok(Json(DocumentStatsResponse {
                total_vectors: stats.total_vector_count,
                dimensions: stats.dimension,
                namespaces: stats.namespaces,
            }))
        }
        Err(ExplorerError::NotInitialized(_)) => Ok(Json(DocumentStatsResponse {
            total_vectors: 0,
            dimensions: state.config.embedding_dimension(),
            namespaces: HashMap::new(),
        })),
        Err(e) => {
            error!("Failed to get stats: {}", e);
            Err(state.api_error("Failed to get document stats", &e))
        }
    }
}

/// Delete every chunk of one document (DELETE /api/documents/filename/:filename)
pub async fn delete_document(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    info!("DELETE /api/documents/filename/{}", filename);

    match state.index.delete_by_filename(&filename).await {
        Ok(()) | Err(ExplorerError::NotInitialized(_)) => Ok(Json(DeleteResponse::success(
            format!("Deleted all chunks from document: {filename}"),
        ))),
        Err(e) => {
            error!("Failed to delete document {}: {}", filename, e);
            Err(state.api_error("Failed to delete document", &e))
        }
    }
}

/// Delete everything (DELETE /api/documents/clear-all)
pub async fn clear_documents(
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, ApiError> {
    warn!("DELETE /api/documents/clear-all: clearing all documents");

    match state.index.clear().await {
        Ok(()) | Err(ExplorerError::NotInitialized(_)) => Ok(Json(DeleteResponse::success(
            "All documents have been deleted from the knowledge base",
        ))),
        Err(e) => {
            error!("Failed to clear all documents: {}", e);
            Err(state.api_error("Failed to clear documents", &e))
        }
    }
}
