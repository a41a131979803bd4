//! API route definitions

use axum::extract::DefaultBodyLimit;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Query endpoints
        .route("/query", post(handlers::query))
        .route("/stream-query", get(handlers::stream_query))
        // Upload endpoints; size is enforced per file while each field is read
        .route(
            "/upload",
            post(handlers::upload_files).layer(DefaultBodyLimit::disable()),
        )
        .route("/upload/status", get(handlers::upload_status))
        // Document management
        .route("/documents/stats", get(handlers::document_stats))
        .route(
            "/documents/filename/:filename",
            delete(handlers::delete_document),
        )
        .route("/documents/clear-all", delete(handlers::clear_documents))
        .with_state(state)
}

/// Full application: banner and health at the root, everything else under `/api`
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::service_health))
        .with_state(state.clone())
        .nest("/api", api_routes(state))
}
