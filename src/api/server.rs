//! HTTP server implementation

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::Result;

/// Routes plus middleware; compression skips `text/event-stream` responses
pub fn build_app(state: AppState, enable_cors: bool) -> Router {
    let mut app = routes::app_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(config: AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting KnowledgeExplorer API server...");
    info!(
        "📋 Configuration: chunk_size={}, chunk_overlap={}, min_relevance_score={}",
        config.chunk_size(),
        config.chunk_overlap(),
        config.min_relevance_score()
    );

    let keys = config.validate_api_keys();
    info!(
        "🔑 API keys: groq={}, pinecone={}, jina={}",
        keys.groq, keys.pinecone, keys.jina
    );
    if !keys.all_present() {
        warn!("⚠️  Some API keys are missing. Check your .env file.");
    }

    config.ensure_upload_dir()?;

    // Initialize services
    let state = AppState::from_config(config)?;
    let app = build_app(state, enable_cors);

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("📋 RESTful API available at http://{}/api", addr);
    info!("");
    info!("Available endpoints:");
    info!("  GET    /health                         - Health with key status");
    info!("  GET    /api/health                     - Health check");
    info!("  POST   /api/query                      - Ask a question");
    info!("  GET    /api/stream-query               - Ask a question (SSE)");
    info!("  POST   /api/upload                     - Upload PDF/TXT files");
    info!("  GET    /api/upload/status              - Upload directory listing");
    info!("  GET    /api/documents/stats            - Index statistics");
    info!("  DELETE /api/documents/filename/:name   - Delete one document");
    info!("  DELETE /api/documents/clear-all        - Delete all documents");

    axum::serve(listener, app).await?;

    info!("👋 Shutting down KnowledgeExplorer API server...");
    Ok(())
}
