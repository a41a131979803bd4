/// Query handlers: blocking answers and SSE streams
use std::convert::Infallible;

use axum::extract::Query;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderName;
use axum::response::sse::Event;
use axum::response::sse::KeepAlive;
use axum::response::sse::Sse;
use axum::response::IntoResponse;
use axum::Json;
use futures::StreamExt;
use tracing::error;
use tracing::info;

use super::AppState;
use crate::api::types::query_options;
use crate::api::types::ApiError;
use crate::api::types::QueryRequest;
use crate::api::types::StreamQueryParams;
use crate::rag::truncate_str;
use crate::rag::QueryEvent;
use crate::rag::QueryResult;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

impl From<QueryEvent> for Event {
    fn from(event: QueryEvent) -> Self {
        Event::default().event(event.kind()).data(event.data())
    }
}

/// Answer a question in one response (POST /api/query)
pub async fn query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResult>, ApiError> {
    info!("POST /api/query: {}", truncate_str(&req.question, 100));

    let options = query_options(
        &state.config.retrieval,
        &req.question,
        req.top_k,
        req.force_documents,
        req.filename.as_deref(),
    )
    .map_err(|e| state.api_error("Invalid query", &e))?;

    let result = state
        .query_service
        .answer(&req.question, &options)
        .await
        .map_err(|e| {
            error!("Query failed: {}", e);
            state.api_error("Query processing failed", &e)
        })?;

    Ok(Json(result))
}

/// Answer a question as server-sent events (GET /api/stream-query)
///
/// Request validation failures are plain HTTP errors; once the stream is open, failures
/// arrive as a terminal `error` event.
pub async fn stream_query(
    State(state): State<AppState>,
    Query(params): Query<StreamQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/stream-query: {}", truncate_str(&params.question, 100));

    let options = query_options(
        &state.config.retrieval,
        &params.question,
        params.top_k,
        params.force_documents,
        params.filename.as_deref(),
    )
    .map_err(|e| state.api_error("Invalid query", &e))?;

    let events = state
        .query_service
        .answer_stream(params.question, options)
        .map(|event| Ok::<Event, Infallible>(event.into()));

    Ok((
        [
            (header::CACHE_CONTROL, "no-cache"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        Sse::new(events).keep_alive(KeepAlive::default()),
    ))
}
