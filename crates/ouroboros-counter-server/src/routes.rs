//! Route table and handlers
//!
//! All counter routes live under `/api/v1`; `/health` sits at the root.

use std::time::Duration;

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use ouroboros_counter::{CounterResponse, CounterService};
use serde_json::json;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: CounterService,
}

/// Build the application router
pub fn build_router(service: CounterService, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route("/storage", post(create_counter))
        .route(
            "/storage/{key}",
            put(increment_counter).get(check_counter).delete(delete_counter),
        )
        .route("/storage/{key}/increment", put(increment_counter))
        .route("/storage/{key}/decrement", put(decrement_counter))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health))
        .layer(middleware::from_fn_with_state(request_timeout, enforce_deadline))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

/// Answer with an `ErrorResponse` once a request outlives `limit`
async fn enforce_deadline(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => ApiError::Timeout(limit).into_response(),
    }
}

/// POST /api/v1/storage
async fn create_counter(State(state): State<AppState>) -> ApiResult<Json<CounterResponse>> {
    let result = state.service.create_or_increment(None).await?;
    Ok(Json(result.into()))
}

/// PUT /api/v1/storage/{key} and PUT /api/v1/storage/{key}/increment
async fn increment_counter(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<CounterResponse>> {
    let result = state.service.increment_with_key(&key).await?;
    Ok(Json(result.into()))
}

/// PUT /api/v1/storage/{key}/decrement
async fn decrement_counter(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<CounterResponse>> {
    let result = state.service.decrement(&key).await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/storage/{key}
async fn check_counter(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<CounterResponse>> {
    let result = state.service.check(&key).await?;
    Ok(Json(result.into()))
}

/// DELETE /api/v1/storage/{key}
///
/// 200 with `true` when the counter was removed, 404 with an empty body when
/// there was nothing to remove.
async fn delete_counter(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Response> {
    if state.service.delete(&key).await? {
        Ok(Json(true).into_response())
    } else {
        debug!(key = %key, "Delete of absent counter");
        Ok(StatusCode::NOT_FOUND.into_response())
    }
}

/// GET /health
async fn health(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    state
        .service
        .health_check()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;

    Ok(Json(json!({ "status": "ok" })))
}
