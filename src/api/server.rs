//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers;
use super::models::{ApiResponse, SelectiveSyncRequest, SyncRequest};
use crate::sync::SyncService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SyncService>,
}

/// Build the router with all routes and middleware
pub fn router(service: Arc<SyncService>) -> Router {
    let app_state = AppState { service };

    // Configure CORS to allow browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        // Health check endpoints (both paths for compatibility)
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        // Catalog endpoints
        .route("/api/clips", get(list_clips_handler))
        // Reconciliation endpoints
        .route("/api/sync", post(sync_handler))
        .route("/api/sync/preview", post(preview_handler))
        .route("/api/sync/selective", post(selective_sync_handler))
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(service: Arc<SyncService>, host: &str, port: u16) -> Result<()> {
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    info!("🌐 API server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Rejected roots answer 400 with the report as body
fn report_response<T: serde::Serialize>(result: Result<T, T>) -> axum::response::Response {
    match result {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(report) => (StatusCode::BAD_REQUEST, Json(report)).into_response(),
    }
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    match handlers::health_check().await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => {
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            (status, Json(ApiResponse::<()>::error(e.to_string()))).into_response()
        }
    }
}

/// List local clips handler
async fn list_clips_handler(State(state): State<AppState>) -> impl IntoResponse {
    match handlers::list_clips(state.service.store().as_ref()).await {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))).into_response(),
        Err(e) => {
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            (status, Json(ApiResponse::<()>::error(e.to_string()))).into_response()
        }
    }
}

/// Full sync handler
async fn sync_handler(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> impl IntoResponse {
    report_response(handlers::run_sync(&state.service, &request).await)
}

/// Preview handler
async fn preview_handler(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> impl IntoResponse {
    report_response(handlers::run_preview(&state.service, &request).await)
}

/// Selective sync handler
async fn selective_sync_handler(
    State(state): State<AppState>,
    Json(request): Json<SelectiveSyncRequest>,
) -> impl IntoResponse {
    report_response(handlers::run_selective_sync(&state.service, &request).await)
}
