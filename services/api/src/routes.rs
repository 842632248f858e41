//! HTTP routing for the API service

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{authenticate, error_path, rate_limit},
    repositories::Repositories,
    state::AppState,
};

mod bookings;
mod host;
mod locations;
mod users;

/// Create the router for the API service
///
/// Layers run outside-in: the error path stamp, then rate limiting, then
/// bearer authentication.
pub fn create_router<R: Repositories>(state: AppState<R>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(database_health::<R>))
        .merge(users::routes())
        .merge(locations::routes())
        .merge(bookings::routes())
        .merge(host::routes())
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            authenticate::<R>,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit::<R>,
        ))
        .layer(axum::middleware::from_fn(error_path))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "luggage-api"
    }))
}

/// Store connectivity
pub async fn database_health<R: Repositories>(
    State(state): State<AppState<R>>,
) -> ApiResult<impl IntoResponse> {
    if !state.repositories.health_check().await? {
        return Err(ApiError::Internal("Database health check failed".to_string()));
    }

    Ok(Json(json!({
        "status": "ok",
        "database": "connected"
    })))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Resource not found".to_string())
}
