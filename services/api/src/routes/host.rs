//! `/host` views, restricted to users whose stored role is HOST

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    extract::AppPath,
    middleware::AuthUser,
    repositories::Repositories,
    state::AppState,
};

pub fn routes<R: Repositories>() -> Router<AppState<R>> {
    Router::new()
        .route("/host/bookings", get(host_bookings::<R>))
        .route("/host/locations/:id/bookings", get(location_bookings::<R>))
        .route("/host/dashboard", get(dashboard::<R>))
}

async fn host_bookings<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.hosts.list_bookings(caller.id).await?))
}

async fn location_bookings<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.hosts.list_for_location(id, caller.id).await?))
}

async fn dashboard<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.hosts.dashboard(caller.id).await?))
}
