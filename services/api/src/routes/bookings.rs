//! `/bookings` endpoints

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    extract::{AppJson, AppPath},
    middleware::AuthUser,
    models::{CreateBookingRequest, UpdateBookingRequest},
    repositories::Repositories,
    state::AppState,
};

pub fn routes<R: Repositories>() -> Router<AppState<R>> {
    Router::new()
        .route(
            "/bookings",
            get(list_bookings::<R>).post(create_booking::<R>),
        )
        .route("/bookings/me", get(my_bookings::<R>))
        .route("/bookings/user/:user_id", get(user_bookings::<R>))
        .route(
            "/bookings/:id",
            get(get_booking::<R>)
                .put(update_booking::<R>)
                .delete(cancel_booking::<R>),
        )
        .route("/bookings/:id/confirm", patch(confirm_booking::<R>))
        .route("/bookings/:id/complete", patch(complete_booking::<R>))
}

async fn create_booking<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppJson(request): AppJson<CreateBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    let booking = state.bookings.create(caller.id, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn list_bookings<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
) -> ApiResult<impl IntoResponse> {
    caller.ensure_admin()?;
    Ok(Json(state.bookings.list_all().await?))
}

async fn my_bookings<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.bookings.list_for_user(caller.id).await?))
}

async fn user_bookings<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    caller.ensure_self_or_admin(user_id)?;
    Ok(Json(state.bookings.list_for_user(user_id).await?))
}

async fn get_booking<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.bookings.get(id, &caller).await?))
}

async fn update_booking<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.bookings.update(id, caller.id, request).await?))
}

async fn cancel_booking<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.bookings.cancel(id, caller.id).await?))
}

async fn confirm_booking<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.bookings.confirm(id, caller.id).await?))
}

async fn complete_booking<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.bookings.complete(id, caller.id).await?))
}
