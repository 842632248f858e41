//! `/users` endpoints

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extract::{AppJson, AppPath, AppQuery},
    middleware::AuthUser,
    models::{
        ChangePasswordRequest, EmailQuery, LoginRequest, RegisterRequest, Role,
        UpdateUserRequest, UserSearchQuery,
    },
    repositories::Repositories,
    state::AppState,
};

pub fn routes<R: Repositories>() -> Router<AppState<R>> {
    Router::new()
        .route("/users", get(list_users::<R>))
        .route("/users/register", post(register::<R>))
        .route("/users/login", post(login::<R>))
        .route("/users/me", get(current_user::<R>))
        .route("/users/search", get(search_users::<R>))
        .route("/users/check-email", get(check_email::<R>))
        .route("/users/by-email", get(user_by_email::<R>))
        .route("/users/role/:role", get(users_by_role::<R>))
        .route(
            "/users/:id",
            get(get_user::<R>).put(update_user::<R>).delete(delete_user::<R>),
        )
        .route("/users/:id/password", put(change_password::<R>))
        .route("/users/:id/upgrade-to-host", patch(upgrade_to_host::<R>))
}

async fn register<R: Repositories>(
    State(state): State<AppState<R>>,
    AppJson(request): AppJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = state.users.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login<R: Repositories>(
    State(state): State<AppState<R>>,
    AppJson(request): AppJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.users.login(request).await?))
}

async fn current_user<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.users.get(caller.id).await?))
}

async fn list_users<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
) -> ApiResult<impl IntoResponse> {
    caller.ensure_admin()?;
    Ok(Json(state.users.list_all().await?))
}

async fn users_by_role<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(role): AppPath<String>,
) -> ApiResult<impl IntoResponse> {
    caller.ensure_admin()?;
    let role = role.parse::<Role>().map_err(ApiError::BadRequest)?;
    Ok(Json(state.users.list_by_role(role).await?))
}

async fn search_users<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppQuery(query): AppQuery<UserSearchQuery>,
) -> ApiResult<impl IntoResponse> {
    caller.ensure_admin()?;
    Ok(Json(state.users.search(&query.q).await?))
}

async fn check_email<R: Repositories>(
    State(state): State<AppState<R>>,
    AppQuery(query): AppQuery<EmailQuery>,
) -> ApiResult<impl IntoResponse> {
    let exists = state.users.email_exists(&query.email).await?;
    Ok(Json(json!({ "exists": exists })))
}

async fn user_by_email<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppQuery(query): AppQuery<EmailQuery>,
) -> ApiResult<impl IntoResponse> {
    caller.ensure_admin()?;
    Ok(Json(state.users.get_by_email(&query.email).await?))
}

async fn get_user<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    caller.ensure_self_or_admin(id)?;
    Ok(Json(state.users.get(id).await?))
}

/// Only the account holder may change their own profile
fn ensure_self(caller: &AuthUser, id: Uuid) -> ApiResult<()> {
    if caller.id != id {
        return Err(ApiError::Forbidden(
            "You can only modify your own account".to_string(),
        ));
    }
    Ok(())
}

async fn update_user<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    ensure_self(&caller, id)?;
    Ok(Json(state.users.update_profile(id, request).await?))
}

async fn change_password<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    ensure_self(&caller, id)?;
    state.users.change_password(id, request).await?;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}

async fn upgrade_to_host<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    ensure_self(&caller, id)?;
    Ok(Json(state.users.upgrade_to_host(id).await?))
}

async fn delete_user<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    caller.ensure_self_or_admin(id)?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
