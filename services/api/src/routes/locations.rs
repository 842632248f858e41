//! `/locations` endpoints

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    extract::{AppJson, AppPath, AppQuery},
    middleware::AuthUser,
    models::{
        AvailabilityQuery, AvailabilityResponse, CapacityQuery, LocationFilter,
        LocationRequest, LocationSearchQuery, LocationStatusRequest, NearbyFilteredRequest,
        NearbyRequest, PageQuery, PopularQuery, PriceRangeQuery,
    },
    repositories::Repositories,
    state::AppState,
};

pub fn routes<R: Repositories>() -> Router<AppState<R>> {
    Router::new()
        .route(
            "/locations",
            get(list_locations::<R>).post(create_location::<R>),
        )
        .route("/locations/nearby", post(nearby::<R>))
        .route("/locations/nearby/filtered", post(nearby_filtered::<R>))
        .route("/locations/search", get(search::<R>))
        .route("/locations/filter", get(filter::<R>))
        .route("/locations/price-range", get(price_range::<R>))
        .route("/locations/capacity", get(capacity::<R>))
        .route("/locations/cities", get(cities::<R>))
        .route("/locations/city/:city", get(by_city::<R>))
        .route("/locations/popular", get(popular::<R>))
        .route("/locations/host/:host_id", get(by_host::<R>))
        .route(
            "/locations/:id",
            get(get_location::<R>)
                .put(update_location::<R>)
                .delete(delete_location::<R>),
        )
        .route("/locations/:id/status", patch(set_status::<R>))
        .route("/locations/:id/availability", get(availability::<R>))
}

async fn list_locations<R: Repositories>(
    State(state): State<AppState<R>>,
    AppQuery(query): AppQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.list(query.page, query.size).await?))
}

async fn create_location<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppJson(request): AppJson<LocationRequest>,
) -> ApiResult<impl IntoResponse> {
    let location = state.locations.create(caller.id, request).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

async fn get_location<R: Repositories>(
    State(state): State<AppState<R>>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.get(id).await?))
}

async fn by_host<R: Repositories>(
    State(state): State<AppState<R>>,
    AppPath(host_id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.list_by_host(host_id).await?))
}

async fn update_location<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<LocationRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.update(id, caller.id, request).await?))
}

async fn set_status<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<LocationStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let location = state
        .locations
        .set_active(id, caller.id, request.is_active)
        .await?;
    Ok(Json(location))
}

async fn delete_location<R: Repositories>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.locations.delete(id, caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn nearby<R: Repositories>(
    State(state): State<AppState<R>>,
    AppJson(request): AppJson<NearbyRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.find_nearby(request).await?))
}

async fn nearby_filtered<R: Repositories>(
    State(state): State<AppState<R>>,
    AppJson(request): AppJson<NearbyFilteredRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.find_nearby_filtered(request).await?))
}

async fn search<R: Repositories>(
    State(state): State<AppState<R>>,
    AppQuery(query): AppQuery<LocationSearchQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.search(&query.q).await?))
}

async fn filter<R: Repositories>(
    State(state): State<AppState<R>>,
    AppQuery(filter): AppQuery<LocationFilter>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.filter(filter).await?))
}

async fn price_range<R: Repositories>(
    State(state): State<AppState<R>>,
    AppQuery(query): AppQuery<PriceRangeQuery>,
) -> ApiResult<impl IntoResponse> {
    let locations = state
        .locations
        .filter_by_price_range(query.min_price, query.max_price)
        .await?;
    Ok(Json(locations))
}

async fn capacity<R: Repositories>(
    State(state): State<AppState<R>>,
    AppQuery(query): AppQuery<CapacityQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state.locations.filter_by_capacity(query.min_capacity).await?,
    ))
}

async fn cities<R: Repositories>(State(state): State<AppState<R>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.list_cities().await?))
}

async fn by_city<R: Repositories>(
    State(state): State<AppState<R>>,
    AppPath(city): AppPath<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.by_city(&city).await?))
}

async fn popular<R: Repositories>(
    State(state): State<AppState<R>>,
    AppQuery(query): AppQuery<PopularQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.locations.popular(query.limit).await?))
}

async fn availability<R: Repositories>(
    State(state): State<AppState<R>>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<AvailabilityQuery>,
) -> ApiResult<impl IntoResponse> {
    let available = state
        .locations
        .is_available(id, query.start_time, query.end_time, query.capacity.unwrap_or(1))
        .await?;

    Ok(Json(AvailabilityResponse {
        location_id: id,
        available,
    }))
}
