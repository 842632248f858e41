//! Location management and discovery
//!
//! Discovery queries only ever return active locations. Direct fetches by id
//! and a host's own listing include inactive ones.

use auth::validation::{
    ValidationErrors, validate_latitude, validate_longitude, validate_required,
};
use chrono::{DateTime, Utc};
use common::geo::{BoundingBox, haversine_km};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Location, LocationFilter, LocationRequest, LocationResponse, NearbyFilteredRequest,
    NearbyRequest, NewLocation, PageResponse, Role,
};
use crate::repositories::{BookingRepository, LocationRepository, Repositories, UserRepository};
use crate::services::responses::{
    location_view, location_views, location_views_with_distance,
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_POPULAR_LIMIT: i64 = 10;
pub const MAX_POPULAR_LIMIT: i64 = 100;

pub(crate) fn location_not_found() -> ApiError {
    ApiError::NotFound("Location not found".to_string())
}

fn validate_details(details: &LocationRequest) -> ApiResult<()> {
    let mut errors = ValidationErrors::new();
    errors
        .check("name", validate_required(&details.name, "Name"))
        .check("address", validate_required(&details.address, "Address"))
        .check("city", validate_required(&details.city, "City"))
        .check("hours", validate_required(&details.hours, "Hours"))
        .check("latitude", validate_latitude(details.latitude))
        .check("longitude", validate_longitude(details.longitude));

    if details.price_per_hour <= Decimal::ZERO {
        errors.add("pricePerHour", "Price per hour must be positive");
    }
    if details.capacity <= 0 {
        errors.add("capacity", "Capacity must be positive");
    }

    errors.into_result().map_err(ApiError::Validation)
}

fn validate_search_area(latitude: f64, longitude: f64, radius_km: f64) -> ApiResult<()> {
    let mut errors = ValidationErrors::new();
    errors
        .check("latitude", validate_latitude(latitude))
        .check("longitude", validate_longitude(longitude));

    if !radius_km.is_finite() || radius_km < 0.0 {
        errors.add("radiusKm", "Radius must be a non-negative number");
    }

    errors.into_result().map_err(ApiError::Validation)
}

fn validate_filter(filter: &LocationFilter) -> ApiResult<()> {
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(ApiError::invalid(
                "maxPrice",
                "Maximum price must not be less than minimum price",
            ));
        }
    }
    Ok(())
}

/// Free slots check shared with booking creation and rescheduling
///
/// Occupancy counts pending and confirmed bookings overlapping `[start, end]`,
/// shared endpoints included.
pub(crate) async fn has_capacity<R: Repositories>(
    repos: &R,
    location: &Location,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    required: i32,
    exclude: Option<Uuid>,
) -> ApiResult<bool> {
    let occupied = repos
        .bookings()
        .count_overlapping(location.id, start, end, exclude)
        .await?;

    Ok(i64::from(location.capacity) - occupied >= i64::from(required))
}

#[derive(Clone)]
pub struct LocationService<R> {
    repos: R,
}

impl<R: Repositories> LocationService<R> {
    pub fn new(repos: R) -> Self {
        Self { repos }
    }

    async fn find(&self, id: Uuid) -> ApiResult<Location> {
        self.repos
            .locations()
            .find_by_id(id)
            .await?
            .ok_or_else(location_not_found)
    }

    /// Load a location the caller must own
    async fn find_owned(&self, id: Uuid, host_id: Uuid, denied: &str) -> ApiResult<Location> {
        let location = self.find(id).await?;
        if location.host_id != host_id {
            return Err(ApiError::Forbidden(denied.to_string()));
        }
        Ok(location)
    }

    /// New active location; the caller's stored role must be HOST
    pub async fn create(
        &self,
        host_id: Uuid,
        details: LocationRequest,
    ) -> ApiResult<LocationResponse> {
        validate_details(&details)?;

        let host = self
            .repos
            .users()
            .find_by_id(host_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Host not found".to_string()))?;
        if host.role != Role::Host {
            return Err(ApiError::Forbidden("User is not a host".to_string()));
        }

        let location = self
            .repos
            .locations()
            .create(NewLocation { host_id, details })
            .await?;

        info!("Host {} created location {}", host_id, location.id);
        location_view(&self.repos, location).await
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<LocationResponse> {
        let location = self.find(id).await?;
        location_view(&self.repos, location).await
    }

    /// Active locations by name, one page at a time
    pub async fn list(
        &self,
        page: Option<i64>,
        size: Option<i64>,
    ) -> ApiResult<PageResponse<LocationResponse>> {
        let page = page.unwrap_or(0).max(0);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let (locations, total) = self
            .repos
            .locations()
            .list_active_page(page.saturating_mul(size), size)
            .await?;
        let content = location_views(&self.repos, locations).await?;

        Ok(PageResponse::new(content, page, size, total))
    }

    pub async fn list_by_host(&self, host_id: Uuid) -> ApiResult<Vec<LocationResponse>> {
        let locations = self.repos.locations().list_by_host(host_id).await?;
        location_views(&self.repos, locations).await
    }

    /// Full replacement of the editable fields
    pub async fn update(
        &self,
        id: Uuid,
        host_id: Uuid,
        details: LocationRequest,
    ) -> ApiResult<LocationResponse> {
        self.find_owned(id, host_id, "You don't have permission to update this location")
            .await?;
        validate_details(&details)?;

        let location = self
            .repos
            .locations()
            .update_details(id, &details)
            .await?
            .ok_or_else(location_not_found)?;

        info!("Host {} updated location {}", host_id, id);
        location_view(&self.repos, location).await
    }

    pub async fn set_active(
        &self,
        id: Uuid,
        host_id: Uuid,
        is_active: bool,
    ) -> ApiResult<LocationResponse> {
        self.find_owned(id, host_id, "You don't have permission to update this location")
            .await?;

        let location = self
            .repos
            .locations()
            .set_active(id, is_active)
            .await?
            .ok_or_else(location_not_found)?;

        info!("Host {} set location {} active={}", host_id, id, is_active);
        location_view(&self.repos, location).await
    }

    /// Hard delete, refused while pending or confirmed bookings remain
    pub async fn delete(&self, id: Uuid, host_id: Uuid) -> ApiResult<()> {
        self.find_owned(id, host_id, "You don't have permission to delete this location")
            .await?;

        if self.repos.bookings().count_open_for_location(id).await? > 0 {
            return Err(ApiError::BadRequest(
                "Location has active bookings and cannot be deleted".to_string(),
            ));
        }

        if !self.repos.locations().delete(id).await? {
            return Err(location_not_found());
        }

        info!("Host {} deleted location {}", host_id, id);
        Ok(())
    }

    /// Active locations within `radius_km`, nearest first
    async fn within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        filter: &LocationFilter,
    ) -> ApiResult<Vec<LocationResponse>> {
        validate_search_area(latitude, longitude, radius_km)?;

        let bounds = BoundingBox::around(latitude, longitude, radius_km);
        let candidates = self.repos.locations().list_active_within(bounds).await?;

        let mut hits: Vec<(Location, f64)> = candidates
            .into_iter()
            .filter(|location| filter.matches(location))
            .map(|location| {
                let distance =
                    haversine_km(latitude, longitude, location.latitude, location.longitude);
                (location, distance)
            })
            .filter(|(_, distance)| *distance <= radius_km)
            .collect();

        hits.sort_by(|(a, da), (b, db)| da.total_cmp(db).then_with(|| a.id.cmp(&b.id)));

        let hits = hits
            .into_iter()
            .map(|(location, distance)| (location, Some(distance)))
            .collect();
        location_views_with_distance(&self.repos, hits).await
    }

    pub async fn find_nearby(&self, request: NearbyRequest) -> ApiResult<Vec<LocationResponse>> {
        self.within_radius(
            request.latitude,
            request.longitude,
            request.radius_km,
            &LocationFilter::default(),
        )
        .await
    }

    pub async fn find_nearby_filtered(
        &self,
        request: NearbyFilteredRequest,
    ) -> ApiResult<Vec<LocationResponse>> {
        let filter = LocationFilter {
            min_price: request.min_price,
            max_price: request.max_price,
            min_capacity: request.min_capacity,
            city: None,
        };
        validate_filter(&filter)?;

        self.within_radius(request.latitude, request.longitude, request.radius_km, &filter)
            .await
    }

    /// Name or address contains `keyword`, ignoring case
    pub async fn search(&self, keyword: &str) -> ApiResult<Vec<LocationResponse>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ApiError::invalid("q", "Search keyword is required"));
        }

        let locations = self.repos.locations().search_active(keyword).await?;
        location_views(&self.repos, locations).await
    }

    /// Any combination of price range, minimum capacity and city
    pub async fn filter(&self, filter: LocationFilter) -> ApiResult<Vec<LocationResponse>> {
        validate_filter(&filter)?;

        let locations = self.repos.locations().filter_active(&filter).await?;
        location_views(&self.repos, locations).await
    }

    pub async fn filter_by_price_range(
        &self,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
    ) -> ApiResult<Vec<LocationResponse>> {
        self.filter(LocationFilter {
            min_price,
            max_price,
            ..LocationFilter::default()
        })
        .await
    }

    pub async fn filter_by_capacity(&self, min_capacity: i32) -> ApiResult<Vec<LocationResponse>> {
        self.filter(LocationFilter {
            min_capacity: Some(min_capacity),
            ..LocationFilter::default()
        })
        .await
    }

    pub async fn by_city(&self, city: &str) -> ApiResult<Vec<LocationResponse>> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ApiError::invalid("city", "City is required"));
        }

        self.filter(LocationFilter {
            city: Some(city.to_string()),
            ..LocationFilter::default()
        })
        .await
    }

    pub async fn list_cities(&self) -> ApiResult<Vec<String>> {
        Ok(self.repos.locations().list_active_cities().await?)
    }

    /// Most booked active locations
    pub async fn popular(&self, limit: Option<i64>) -> ApiResult<Vec<LocationResponse>> {
        let limit = limit.unwrap_or(DEFAULT_POPULAR_LIMIT);
        if limit <= 0 {
            return Err(ApiError::invalid("limit", "Limit must be positive"));
        }

        let ranked = self
            .repos
            .locations()
            .popular(limit.min(MAX_POPULAR_LIMIT))
            .await?;
        let locations = ranked.into_iter().map(|(location, _)| location).collect();
        location_views(&self.repos, locations).await
    }

    /// Whether `required` slots are free over `[start, end]`
    ///
    /// A missing or inactive location is simply unavailable.
    pub async fn is_available(
        &self,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        required: i32,
    ) -> ApiResult<bool> {
        if end <= start {
            return Err(ApiError::invalid(
                "endTime",
                "End time must be after start time",
            ));
        }
        if required < 1 {
            return Err(ApiError::invalid("capacity", "Capacity must be at least 1"));
        }

        match self.repos.locations().find_by_id(id).await? {
            Some(location) if location.is_active => {
                has_capacity(&self.repos, &location, start, end, required, None).await
            }
            _ => Ok(false),
        }
    }
}
