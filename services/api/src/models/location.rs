//! Storage locations and discovery queries

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored location
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: Uuid,
    pub host_id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_hour: Decimal,
    /// Concurrent booking slots
    pub capacity: i32,
    /// Free-text opening hours
    pub hours: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new location
#[derive(Debug, Clone)]
pub struct NewLocation {
    pub host_id: Uuid,
    pub details: LocationRequest,
}

/// Location fields supplied on create and full update
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    pub name: String,
    pub address: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_hour: Decimal,
    pub capacity: i32,
    pub hours: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStatusRequest {
    pub is_active: bool,
}

fn default_radius_km() -> f64 {
    5.0
}

/// Body of `/locations/nearby`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

/// Body of `/locations/nearby/filtered`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyFilteredRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_capacity: Option<i32>,
}

/// Attribute filters over active locations; each bound applies only when set
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFilter {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_capacity: Option<i32>,
    /// Case-insensitive exact match
    pub city: Option<String>,
}

impl LocationFilter {
    pub fn matches(&self, location: &Location) -> bool {
        self.min_price.is_none_or(|min| location.price_per_hour >= min)
            && self.max_price.is_none_or(|max| location.price_per_hour <= max)
            && self.min_capacity.is_none_or(|min| location.capacity >= min)
            && self
                .city
                .as_deref()
                .is_none_or(|city| location.city.to_lowercase() == city.to_lowercase())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeQuery {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityQuery {
    pub min_capacity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationSearchQuery {
    pub q: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub location_id: Uuid,
    pub available: bool,
}

/// Host details nested in a location view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

/// External view of a location
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_hour: Decimal,
    pub capacity: i32,
    pub hours: String,
    pub is_active: bool,
    /// Distance from the caller's coordinates when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub host: Option<HostSummary>,
    /// Reviews are not collected yet
    pub rating: Option<f64>,
    pub review_count: i64,
}
