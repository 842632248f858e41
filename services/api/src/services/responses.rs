//! Response assembly
//!
//! Maps stored entities onto their external views. Related users and
//! locations are fetched in one batch per listing rather than per row.

use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Booking, BookingLocationSummary, BookingResponse, BookingUserSummary, HostSummary, Location,
    LocationResponse, Role, User, UserResponse,
};
use crate::repositories::{
    BookingRepository, LocationRepository, Repositories, UserRepository,
};

fn unique_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

pub fn location_response(
    location: Location,
    host: Option<&User>,
    distance_km: Option<f64>,
) -> LocationResponse {
    LocationResponse {
        id: location.id,
        name: location.name,
        address: location.address,
        city: location.city,
        latitude: location.latitude,
        longitude: location.longitude,
        price_per_hour: location.price_per_hour,
        capacity: location.capacity,
        hours: location.hours,
        is_active: location.is_active,
        distance_km,
        host: host.map(|host| HostSummary {
            id: host.id,
            full_name: host.full_name.clone(),
            email: host.email.clone(),
        }),
        rating: None,
        review_count: 0,
    }
}

pub fn booking_response(
    booking: Booking,
    user: Option<&User>,
    location: Option<&Location>,
) -> BookingResponse {
    BookingResponse {
        id: booking.id,
        user: user.map(|user| BookingUserSummary {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
        }),
        location: location.map(|location| BookingLocationSummary {
            id: location.id,
            name: location.name.clone(),
            address: location.address.clone(),
        }),
        start_time: booking.start_time,
        end_time: booking.end_time,
        price_cents: booking.price_cents,
        status: booking.status,
    }
}

pub fn user_response(user: User, total_bookings: i64, total_locations: Option<i64>) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        role: user.role,
        created_at: user.created_at,
        updated_at: user.updated_at,
        total_bookings,
        total_locations,
    }
}

/// User view with booking and (for hosts) location totals
pub async fn user_view<R: Repositories>(repos: &R, user: User) -> ApiResult<UserResponse> {
    let mut views = user_views(repos, vec![user]).await?;
    views
        .pop()
        .ok_or_else(|| ApiError::Internal("user view missing".to_string()))
}

pub async fn user_views<R: Repositories>(repos: &R, users: Vec<User>) -> ApiResult<Vec<UserResponse>> {
    let user_ids = unique_ids(users.iter().map(|u| u.id));
    let host_ids = unique_ids(users.iter().filter(|u| u.role == Role::Host).map(|u| u.id));

    let bookings = repos.bookings().count_by_users(&user_ids).await?;
    let locations = repos.locations().count_by_hosts(&host_ids).await?;

    Ok(users
        .into_iter()
        .map(|user| {
            let total_bookings = bookings.get(&user.id).copied().unwrap_or(0);
            let total_locations = (user.role == Role::Host)
                .then(|| locations.get(&user.id).copied().unwrap_or(0));
            user_response(user, total_bookings, total_locations)
        })
        .collect())
}

/// Location views paired with an optional distance from the caller
pub async fn location_views_with_distance<R: Repositories>(
    repos: &R,
    locations: Vec<(Location, Option<f64>)>,
) -> ApiResult<Vec<LocationResponse>> {
    let host_ids = unique_ids(locations.iter().map(|(l, _)| l.host_id));
    let hosts: HashMap<Uuid, User> = repos
        .users()
        .find_many(&host_ids)
        .await?
        .into_iter()
        .map(|host| (host.id, host))
        .collect();

    Ok(locations
        .into_iter()
        .map(|(location, distance)| {
            let host = hosts.get(&location.host_id);
            location_response(location, host, distance)
        })
        .collect())
}

pub async fn location_views<R: Repositories>(
    repos: &R,
    locations: Vec<Location>,
) -> ApiResult<Vec<LocationResponse>> {
    location_views_with_distance(repos, locations.into_iter().map(|l| (l, None)).collect()).await
}

pub async fn location_view<R: Repositories>(
    repos: &R,
    location: Location,
) -> ApiResult<LocationResponse> {
    let host = repos.users().find_by_id(location.host_id).await?;
    Ok(location_response(location, host.as_ref(), None))
}

pub async fn booking_views<R: Repositories>(
    repos: &R,
    bookings: Vec<Booking>,
) -> ApiResult<Vec<BookingResponse>> {
    let user_ids = unique_ids(bookings.iter().map(|b| b.user_id));
    let location_ids = unique_ids(bookings.iter().map(|b| b.location_id));

    let users: HashMap<Uuid, User> = repos
        .users()
        .find_many(&user_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();
    let locations: HashMap<Uuid, Location> = repos
        .locations()
        .find_many(&location_ids)
        .await?
        .into_iter()
        .map(|location| (location.id, location))
        .collect();

    Ok(bookings
        .into_iter()
        .map(|booking| {
            let user = users.get(&booking.user_id);
            let location = locations.get(&booking.location_id);
            booking_response(booking, user, location)
        })
        .collect())
}

pub async fn booking_view<R: Repositories>(repos: &R, booking: Booking) -> ApiResult<BookingResponse> {
    let mut views = booking_views(repos, vec![booking]).await?;
    views
        .pop()
        .ok_or_else(|| ApiError::Internal("booking view missing".to_string()))
}
