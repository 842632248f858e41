//! Booking lifecycle: creation, rescheduling and status transitions

use auth::validation::ValidationErrors;
use chrono::{DateTime, Utc};
use common::pricing::price_cents;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::{
    Booking, BookingAction, BookingResponse, CreateBookingRequest, Location, NewBooking,
    UpdateBookingRequest,
};
use crate::repositories::{BookingRepository, LocationRepository, Repositories, UserRepository};
use crate::services::locations::{has_capacity, location_not_found};
use crate::services::responses::{booking_view, booking_views};

pub(crate) fn booking_not_found() -> ApiError {
    ApiError::NotFound("Booking not found".to_string())
}

fn insufficient_capacity() -> ApiError {
    ApiError::BadRequest(
        "Location does not have enough capacity for the requested time".to_string(),
    )
}

/// Field checks on a requested schedule
///
/// `check_start` is false when an update keeps the stored start time, which
/// may already have passed.
fn validate_schedule(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    check_start: bool,
    items: i32,
    now: DateTime<Utc>,
) -> ApiResult<()> {
    let mut errors = ValidationErrors::new();

    if check_start && start <= now {
        errors.add("startTime", "Start time must be in the future");
    }
    if end <= start {
        errors.add("endTime", "End time must be after start time");
    }
    if items < 1 {
        errors.add("numberOfItems", "Number of items must be at least 1");
    }

    errors.into_result().map_err(ApiError::Validation)
}

#[derive(Clone)]
pub struct BookingService<R> {
    repos: R,
}

impl<R: Repositories> BookingService<R> {
    pub fn new(repos: R) -> Self {
        Self { repos }
    }

    async fn find(&self, id: Uuid) -> ApiResult<Booking> {
        self.repos
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_else(booking_not_found)
    }

    async fn location_of(&self, booking: &Booking) -> ApiResult<Location> {
        self.repos
            .locations()
            .find_by_id(booking.location_id)
            .await?
            .ok_or_else(location_not_found)
    }

    /// New PENDING booking priced from the location's hourly rate
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateBookingRequest,
    ) -> ApiResult<BookingResponse> {
        let items = request.number_of_items.unwrap_or(1);
        validate_schedule(request.start_time, request.end_time, true, items, Utc::now())?;

        self.repos
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let location = self
            .repos
            .locations()
            .find_by_id(request.location_id)
            .await?
            .ok_or_else(location_not_found)?;

        if !location.is_active {
            return Err(ApiError::BadRequest("Location is not active".to_string()));
        }

        if !has_capacity(
            &self.repos,
            &location,
            request.start_time,
            request.end_time,
            items,
            None,
        )
        .await?
        {
            return Err(insufficient_capacity());
        }

        let booking = self
            .repos
            .bookings()
            .create(NewBooking {
                user_id,
                location_id: location.id,
                start_time: request.start_time,
                end_time: request.end_time,
                price_cents: price_cents(
                    request.start_time,
                    request.end_time,
                    location.price_per_hour,
                ),
            })
            .await?;

        info!(
            "User {} booked location {} ({}, {} cents)",
            user_id, location.id, booking.id, booking.price_cents
        );
        booking_view(&self.repos, booking).await
    }

    /// Reschedule a pending booking owned by `user_id`
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        request: UpdateBookingRequest,
    ) -> ApiResult<BookingResponse> {
        let booking = self.find(id).await?;

        if booking.user_id != user_id {
            return Err(ApiError::Forbidden(
                "You can only update your own bookings".to_string(),
            ));
        }
        if !booking.status.is_editable() {
            return Err(ApiError::BadRequest(
                "Only pending bookings can be updated".to_string(),
            ));
        }

        let start = request.start_time.unwrap_or(booking.start_time);
        let end = request.end_time.unwrap_or(booking.end_time);
        let items = request.number_of_items.unwrap_or(1);
        validate_schedule(start, end, request.start_time.is_some(), items, Utc::now())?;

        let rescheduled = start != booking.start_time || end != booking.end_time;
        if !rescheduled && request.number_of_items.is_none() {
            return booking_view(&self.repos, booking).await;
        }

        let location = self.location_of(&booking).await?;
        if !has_capacity(&self.repos, &location, start, end, items, Some(booking.id)).await? {
            return Err(insufficient_capacity());
        }

        if !rescheduled {
            return booking_view(&self.repos, booking).await;
        }

        let booking = self
            .repos
            .bookings()
            .update_schedule(id, start, end, price_cents(start, end, location.price_per_hour))
            .await?
            .ok_or_else(booking_not_found)?;

        info!("User {} rescheduled booking {}", user_id, id);
        booking_view(&self.repos, booking).await
    }

    async fn transition(&self, booking: Booking, action: BookingAction) -> ApiResult<BookingResponse> {
        let status = booking
            .status
            .apply(action)
            .map_err(|message| ApiError::BadRequest(message.to_string()))?;

        let booking = self
            .repos
            .bookings()
            .update_status(booking.id, status)
            .await?
            .ok_or_else(booking_not_found)?;

        booking_view(&self.repos, booking).await
    }

    pub async fn cancel(&self, id: Uuid, user_id: Uuid) -> ApiResult<BookingResponse> {
        let booking = self.find(id).await?;
        if booking.user_id != user_id {
            return Err(ApiError::Forbidden(
                "You can only cancel your own bookings".to_string(),
            ));
        }

        let response = self.transition(booking, BookingAction::Cancel).await?;
        info!("User {} cancelled booking {}", user_id, id);
        Ok(response)
    }

    /// Booking whose location is hosted by `host_id`
    async fn find_hosted(&self, id: Uuid, host_id: Uuid, denied: &str) -> ApiResult<Booking> {
        let booking = self.find(id).await?;
        let location = self.location_of(&booking).await?;
        if location.host_id != host_id {
            return Err(ApiError::Forbidden(denied.to_string()));
        }
        Ok(booking)
    }

    pub async fn confirm(&self, id: Uuid, host_id: Uuid) -> ApiResult<BookingResponse> {
        let booking = self
            .find_hosted(id, host_id, "Only the location host can confirm bookings")
            .await?;

        let response = self.transition(booking, BookingAction::Confirm).await?;
        info!("Host {} confirmed booking {}", host_id, id);
        Ok(response)
    }

    pub async fn complete(&self, id: Uuid, host_id: Uuid) -> ApiResult<BookingResponse> {
        let booking = self
            .find_hosted(id, host_id, "Only the location host can complete bookings")
            .await?;

        let response = self.transition(booking, BookingAction::Complete).await?;
        info!("Host {} completed booking {}", host_id, id);
        Ok(response)
    }

    /// Visible to the customer, the location's host and admins
    pub async fn get(&self, id: Uuid, caller: &AuthUser) -> ApiResult<BookingResponse> {
        let booking = self.find(id).await?;

        if booking.user_id != caller.id && !caller.is_admin() {
            let location = self.location_of(&booking).await?;
            if location.host_id != caller.id {
                return Err(ApiError::Forbidden(
                    "You don't have permission to view this booking".to_string(),
                ));
            }
        }

        booking_view(&self.repos, booking).await
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> ApiResult<Vec<BookingResponse>> {
        let bookings = self.repos.bookings().list_by_user(user_id).await?;
        booking_views(&self.repos, bookings).await
    }

    pub async fn list_all(&self) -> ApiResult<Vec<BookingResponse>> {
        let bookings = self.repos.bookings().list_all().await?;
        booking_views(&self.repos, bookings).await
    }
}
