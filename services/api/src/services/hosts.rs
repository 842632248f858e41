//! Host-only views over bookings at the host's locations

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{BookingResponse, HostDashboard, Role};
use crate::repositories::{BookingRepository, LocationRepository, Repositories, UserRepository};
use crate::services::responses::booking_views;

#[derive(Clone)]
pub struct HostService<R> {
    repos: R,
}

impl<R: Repositories> HostService<R> {
    pub fn new(repos: R) -> Self {
        Self { repos }
    }

    /// The stored role decides, not the one in the caller's token
    async fn ensure_host(&self, host_id: Uuid) -> ApiResult<()> {
        let user = self
            .repos
            .users()
            .find_by_id(host_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if user.role != Role::Host {
            return Err(ApiError::Forbidden("User is not a host".to_string()));
        }
        Ok(())
    }

    /// Bookings across every location of the host
    pub async fn list_bookings(&self, host_id: Uuid) -> ApiResult<Vec<BookingResponse>> {
        self.ensure_host(host_id).await?;

        let bookings = self.repos.bookings().list_by_host(host_id).await?;
        booking_views(&self.repos, bookings).await
    }

    /// Bookings of one location; an empty list when it has none
    pub async fn list_for_location(
        &self,
        location_id: Uuid,
        host_id: Uuid,
    ) -> ApiResult<Vec<BookingResponse>> {
        self.ensure_host(host_id).await?;

        let bookings = self.repos.bookings().list_by_location(location_id).await?;
        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let owner = self
            .repos
            .locations()
            .find_by_id(location_id)
            .await?
            .map(|location| location.host_id);
        if owner != Some(host_id) {
            return Err(ApiError::Forbidden(
                "This location does not belong to you".to_string(),
            ));
        }

        booking_views(&self.repos, bookings).await
    }

    /// Booking counts per status across the host's locations
    pub async fn dashboard(&self, host_id: Uuid) -> ApiResult<HostDashboard> {
        self.ensure_host(host_id).await?;

        let bookings = self.repos.bookings().list_by_host(host_id).await?;
        Ok(HostDashboard::from_statuses(
            bookings.iter().map(|booking| booking.status),
        ))
    }
}
