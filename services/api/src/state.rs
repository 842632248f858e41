//! Application state shared across handlers

use auth::{JwtService, PasswordService, RateLimiter};

use crate::repositories::Repositories;
use crate::services::{BookingService, HostService, LocationService, UserService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState<R: Repositories> {
    pub repositories: R,
    pub jwt_service: JwtService,
    pub rate_limiter: RateLimiter,
    pub users: UserService<R>,
    pub locations: LocationService<R>,
    pub bookings: BookingService<R>,
    pub hosts: HostService<R>,
}

impl<R: Repositories> AppState<R> {
    pub fn new(
        repositories: R,
        jwt_service: JwtService,
        password_service: PasswordService,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            users: UserService::new(
                repositories.clone(),
                password_service,
                jwt_service.clone(),
            ),
            locations: LocationService::new(repositories.clone()),
            bookings: BookingService::new(repositories.clone()),
            hosts: HostService::new(repositories.clone()),
            repositories,
            jwt_service,
            rate_limiter,
        }
    }
}
