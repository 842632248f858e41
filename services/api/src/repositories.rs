//! Repository traits for data access
//!
//! Each mutation is a single atomic write against the store. `postgres`
//! backs the running service; `memory` implements the same contracts over
//! in-process maps for tests and database-free runs.

use chrono::{DateTime, Utc};
use common::error::DatabaseResult;
use common::geo::BoundingBox;
use std::collections::HashMap;
use std::future::Future;
use uuid::Uuid;

use crate::models::{
    Booking, BookingStatus, Location, LocationFilter, LocationRequest, NewBooking, NewLocation,
    NewUser, Role, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepositories;
pub use postgres::PgRepositories;

pub trait UserRepository: Clone + Send + Sync + 'static {
    fn create(&self, new_user: NewUser) -> impl Future<Output = DatabaseResult<User>> + Send;
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = DatabaseResult<Option<User>>> + Send;
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = DatabaseResult<Option<User>>> + Send;
    /// Users with any of `ids`, in no particular order
    fn find_many(&self, ids: &[Uuid]) -> impl Future<Output = DatabaseResult<Vec<User>>> + Send;
    fn email_exists(&self, email: &str) -> impl Future<Output = DatabaseResult<bool>> + Send;
    /// All users, newest first
    fn list_all(&self) -> impl Future<Output = DatabaseResult<Vec<User>>> + Send;
    fn list_by_role(&self, role: Role) -> impl Future<Output = DatabaseResult<Vec<User>>> + Send;
    /// Case-insensitive full name substring, or exact email
    fn search(&self, query: &str) -> impl Future<Output = DatabaseResult<Vec<User>>> + Send;
    /// Persist email, full name, password hash and role; refreshes `updated_at`
    fn update(&self, user: &User) -> impl Future<Output = DatabaseResult<Option<User>>> + Send;
    /// Hard delete, cascading to owned locations and all related bookings
    fn delete(&self, id: Uuid) -> impl Future<Output = DatabaseResult<bool>> + Send;
}

pub trait LocationRepository: Clone + Send + Sync + 'static {
    fn create(
        &self,
        new_location: NewLocation,
    ) -> impl Future<Output = DatabaseResult<Location>> + Send;
    fn find_by_id(&self, id: Uuid)
    -> impl Future<Output = DatabaseResult<Option<Location>>> + Send;
    fn find_many(
        &self,
        ids: &[Uuid],
    ) -> impl Future<Output = DatabaseResult<Vec<Location>>> + Send;
    /// Active locations ordered by name, with the total active count
    fn list_active_page(
        &self,
        offset: i64,
        limit: i64,
    ) -> impl Future<Output = DatabaseResult<(Vec<Location>, i64)>> + Send;
    /// Every location of a host, active or not
    fn list_by_host(
        &self,
        host_id: Uuid,
    ) -> impl Future<Output = DatabaseResult<Vec<Location>>> + Send;
    /// Location totals keyed by host; hosts without locations are absent
    fn count_by_hosts(
        &self,
        host_ids: &[Uuid],
    ) -> impl Future<Output = DatabaseResult<HashMap<Uuid, i64>>> + Send;
    /// Active locations inside a coordinate box
    fn list_active_within(
        &self,
        bounds: BoundingBox,
    ) -> impl Future<Output = DatabaseResult<Vec<Location>>> + Send;
    /// Active locations whose name or address contains `keyword`, ignoring case
    fn search_active(
        &self,
        keyword: &str,
    ) -> impl Future<Output = DatabaseResult<Vec<Location>>> + Send;
    fn filter_active(
        &self,
        filter: &LocationFilter,
    ) -> impl Future<Output = DatabaseResult<Vec<Location>>> + Send;
    /// Distinct cities of active locations, sorted
    fn list_active_cities(&self) -> impl Future<Output = DatabaseResult<Vec<String>>> + Send;
    /// Active locations by descending booking count (any status), then name, then id
    fn popular(
        &self,
        limit: i64,
    ) -> impl Future<Output = DatabaseResult<Vec<(Location, i64)>>> + Send;
    fn update_details(
        &self,
        id: Uuid,
        details: &LocationRequest,
    ) -> impl Future<Output = DatabaseResult<Option<Location>>> + Send;
    fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> impl Future<Output = DatabaseResult<Option<Location>>> + Send;
    /// Hard delete, cascading to the location's bookings
    fn delete(&self, id: Uuid) -> impl Future<Output = DatabaseResult<bool>> + Send;
}

pub trait BookingRepository: Clone + Send + Sync + 'static {
    fn create(&self, new_booking: NewBooking)
    -> impl Future<Output = DatabaseResult<Booking>> + Send;
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = DatabaseResult<Option<Booking>>> + Send;
    /// All bookings, newest first (as are the other listings)
    fn list_all(&self) -> impl Future<Output = DatabaseResult<Vec<Booking>>> + Send;
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = DatabaseResult<Vec<Booking>>> + Send;
    /// Bookings on any location owned by `host_id`
    fn list_by_host(
        &self,
        host_id: Uuid,
    ) -> impl Future<Output = DatabaseResult<Vec<Booking>>> + Send;
    fn list_by_location(
        &self,
        location_id: Uuid,
    ) -> impl Future<Output = DatabaseResult<Vec<Booking>>> + Send;
    /// Booking totals keyed by user; users without bookings are absent
    fn count_by_users(
        &self,
        user_ids: &[Uuid],
    ) -> impl Future<Output = DatabaseResult<HashMap<Uuid, i64>>> + Send;
    /// PENDING or CONFIRMED bookings on a location overlapping `[start, end]`
    /// (inclusive of shared endpoints), optionally ignoring one booking
    fn count_overlapping(
        &self,
        location_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> impl Future<Output = DatabaseResult<i64>> + Send;
    /// PENDING or CONFIRMED bookings made by the user or held at their locations
    fn count_open_involving_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = DatabaseResult<i64>> + Send;
    fn count_open_for_location(
        &self,
        location_id: Uuid,
    ) -> impl Future<Output = DatabaseResult<i64>> + Send;
    fn update_schedule(
        &self,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        price_cents: i64,
    ) -> impl Future<Output = DatabaseResult<Option<Booking>>> + Send;
    fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> impl Future<Output = DatabaseResult<Option<Booking>>> + Send;
}

/// The full set of stores a service runs against
pub trait Repositories: Clone + Send + Sync + 'static {
    type Users: UserRepository;
    type Locations: LocationRepository;
    type Bookings: BookingRepository;

    fn users(&self) -> &Self::Users;
    fn locations(&self) -> &Self::Locations;
    fn bookings(&self) -> &Self::Bookings;

    /// Whether the backing store is reachable
    fn health_check(&self) -> impl Future<Output = DatabaseResult<bool>> + Send;
}
