//! In-memory repositories
//!
//! All three repositories share one store behind a `tokio::sync::RwLock`, so
//! cascading deletes and cross-entity queries see a consistent snapshot.
//! Orderings and constraint failures mirror the PostgreSQL schema.

use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use common::geo::BoundingBox;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BookingRepository, LocationRepository, Repositories, UserRepository};
use crate::models::{
    Booking, BookingStatus, Location, LocationFilter, LocationRequest, NewBooking, NewLocation,
    NewUser, Role, User,
};

const EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Debug, Default)]
struct Store {
    users: HashMap<Uuid, User>,
    locations: HashMap<Uuid, Location>,
    bookings: HashMap<Uuid, Booking>,
}

type SharedStore = Arc<RwLock<Store>>;

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, Uuid)) {
    items.sort_by_key(|item| {
        let (created_at, id) = key(item);
        (Reverse(created_at), id)
    });
}

fn sorted_by_name(mut locations: Vec<Location>) -> Vec<Location> {
    locations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    locations
}

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    store: SharedStore,
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        let mut store = self.store.write().await;
        if store.users.values().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation(EMAIL_CONSTRAINT.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> DatabaseResult<Vec<User>> {
        let store = self.store.read().await;
        Ok(ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| store.users.get(id).cloned())
            .collect())
    }

    async fn email_exists(&self, email: &str) -> DatabaseResult<bool> {
        let store = self.store.read().await;
        Ok(store.users.values().any(|u| u.email == email))
    }

    async fn list_all(&self) -> DatabaseResult<Vec<User>> {
        let mut users: Vec<User> = self.store.read().await.users.values().cloned().collect();
        newest_first(&mut users, |u| (u.created_at, u.id));
        Ok(users)
    }

    async fn list_by_role(&self, role: Role) -> DatabaseResult<Vec<User>> {
        let mut users: Vec<User> = self
            .store
            .read()
            .await
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        newest_first(&mut users, |u| (u.created_at, u.id));
        Ok(users)
    }

    async fn search(&self, query: &str) -> DatabaseResult<Vec<User>> {
        let needle = query.to_lowercase();
        let mut users: Vec<User> = self
            .store
            .read()
            .await
            .users
            .values()
            .filter(|u| u.full_name.to_lowercase().contains(&needle) || u.email == query)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn update(&self, user: &User) -> DatabaseResult<Option<User>> {
        let mut store = self.store.write().await;
        if store
            .users
            .values()
            .any(|other| other.id != user.id && other.email == user.email)
        {
            return Err(DatabaseError::UniqueViolation(EMAIL_CONSTRAINT.to_string()));
        }

        Ok(store.users.get_mut(&user.id).map(|stored| {
            stored.email = user.email.clone();
            stored.full_name = user.full_name.clone();
            stored.password_hash = user.password_hash.clone();
            stored.role = user.role;
            stored.updated_at = Utc::now();
            stored.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut store = self.store.write().await;
        if store.users.remove(&id).is_none() {
            return Ok(false);
        }

        store.locations.retain(|_, l| l.host_id != id);
        let Store {
            locations,
            bookings,
            ..
        } = &mut *store;
        bookings.retain(|_, b| b.user_id != id && locations.contains_key(&b.location_id));

        Ok(true)
    }
}

#[derive(Clone, Default)]
pub struct MemoryLocationRepository {
    store: SharedStore,
}

impl MemoryLocationRepository {
    async fn active_where(&self, predicate: impl Fn(&Location) -> bool) -> Vec<Location> {
        self.store
            .read()
            .await
            .locations
            .values()
            .filter(|l| l.is_active && predicate(l))
            .cloned()
            .collect()
    }
}

impl LocationRepository for MemoryLocationRepository {
    async fn create(&self, new_location: NewLocation) -> DatabaseResult<Location> {
        let mut store = self.store.write().await;
        if !store.users.contains_key(&new_location.host_id) {
            return Err(DatabaseError::Configuration(format!(
                "host {} does not exist",
                new_location.host_id
            )));
        }

        let details = new_location.details;
        let now = Utc::now();
        let location = Location {
            id: Uuid::new_v4(),
            host_id: new_location.host_id,
            name: details.name,
            address: details.address,
            city: details.city,
            latitude: details.latitude,
            longitude: details.longitude,
            price_per_hour: details.price_per_hour,
            capacity: details.capacity,
            hours: details.hours,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        store.locations.insert(location.id, location.clone());

        Ok(location)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Location>> {
        Ok(self.store.read().await.locations.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> DatabaseResult<Vec<Location>> {
        let store = self.store.read().await;
        Ok(ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| store.locations.get(id).cloned())
            .collect())
    }

    async fn list_active_page(&self, offset: i64, limit: i64) -> DatabaseResult<(Vec<Location>, i64)> {
        let active = sorted_by_name(self.active_where(|_| true).await);
        let total = active.len() as i64;
        let page = active
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }

    async fn list_by_host(&self, host_id: Uuid) -> DatabaseResult<Vec<Location>> {
        let mut locations: Vec<Location> = self
            .store
            .read()
            .await
            .locations
            .values()
            .filter(|l| l.host_id == host_id)
            .cloned()
            .collect();
        newest_first(&mut locations, |l| (l.created_at, l.id));
        Ok(locations)
    }

    async fn count_by_hosts(&self, host_ids: &[Uuid]) -> DatabaseResult<HashMap<Uuid, i64>> {
        let store = self.store.read().await;
        let mut counts = HashMap::new();
        for location in store.locations.values().filter(|l| host_ids.contains(&l.host_id)) {
            *counts.entry(location.host_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn list_active_within(&self, bounds: BoundingBox) -> DatabaseResult<Vec<Location>> {
        Ok(self
            .active_where(|l| bounds.contains(l.latitude, l.longitude))
            .await)
    }

    async fn search_active(&self, keyword: &str) -> DatabaseResult<Vec<Location>> {
        let needle = keyword.to_lowercase();
        let matches = self
            .active_where(|l| {
                l.name.to_lowercase().contains(&needle) || l.address.to_lowercase().contains(&needle)
            })
            .await;

        Ok(sorted_by_name(matches))
    }

    async fn filter_active(&self, filter: &LocationFilter) -> DatabaseResult<Vec<Location>> {
        let mut matches = self.active_where(|l| filter.matches(l)).await;
        matches.sort_by(|a, b| {
            a.price_per_hour
                .cmp(&b.price_per_hour)
                .then(a.name.cmp(&b.name))
                .then(a.id.cmp(&b.id))
        });
        Ok(matches)
    }

    async fn list_active_cities(&self) -> DatabaseResult<Vec<String>> {
        let cities: BTreeSet<String> = self
            .active_where(|_| true)
            .await
            .into_iter()
            .map(|l| l.city)
            .collect();

        Ok(cities.into_iter().collect())
    }

    async fn popular(&self, limit: i64) -> DatabaseResult<Vec<(Location, i64)>> {
        let store = self.store.read().await;
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for booking in store.bookings.values() {
            *counts.entry(booking.location_id).or_default() += 1;
        }

        let mut ranked: Vec<(Location, i64)> = store
            .locations
            .values()
            .filter(|l| l.is_active)
            .map(|l| (l.clone(), counts.get(&l.id).copied().unwrap_or(0)))
            .collect();
        ranked.sort_by(|(a, a_count), (b, b_count)| {
            b_count
                .cmp(a_count)
                .then(a.name.cmp(&b.name))
                .then(a.id.cmp(&b.id))
        });
        ranked.truncate(limit.max(0) as usize);

        Ok(ranked)
    }

    async fn update_details(
        &self,
        id: Uuid,
        details: &LocationRequest,
    ) -> DatabaseResult<Option<Location>> {
        let mut store = self.store.write().await;
        Ok(store.locations.get_mut(&id).map(|location| {
            location.name = details.name.clone();
            location.address = details.address.clone();
            location.city = details.city.clone();
            location.latitude = details.latitude;
            location.longitude = details.longitude;
            location.price_per_hour = details.price_per_hour;
            location.capacity = details.capacity;
            location.hours = details.hours.clone();
            location.updated_at = Utc::now();
            location.clone()
        }))
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> DatabaseResult<Option<Location>> {
        let mut store = self.store.write().await;
        Ok(store.locations.get_mut(&id).map(|location| {
            location.is_active = is_active;
            location.updated_at = Utc::now();
            location.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut store = self.store.write().await;
        if store.locations.remove(&id).is_none() {
            return Ok(false);
        }

        store.bookings.retain(|_, b| b.location_id != id);
        Ok(true)
    }
}

#[derive(Clone, Default)]
pub struct MemoryBookingRepository {
    store: SharedStore,
}

impl MemoryBookingRepository {
    async fn list_where(&self, predicate: impl Fn(&Store, &Booking) -> bool) -> Vec<Booking> {
        let guard = self.store.read().await;
        let store = &*guard;
        let mut bookings: Vec<Booking> = store
            .bookings
            .values()
            .filter(|&b| predicate(store, b))
            .cloned()
            .collect();
        newest_first(&mut bookings, |b| (b.created_at, b.id));
        bookings
    }

    async fn count_where(&self, predicate: impl Fn(&Store, &Booking) -> bool) -> i64 {
        let guard = self.store.read().await;
        let store = &*guard;
        store
            .bookings
            .values()
            .filter(|&b| predicate(store, b))
            .count() as i64
    }

    async fn modify(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut Booking),
    ) -> DatabaseResult<Option<Booking>> {
        let mut store = self.store.write().await;
        Ok(store.bookings.get_mut(&id).map(|booking| {
            change(booking);
            booking.updated_at = Utc::now();
            booking.clone()
        }))
    }
}

fn hosted_by(store: &Store, booking: &Booking, host_id: Uuid) -> bool {
    store
        .locations
        .get(&booking.location_id)
        .is_some_and(|l| l.host_id == host_id)
}

impl BookingRepository for MemoryBookingRepository {
    async fn create(&self, new_booking: NewBooking) -> DatabaseResult<Booking> {
        let mut store = self.store.write().await;
        if !store.users.contains_key(&new_booking.user_id)
            || !store.locations.contains_key(&new_booking.location_id)
        {
            return Err(DatabaseError::Configuration(
                "booking references a missing user or location".to_string(),
            ));
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: new_booking.user_id,
            location_id: new_booking.location_id,
            start_time: new_booking.start_time,
            end_time: new_booking.end_time,
            price_cents: new_booking.price_cents,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        store.bookings.insert(booking.id, booking.clone());

        Ok(booking)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Booking>> {
        Ok(self.store.read().await.bookings.get(&id).cloned())
    }

    async fn list_all(&self) -> DatabaseResult<Vec<Booking>> {
        Ok(self.list_where(|_, _| true).await)
    }

    async fn list_by_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Booking>> {
        Ok(self.list_where(|_, b| b.user_id == user_id).await)
    }

    async fn list_by_host(&self, host_id: Uuid) -> DatabaseResult<Vec<Booking>> {
        Ok(self
            .list_where(|store, b| hosted_by(store, b, host_id))
            .await)
    }

    async fn list_by_location(&self, location_id: Uuid) -> DatabaseResult<Vec<Booking>> {
        Ok(self.list_where(|_, b| b.location_id == location_id).await)
    }

    async fn count_by_users(&self, user_ids: &[Uuid]) -> DatabaseResult<HashMap<Uuid, i64>> {
        let store = self.store.read().await;
        let mut counts = HashMap::new();
        for booking in store.bookings.values().filter(|b| user_ids.contains(&b.user_id)) {
            *counts.entry(booking.user_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn count_overlapping(
        &self,
        location_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> DatabaseResult<i64> {
        Ok(self
            .count_where(|_, b| {
                b.location_id == location_id
                    && b.status.occupies_capacity()
                    && b.overlaps(start, end)
                    && Some(b.id) != exclude
            })
            .await)
    }

    async fn count_open_involving_user(&self, user_id: Uuid) -> DatabaseResult<i64> {
        Ok(self
            .count_where(|store, b| {
                b.status.occupies_capacity()
                    && (b.user_id == user_id || hosted_by(store, b, user_id))
            })
            .await)
    }

    async fn count_open_for_location(&self, location_id: Uuid) -> DatabaseResult<i64> {
        Ok(self
            .count_where(|_, b| b.location_id == location_id && b.status.occupies_capacity())
            .await)
    }

    async fn update_schedule(
        &self,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        price_cents: i64,
    ) -> DatabaseResult<Option<Booking>> {
        self.modify(id, |booking| {
            booking.start_time = start;
            booking.end_time = end;
            booking.price_cents = price_cents;
        })
        .await
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> DatabaseResult<Option<Booking>> {
        self.modify(id, |booking| booking.status = status).await
    }
}

/// In-memory repositories over one shared store
#[derive(Clone)]
pub struct MemoryRepositories {
    users: MemoryUserRepository,
    locations: MemoryLocationRepository,
    bookings: MemoryBookingRepository,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        let store = SharedStore::default();
        Self {
            users: MemoryUserRepository {
                store: store.clone(),
            },
            locations: MemoryLocationRepository {
                store: store.clone(),
            },
            bookings: MemoryBookingRepository { store },
        }
    }
}

impl Default for MemoryRepositories {
    fn default() -> Self {
        Self::new()
    }
}

impl Repositories for MemoryRepositories {
    type Users = MemoryUserRepository;
    type Locations = MemoryLocationRepository;
    type Bookings = MemoryBookingRepository;

    fn users(&self) -> &Self::Users {
        &self.users
    }

    fn locations(&self) -> &Self::Locations {
        &self.locations
    }

    fn bookings(&self) -> &Self::Bookings {
        &self.bookings
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(true)
    }
}
