//! PostgreSQL repositories

use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use common::geo::BoundingBox;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::collections::HashMap;
use uuid::Uuid;

use super::{BookingRepository, LocationRepository, Repositories, UserRepository};
use crate::models::{
    Booking, BookingStatus, Location, LocationFilter, LocationRequest, NewBooking, NewLocation,
    NewUser, Role, User,
};

const USER_COLUMNS: &str = "id, email, password_hash, full_name, role, created_at, updated_at";

const LOCATION_COLUMNS: &str = "id, host_id, name, address, city, lat, lng, price_per_hour, \
     capacity, hours, is_active, created_at, updated_at";

const BOOKING_COLUMNS: &str =
    "id, user_id, location_id, start_time, end_time, price_cents, status, created_at, updated_at";

fn user_from_row(row: &PgRow) -> DatabaseResult<User> {
    let role: String = row.get("role");

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        full_name: row.get("full_name"),
        role: role.parse::<Role>().map_err(DatabaseError::Decode)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn location_from_row(row: &PgRow) -> Location {
    Location {
        id: row.get("id"),
        host_id: row.get("host_id"),
        name: row.get("name"),
        address: row.get("address"),
        city: row.get("city"),
        latitude: row.get("lat"),
        longitude: row.get("lng"),
        price_per_hour: row.get("price_per_hour"),
        capacity: row.get("capacity"),
        hours: row.get("hours"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn booking_from_row(row: &PgRow) -> DatabaseResult<Booking> {
    let status: String = row.get("status");

    Ok(Booking {
        id: row.get("id"),
        user_id: row.get("user_id"),
        location_id: row.get("location_id"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        price_cents: row.get("price_cents"),
        status: status.parse::<BookingStatus>().map_err(DatabaseError::Decode)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn users_from_rows(rows: Vec<PgRow>) -> DatabaseResult<Vec<User>> {
    rows.iter().map(user_from_row).collect()
}

fn bookings_from_rows(rows: Vec<PgRow>) -> DatabaseResult<Vec<Booking>> {
    rows.iter().map(booking_from_row).collect()
}

/// `%keyword%` with LIKE wildcards in the keyword escaped
fn contains_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// User repository for database operations
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.full_name)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        user_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> DatabaseResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        users_from_rows(rows)
    }

    async fn email_exists(&self, email: &str) -> DatabaseResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn list_all(&self) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        users_from_rows(rows)
    }

    async fn list_by_role(&self, role: Role) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at DESC, id"
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        users_from_rows(rows)
    }

    async fn search(&self, query: &str) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE full_name ILIKE $1 OR email = $2
            ORDER BY full_name COLLATE "C", id
            "#
        ))
        .bind(contains_pattern(query))
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        users_from_rows(rows)
    }

    async fn update(&self, user: &User) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET email = $2, full_name = $3, password_hash = $4, role = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Location repository for database operations
#[derive(Clone)]
pub struct PgLocationRepository {
    pool: PgPool,
}

impl PgLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LocationRepository for PgLocationRepository {
    async fn create(&self, new_location: NewLocation) -> DatabaseResult<Location> {
        let details = &new_location.details;
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO locations (id, host_id, name, address, city, lat, lng, price_per_hour, capacity, hours)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new_location.host_id)
        .bind(&details.name)
        .bind(&details.address)
        .bind(&details.city)
        .bind(details.latitude)
        .bind(details.longitude)
        .bind(details.price_per_hour)
        .bind(details.capacity)
        .bind(&details.hours)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(location_from_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Location>> {
        let row = sqlx::query(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(location_from_row))
    }

    async fn find_many(&self, ids: &[Uuid]) -> DatabaseResult<Vec<Location>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows.iter().map(location_from_row).collect())
    }

    async fn list_active_page(&self, offset: i64, limit: i64) -> DatabaseResult<(Vec<Location>, i64)> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM locations
            WHERE is_active
            ORDER BY name COLLATE "C", id
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations WHERE is_active")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok((rows.iter().map(location_from_row).collect(), total))
    }

    async fn list_by_host(&self, host_id: Uuid) -> DatabaseResult<Vec<Location>> {
        let rows = sqlx::query(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE host_id = $1 ORDER BY created_at DESC, id"
        ))
        .bind(host_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows.iter().map(location_from_row).collect())
    }

    async fn count_by_hosts(&self, host_ids: &[Uuid]) -> DatabaseResult<HashMap<Uuid, i64>> {
        if host_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let counts: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT host_id, COUNT(*) FROM locations WHERE host_id = ANY($1) GROUP BY host_id",
        )
        .bind(host_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(counts.into_iter().collect())
    }

    async fn list_active_within(&self, bounds: BoundingBox) -> DatabaseResult<Vec<Location>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM locations
            WHERE is_active
              AND lat BETWEEN $1 AND $2
              AND lng BETWEEN $3 AND $4
            "#
        ))
        .bind(bounds.min_lat)
        .bind(bounds.max_lat)
        .bind(bounds.min_lng)
        .bind(bounds.max_lng)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows.iter().map(location_from_row).collect())
    }

    async fn search_active(&self, keyword: &str) -> DatabaseResult<Vec<Location>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM locations
            WHERE is_active AND (name ILIKE $1 OR address ILIKE $1)
            ORDER BY name COLLATE "C", id
            "#
        ))
        .bind(contains_pattern(keyword))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows.iter().map(location_from_row).collect())
    }

    async fn filter_active(&self, filter: &LocationFilter) -> DatabaseResult<Vec<Location>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM locations
            WHERE is_active
              AND ($1::NUMERIC IS NULL OR price_per_hour >= $1)
              AND ($2::NUMERIC IS NULL OR price_per_hour <= $2)
              AND ($3::INTEGER IS NULL OR capacity >= $3)
              AND ($4::TEXT IS NULL OR LOWER(city) = LOWER($4))
            ORDER BY price_per_hour, name COLLATE "C", id
            "#
        ))
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(filter.min_capacity)
        .bind(filter.city.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows.iter().map(location_from_row).collect())
    }

    async fn list_active_cities(&self) -> DatabaseResult<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT city
            FROM locations
            WHERE is_active AND city IS NOT NULL
            GROUP BY city
            ORDER BY city COLLATE "C"
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn popular(&self, limit: i64) -> DatabaseResult<Vec<(Location, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.host_id, l.name, l.address, l.city, l.lat, l.lng, l.price_per_hour,
                   l.capacity, l.hours, l.is_active, l.created_at, l.updated_at,
                   COUNT(b.id) AS booking_count
            FROM locations l
            LEFT JOIN bookings b ON b.location_id = l.id
            WHERE l.is_active
            GROUP BY l.id
            ORDER BY booking_count DESC, l.name COLLATE "C", l.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows
            .iter()
            .map(|row| (location_from_row(row), row.get("booking_count")))
            .collect())
    }

    async fn update_details(
        &self,
        id: Uuid,
        details: &LocationRequest,
    ) -> DatabaseResult<Option<Location>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE locations
            SET name = $2, address = $3, city = $4, lat = $5, lng = $6,
                price_per_hour = $7, capacity = $8, hours = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&details.name)
        .bind(&details.address)
        .bind(&details.city)
        .bind(details.latitude)
        .bind(details.longitude)
        .bind(details.price_per_hour)
        .bind(details.capacity)
        .bind(&details.hours)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(location_from_row))
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> DatabaseResult<Option<Location>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE locations
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(location_from_row))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Booking repository for database operations
#[derive(Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, condition: &str, id: Uuid) -> DatabaseResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE {condition} ORDER BY created_at DESC, id"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        bookings_from_rows(rows)
    }
}

impl BookingRepository for PgBookingRepository {
    async fn create(&self, new_booking: NewBooking) -> DatabaseResult<Booking> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bookings (id, user_id, location_id, start_time, end_time, price_cents, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new_booking.user_id)
        .bind(new_booking.location_id)
        .bind(new_booking.start_time)
        .bind(new_booking.end_time)
        .bind(new_booking.price_cents)
        .bind(BookingStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        booking_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Booking>> {
        let row = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref().map(booking_from_row).transpose()
    }

    async fn list_all(&self) -> DatabaseResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        bookings_from_rows(rows)
    }

    async fn list_by_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Booking>> {
        self.list_where("user_id = $1", user_id).await
    }

    async fn list_by_host(&self, host_id: Uuid) -> DatabaseResult<Vec<Booking>> {
        self.list_where(
            "location_id IN (SELECT id FROM locations WHERE host_id = $1)",
            host_id,
        )
        .await
    }

    async fn list_by_location(&self, location_id: Uuid) -> DatabaseResult<Vec<Booking>> {
        self.list_where("location_id = $1", location_id).await
    }

    async fn count_by_users(&self, user_ids: &[Uuid]) -> DatabaseResult<HashMap<Uuid, i64>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let counts: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT user_id, COUNT(*) FROM bookings WHERE user_id = ANY($1) GROUP BY user_id",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(counts.into_iter().collect())
    }

    async fn count_overlapping(
        &self,
        location_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> DatabaseResult<i64> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE location_id = $1
              AND status IN ('PENDING', 'CONFIRMED')
              AND NOT (end_time < $2 OR start_time > $3)
              AND ($4::UUID IS NULL OR id <> $4)
            "#,
        )
        .bind(location_id)
        .bind(start)
        .bind(end)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn count_open_involving_user(&self, user_id: Uuid) -> DatabaseResult<i64> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings b
            JOIN locations l ON l.id = b.location_id
            WHERE b.status IN ('PENDING', 'CONFIRMED')
              AND (b.user_id = $1 OR l.host_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn count_open_for_location(&self, location_id: Uuid) -> DatabaseResult<i64> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE location_id = $1 AND status IN ('PENDING', 'CONFIRMED')
            "#,
        )
        .bind(location_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn update_schedule(
        &self,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        price_cents: i64,
    ) -> DatabaseResult<Option<Booking>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE bookings
            SET start_time = $2, end_time = $3, price_cents = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(start)
        .bind(end)
        .bind(price_cents)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref().map(booking_from_row).transpose()
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> DatabaseResult<Option<Booking>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref().map(booking_from_row).transpose()
    }
}

/// PostgreSQL-backed repositories sharing one pool
#[derive(Clone)]
pub struct PgRepositories {
    pool: PgPool,
    users: PgUserRepository,
    locations: PgLocationRepository,
    bookings: PgBookingRepository,
}

impl PgRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            locations: PgLocationRepository::new(pool.clone()),
            bookings: PgBookingRepository::new(pool.clone()),
            pool,
        }
    }
}

impl Repositories for PgRepositories {
    type Users = PgUserRepository;
    type Locations = PgLocationRepository;
    type Bookings = PgBookingRepository;

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
        common::database::health_check(&self.pool).await
    }
}
