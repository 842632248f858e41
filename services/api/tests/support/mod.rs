//! Shared fixtures for the integration tests
#![allow(dead_code)]

use api::AppState;
use api::models::{LocationRequest, NewUser, RegisterRequest, Role};
use api::repositories::{MemoryRepositories, Repositories, UserRepository};
use auth::{JwtConfig, JwtService, PasswordService, RateLimiter, RateLimiterConfig};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

pub const PASSWORD: &str = "Luggage#2024";

pub type TestState = AppState<MemoryRepositories>;

pub fn limits(auth_capacity: u32, general_capacity: u32) -> RateLimiterConfig {
    RateLimiterConfig {
        auth_capacity,
        general_capacity,
        ..RateLimiterConfig::default()
    }
}

pub fn state_with_limits(config: RateLimiterConfig) -> TestState {
    let jwt = JwtService::new(JwtConfig::with_secret(
        "integration-test-secret-of-at-least-32-bytes",
        3600,
    ))
    .unwrap();

    AppState::new(
        MemoryRepositories::new(),
        jwt,
        PasswordService::with_params(1024, 1, 1).unwrap(),
        RateLimiter::new(config),
    )
}

pub fn state() -> TestState {
    state_with_limits(limits(10_000, 10_000))
}

/// Register through the account manager and return the new id
pub async fn register(state: &TestState, email: &str, role: Role) -> Uuid {
    state
        .users
        .register(RegisterRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            full_name: format!("Test {}", role),
            role: Some(role),
        })
        .await
        .unwrap()
        .user_id
}

/// Admins cannot self-register, so they are written straight to the store
pub async fn create_admin(state: &TestState, email: &str) -> Uuid {
    state
        .repositories
        .users()
        .create(NewUser {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            full_name: "Site Admin".to_string(),
            role: Role::Admin,
        })
        .await
        .unwrap()
        .id
}

pub fn location_request(
    name: &str,
    latitude: f64,
    longitude: f64,
    price_per_hour: Decimal,
    capacity: i32,
) -> LocationRequest {
    LocationRequest {
        name: name.to_string(),
        address: format!("{} Street 1", name),
        city: "Lisbon".to_string(),
        latitude,
        longitude,
        price_per_hour,
        capacity,
        hours: "08:00-20:00".to_string(),
    }
}

/// `hour:00` UTC tomorrow, always in the future
pub fn tomorrow_at(hour: u32) -> DateTime<Utc> {
    (Utc::now() + Duration::days(1))
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
        .and_utc()
}
