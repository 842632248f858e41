//! Manager-level scenarios over the in-memory store

mod support;

use api::error::ApiError;
use api::middleware::AuthUser;
use api::models::{
    BookingStatus, CreateBookingRequest, LoginRequest, NearbyFilteredRequest, NearbyRequest,
    Role, UpdateBookingRequest,
};
use chrono::Duration;
use common::geo::haversine_km;
use rust_decimal::Decimal;
use support::{PASSWORD, create_admin, location_request, register, state, tomorrow_at};
use uuid::Uuid;

fn booking(location_id: Uuid, start_hour: u32, hours: i64) -> CreateBookingRequest {
    let start = tomorrow_at(start_hour);
    CreateBookingRequest {
        location_id,
        start_time: start,
        end_time: start + Duration::hours(hours),
        number_of_items: None,
    }
}

#[tokio::test]
async fn test_end_to_end_booking_scenario() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let location = state
        .locations
        .create(host, location_request("Central", 38.71, -9.14, Decimal::new(1000, 2), 1))
        .await
        .unwrap();

    let user = register(&state, "user@example.com", Role::User).await;
    let first = state
        .bookings
        .create(user, booking(location.id, 10, 2))
        .await
        .unwrap();
    assert_eq!(first.price_cents, 2000);
    assert_eq!(first.status, BookingStatus::Pending);
    assert_eq!(first.location.as_ref().unwrap().name, "Central");

    let confirmed = state.bookings.confirm(first.id, host).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let overlapping = booking(location.id, 11, 2);
    assert!(
        !state
            .locations
            .is_available(location.id, overlapping.start_time, overlapping.end_time, 1)
            .await
            .unwrap()
    );

    let other = register(&state, "other@example.com", Role::User).await;
    let err = state.bookings.create(other, overlapping).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    // Touching the end of the confirmed booking still overlaps
    let touching = booking(location.id, 12, 1);
    assert!(state.bookings.create(other, touching).await.is_err());

    let later = booking(location.id, 14, 1);
    assert!(state.bookings.create(other, later).await.is_ok());
}

#[tokio::test]
async fn test_state_machine_and_ownership() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let location = state
        .locations
        .create(host, location_request("Dock", 38.7, -9.1, Decimal::new(500, 2), 3))
        .await
        .unwrap();
    let user = register(&state, "user@example.com", Role::User).await;
    let stranger = register(&state, "stranger@example.com", Role::Host).await;

    let created = state
        .bookings
        .create(user, booking(location.id, 9, 1))
        .await
        .unwrap();

    assert!(matches!(
        state.bookings.complete(created.id, host).await,
        Err(ApiError::BadRequest(_))
    ));
    assert!(matches!(
        state.bookings.confirm(created.id, stranger).await,
        Err(ApiError::Forbidden(_))
    ));
    assert!(matches!(
        state.bookings.cancel(created.id, stranger).await,
        Err(ApiError::Forbidden(_))
    ));

    state.bookings.confirm(created.id, host).await.unwrap();
    let err = state.bookings.confirm(created.id, host).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Only pending bookings can be confirmed"));

    // Confirmed bookings can no longer be rescheduled, whoever asks
    let update = UpdateBookingRequest {
        start_time: Some(tomorrow_at(15)),
        end_time: Some(tomorrow_at(16)),
        number_of_items: None,
    };
    assert!(matches!(
        state.bookings.update(created.id, user, update).await,
        Err(ApiError::BadRequest(_))
    ));

    let cancelled = state.bookings.cancel(created.id, user).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    let err = state.bookings.cancel(created.id, user).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Booking is already cancelled"));

    let done = state
        .bookings
        .create(user, booking(location.id, 18, 1))
        .await
        .unwrap();
    state.bookings.confirm(done.id, host).await.unwrap();
    let completed = state.bookings.complete(done.id, host).await.unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);
    assert!(state.bookings.cancel(done.id, user).await.is_err());
}

#[tokio::test]
async fn test_reschedule_recomputes_price() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let location = state
        .locations
        .create(host, location_request("Quay", 38.7, -9.1, Decimal::new(500, 2), 2))
        .await
        .unwrap();
    let user = register(&state, "user@example.com", Role::User).await;

    let created = state
        .bookings
        .create(user, booking(location.id, 10, 1))
        .await
        .unwrap();
    assert_eq!(created.price_cents, 500);

    let start = tomorrow_at(10);
    let updated = state
        .bookings
        .update(
            created.id,
            user,
            UpdateBookingRequest {
                start_time: None,
                end_time: Some(start + Duration::minutes(90)),
                number_of_items: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price_cents, 750);

    let other = register(&state, "other@example.com", Role::User).await;
    assert!(matches!(
        state
            .bookings
            .update(created.id, other, UpdateBookingRequest {
                start_time: None,
                end_time: Some(start + Duration::hours(3)),
                number_of_items: None,
            })
            .await,
        Err(ApiError::Forbidden(_))
    ));

    let past_start = UpdateBookingRequest {
        start_time: Some(chrono::Utc::now() - Duration::hours(1)),
        end_time: None,
        number_of_items: None,
    };
    assert!(matches!(
        state.bookings.update(created.id, user, past_start).await,
        Err(ApiError::Validation(_))
    ));
}

#[tokio::test]
async fn test_booking_creation_rules() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let location = state
        .locations
        .create(host, location_request("Harbour", 38.7, -9.1, Decimal::new(300, 2), 2))
        .await
        .unwrap();
    let user = register(&state, "user@example.com", Role::User).await;

    let mut past = booking(location.id, 10, 1);
    past.start_time = chrono::Utc::now() - Duration::hours(2);
    assert!(matches!(
        state.bookings.create(user, past).await,
        Err(ApiError::Validation(errors)) if errors.contains_key("startTime")
    ));

    let mut inverted = booking(location.id, 10, 1);
    inverted.end_time = inverted.start_time;
    assert!(matches!(
        state.bookings.create(user, inverted).await,
        Err(ApiError::Validation(errors)) if errors.contains_key("endTime")
    ));

    assert!(matches!(
        state.bookings.create(user, booking(Uuid::new_v4(), 10, 1)).await,
        Err(ApiError::NotFound(_))
    ));

    let mut too_many = booking(location.id, 10, 1);
    too_many.number_of_items = Some(3);
    assert!(matches!(
        state.bookings.create(user, too_many).await,
        Err(ApiError::BadRequest(_))
    ));

    state.locations.set_active(location.id, host, false).await.unwrap();
    let err = state
        .bookings
        .create(user, booking(location.id, 10, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Location is not active"));
    assert!(
        !state
            .locations
            .is_available(location.id, tomorrow_at(10), tomorrow_at(11), 1)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_item_count_is_the_required_capacity() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let location = state
        .locations
        .create(host, location_request("Lockers", 38.7, -9.1, Decimal::new(400, 2), 2))
        .await
        .unwrap();
    let user = register(&state, "user@example.com", Role::User).await;
    let other = register(&state, "other@example.com", Role::User).await;

    state
        .bookings
        .create(user, booking(location.id, 10, 2))
        .await
        .unwrap();

    let (start, end) = (tomorrow_at(10), tomorrow_at(12));
    assert!(state.locations.is_available(location.id, start, end, 1).await.unwrap());
    assert!(!state.locations.is_available(location.id, start, end, 2).await.unwrap());
    let (free_start, free_end) = (tomorrow_at(14), tomorrow_at(16));
    assert!(state.locations.is_available(location.id, free_start, free_end, 2).await.unwrap());
    assert!(!state.locations.is_available(location.id, free_start, free_end, 3).await.unwrap());

    let mut pair = booking(location.id, 11, 1);
    pair.number_of_items = Some(2);
    let err = state.bookings.create(other, pair).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::BadRequest(msg)
            if msg == "Location does not have enough capacity for the requested time"
    ));

    let mut later_pair = booking(location.id, 14, 1);
    later_pair.number_of_items = Some(2);
    let moved = state.bookings.create(other, later_pair).await.unwrap();

    let into_busy_window = UpdateBookingRequest {
        start_time: Some(tomorrow_at(11)),
        end_time: Some(tomorrow_at(12)),
        number_of_items: Some(2),
    };
    assert!(matches!(
        state.bookings.update(moved.id, other, into_busy_window).await,
        Err(ApiError::BadRequest(_))
    ));

    let single_item = UpdateBookingRequest {
        start_time: Some(tomorrow_at(11)),
        end_time: Some(tomorrow_at(12)),
        number_of_items: Some(1),
    };
    let rescheduled = state.bookings.update(moved.id, other, single_item).await.unwrap();
    assert_eq!(rescheduled.start_time, tomorrow_at(11));
    assert_eq!(rescheduled.price_cents, 400);
}

#[tokio::test]
async fn test_user_listings_carry_totals() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let idle_host = register(&state, "idle@example.com", Role::Host).await;
    let user = register(&state, "user@example.com", Role::User).await;
    let location = state
        .locations
        .create(host, location_request("Kiosk", 38.7, -9.1, Decimal::new(200, 2), 5))
        .await
        .unwrap();
    state
        .locations
        .create(host, location_request("Depot", 38.8, -9.2, Decimal::new(200, 2), 5))
        .await
        .unwrap();
    state
        .bookings
        .create(user, booking(location.id, 9, 1))
        .await
        .unwrap();
    state
        .bookings
        .create(user, booking(location.id, 13, 1))
        .await
        .unwrap();

    let everyone = state.users.list_all().await.unwrap();
    let view = |id: Uuid| everyone.iter().find(|u| u.id == id).unwrap();

    assert_eq!(everyone.len(), 3);
    assert_eq!(view(host).total_locations, Some(2));
    assert_eq!(view(host).total_bookings, 0);
    assert_eq!(view(idle_host).total_locations, Some(0));
    assert_eq!(view(user).total_bookings, 2);
    assert_eq!(view(user).total_locations, None);

    let hosts = state.users.list_by_role(Role::Host).await.unwrap();
    assert_eq!(hosts.len(), 2);
    assert!(hosts.iter().all(|h| h.total_locations.is_some()));
}

#[tokio::test]
async fn test_nearby_is_sorted_and_boundary_inclusive() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let origin = (38.7223, -9.1393);

    let near = state
        .locations
        .create(host, location_request("Near", 38.7250, -9.1400, Decimal::ONE, 1))
        .await
        .unwrap();
    let edge = state
        .locations
        .create(host, location_request("Edge", 38.7500, -9.1000, Decimal::TEN, 5))
        .await
        .unwrap();
    let hidden = state
        .locations
        .create(host, location_request("Hidden", 38.7230, -9.1390, Decimal::ONE, 1))
        .await
        .unwrap();
    state.locations.set_active(hidden.id, host, false).await.unwrap();
    state
        .locations
        .create(host, location_request("Porto", 41.1579, -8.6291, Decimal::ONE, 1))
        .await
        .unwrap();

    let radius = haversine_km(origin.0, origin.1, edge.latitude, edge.longitude);
    let found = state
        .locations
        .find_nearby(NearbyRequest {
            latitude: origin.0,
            longitude: origin.1,
            radius_km: radius,
        })
        .await
        .unwrap();

    let ids: Vec<Uuid> = found.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![near.id, edge.id]);
    assert!(found[0].distance_km.unwrap() < found[1].distance_km.unwrap());
    assert_eq!(found[1].host.as_ref().unwrap().id, host);

    let filtered = state
        .locations
        .find_nearby_filtered(NearbyFilteredRequest {
            latitude: origin.0,
            longitude: origin.1,
            radius_km: radius,
            min_price: Some(Decimal::new(500, 2)),
            max_price: None,
            min_capacity: Some(2),
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, edge.id);

    let err = state
        .locations
        .find_nearby(NearbyRequest {
            latitude: origin.0,
            longitude: origin.1,
            radius_km: -1.0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(errors) if errors.contains_key("radiusKm")));
}

#[tokio::test]
async fn test_discovery_queries_skip_inactive_locations() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let user = register(&state, "user@example.com", Role::User).await;

    let mut porto = location_request("Bolhao Lockers", 41.15, -8.61, Decimal::new(800, 2), 4);
    porto.city = "Porto".to_string();
    let porto = state.locations.create(host, porto).await.unwrap();
    let lisbon = state
        .locations
        .create(host, location_request("Rossio Lockers", 38.71, -9.14, Decimal::new(300, 2), 1))
        .await
        .unwrap();
    let closed = state
        .locations
        .create(host, location_request("Closed Lockers", 38.72, -9.15, Decimal::new(100, 2), 1))
        .await
        .unwrap();
    state.locations.set_active(closed.id, host, false).await.unwrap();

    state
        .bookings
        .create(user, booking(porto.id, 10, 1))
        .await
        .unwrap();

    assert_eq!(state.locations.list_cities().await.unwrap(), vec!["Lisbon", "Porto"]);
    assert_eq!(state.locations.by_city("porto").await.unwrap().len(), 1);
    assert_eq!(state.locations.search("lockers").await.unwrap().len(), 2);
    assert_eq!(
        state
            .locations
            .filter_by_price_range(Some(Decimal::new(100, 2)), Some(Decimal::new(300, 2)))
            .await
            .unwrap()
            .iter()
            .map(|l| l.id)
            .collect::<Vec<_>>(),
        vec![lisbon.id]
    );
    assert_eq!(state.locations.filter_by_capacity(2).await.unwrap().len(), 1);

    let popular = state.locations.popular(None).await.unwrap();
    assert_eq!(popular.first().map(|l| l.id), Some(porto.id));
    assert_eq!(popular.len(), 2);
    assert!(matches!(
        state.locations.popular(Some(0)).await,
        Err(ApiError::Validation(_))
    ));

    let page = state.locations.list(Some(0), Some(1)).await.unwrap();
    assert_eq!(page.total_elements, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.content.len(), 1);

    // Direct fetches and the host's own listing still see it
    assert!(!state.locations.get(closed.id).await.unwrap().is_active);
    assert_eq!(state.locations.list_by_host(host).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_location_management_requires_owning_host() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let rival = register(&state, "rival@example.com", Role::Host).await;
    let user = register(&state, "user@example.com", Role::User).await;

    assert!(matches!(
        state
            .locations
            .create(user, location_request("Nope", 0.0, 0.0, Decimal::ONE, 1))
            .await,
        Err(ApiError::Forbidden(_))
    ));

    let invalid = location_request(" ", 95.0, 0.0, Decimal::ZERO, 0);
    let err = state.locations.create(host, invalid).await.unwrap_err();
    let ApiError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    for field in ["name", "latitude", "pricePerHour", "capacity"] {
        assert!(errors.contains_key(field), "missing {}", field);
    }

    let location = state
        .locations
        .create(host, location_request("Mine", 0.0, 0.0, Decimal::ONE, 1))
        .await
        .unwrap();

    let mut renamed = location_request("Theirs", 0.0, 0.0, Decimal::ONE, 1);
    assert!(matches!(
        state.locations.update(location.id, rival, renamed.clone()).await,
        Err(ApiError::Forbidden(_))
    ));
    assert!(matches!(
        state.locations.delete(location.id, rival).await,
        Err(ApiError::Forbidden(_))
    ));

    renamed.name = "Still Mine".to_string();
    let updated = state
        .locations
        .update(location.id, host, renamed)
        .await
        .unwrap();
    assert_eq!(updated.name, "Still Mine");

    let held = state
        .bookings
        .create(user, booking(location.id, 10, 1))
        .await
        .unwrap();
    assert!(matches!(
        state.locations.delete(location.id, host).await,
        Err(ApiError::BadRequest(_))
    ));

    state.bookings.cancel(held.id, user).await.unwrap();
    state.locations.delete(location.id, host).await.unwrap();
    assert!(matches!(
        state.locations.get(location.id).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_accounts_and_role_upgrade() {
    let state = state();
    let user = register(&state, "user@example.com", Role::User).await;

    let err = state
        .users
        .register(api::models::RegisterRequest {
            email: "user@example.com".to_string(),
            password: PASSWORD.to_string(),
            full_name: "Second".to_string(),
            role: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Email already exists"));

    let err = state
        .users
        .register(api::models::RegisterRequest {
            email: "boss@example.com".to_string(),
            password: PASSWORD.to_string(),
            full_name: "Boss".to_string(),
            role: Some(Role::Admin),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(errors) if errors.contains_key("role")));

    assert!(matches!(
        state
            .users
            .login(LoginRequest {
                email: "user@example.com".to_string(),
                password: "Wrong#2024".to_string(),
            })
            .await,
        Err(ApiError::Unauthorized(_))
    ));
    let login = state
        .users
        .login(LoginRequest {
            email: "user@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(login.message, "Login successful");
    assert_eq!(state.jwt_service.validate_token(&login.token).unwrap().sub, user);

    let upgraded = state.users.upgrade_to_host(user).await.unwrap();
    assert_eq!(upgraded.role, Role::Host);
    assert_eq!(upgraded.total_locations, Some(0));
    assert!(matches!(
        state.users.upgrade_to_host(user).await,
        Err(ApiError::BadRequest(msg)) if msg == "User is already a host"
    ));

    let admin = create_admin(&state, "admin@example.com").await;
    assert!(matches!(
        state.users.upgrade_to_host(admin).await,
        Err(ApiError::BadRequest(msg)) if msg == "Cannot change admin role"
    ));

    let found = state.users.search("TEST").await.unwrap();
    assert_eq!(found.len(), 1);
    let by_email = state.users.search("admin@example.com").await.unwrap();
    assert_eq!(by_email[0].id, admin);
}

#[tokio::test]
async fn test_password_change_and_profile_update() {
    let state = state();
    let user = register(&state, "user@example.com", Role::User).await;
    register(&state, "taken@example.com", Role::User).await;

    let change = |current: &str, new: &str, confirm: &str| api::models::ChangePasswordRequest {
        current_password: current.to_string(),
        new_password: new.to_string(),
        confirm_password: confirm.to_string(),
    };

    assert!(matches!(
        state.users.change_password(user, change("Wrong#1234", "Fresh#2025", "Fresh#2025")).await,
        Err(ApiError::BadRequest(msg)) if msg == "Current password is incorrect"
    ));
    assert!(matches!(
        state.users.change_password(user, change(PASSWORD, "Fresh#2025", "Fresh#2026")).await,
        Err(ApiError::BadRequest(msg)) if msg == "New password and confirmation do not match"
    ));
    state
        .users
        .change_password(user, change(PASSWORD, "Fresh#2025", "Fresh#2025"))
        .await
        .unwrap();
    assert!(
        state
            .users
            .login(LoginRequest {
                email: "user@example.com".to_string(),
                password: "Fresh#2025".to_string(),
            })
            .await
            .is_ok()
    );

    let taken = api::models::UpdateUserRequest {
        email: Some("taken@example.com".to_string()),
        full_name: None,
    };
    assert!(matches!(
        state.users.update_profile(user, taken).await,
        Err(ApiError::BadRequest(_))
    ));

    let rename = api::models::UpdateUserRequest {
        email: None,
        full_name: Some("  Renamed Traveller ".to_string()),
    };
    let updated = state.users.update_profile(user, rename).await.unwrap();
    assert_eq!(updated.full_name, "Renamed Traveller");
    assert_eq!(updated.total_locations, None);
}

#[tokio::test]
async fn test_user_deletion_waits_for_open_bookings() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let user = register(&state, "user@example.com", Role::User).await;
    let location = state
        .locations
        .create(host, location_request("Station", 0.0, 0.0, Decimal::ONE, 1))
        .await
        .unwrap();
    let held = state
        .bookings
        .create(user, booking(location.id, 10, 1))
        .await
        .unwrap();

    assert_eq!(state.users.get(user).await.unwrap().total_bookings, 1);
    assert!(matches!(state.users.delete(host).await, Err(ApiError::BadRequest(_))));
    assert!(matches!(state.users.delete(user).await, Err(ApiError::BadRequest(_))));

    state.bookings.cancel(held.id, user).await.unwrap();
    state.users.delete(host).await.unwrap();

    // Removing the host took the location and its bookings with it
    assert!(matches!(state.locations.get(location.id).await, Err(ApiError::NotFound(_))));
    assert_eq!(state.users.get(user).await.unwrap().total_bookings, 0);
}

#[tokio::test]
async fn test_host_views() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let rival = register(&state, "rival@example.com", Role::Host).await;
    let user = register(&state, "user@example.com", Role::User).await;

    let location = state
        .locations
        .create(host, location_request("Terminal", 0.0, 0.0, Decimal::ONE, 5))
        .await
        .unwrap();
    let empty = state
        .locations
        .create(host, location_request("Annex", 0.0, 0.0, Decimal::ONE, 5))
        .await
        .unwrap();

    let first = state
        .bookings
        .create(user, booking(location.id, 8, 1))
        .await
        .unwrap();
    let second = state
        .bookings
        .create(user, booking(location.id, 10, 1))
        .await
        .unwrap();
    state
        .bookings
        .create(user, booking(location.id, 12, 1))
        .await
        .unwrap();
    state.bookings.confirm(first.id, host).await.unwrap();
    state.bookings.cancel(second.id, user).await.unwrap();

    let dashboard = state.hosts.dashboard(host).await.unwrap();
    assert_eq!(dashboard.total_bookings, 3);
    assert_eq!(dashboard.pending_bookings, 1);
    assert_eq!(dashboard.confirmed_bookings, 1);
    assert_eq!(dashboard.cancelled_bookings, 1);
    assert_eq!(dashboard.completed_bookings, 0);

    assert_eq!(state.hosts.list_bookings(host).await.unwrap().len(), 3);
    assert!(state.hosts.list_bookings(rival).await.unwrap().is_empty());
    assert!(matches!(state.hosts.dashboard(user).await, Err(ApiError::Forbidden(_))));

    assert_eq!(
        state.hosts.list_for_location(location.id, host).await.unwrap().len(),
        3
    );
    assert!(matches!(
        state.hosts.list_for_location(location.id, rival).await,
        Err(ApiError::Forbidden(_))
    ));
    assert!(
        state
            .hosts
            .list_for_location(empty.id, rival)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_booking_visibility() {
    let state = state();
    let host = register(&state, "host@example.com", Role::Host).await;
    let user = register(&state, "user@example.com", Role::User).await;
    let stranger = register(&state, "stranger@example.com", Role::User).await;
    let admin = create_admin(&state, "admin@example.com").await;

    let location = state
        .locations
        .create(host, location_request("Pier", 0.0, 0.0, Decimal::ONE, 1))
        .await
        .unwrap();
    let created = state
        .bookings
        .create(user, booking(location.id, 10, 1))
        .await
        .unwrap();

    let caller = |id: Uuid, role: Role| AuthUser {
        id,
        email: "caller@example.com".to_string(),
        role,
    };

    for allowed in [caller(user, Role::User), caller(host, Role::Host), caller(admin, Role::Admin)] {
        assert_eq!(state.bookings.get(created.id, &allowed).await.unwrap().id, created.id);
    }
    assert!(matches!(
        state.bookings.get(created.id, &caller(stranger, Role::User)).await,
        Err(ApiError::Forbidden(_))
    ));

    assert_eq!(state.bookings.list_for_user(user).await.unwrap().len(), 1);
    assert_eq!(state.bookings.list_all().await.unwrap().len(), 1);
}
