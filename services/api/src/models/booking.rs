//! Bookings and their lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Booking status
///
/// ```text
/// PENDING --confirm--> CONFIRMED --complete--> COMPLETED
/// PENDING --cancel---> CANCELLED
/// CONFIRMED --cancel-> CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// Status-changing action on a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Confirm,
    Complete,
    Cancel,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    /// Statuses that hold a capacity slot
    pub fn occupies_capacity(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// Only pending bookings may have their schedule edited
    pub fn is_editable(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }

    /// Status reached by applying `action`, or why it is not allowed
    pub fn apply(self, action: BookingAction) -> Result<BookingStatus, &'static str> {
        use BookingAction::*;
        use BookingStatus::*;

        match (self, action) {
            (Pending, Confirm) => Ok(Confirmed),
            (_, Confirm) => Err("Only pending bookings can be confirmed"),
            (Confirmed, Complete) => Ok(Completed),
            (_, Complete) => Err("Only confirmed bookings can be completed"),
            (Pending | Confirmed, Cancel) => Ok(Cancelled),
            (Cancelled, Cancel) => Err("Booking is already cancelled"),
            (Completed, Cancel) => Err("Cannot cancel a completed booking"),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "COMPLETED" => Ok(BookingStatus::Completed),
            other => Err(format!("Unknown booking status: {}", other)),
        }
    }
}

/// Stored booking
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub location_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price_cents: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Inclusive overlap: intervals sharing only an endpoint still overlap
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        !(self.end_time < start || self.start_time > end)
    }
}

/// Values for a new booking, created as PENDING
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub location_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub location_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Number of bags; capacity slots required (default 1)
    pub number_of_items: Option<i32>,
}

/// Schedule changes; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub number_of_items: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingLocationSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
}

/// External view of a booking
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub user: Option<BookingUserSummary>,
    pub location: Option<BookingLocationSummary>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price_cents: i64,
    pub status: BookingStatus,
}

/// Booking counts across a host's locations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDashboard {
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub cancelled_bookings: i64,
    pub completed_bookings: i64,
}

impl HostDashboard {
    pub fn from_statuses(statuses: impl IntoIterator<Item = BookingStatus>) -> Self {
        statuses
            .into_iter()
            .fold(HostDashboard::default(), |mut dashboard, status| {
                dashboard.total_bookings += 1;
                match status {
                    BookingStatus::Pending => dashboard.pending_bookings += 1,
                    BookingStatus::Confirmed => dashboard.confirmed_bookings += 1,
                    BookingStatus::Cancelled => dashboard.cancelled_bookings += 1,
                    BookingStatus::Completed => dashboard.completed_bookings += 1,
                }
                dashboard
            })
    }
}
