//! Business logic over the repositories
//!
//! Managers take the caller's id explicitly and return external views.

pub mod bookings;
pub mod hosts;
pub mod locations;
pub mod responses;
pub mod users;

pub use bookings::BookingService;
pub use hosts::HostService;
pub use locations::LocationService;
pub use users::UserService;
