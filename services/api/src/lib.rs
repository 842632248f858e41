//! Luggage storage marketplace API
//!
//! Users book hourly storage at locations run by hosts. The crate is generic
//! over its [`repositories::Repositories`] so the same router runs against
//! PostgreSQL in production and in-memory stores under test.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
