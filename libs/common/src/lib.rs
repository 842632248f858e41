//! Common library for the luggage storage marketplace
//!
//! This crate provides functionality shared across the workspace: database
//! connectivity and migrations, the store error type, and the pure
//! calculators for great-circle distance and booking prices.

pub mod database;
pub mod error;
pub mod geo;
pub mod pricing;

/// Example usage of the database module
///
/// ```rust,no_run
/// use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig::from_env()?;
///     let pool = init_pool(&config).await?;
///     run_migrations(&pool).await?;
///     let is_healthy = health_check(&pool).await?;
///     println!("Database health check: {}", is_healthy);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
