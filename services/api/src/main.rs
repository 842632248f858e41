use anyhow::Result;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{AppState, config::ServerConfig, create_router, repositories::PgRepositories};
use auth::{JwtConfig, JwtService, PasswordService, RateLimiter, RateLimiterConfig};
use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting luggage API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if !health_check(&pool).await? {
        anyhow::bail!("Failed to connect to database");
    }
    run_migrations(&pool).await?;
    info!("Database ready");

    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;
    let rate_limiter = RateLimiter::new(RateLimiterConfig::from_env());

    // Idle buckets are swept for as long as the scheduler lives
    let _sweeper = rate_limiter.start_sweeper().await?;

    let state = AppState::new(
        PgRepositories::new(pool),
        jwt_service,
        PasswordService::default(),
        rate_limiter,
    );
    let app = create_router(state);

    let server_config = ServerConfig::from_env()?;
    let address = server_config.address();
    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
