//! Error types for credential, token and rate-limit handling

use thiserror::Error;

/// Errors raised by the authentication primitives
#[derive(Error, Debug)]
pub enum AuthError {
    /// Token could not be created or did not verify
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Password hashing or hash parsing failed
    #[error("Password hashing error: {0}")]
    Hashing(String),

    /// Missing or malformed configuration
    #[error("Authentication configuration error: {0}")]
    Configuration(String),

    /// Background job scheduling failed
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}

/// Type alias for Result with AuthError
pub type AuthResult<T> = Result<T, AuthError>;
