//! Authentication primitives for the luggage storage marketplace
//!
//! Password hashing, bearer tokens, request rate limiting and the shared
//! field validators used by the HTTP layer.

pub mod error;
pub mod jwt;
pub mod password;
pub mod rate_limiter;
pub mod validation;

pub use error::{AuthError, AuthResult};
pub use jwt::{Claims, JwtConfig, JwtService};
pub use password::PasswordService;
pub use rate_limiter::{RateLimitDecision, RateLimitTier, RateLimiter, RateLimiterConfig};
