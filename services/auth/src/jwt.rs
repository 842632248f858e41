//! JWT service for bearer token generation and validation
//!
//! Tokens are signed either with a shared secret (HS256) or with an RSA key
//! pair (RS256). The claims carry the caller identity consumed by the request
//! middleware: the user id, email and role.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Key material used to sign and verify tokens
#[derive(Clone)]
pub enum JwtKeys {
    /// Shared secret (HS256)
    Secret(String),
    /// PEM encoded RSA key pair (RS256)
    Rsa {
        private_key: String,
        public_key: String,
    },
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtKeys::Secret(_) => f.write_str("Secret(..)"),
            JwtKeys::Rsa { .. } => f.write_str("Rsa { .. }"),
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing keys
    pub keys: JwtKeys,
    /// Access token expiration time in seconds (default: 24 hours)
    pub access_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PRIVATE_KEY` / `JWT_PUBLIC_KEY`: PEM keys or paths to PEM files (RS256)
    /// - `JWT_SECRET`: shared secret, used when no key pair is configured (HS256)
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 86400)
    pub fn from_env() -> AuthResult<Self> {
        let keys = match (
            std::env::var("JWT_PRIVATE_KEY"),
            std::env::var("JWT_PUBLIC_KEY"),
        ) {
            (Ok(private_key), Ok(public_key)) => JwtKeys::Rsa {
                private_key: read_pem(&private_key)?,
                public_key: read_pem(&public_key)?,
            },
            _ => {
                let secret = std::env::var("JWT_SECRET").map_err(|_| {
                    AuthError::Configuration(
                        "JWT_SECRET or JWT_PRIVATE_KEY/JWT_PUBLIC_KEY must be set".to_string(),
                    )
                })?;
                if secret.len() < 32 {
                    return Err(AuthError::Configuration(
                        "JWT_SECRET must be at least 32 bytes long".to_string(),
                    ));
                }
                JwtKeys::Secret(secret)
            }
        };

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86_400);

        Ok(JwtConfig {
            keys,
            access_token_expiry,
        })
    }

    /// Configuration signing with a shared secret
    pub fn with_secret(secret: impl Into<String>, access_token_expiry: u64) -> Self {
        JwtConfig {
            keys: JwtKeys::Secret(secret.into()),
            access_token_expiry,
        }
    }
}

/// If the value looks like a file path, read the PEM from file (try CWD, then crate root)
fn read_pem(value: &str) -> AuthResult<String> {
    if value.starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    std::fs::read_to_string(value)
        .or_else(|_| {
            let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push(value);
            std::fs::read_to_string(path)
        })
        .map(|pem| pem.trim().to_string())
        .map_err(|e| AuthError::Configuration(format!("Failed to read key file {}: {}", value, e)))
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User email at issuance
    pub email: String,
    /// User role at issuance
    pub role: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        let (encoding_key, decoding_key, algorithm) = match &config.keys {
            JwtKeys::Secret(secret) => (
                EncodingKey::from_secret(secret.as_bytes()),
                DecodingKey::from_secret(secret.as_bytes()),
                Algorithm::HS256,
            ),
            JwtKeys::Rsa {
                private_key,
                public_key,
            } => (
                EncodingKey::from_rsa_pem(private_key.as_bytes())?,
                DecodingKey::from_rsa_pem(public_key.as_bytes())?,
                Algorithm::RS256,
            ),
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;

        info!("JWT service initialized with {:?}", algorithm);

        Ok(JwtService {
            encoding_key,
            decoding_key,
            algorithm,
            validation,
            config,
        })
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: Uuid, email: &str, role: &str) -> AuthResult<String> {
        let now = Utc::now().timestamp().max(0) as u64;

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + self.config.access_token_expiry,
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }
}
