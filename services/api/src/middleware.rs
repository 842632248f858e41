//! Request middleware: bearer authentication, rate limiting and error paths

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::{TypedHeaderRejection, TypedHeaderRejectionReason},
};
use auth::{RateLimitDecision, RateLimitTier};
use std::net::SocketAddr;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ErrorBody},
    models::Role,
    repositories::Repositories,
    state::AppState,
};

/// Caller identity established from a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Allow the user themselves or an admin
    pub fn ensure_self_or_admin(&self, user_id: Uuid) -> Result<(), ApiError> {
        if self.id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "You can only access your own account".to_string(),
            ))
        }
    }

    pub fn ensure_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

/// Verify the bearer token when one is presented
///
/// Requests without an `Authorization` header pass through anonymously;
/// handlers that need an identity reject them through the [`AuthUser`]
/// extractor. A header that is present but not a valid bearer token is
/// rejected on every route.
pub async fn authenticate<R: Repositories>(
    State(state): State<AppState<R>>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match bearer {
        Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
        Err(rejection) if matches!(rejection.reason(), TypedHeaderRejectionReason::Missing) => {
            return Ok(next.run(req).await);
        }
        Err(rejection) => {
            debug!("Rejected authorization header: {}", rejection);
            return Err(ApiError::Unauthorized(
                "Invalid authorization header".to_string(),
            ));
        }
    };

    let claims = state.jwt_service.validate_token(&token).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let role = claims.role.parse::<Role>().map_err(|e| {
        warn!("Token for {} carries an unknown role: {}", claims.sub, e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        email: claims.email,
        role,
    });

    Ok(next.run(req).await)
}

/// Client identity used as the rate limit key
fn client_key(req: &Request) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(address) = forwarded {
        return address.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn tier_for(path: &str) -> RateLimitTier {
    match path {
        "/users/register" | "/users/login" => RateLimitTier::Auth,
        _ => RateLimitTier::General,
    }
}

/// Token bucket per client, stricter on the credential endpoints
pub async fn rate_limit<R: Repositories>(
    State(state): State<AppState<R>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(&req);
    let tier = tier_for(req.uri().path());

    match state.rate_limiter.check(&key, tier).await {
        RateLimitDecision::Allowed { .. } => Ok(next.run(req).await),
        RateLimitDecision::Limited { retry_after } => {
            warn!("Rate limit exceeded for {} on {:?} tier", key, tier);
            let retry_after_secs = (retry_after.as_secs_f64().ceil() as u64).max(1);
            Err(ApiError::TooManyRequests { retry_after_secs })
        }
    }
}

/// Stamp the request path onto error payloads
pub async fn error_path(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    let Some(mut body) = response.extensions_mut().remove::<ErrorBody>() else {
        return response;
    };
    body.path = path;

    let (mut parts, original) = response.into_parts();
    match serde_json::to_vec(&body) {
        Ok(bytes) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            warn!("Failed to rewrite error payload: {}", e);
            Response::from_parts(parts, original)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder().uri("/locations");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_client_key_prefers_first_forwarded_address() {
        let req = request(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        assert_eq!(client_key(&req), "203.0.113.7");
    }

    #[test]
    fn test_client_key_falls_back_to_peer_address() {
        let mut req = request(&[]);
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000))));
        assert_eq!(client_key(&req), "192.0.2.1");

        assert_eq!(client_key(&request(&[])), "unknown");
    }

    #[test]
    fn test_credential_endpoints_use_auth_tier() {
        assert_eq!(tier_for("/users/login"), RateLimitTier::Auth);
        assert_eq!(tier_for("/users/register"), RateLimitTier::Auth);
        assert_eq!(tier_for("/users/me"), RateLimitTier::General);
    }

    #[test]
    fn test_admin_bypasses_ownership() {
        let admin = AuthUser {
            id: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        };
        let user = AuthUser {
            role: Role::User,
            ..admin.clone()
        };

        assert!(admin.ensure_self_or_admin(Uuid::new_v4()).is_ok());
        assert!(user.ensure_self_or_admin(user.id).is_ok());
        assert!(matches!(
            user.ensure_self_or_admin(Uuid::new_v4()),
            Err(ApiError::Forbidden(_))
        ));
        assert!(user.ensure_admin().is_err());
    }
}
