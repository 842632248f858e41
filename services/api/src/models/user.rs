//! User accounts and roles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Account role
///
/// The only permitted change is `User -> Host`; `Admin` never changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Host,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Host => "HOST",
            Role::Admin => "ADMIN",
        }
    }

    /// Role after upgrading to host, or the reason the upgrade is refused
    pub fn upgrade_to_host(self) -> Result<Role, &'static str> {
        match self {
            Role::User => Ok(Role::Host),
            Role::Host => Err("User is already a host"),
            Role::Admin => Err("Cannot change admin role"),
        }
    }

    /// Whether a caller may pick this role when registering
    pub fn is_self_assignable(self) -> bool {
        matches!(self, Role::User | Role::Host)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "HOST" => Ok(Role::Host),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Stored user account
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new account; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
}

/// Request for user registration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Option<Role>,
}

/// Request for login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile changes; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Query for `/users/search`
#[derive(Debug, Clone, Deserialize)]
pub struct UserSearchQuery {
    pub q: String,
}

/// Query carrying a single email address
#[derive(Debug, Clone, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// Response for user operations
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_bookings: i64,
    /// Only present for hosts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_locations: Option<i64>,
}

/// Response for register and login, carrying the bearer token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub message: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_user_can_become_host() {
        assert_eq!(Role::User.upgrade_to_host(), Ok(Role::Host));
        assert_eq!(
            Role::Host.upgrade_to_host(),
            Err("User is already a host")
        );
        assert_eq!(
            Role::Admin.upgrade_to_host(),
            Err("Cannot change admin role")
        );
    }

    #[test]
    fn test_admin_is_not_self_assignable() {
        assert!(Role::User.is_self_assignable());
        assert!(Role::Host.is_self_assignable());
        assert!(!Role::Admin.is_self_assignable());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("HOST".parse::<Role>(), Ok(Role::Host));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("GUEST".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Host).unwrap(), "\"HOST\"");
        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_user_response_hides_location_count_for_customers() {
        let now = Utc::now();
        let response = UserResponse {
            id: Uuid::new_v4(),
            email: "guest@example.com".to_string(),
            full_name: "Guest".to_string(),
            role: Role::User,
            created_at: now,
            updated_at: now,
            total_bookings: 2,
            total_locations: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["totalBookings"], 2);
        assert!(json.get("totalLocations").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
