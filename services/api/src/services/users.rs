//! User accounts: registration, login, profile and role changes

use auth::validation::{
    ValidationErrors, validate_email, validate_full_name, validate_password,
};
use auth::{JwtService, PasswordService};
use common::error::DatabaseError;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, NewUser, RegisterRequest, Role,
    UpdateUserRequest, User, UserResponse,
};
use crate::repositories::{BookingRepository, Repositories, UserRepository};
use crate::services::responses::{user_view, user_views};

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

fn email_taken() -> ApiError {
    ApiError::BadRequest("Email already exists".to_string())
}

/// A concurrent registration can still hit the unique index
fn email_conflict(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::UniqueViolation(_) => email_taken(),
        other => ApiError::Database(other),
    }
}

#[derive(Clone)]
pub struct UserService<R> {
    repos: R,
    passwords: PasswordService,
    jwt: JwtService,
}

impl<R: Repositories> UserService<R> {
    pub fn new(repos: R, passwords: PasswordService, jwt: JwtService) -> Self {
        Self {
            repos,
            passwords,
            jwt,
        }
    }

    async fn find(&self, id: Uuid) -> ApiResult<User> {
        self.repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(user_not_found)
    }

    fn login_response(&self, user: User, message: &str) -> ApiResult<LoginResponse> {
        let token = self
            .jwt
            .generate_access_token(user.id, &user.email, user.role.as_str())?;

        Ok(LoginResponse {
            user_id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            message: message.to_string(),
            token,
        })
    }

    /// Create an account and sign it in
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<LoginResponse> {
        let role = request.role.unwrap_or_default();

        let mut errors = ValidationErrors::new();
        errors
            .check("email", validate_email(&request.email))
            .check("password", validate_password(&request.password))
            .check("fullName", validate_full_name(&request.full_name));
        if !role.is_self_assignable() {
            errors.add("role", "Role must be USER or HOST");
        }
        errors.into_result().map_err(ApiError::Validation)?;

        if self.repos.users().email_exists(&request.email).await? {
            return Err(email_taken());
        }

        let password_hash = self.passwords.hash(&request.password)?;
        let user = self
            .repos
            .users()
            .create(NewUser {
                email: request.email,
                password_hash,
                full_name: request.full_name.trim().to_string(),
                role,
            })
            .await
            .map_err(email_conflict)?;

        info!("Registered user {} as {}", user.id, user.role);
        self.login_response(user, "User registered successfully")
    }

    pub async fn login(&self, request: LoginRequest) -> ApiResult<LoginResponse> {
        let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .repos
            .users()
            .find_by_email(&request.email)
            .await?
            .ok_or_else(invalid)?;

        if !self.passwords.verify(&request.password, &user.password_hash)? {
            info!("Failed login for user {}", user.id);
            return Err(invalid());
        }

        info!("User {} logged in", user.id);
        self.login_response(user, "Login successful")
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<UserResponse> {
        let user = self.find(id).await?;
        user_view(&self.repos, user).await
    }

    pub async fn get_by_email(&self, email: &str) -> ApiResult<UserResponse> {
        let user = self
            .repos
            .users()
            .find_by_email(email)
            .await?
            .ok_or_else(user_not_found)?;
        user_view(&self.repos, user).await
    }

    pub async fn email_exists(&self, email: &str) -> ApiResult<bool> {
        Ok(self.repos.users().email_exists(email).await?)
    }

    pub async fn list_all(&self) -> ApiResult<Vec<UserResponse>> {
        let users = self.repos.users().list_all().await?;
        user_views(&self.repos, users).await
    }

    pub async fn list_by_role(&self, role: Role) -> ApiResult<Vec<UserResponse>> {
        let users = self.repos.users().list_by_role(role).await?;
        user_views(&self.repos, users).await
    }

    /// Full name substring (any case) or exact email
    pub async fn search(&self, query: &str) -> ApiResult<Vec<UserResponse>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::invalid("q", "Search query is required"));
        }

        let users = self.repos.users().search(query).await?;
        user_views(&self.repos, users).await
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> ApiResult<UserResponse> {
        let mut errors = ValidationErrors::new();
        if let Some(email) = &request.email {
            errors.check("email", validate_email(email));
        }
        if let Some(full_name) = &request.full_name {
            errors.check("fullName", validate_full_name(full_name));
        }
        errors.into_result().map_err(ApiError::Validation)?;

        let mut user = self.find(id).await?;

        if let Some(email) = request.email {
            if email != user.email {
                if self.repos.users().email_exists(&email).await? {
                    return Err(email_taken());
                }
                user.email = email;
            }
        }
        if let Some(full_name) = request.full_name {
            user.full_name = full_name.trim().to_string();
        }

        let user = self
            .repos
            .users()
            .update(&user)
            .await
            .map_err(email_conflict)?
            .ok_or_else(user_not_found)?;

        info!("Updated profile of user {}", user.id);
        user_view(&self.repos, user).await
    }

    pub async fn change_password(&self, id: Uuid, request: ChangePasswordRequest) -> ApiResult<()> {
        let mut user = self.find(id).await?;

        if !self
            .passwords
            .verify(&request.current_password, &user.password_hash)?
        {
            return Err(ApiError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        if request.new_password != request.confirm_password {
            return Err(ApiError::BadRequest(
                "New password and confirmation do not match".to_string(),
            ));
        }

        validate_password(&request.new_password)
            .map_err(|message| ApiError::invalid("newPassword", message))?;

        user.password_hash = self.passwords.hash(&request.new_password)?;
        self.repos
            .users()
            .update(&user)
            .await?
            .ok_or_else(user_not_found)?;

        info!("Changed password of user {}", id);
        Ok(())
    }

    /// USER becomes HOST; any other starting role is refused
    pub async fn upgrade_to_host(&self, id: Uuid) -> ApiResult<UserResponse> {
        let mut user = self.find(id).await?;

        user.role = user
            .role
            .upgrade_to_host()
            .map_err(|message| ApiError::BadRequest(message.to_string()))?;

        let user = self
            .repos
            .users()
            .update(&user)
            .await?
            .ok_or_else(user_not_found)?;

        info!("Upgraded user {} to host", user.id);
        user_view(&self.repos, user).await
    }

    /// Hard delete, refused while a pending or confirmed booking involves the user
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.find(id).await?;

        let open = self.repos.bookings().count_open_involving_user(id).await?;
        if open > 0 {
            return Err(ApiError::BadRequest(
                "User has active bookings and cannot be deleted".to_string(),
            ));
        }

        if !self.repos.users().delete(id).await? {
            return Err(user_not_found());
        }

        info!("Deleted user {}", id);
        Ok(())
    }
}
