use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::validate_email;

/// Request body for account registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique email address used to sign in.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    /// Optional display name.
    #[schema(example = "Alice Wonder")]
    pub name: Option<String>,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_email(&payload.email)?;
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    if let Some(ref name) = payload.name
        && name.trim().chars().count() > 255
    {
        return Err(AppError::Validation(
            "Name must be at most 255 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for signing in.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Email of the account to sign into.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful registration response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    /// ID of the newly created account.
    #[schema(example = 42)]
    pub id: i32,
    /// Email of the newly created account.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Role assigned at sign-up.
    #[schema(example = "user")]
    pub role: String,
}

impl From<crate::entity::user::Model> for RegisterResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token valid for 7 days.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Authenticated user's email.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Role carried in the token.
    #[schema(example = "user")]
    pub role: String,
}

/// Current authenticated user's profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    /// User ID.
    #[schema(example = 42)]
    pub id: i32,
    /// Email.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Display name, when set.
    #[schema(example = "Alice Wonder")]
    pub name: Option<String>,
    /// Role.
    #[schema(example = "user")]
    pub role: String,
}

impl From<crate::entity::user::Model> for MeResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}
