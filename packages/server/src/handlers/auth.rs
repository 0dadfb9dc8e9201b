use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse,
    validate_login_request, validate_register_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

/// Whether this email gets the admin role automatically.
fn is_owner(state: &AppState, email: &str) -> bool {
    state
        .config
        .auth
        .owner_email
        .as_deref()
        .is_some_and(|owner| owner.eq_ignore_ascii_case(email))
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Create an account",
    description = "Creates an account with the `user` role. The configured owner email is granted `admin` instead.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let email = payload.email.trim().to_ascii_lowercase();
    let role = if is_owner(&state, &email) {
        user::ROLE_ADMIN
    } else {
        user::ROLE_USER
    };

    let password_hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = chrono::Utc::now();
    let new_user = user::ActiveModel {
        email: Set(email),
        password_hash: Set(password_hash),
        name: Set(payload.name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty())),
        role: Set(role.to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Registration race condition: unique constraint caught on insert");
            AppError::EmailTaken
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(created))))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Sign in",
    description = "Verifies credentials and returns a JWT valid for 7 days. An account matching the configured owner email is promoted to admin on sign-in.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong email or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let email = payload.email.trim().to_ascii_lowercase();

    let account = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &account.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let now = chrono::Utc::now();
    let mut active: user::ActiveModel = account.clone().into();
    active.last_signed_in = Set(Some(now));
    active.updated_at = Set(now);

    // Covers owner accounts created before owner_email was configured.
    if account.role != user::ROLE_ADMIN && is_owner(&state, &account.email) {
        tracing::info!(user_id = account.id, "promoting owner account to admin");
        active.role = Set(user::ROLE_ADMIN.to_owned());
    }

    let account = active.update(&state.db).await?;

    let token = jwt::sign(
        &state.config.auth.jwt_secret,
        account.id,
        &account.email,
        &account.role,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        email: account.email,
        role: account.role,
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current account profile",
    responses(
        (status = 200, description = "Profile", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, AppError> {
    let account = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    Ok(Json(MeResponse::from(account)))
}
