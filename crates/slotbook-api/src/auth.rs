use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{error, info};
use uuid::Uuid;

use slotbook_db::{Database, StoreError};
use slotbook_types::api::{AuthResponse, ChangePasswordRequest, LoginRequest, SignupRequest};

use crate::error::ApiError;
use crate::extract::Json;
use crate::identity::{Claims, create_token};
use crate::users::user_to_model;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::Validation("username must be 3-32 characters".into()));
    }
    if !req.email.contains('@') {
        return Err(ApiError::Validation("a valid email is required".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation("password must be at least 8 characters".into()));
    }

    // Check if username is taken
    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Conflict("username already taken"));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Password hash failed: {}", e);
            ApiError::Internal
        })?
        .to_string();

    let user_id = Uuid::new_v4();

    let row = match state
        .db
        .create_user(&user_id.to_string(), &req.username, &req.email, &password_hash)
    {
        Ok(row) => row,
        // Losing a signup race lands here instead of the pre-check above.
        Err(StoreError::UniqueViolation) => {
            return Err(ApiError::Conflict("username or email already taken"));
        }
        Err(e) => return Err(e.into()),
    };

    let token = create_token(&state.jwt_secret, user_id, &req.username)?;
    info!("User {} signed up", req.username);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user_to_model(row),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("username and password are required".into()));
    }

    let user = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or(ApiError::Unauthorized("invalid username or password"))?;

    // Verify password. Accounts from the legacy create endpoint store an
    // empty hash, which fails to parse and therefore never verifies.
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|_| ApiError::Unauthorized("invalid username or password"))?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized("invalid username or password"))?;

    let user_id: Uuid = user.id.parse().map_err(|e| {
        error!("Corrupt user id '{}': {}", user.id, e);
        ApiError::Internal
    })?;

    let token = create_token(&state.jwt_secret, user_id, &user.username)?;
    info!("User {} logged in", user.username);

    Ok(Json(AuthResponse {
        user: user_to_model(user),
        token,
    }))
}

/// GET /auth/me — the account behind the presented token.
pub async fn me(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(user_to_model(user)))
}

/// POST /users/{id}/change-password — self only; re-checks the current
/// password even though the caller already holds a valid token.
pub async fn change_password(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    claims: Claims,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.sub != user_id {
        return Err(ApiError::Forbidden("you can only change your own password"));
    }
    if req.current_password.is_empty() || req.new_password.is_empty() {
        return Err(ApiError::Validation("current and new password are required".into()));
    }
    if req.new_password.len() < 8 {
        return Err(ApiError::Validation("password must be at least 8 characters".into()));
    }

    let user = state
        .db
        .get_user_by_id(&user_id.to_string())?
        .ok_or(ApiError::NotFound("user"))?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|_| ApiError::Unauthorized("current password is not correct"))?;
    Argon2::default()
        .verify_password(req.current_password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized("current password is not correct"))?;

    let salt = SaltString::generate(&mut OsRng);
    let new_hash = Argon2::default()
        .hash_password(req.new_password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Password hash failed: {}", e);
            ApiError::Internal
        })?
        .to_string();

    if !state.db.update_user_password(&user_id.to_string(), &new_hash)? {
        return Err(ApiError::NotFound("user"));
    }

    info!("User {} changed their password", claims.username);
    Ok(Json(serde_json::json!({ "message": "password updated" })))
}
