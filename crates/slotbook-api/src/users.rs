use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::info;
use uuid::Uuid;

use slotbook_db::StoreError;
use slotbook_db::models::UserRow;
use slotbook_types::api::{CreateUserRequest, UpdateUserRequest};
use slotbook_types::models::User;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::Json;
use crate::identity::Claims;
use crate::{parse_timestamp, parse_uuid};

pub(crate) fn user_to_model(row: UserRow) -> User {
    User {
        id: parse_uuid(&row.id, "user id"),
        username: row.username,
        email: row.email,
        created_at: parse_timestamp(&row.created_at),
    }
}

/// GET /users — every account, newest first. Password hashes stay in the
/// store; the response model has no field for them.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_users()?;
    let users: Vec<User> = rows.into_iter().map(user_to_model).collect();
    Ok(Json(users))
}

/// POST /users — legacy unauthenticated create, kept for scripted setups.
/// The account stores an empty password hash and cannot log in.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.trim().is_empty() || req.email.trim().is_empty() {
        return Err(ApiError::Validation("username and email are required".into()));
    }

    let id = Uuid::new_v4();
    match state.db.create_user(&id.to_string(), &req.username, &req.email, "") {
        Ok(row) => Ok((StatusCode::CREATED, Json(user_to_model(row)))),
        Err(StoreError::UniqueViolation) => Err(ApiError::Conflict("username or email already taken")),
        Err(e) => Err(e.into()),
    }
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_id(&user_id.to_string())?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(user_to_model(user)))
}

/// PUT /users/{id} — partial update of username/email, self only.
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    claims: Claims,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.sub != user_id {
        return Err(ApiError::Forbidden("you can only update your own account"));
    }
    if req.username.is_none() && req.email.is_none() {
        return Err(ApiError::Validation("nothing to update".into()));
    }
    if let Some(username) = &req.username {
        if username.len() < 3 || username.len() > 32 {
            return Err(ApiError::Validation("username must be 3-32 characters".into()));
        }
    }
    if let Some(email) = &req.email {
        if !email.contains('@') {
            return Err(ApiError::Validation("a valid email is required".into()));
        }
    }

    match state
        .db
        .update_user(&user_id.to_string(), req.username.as_deref(), req.email.as_deref())
    {
        Ok(Some(row)) => Ok(Json(user_to_model(row))),
        Ok(None) => Err(ApiError::NotFound("user")),
        Err(StoreError::UniqueViolation) => Err(ApiError::Conflict("username or email already taken")),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /users/{id} — self only. Posts and bookings go with the account.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    claims: Claims,
) -> Result<impl IntoResponse, ApiError> {
    if claims.sub != user_id {
        return Err(ApiError::Forbidden("you can only delete your own account"));
    }

    if !state.db.delete_user(&user_id.to_string())? {
        return Err(ApiError::NotFound("user"));
    }

    info!("User {} deleted their account", claims.username);
    Ok(Json(serde_json::json!({ "message": "user deleted" })))
}
