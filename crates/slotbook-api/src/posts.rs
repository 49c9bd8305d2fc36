use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use slotbook_db::StoreError;
use slotbook_db::models::PostRow;
use slotbook_types::api::CreatePostRequest;
use slotbook_types::models::Post;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::Json;
use crate::identity::Claims;
use crate::{parse_timestamp, parse_uuid};

pub(crate) fn post_to_model(row: PostRow) -> Post {
    Post {
        id: parse_uuid(&row.id, "post id"),
        user_id: parse_uuid(&row.user_id, "post author id"),
        title: row.title,
        content: row.content,
        created_at: parse_timestamp(&row.created_at),
        username: row.username,
    }
}

/// GET /posts — all posts with author usernames, newest first.
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_posts()?;
    let posts: Vec<Post> = rows.into_iter().map(post_to_model).collect();
    Ok(Json(posts))
}

/// POST /posts — the author is whoever the token names.
pub async fn create_post(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }

    let id = Uuid::new_v4();
    match state.db.create_post(
        &id.to_string(),
        &claims.sub.to_string(),
        &req.title,
        req.content.as_deref(),
    ) {
        Ok(row) => Ok((StatusCode::CREATED, Json(post_to_model(row)))),
        // The token outlived its account.
        Err(StoreError::ForeignKeyViolation) => {
            Err(ApiError::Unauthorized("user account no longer exists"))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .db
        .get_post_by_id(&post_id.to_string())?
        .ok_or(ApiError::NotFound("post"))?;

    Ok(Json(post_to_model(post)))
}

/// DELETE /posts/{id} — owner only; a missing post and someone else's post
/// answer the same 404.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    claims: Claims,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.delete_post(&post_id.to_string(), &claims.sub.to_string())? {
        return Err(ApiError::NotFound("post"));
    }

    Ok(Json(serde_json::json!({ "message": "post deleted" })))
}

/// GET /users/{id}/posts — one author's posts, newest first.
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_posts_by_user(&user_id.to_string())?;
    let posts: Vec<Post> = rows.into_iter().map(post_to_model).collect();
    Ok(Json(posts))
}
