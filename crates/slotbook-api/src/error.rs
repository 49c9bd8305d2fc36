use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use slotbook_db::StoreError;

/// API failure taxonomy. Every handler error funnels through here and comes
/// out as a JSON body of the shape `{"error": "..."}` with the matching
/// status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body or a field in it is unusable (400).
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid token, or a failed credential check (401).
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Authenticated, but acting on someone else's account (403).
    #[error("{0}")]
    Forbidden(&'static str),

    /// Target row absent. Owner-scoped deletes answer this for foreign
    /// rows too, so existence is not revealed to non-owners (404).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate username or email (409).
    #[error("{0}")]
    Conflict(&'static str),

    /// The requested calendar slot is already taken (409).
    #[error("this slot is already booked")]
    SlotConflict,

    /// Storage failure. Logged server-side; the client only learns that
    /// something went wrong (500).
    #[error("internal server error")]
    Store(#[from] StoreError),

    /// Any other server-side failure, logged at the point it happened (500).
    #[error("internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::SlotConflict => StatusCode::CONFLICT,
            ApiError::Store(e) => {
                error!("Storage failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let cases = [
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized("no token"), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("not yours"), StatusCode::FORBIDDEN),
            (ApiError::NotFound("booking"), StatusCode::NOT_FOUND),
            (ApiError::Conflict("taken"), StatusCode::CONFLICT),
            (ApiError::SlotConflict, StatusCode::CONFLICT),
            (ApiError::Store(StoreError::LockPoisoned), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn bodies_carry_the_error_key() {
        let resp = ApiError::SlotConflict.into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "this slot is already booked");
    }

    #[tokio::test]
    async fn storage_detail_stays_out_of_the_body() {
        let resp = ApiError::Store(StoreError::NotFound).into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal server error");
    }

    #[test]
    fn not_found_names_the_resource() {
        assert_eq!(ApiError::NotFound("booking").to_string(), "booking not found");
    }
}
