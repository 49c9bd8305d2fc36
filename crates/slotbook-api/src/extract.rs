use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::ApiError;

/// `axum::Json` with its rejection folded into [`ApiError`], so a malformed
/// or incomplete body answers 400 with the usual `{"error": ...}` shape
/// instead of axum's bare 422.
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use slotbook_types::api::{CreateBookingRequest, LoginRequest};

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn well_formed_bodies_extract() {
        let req = json_request(r#"{"date": "2024-06-01", "start_time": "10:00", "title": "Sync"}"#);
        let Json(body): Json<CreateBookingRequest> =
            Json::from_request(req, &()).await.unwrap();
        assert_eq!(body.title, "Sync");
        assert_eq!(body.start_time, "10:00:00".parse().unwrap());
    }

    #[tokio::test]
    async fn malformed_bodies_become_validation_errors() {
        let req = json_request(r#"{"username": 42}"#);
        let result: Result<Json<LoginRequest>, ApiError> = Json::from_request(req, &()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_required_fields_become_validation_errors() {
        let req = json_request(r#"{"start_time": "10:00", "title": "no date"}"#);
        let result: Result<Json<CreateBookingRequest>, ApiError> =
            Json::from_request(req, &()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
