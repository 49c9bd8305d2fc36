use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use slotbook_db::StoreError;
use slotbook_db::models::{BookingRow, NewBooking};
use slotbook_types::api::CreateBookingRequest;
use slotbook_types::models::Booking;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::Json;
use crate::identity::Claims;
use crate::{parse_date, parse_time, parse_timestamp, parse_uuid};

#[derive(Debug, Deserialize)]
pub struct BookingRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub(crate) fn booking_to_model(row: BookingRow) -> Booking {
    Booking {
        id: parse_uuid(&row.id, "booking id"),
        user_id: parse_uuid(&row.user_id, "booking owner id"),
        date: parse_date(&row.booking_date),
        start_time: parse_time(&row.start_time),
        end_time: parse_time(&row.end_time),
        title: row.title,
        description: row.description,
        created_at: parse_timestamp(&row.created_at),
        username: row.username,
    }
}

/// POST /bookings — reserve a slot for the authenticated user.
///
/// The store runs the availability check and the insert; either way of
/// losing the slot comes back as [`StoreError::UniqueViolation`] and turns
/// into one 409 here.
pub async fn create_booking(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }

    let new = NewBooking {
        user_id: claims.sub.to_string(),
        date: req.date,
        start_time: req.start_time,
        end_time: req.end_time,
        title: req.title,
        description: req.description,
    };

    // Run the blocking allocation off the async runtime
    let db = state.clone();
    let result = tokio::task::spawn_blocking(move || db.db.create_booking(&new))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?;

    match result {
        Ok(row) => {
            info!(
                "Booking {} created by {} for {} {}",
                row.id, claims.username, row.booking_date, row.start_time
            );
            Ok((StatusCode::CREATED, Json(booking_to_model(row))))
        }
        Err(StoreError::UniqueViolation) => Err(ApiError::SlotConflict),
        Err(StoreError::ForeignKeyViolation) => {
            Err(ApiError::Unauthorized("user account no longer exists"))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /bookings — the whole calendar, oldest slot first, or just an
/// inclusive date range when both `start_date` and `end_date` are present.
/// A single bound is ignored.
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = query.start_date.zip(query.end_date);

    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_bookings(range))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    let bookings: Vec<Booking> = rows.into_iter().map(booking_to_model).collect();
    Ok(Json(bookings))
}

/// DELETE /bookings/{id} — owner only. One conditional DELETE in the store
/// decides; a missing booking and someone else's booking both answer 404.
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    claims: Claims,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let id = booking_id.to_string();
    let user_id = claims.sub.to_string();
    let deleted = tokio::task::spawn_blocking(move || db.db.delete_booking(&id, &user_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    if !deleted {
        return Err(ApiError::NotFound("booking"));
    }

    info!("Booking {} deleted by {}", booking_id, claims.username);
    Ok(Json(serde_json::json!({ "message": "booking deleted" })))
}

/// GET /users/{id}/bookings — one user's bookings, most recent date first
/// with times ascending within a day.
pub async fn list_user_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let id = user_id.to_string();
    let rows = tokio::task::spawn_blocking(move || db.db.list_bookings_by_user(&id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })??;

    let bookings: Vec<Booking> = rows.into_iter().map(booking_to_model).collect();
    Ok(Json(bookings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_convert_to_typed_bookings() {
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let row = BookingRow {
            id: id.to_string(),
            user_id: owner.to_string(),
            booking_date: "2024-06-01".to_string(),
            start_time: "10:00:00".to_string(),
            end_time: "11:00:00".to_string(),
            title: "Sync".to_string(),
            description: Some("weekly".to_string()),
            created_at: "2024-05-30 08:00:00".to_string(),
            username: Some("alice".to_string()),
        };

        let booking = booking_to_model(row);
        assert_eq!(booking.id, id);
        assert_eq!(booking.user_id, owner);
        assert_eq!(booking.date, "2024-06-01".parse().unwrap());
        assert_eq!(booking.start_time, "10:00:00".parse().unwrap());
        assert_eq!(booking.end_time, "11:00:00".parse().unwrap());
        assert_eq!(booking.username.as_deref(), Some("alice"));
        assert_eq!(booking.created_at.to_rfc3339(), "2024-05-30T08:00:00+00:00");
    }

    #[test]
    fn half_open_ranges_are_ignored() {
        let query = BookingRangeQuery {
            start_date: Some("2024-06-01".parse().unwrap()),
            end_date: None,
        };
        assert!(query.start_date.zip(query.end_date).is_none());
    }
}
