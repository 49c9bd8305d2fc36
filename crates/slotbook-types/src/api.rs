use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::User;

/// Slot times arrive from clients as either "HH:MM" or "HH:MM:SS"; both
/// deserialize to the same `NaiveTime`.
pub mod flexible_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, de};

    pub fn parse(s: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .ok()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| de::Error::custom(format!("invalid time '{}'", s)))
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid time '{}'", s))),
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// -- Users --

/// Body for the unauthenticated user-create endpoint. Accounts made this
/// way carry no password and cannot log in.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: Option<String>,
}

// -- Bookings --

/// Body for reserving a calendar slot. `end_time` defaults to one hour
/// after `start_time` when omitted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBookingRequest {
    pub date: NaiveDate,
    #[serde(deserialize_with = "flexible_time::deserialize")]
    pub start_time: NaiveTime,
    #[serde(default, deserialize_with = "flexible_time::deserialize_opt")]
    pub end_time: Option<NaiveTime>,
    pub title: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_request_accepts_minute_precision_times() {
        let req: CreateBookingRequest = serde_json::from_str(
            r#"{"date": "2024-06-01", "start_time": "10:00", "title": "Standup"}"#,
        )
        .unwrap();

        assert_eq!(req.start_time, chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert!(req.end_time.is_none());
        assert!(req.description.is_none());
    }

    #[test]
    fn booking_request_accepts_second_precision_times() {
        let req: CreateBookingRequest = serde_json::from_str(
            r#"{"date": "2024-06-01", "start_time": "10:00:00", "end_time": "11:30:00", "title": "Standup"}"#,
        )
        .unwrap();

        assert_eq!(req.start_time, chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(req.end_time, chrono::NaiveTime::from_hms_opt(11, 30, 0));
    }

    #[test]
    fn booking_request_rejects_unparseable_times() {
        let result = serde_json::from_str::<CreateBookingRequest>(
            r#"{"date": "2024-06-01", "start_time": "ten o'clock", "title": "x"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn booking_request_rejects_unknown_fields() {
        let result = serde_json::from_str::<CreateBookingRequest>(
            r#"{"date": "2024-06-01", "start_time": "10:00", "title": "x", "owner": "bob"}"#,
        );
        assert!(result.is_err(), "unknown field should be rejected");
    }

    #[test]
    fn update_user_request_allows_partial_bodies() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"email": "new@example.com"}"#).unwrap();
        assert!(req.username.is_none());
        assert_eq!(req.email.as_deref(), Some("new@example.com"));
    }
}
