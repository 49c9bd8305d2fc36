pub mod auth;
pub mod bookings;
pub mod error;
pub mod extract;
pub mod identity;
pub mod posts;
pub mod users;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::warn;
use uuid::Uuid;

// Row fields come back from SQLite as strings. Corrupt values should never
// take a whole listing down, so these fall back to defaults and leave a
// trace in the log.

pub(crate) fn parse_uuid(s: &str, what: &str) -> Uuid {
    s.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, s, e);
        Uuid::default()
    })
}

pub(crate) fn parse_date(s: &str) -> NaiveDate {
    s.parse().unwrap_or_else(|e| {
        warn!("Corrupt booking date '{}': {}", s, e);
        NaiveDate::default()
    })
}

pub(crate) fn parse_time(s: &str) -> NaiveTime {
    s.parse().unwrap_or_else(|e| {
        warn!("Corrupt slot time '{}': {}", s, e);
        NaiveTime::default()
    })
}

pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}': {}", s, e);
            DateTime::default()
        })
}
