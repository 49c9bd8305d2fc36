//! Row types as they come out of SQLite. Dates, times, and timestamps stay
//! as their stored strings here; the API layer owns the conversion to
//! typed values.

use chrono::{NaiveDate, NaiveTime};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: Option<String>,
    pub created_at: String,
    /// Author's username, filled by queries that join against users.
    pub username: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BookingRow {
    pub id: String,
    pub user_id: String,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
    /// Owner's username, filled by the calendar-wide listing queries.
    pub username: Option<String>,
}

/// Input to the booking allocator. When `end_time` is `None` the allocator
/// stores one hour past `start_time`.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub title: String,
    pub description: Option<String>,
}
