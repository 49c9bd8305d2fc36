use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account. The password hash never leaves the storage layer, so
/// there is no field for it here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Author's username, present on listings that join against users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A reserved slot on the shared calendar. The `(date, start_time)` pair is
/// unique across all users; `end_time` is informational and takes no part
/// in conflict decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Owner's username, present on calendar-wide listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}
