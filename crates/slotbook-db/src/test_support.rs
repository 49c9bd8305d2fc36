//! Helpers shared across the store tests: fresh on-disk databases under the
//! system temp dir, plus seed rows.

use std::path::PathBuf;

use chrono::NaiveTime;
use uuid::Uuid;

use crate::Database;
use crate::models::NewBooking;

pub(crate) fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .unwrap()
}

pub(crate) fn temp_db_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("slotbook-{}-{}.db", tag, Uuid::new_v4()))
}

pub(crate) fn open_db(tag: &str) -> Database {
    Database::open(&temp_db_path(tag)).unwrap()
}

pub(crate) fn seed_user(db: &Database, username: &str) -> String {
    let id = Uuid::new_v4().to_string();
    db.create_user(&id, username, &format!("{}@example.com", username), "x")
        .unwrap();
    id
}

pub(crate) fn booking(user_id: &str, date: &str, start_time: &str) -> NewBooking {
    NewBooking {
        user_id: user_id.to_string(),
        date: date.parse().unwrap(),
        start_time: time(start_time),
        end_time: None,
        title: "Meeting".to_string(),
        description: None,
    }
}
