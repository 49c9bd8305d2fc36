//! Booking slot allocation.
//!
//! A slot is the exact `(booking_date, start_time)` pair. Uniqueness holds
//! per slot, not per interval: two bookings whose time ranges overlap but
//! start at different instants are both accepted.

use chrono::{Duration, NaiveDate, NaiveTime};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::Database;
use crate::error::StoreError;
use crate::models::{BookingRow, NewBooking};

/// Stored format for booking dates.
const DATE_FMT: &str = "%Y-%m-%d";
/// Stored format for slot times. "10:00" and "10:00:00" collapse to one
/// representation, so the UNIQUE constraint sees a single key per slot.
const TIME_FMT: &str = "%H:%M:%S";

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FMT).to_string()
}

impl Database {
    /// Availability check for one exact slot. A pure read: asking never
    /// reserves anything, and asking twice gives the same answer until a
    /// write lands in between.
    pub fn slot_available(&self, date: NaiveDate, start_time: NaiveTime) -> Result<bool, StoreError> {
        let (date, time) = (format_date(date), format_time(start_time));
        self.with_conn(move |conn| {
            let taken: i64 = conn.query_row(
                "SELECT COUNT(*) FROM bookings WHERE booking_date = ?1 AND start_time = ?2",
                (date, time),
                |row| row.get(0),
            )?;
            Ok(taken == 0)
        })
    }

    /// Allocate a slot for `new.user_id`.
    ///
    /// Two phases: an availability pre-check on a reader connection, then
    /// the INSERT on the writer under `UNIQUE(booking_date, start_time)`.
    /// Concurrent callers can both pass the pre-check; the constraint lets
    /// exactly one INSERT through, and the loser gets the same
    /// [`StoreError::UniqueViolation`] as a pre-check miss.
    pub fn create_booking(&self, new: &NewBooking) -> Result<BookingRow, StoreError> {
        if !self.slot_available(new.date, new.start_time)? {
            return Err(StoreError::UniqueViolation);
        }

        let id = Uuid::new_v4().to_string();
        let date = format_date(new.date);
        let start = format_time(new.start_time);
        // One-hour default duration, wrapping at midnight like the times do.
        let end = format_time(
            new.end_time
                .unwrap_or_else(|| new.start_time + Duration::hours(1)),
        );

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO bookings (id, user_id, booking_date, start_time, end_time, title, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![id, new.user_id, date, start, end, new.title, new.description],
            )?;
            query_booking_by_id(conn, &id)?.ok_or(StoreError::NotFound)
        })
    }

    pub fn get_booking_by_id(&self, id: &str) -> Result<Option<BookingRow>, StoreError> {
        self.with_conn(|conn| query_booking_by_id(conn, id))
    }

    /// Delete a booking the caller owns. The id match and the owner match
    /// are one DELETE, so nothing can change hands between a check and the
    /// removal; `Ok(false)` covers both "no such booking" and "not yours".
    pub fn delete_booking(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "DELETE FROM bookings WHERE id = ?1 AND user_id = ?2",
                (id, user_id),
            )?;
            Ok(changed > 0)
        })
    }

    /// The whole calendar, or the slice inside an inclusive date range,
    /// ordered oldest slot first. Rows carry the owner's username.
    pub fn list_bookings(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<BookingRow>, StoreError> {
        self.with_conn(|conn| match range {
            Some((from, to)) => {
                let mut stmt = conn.prepare(
                    "SELECT b.id, b.user_id, b.booking_date, b.start_time, b.end_time,
                            b.title, b.description, b.created_at, u.username
                     FROM bookings b
                     LEFT JOIN users u ON b.user_id = u.id
                     WHERE b.booking_date BETWEEN ?1 AND ?2
                     ORDER BY b.booking_date ASC, b.start_time ASC",
                )?;

                let rows = stmt
                    .query_map((format_date(from), format_date(to)), booking_from_joined_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                Ok(rows)
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT b.id, b.user_id, b.booking_date, b.start_time, b.end_time,
                            b.title, b.description, b.created_at, u.username
                     FROM bookings b
                     LEFT JOIN users u ON b.user_id = u.id
                     ORDER BY b.booking_date ASC, b.start_time ASC",
                )?;

                let rows = stmt
                    .query_map([], booking_from_joined_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                Ok(rows)
            }
        })
    }

    /// One user's bookings, most recent date first with times ascending
    /// inside a day. The calendar-wide listing sorts the other way around;
    /// the two orders are independent contracts.
    pub fn list_bookings_by_user(&self, user_id: &str) -> Result<Vec<BookingRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, booking_date, start_time, end_time,
                        title, description, created_at
                 FROM bookings
                 WHERE user_id = ?1
                 ORDER BY booking_date DESC, start_time ASC",
            )?;

            let rows = stmt
                .query_map([user_id], booking_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn booking_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BookingRow> {
    Ok(BookingRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        booking_date: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        created_at: row.get(7)?,
        username: None,
    })
}

fn booking_from_joined_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BookingRow> {
    Ok(BookingRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        booking_date: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        created_at: row.get(7)?,
        username: row.get(8)?,
    })
}

fn query_booking_by_id(conn: &Connection, id: &str) -> Result<Option<BookingRow>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, booking_date, start_time, end_time,
                title, description, created_at
         FROM bookings
         WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], booking_from_row).optional()?;
    Ok(row)
}
