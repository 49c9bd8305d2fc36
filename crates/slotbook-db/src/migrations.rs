use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;

/// Bring the schema up to date. Every statement is idempotent, so this runs
/// unconditionally at open and a concurrent or repeated open is harmless.
pub fn run(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS posts (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title       TEXT NOT NULL,
            content     TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_user
            ON posts(user_id, created_at);

        CREATE TABLE IF NOT EXISTS bookings (
            id           TEXT PRIMARY KEY,
            user_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            booking_date TEXT NOT NULL,
            start_time   TEXT NOT NULL,
            end_time     TEXT NOT NULL,
            title        TEXT NOT NULL,
            description  TEXT,
            created_at   TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(booking_date, start_time)
        );

        CREATE INDEX IF NOT EXISTS idx_bookings_user
            ON bookings(user_id, booking_date);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use crate::test_support::temp_db_path;

    #[test]
    fn reopening_an_existing_database_is_harmless() {
        let path = temp_db_path("migrations");

        let db = Database::open(&path).unwrap();
        let user_id = crate::test_support::seed_user(&db, "alice");
        drop(db);

        // Second open re-runs the migration batch against a populated file.
        let db = Database::open(&path).unwrap();
        let user = db.get_user_by_id(&user_id).unwrap();
        assert_eq!(user.unwrap().username, "alice");
    }
}
