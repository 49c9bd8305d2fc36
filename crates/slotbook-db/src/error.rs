use rusqlite::ffi;
use thiserror::Error;

/// Storage failure taxonomy. Raw SQLite errors are classified once, here at
/// the store boundary, so callers can route on constraint class instead of
/// string-matching error messages.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A UNIQUE or PRIMARY KEY constraint rejected the write. On `bookings`
    /// this is the slot-conflict signal; on `users` a duplicate username or
    /// email.
    #[error("unique constraint violation")]
    UniqueViolation,

    /// A referenced row does not exist, e.g. the owner of a new booking.
    #[error("foreign key constraint violation")]
    ForeignKeyViolation,

    /// The requested row does not exist.
    #[error("row not found")]
    NotFound,

    /// A connection mutex was poisoned by a panicking holder.
    #[error("database lock poisoned")]
    LockPoisoned,

    /// Any other SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(e, _) = &err {
            match e.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return StoreError::UniqueViolation;
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return StoreError::ForeignKeyViolation,
                _ => {}
            }
        }
        StoreError::Sqlite(err)
    }
}
