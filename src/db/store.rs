use chrono::NaiveDateTime;
use rusqlite::{ffi, ErrorCode};

use crate::models::{Booking, NewBooking, Product, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(err, msg) = &e {
            let detail = msg.clone().unwrap_or_else(|| err.to_string());
            match err.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return StoreError::DuplicateKey(detail)
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return StoreError::ForeignKeyViolation(detail)
                }
                _ if err.code == ErrorCode::ConstraintViolation => {
                    return StoreError::ConstraintViolation(detail)
                }
                _ => {}
            }
        }
        StoreError::Database(e)
    }
}

/// Persistence operations the reservation engine depends on.
///
/// Callers serialize access (the app keeps the store behind a mutex), so an
/// engine operation that reads, validates and then writes a booking observes
/// no interleaved writes.
pub trait EntityStore: Send {
    fn find_product(&self, id: i64) -> Result<Option<Product>, StoreError>;
    fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;
    fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    fn find_booking(&self, id: i64) -> Result<Option<Booking>, StoreError>;
    /// Assigns an id and timestamps, returning the stored record.
    fn insert_booking(&self, booking: &NewBooking, now: NaiveDateTime)
        -> Result<Booking, StoreError>;
    /// Overwrites every mutable column of `booking`. Returns `None` when the id
    /// no longer exists.
    fn update_booking(&self, booking: &Booking, now: NaiveDateTime)
        -> Result<Option<Booking>, StoreError>;
    fn delete_booking(&self, id: i64) -> Result<bool, StoreError>;
    /// Newest first.
    fn list_bookings(&self, limit: i64, offset: i64) -> Result<Vec<Booking>, StoreError>;
    fn count_bookings(&self) -> Result<i64, StoreError>;
}
