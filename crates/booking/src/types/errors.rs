//! Error types for the booking domain.

use reservo_database::{AppointmentStatus, DatabaseError};
use thiserror::Error;

pub type BookingResult<T> = Result<T, BookingError>;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    /// Duplicate names, taken slots and concurrent modifications.
    #[error("{0}")]
    Conflict(String),

    #[error("cannot change appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl BookingError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<DatabaseError> for BookingError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(what) => BookingError::NotFound(what),
            DatabaseError::Duplicate(message) | DatabaseError::Conflict(message) => {
                BookingError::Conflict(message)
            }
            DatabaseError::ValidationError(message) => BookingError::Validation(message),
            other => BookingError::Database(other),
        }
    }
}
