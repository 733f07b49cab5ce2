use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::StoreError;

/// The kind of record a lookup failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Booking,
    Product,
    Renter,
    Owner,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Booking => "Booking",
            EntityKind::Product => "Product",
            EntityKind::Renter => "Renter",
            EntityKind::Owner => "Owner",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("no fields to update")]
    NoFields,

    #[error("invalid phone number")]
    InvalidPhone,

    #[error("invalid date for {field}: expected YYYY-MM-DD or an ISO 8601 timestamp")]
    InvalidDate { field: &'static str },

    #[error("startDate must be before endDate")]
    InvalidDateRange,

    #[error("startDate must be in the future for a pending booking")]
    StartDateNotFuture,

    #[error("invalid driver status, must be one of: yes, no")]
    InvalidDriverStatus,

    #[error("invalid status, must be one of: Pending, Confirmed, Cancelled, Completed")]
    InvalidStatus,

    #[error("invalid payment status, must be one of: {allowed}")]
    InvalidPaymentStatus { allowed: &'static str },

    #[error("totalPrice must be a non-negative number")]
    InvalidPrice,

    #[error("cannot change status of a cancelled booking")]
    CannotChangeFromCancelled,

    #[error("cannot change status of a completed booking")]
    CannotChangeFromCompleted,

    #[error("field {field} does not apply to {variant} bookings")]
    FieldNotApplicable {
        field: &'static str,
        variant: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
