use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, EntityKind, ValidationError};
use crate::models::{BookingResponse, PageMeta, PageParams};
use crate::services::reservation::{self, CreateBookingRequest, UpdateBookingRequest};
use crate::state::AppState;

// Ids that do not parse can never match a row.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(EntityKind::Booking))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let req = body(payload)?;
    let now = Utc::now().naive_utc();

    let booking = {
        let store = state.store()?;
        reservation::create_booking(&**store, req, &state.config.default_country_code, now)?
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Booking created successfully",
            "booking": BookingResponse::from(&booking),
        })),
    ))
}

// GET /api/bookings?page=&limit=
#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse {
    bookings: Vec<BookingResponse>,
    meta: PageMeta,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let params = PageParams::from_query(query.page.as_deref(), query.limit.as_deref());

    let (bookings, meta) = {
        let store = state.store()?;
        reservation::list_bookings(&**store, params)?
    };

    Ok(Json(ListResponse {
        bookings: bookings.iter().map(BookingResponse::from).collect(),
        meta,
    }))
}

// GET /api/bookings/count
pub async fn count_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let total = {
        let store = state.store()?;
        reservation::count_bookings(&**store)?
    };
    Ok(Json(serde_json::json!({ "bookingTotal": total })))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let id = parse_id(&raw_id)?;

    let booking = {
        let store = state.store()?;
        reservation::get_booking(&**store, id)?
    };

    Ok(Json(BookingResponse::from(&booking)))
}

// PUT /api/bookings/:id
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateBookingRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let req = body(payload)?;
    if req.is_empty() {
        return Err(ValidationError::NoFields.into());
    }
    let id = parse_id(&raw_id)?;
    let now = Utc::now().naive_utc();

    let booking = {
        let store = state.store()?;
        reservation::update_booking(&**store, id, req, &state.config.default_country_code, now)?
    };

    Ok(Json(serde_json::json!({
        "message": "Booking updated successfully",
        "booking": BookingResponse::from(&booking),
    })))
}

// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&raw_id)?;

    {
        let store = state.store()?;
        reservation::delete_booking(&**store, id)?;
    }

    Ok(Json(serde_json::json!({ "message": "Booking deleted successfully" })))
}
