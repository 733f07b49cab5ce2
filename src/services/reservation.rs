use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::Deserialize;

use crate::db::EntityStore;
use crate::errors::{AppError, EntityKind, ValidationError};
use crate::models::{
    Booking, BookingChanges, BookingDetails, BookingStatus, BookingVariant, Driver, NewBooking,
    PageMeta, PageParams, PaymentStatus,
};
use crate::services::phone::normalize_phone;

/// Body of `POST /bookings`. Supplying `renterId` or `ownerId` selects an
/// account booking; otherwise the request describes a contact booking.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub product_id: Option<i64>,
    pub full_name: Option<String>,
    #[serde(alias = "Phone")]
    pub phone: Option<String>,
    pub driver: Option<String>,
    pub renter_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub total_price: Option<f64>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Body of `PUT /bookings/:id`. `null` and an absent key both mean "leave as is".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub full_name: Option<String>,
    #[serde(alias = "Phone")]
    pub phone: Option<String>,
    pub driver: Option<String>,
    pub total_price: Option<f64>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl UpdateBookingRequest {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.driver.is_none()
            && self.total_price.is_none()
            && self.status.is_none()
            && self.payment_status.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

pub fn create_booking(
    store: &dyn EntityStore,
    req: CreateBookingRequest,
    country_code: &str,
    now: NaiveDateTime,
) -> Result<Booking, AppError> {
    let variant = if req.renter_id.is_some() || req.owner_id.is_some() {
        BookingVariant::Account
    } else {
        BookingVariant::Contact
    };

    let missing = missing_create_fields(&req, variant);
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing).into());
    }
    reject_foreign_fields(
        variant,
        &[
            ("fullName", req.full_name.is_some()),
            ("phone", req.phone.is_some()),
            ("driver", req.driver.is_some()),
            ("totalPrice", req.total_price.is_some()),
            ("status", req.status.is_some()),
        ],
    )?;

    let product_id = req.product_id.unwrap_or_default();
    if store.find_product(product_id)?.is_none() {
        return Err(AppError::NotFound(EntityKind::Product));
    }

    let details = match variant {
        BookingVariant::Account => {
            let renter_id = req.renter_id.unwrap_or_default();
            let owner_id = req.owner_id.unwrap_or_default();
            if store.find_user(renter_id)?.is_none() {
                return Err(AppError::NotFound(EntityKind::Renter));
            }
            if store.find_user(owner_id)?.is_none() {
                return Err(AppError::NotFound(EntityKind::Owner));
            }

            let status = match req.status.as_deref() {
                Some(s) => BookingStatus::parse(s).ok_or(ValidationError::InvalidStatus)?,
                None => BookingStatus::Pending,
            };
            BookingDetails::Account {
                renter_id,
                owner_id,
                total_price: validate_price(req.total_price.unwrap_or_default())?,
                status,
            }
        }
        BookingVariant::Contact => {
            let raw_phone = req.phone.as_deref().unwrap_or_default();
            let phone =
                normalize_phone(raw_phone, country_code).ok_or(ValidationError::InvalidPhone)?;
            let driver = match req.driver.as_deref() {
                Some(d) => Driver::parse(d).ok_or(ValidationError::InvalidDriverStatus)?,
                None => Driver::default(),
            };
            BookingDetails::Contact {
                full_name: req.full_name.unwrap_or_default().trim().to_string(),
                phone,
                driver,
            }
        }
    };

    let payment_status = match req.payment_status.as_deref() {
        Some(p) => variant.parse_payment_status(p)?,
        None => PaymentStatus::Pending,
    };

    let start_date = parse_date(req.start_date.as_deref().unwrap_or_default(), "startDate")?;
    let end_date = parse_date(req.end_date.as_deref().unwrap_or_default(), "endDate")?;
    if start_date >= end_date {
        return Err(ValidationError::InvalidDateRange.into());
    }

    let new_booking = NewBooking {
        product_id,
        start_date,
        end_date,
        payment_status,
        details,
    };
    let booking = store.insert_booking(&new_booking, now)?;

    tracing::info!(
        booking_id = booking.id,
        product_id = booking.product_id,
        variant = booking.details.variant().as_str(),
        "booking created"
    );
    Ok(booking)
}

pub fn update_booking(
    store: &dyn EntityStore,
    id: i64,
    req: UpdateBookingRequest,
    country_code: &str,
    now: NaiveDateTime,
) -> Result<Booking, AppError> {
    if req.is_empty() {
        return Err(ValidationError::NoFields.into());
    }

    let current = store
        .find_booking(id)?
        .ok_or(AppError::NotFound(EntityKind::Booking))?;
    let variant = current.details.variant();
    reject_foreign_fields(
        variant,
        &[
            ("fullName", req.full_name.is_some()),
            ("phone", req.phone.is_some()),
            ("driver", req.driver.is_some()),
            ("totalPrice", req.total_price.is_some()),
            ("status", req.status.is_some()),
        ],
    )?;

    let mut changes = BookingChanges {
        full_name: req.full_name.map(|n| n.trim().to_string()),
        ..Default::default()
    };

    if let Some(raw) = req.phone.as_deref() {
        changes.phone =
            Some(normalize_phone(raw, country_code).ok_or(ValidationError::InvalidPhone)?);
    }
    if let Some(d) = req.driver.as_deref() {
        changes.driver = Some(Driver::parse(d).ok_or(ValidationError::InvalidDriverStatus)?);
    }
    if let Some(s) = req.status.as_deref() {
        let requested = BookingStatus::parse(s).ok_or(ValidationError::InvalidStatus)?;
        if let Some(current_status) = current.details.status() {
            changes.status = Some(current_status.transition_to(requested)?);
        }
    }
    if let Some(p) = req.payment_status.as_deref() {
        changes.payment_status = Some(variant.parse_payment_status(p)?);
    }
    if let Some(price) = req.total_price {
        changes.total_price = Some(validate_price(price)?);
    }
    if let Some(s) = req.start_date.as_deref() {
        changes.start_date = Some(parse_date(s, "startDate")?);
    }
    if let Some(s) = req.end_date.as_deref() {
        changes.end_date = Some(parse_date(s, "endDate")?);
    }

    let merged = current.merged(&changes);

    if changes.start_date.is_some() || changes.end_date.is_some() {
        if merged.start_date >= merged.end_date {
            return Err(ValidationError::InvalidDateRange.into());
        }
        if current.details.status() == Some(BookingStatus::Pending) && merged.start_date <= now {
            return Err(ValidationError::StartDateNotFuture.into());
        }
    }

    let updated = store
        .update_booking(&merged, now)?
        .ok_or(AppError::NotFound(EntityKind::Booking))?;

    tracing::info!(
        booking_id = updated.id,
        status = updated.details.status().map(|s| s.as_str()),
        payment_status = updated.payment_status.as_str(),
        "booking updated"
    );
    Ok(updated)
}

pub fn delete_booking(store: &dyn EntityStore, id: i64) -> Result<(), AppError> {
    if !store.delete_booking(id)? {
        return Err(AppError::NotFound(EntityKind::Booking));
    }
    tracing::info!(booking_id = id, "booking deleted");
    Ok(())
}

pub fn get_booking(store: &dyn EntityStore, id: i64) -> Result<Booking, AppError> {
    store
        .find_booking(id)?
        .ok_or(AppError::NotFound(EntityKind::Booking))
}

pub fn list_bookings(
    store: &dyn EntityStore,
    params: PageParams,
) -> Result<(Vec<Booking>, PageMeta), AppError> {
    let total = store.count_bookings()?;
    let bookings = store.list_bookings(params.limit, params.offset())?;
    Ok((bookings, PageMeta::new(params, total)))
}

pub fn count_bookings(store: &dyn EntityStore) -> Result<i64, AppError> {
    Ok(store.count_bookings()?)
}

/// Parses a calendar date or timestamp. Offsets are converted to UTC and
/// sub-second precision is dropped.
pub fn parse_date(raw: &str, field: &'static str) -> Result<NaiveDateTime, ValidationError> {
    let s = raw.trim();
    let invalid = ValidationError::InvalidDate { field };

    let parsed = if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        dt.naive_utc()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        dt
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        dt
    } else if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        d.and_hms_opt(0, 0, 0).ok_or(invalid.clone())?
    } else {
        return Err(invalid);
    };

    parsed.with_nanosecond(0).ok_or(invalid)
}

fn validate_price(price: f64) -> Result<f64, ValidationError> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(ValidationError::InvalidPrice)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}

fn missing_create_fields(req: &CreateBookingRequest, variant: BookingVariant) -> Vec<&'static str> {
    let mut missing = vec![];
    if req.product_id.is_none() {
        missing.push("productId");
    }
    match variant {
        BookingVariant::Contact => {
            if is_blank(&req.full_name) {
                missing.push("fullName");
            }
            if is_blank(&req.phone) {
                missing.push("phone");
            }
        }
        BookingVariant::Account => {
            if req.renter_id.is_none() {
                missing.push("renterId");
            }
            if req.owner_id.is_none() {
                missing.push("ownerId");
            }
            if req.total_price.is_none() {
                missing.push("totalPrice");
            }
        }
    }
    if is_blank(&req.start_date) {
        missing.push("startDate");
    }
    if is_blank(&req.end_date) {
        missing.push("endDate");
    }
    missing
}

/// Rejects fields that only exist on the other booking variant.
fn reject_foreign_fields(
    variant: BookingVariant,
    supplied: &[(&'static str, bool)],
) -> Result<(), ValidationError> {
    let foreign: &[&str] = match variant {
        BookingVariant::Contact => &["totalPrice", "status"],
        BookingVariant::Account => &["fullName", "phone", "driver"],
    };
    match supplied
        .iter()
        .find(|(name, present)| *present && foreign.contains(name))
    {
        Some(&(field, _)) => Err(ValidationError::FieldNotApplicable {
            field,
            variant: variant.as_str(),
        }),
        None => Ok(()),
    }
}
