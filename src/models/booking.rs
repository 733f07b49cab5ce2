use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(BookingStatus::Pending),
            "Confirmed" => Some(BookingStatus::Confirmed),
            "Cancelled" => Some(BookingStatus::Cancelled),
            "Completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    /// Statuses a booking currently in `self` may be moved to. Terminal states
    /// only accept re-asserting themselves.
    pub fn allowed_next(&self) -> &'static [BookingStatus] {
        use BookingStatus::*;
        match self {
            Pending | Confirmed => &[Pending, Confirmed, Cancelled, Completed],
            Cancelled => &[Cancelled],
            Completed => &[Completed],
        }
    }

    pub fn transition_to(self, next: BookingStatus) -> Result<BookingStatus, ValidationError> {
        if self.allowed_next().contains(&next) {
            return Ok(next);
        }
        match self {
            BookingStatus::Cancelled => Err(ValidationError::CannotChangeFromCancelled),
            BookingStatus::Completed => Err(ValidationError::CannotChangeFromCompleted),
            _ => Err(ValidationError::InvalidStatus),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Confirmed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Confirmed => "Confirmed",
            PaymentStatus::Refunded => "Refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(PaymentStatus::Pending),
            "Paid" => Some(PaymentStatus::Paid),
            "Confirmed" => Some(PaymentStatus::Confirmed),
            "Refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    Yes,
    #[default]
    No,
}

impl Driver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Yes => "yes",
            Driver::No => "no",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(Driver::Yes),
            "no" => Some(Driver::No),
            _ => None,
        }
    }
}

/// The two booking shapes the platform stores side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingVariant {
    /// Walk-in reservation identified by a name and phone number.
    Contact,
    /// Reservation between two registered users with a price and a lifecycle status.
    Account,
}

impl BookingVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingVariant::Contact => "contact",
            BookingVariant::Account => "account",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "contact" => Some(BookingVariant::Contact),
            "account" => Some(BookingVariant::Account),
            _ => None,
        }
    }

    pub fn payment_statuses(&self) -> &'static [PaymentStatus] {
        use PaymentStatus::*;
        match self {
            BookingVariant::Contact => &[Pending, Paid, Confirmed, Refunded],
            BookingVariant::Account => &[Pending, Paid, Refunded],
        }
    }

    pub fn parse_payment_status(&self, s: &str) -> Result<PaymentStatus, ValidationError> {
        PaymentStatus::parse(s)
            .filter(|p| self.payment_statuses().contains(p))
            .ok_or(ValidationError::InvalidPaymentStatus {
                allowed: match self {
                    BookingVariant::Contact => "Pending, Paid, Confirmed, Refunded",
                    BookingVariant::Account => "Pending, Paid, Refunded",
                },
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingDetails {
    Contact {
        full_name: String,
        phone: String,
        driver: Driver,
    },
    Account {
        renter_id: i64,
        owner_id: i64,
        total_price: f64,
        status: BookingStatus,
    },
}

impl BookingDetails {
    pub fn variant(&self) -> BookingVariant {
        match self {
            BookingDetails::Contact { .. } => BookingVariant::Contact,
            BookingDetails::Account { .. } => BookingVariant::Account,
        }
    }

    pub fn status(&self) -> Option<BookingStatus> {
        match self {
            BookingDetails::Account { status, .. } => Some(*status),
            BookingDetails::Contact { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub product_id: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub payment_status: PaymentStatus,
    pub details: BookingDetails,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A validated booking that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub product_id: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub payment_status: PaymentStatus,
    pub details: BookingDetails,
}

/// Validated subset of mutable fields. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub driver: Option<Driver>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub total_price: Option<f64>,
}

impl Booking {
    /// Returns a copy of the booking with `changes` merged in. Fields that do not
    /// exist on this booking's variant are ignored; callers reject them earlier.
    pub fn merged(&self, changes: &BookingChanges) -> Booking {
        let mut next = self.clone();
        if let Some(start) = changes.start_date {
            next.start_date = start;
        }
        if let Some(end) = changes.end_date {
            next.end_date = end;
        }
        if let Some(payment) = changes.payment_status {
            next.payment_status = payment;
        }

        match &mut next.details {
            BookingDetails::Contact {
                full_name,
                phone,
                driver,
            } => {
                if let Some(name) = &changes.full_name {
                    *full_name = name.clone();
                }
                if let Some(p) = &changes.phone {
                    *phone = p.clone();
                }
                if let Some(d) = changes.driver {
                    *driver = d;
                }
            }
            BookingDetails::Account {
                total_price,
                status,
                ..
            } => {
                if let Some(price) = changes.total_price {
                    *total_price = price;
                }
                if let Some(s) = changes.status {
                    *status = s;
                }
            }
        }
        next
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: i64,
    pub variant: String,
    pub product_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<Driver>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renter_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    pub payment_status: PaymentStatus,
    pub start_date: String,
    pub end_date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Booking> for BookingResponse {
    fn from(b: &Booking) -> Self {
        let mut response = BookingResponse {
            id: b.id,
            variant: b.details.variant().as_str().to_string(),
            product_id: b.product_id,
            full_name: None,
            phone: None,
            driver: None,
            renter_id: None,
            owner_id: None,
            total_price: None,
            status: None,
            payment_status: b.payment_status,
            start_date: b.start_date.format(DATETIME_FORMAT).to_string(),
            end_date: b.end_date.format(DATETIME_FORMAT).to_string(),
            created_at: b.created_at.format(DATETIME_FORMAT).to_string(),
            updated_at: b.updated_at.format(DATETIME_FORMAT).to_string(),
        };

        match &b.details {
            BookingDetails::Contact {
                full_name,
                phone,
                driver,
            } => {
                response.full_name = Some(full_name.clone());
                response.phone = Some(phone.clone());
                response.driver = Some(*driver);
            }
            BookingDetails::Account {
                renter_id,
                owner_id,
                total_price,
                status,
            } => {
                response.renter_id = Some(*renter_id);
                response.owner_id = Some(*owner_id);
                response.total_price = Some(*total_price);
                response.status = Some(*status);
            }
        }
        response
    }
}
