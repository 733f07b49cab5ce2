use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::store::{EntityStore, StoreError};
use crate::models::{
    Booking, BookingDetails, BookingStatus, BookingVariant, Driver, NewBooking, PaymentStatus,
    Product, User, DATETIME_FORMAT,
};

const BOOKING_COLUMNS: &str = "id, variant, product_id, full_name, phone, driver, renter_id, owner_id, \
     total_price, status, payment_status, start_date, end_date, created_at, updated_at";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &str) -> anyhow::Result<Self> {
        Ok(Self::new(crate::db::init_db(path)?))
    }
}

impl EntityStore for SqliteStore {
    // ── Products ──

    fn find_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let product = self
            .conn
            .query_row(
                "SELECT id, title, make, model, year, price_per_day, owner_id, is_active
                 FROM products WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Product {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        make: row.get(2)?,
                        model: row.get(3)?,
                        year: row.get(4)?,
                        price_per_day: row.get(5)?,
                        owner_id: row.get(6)?,
                        is_active: row.get::<_, i32>(7)? != 0,
                    })
                },
            )
            .optional()?;
        Ok(product)
    }

    fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO products (id, title, make, model, year, price_per_day, owner_id, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                product.id,
                product.title,
                product.make,
                product.model,
                product.year,
                product.price_per_day,
                product.owner_id,
                product.is_active as i32,
            ],
        )?;
        Ok(())
    }

    // ── Users ──

    fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = self
            .conn
            .query_row(
                "SELECT id, first_name, last_name, email, phone, is_active FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        email: row.get(3)?,
                        phone: row.get(4)?,
                        is_active: row.get::<_, i32>(5)? != 0,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO users (id, first_name, last_name, email, phone, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.first_name,
                user.last_name,
                user.email,
                user.phone,
                user.is_active as i32,
            ],
        )?;
        Ok(())
    }

    // ── Bookings ──

    fn find_booking(&self, id: i64) -> Result<Option<Booking>, StoreError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
        let result = self
            .conn
            .query_row(&sql, params![id], |row| Ok(parse_booking_row(row)))
            .optional()?;

        result.transpose()
    }

    fn insert_booking(
        &self,
        booking: &NewBooking,
        now: NaiveDateTime,
    ) -> Result<Booking, StoreError> {
        let columns = DetailColumns::from(&booking.details);
        let now_str = now.format(DATETIME_FORMAT).to_string();

        self.conn.execute(
            "INSERT INTO bookings (variant, product_id, full_name, phone, driver, renter_id, owner_id,
                                   total_price, status, payment_status, start_date, end_date,
                                   created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
            params![
                booking.details.variant().as_str(),
                booking.product_id,
                columns.full_name,
                columns.phone,
                columns.driver,
                columns.renter_id,
                columns.owner_id,
                columns.total_price,
                columns.status,
                booking.payment_status.as_str(),
                booking.start_date.format(DATETIME_FORMAT).to_string(),
                booking.end_date.format(DATETIME_FORMAT).to_string(),
                now_str,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.find_booking(id)?
            .ok_or_else(|| StoreError::Corrupt(format!("booking {id} vanished after insert")))
    }

    fn update_booking(
        &self,
        booking: &Booking,
        now: NaiveDateTime,
    ) -> Result<Option<Booking>, StoreError> {
        let columns = DetailColumns::from(&booking.details);

        let count = self.conn.execute(
            "UPDATE bookings SET full_name = ?1, phone = ?2, driver = ?3, total_price = ?4,
                                 status = ?5, payment_status = ?6, start_date = ?7, end_date = ?8,
                                 updated_at = ?9
             WHERE id = ?10",
            params![
                columns.full_name,
                columns.phone,
                columns.driver,
                columns.total_price,
                columns.status,
                booking.payment_status.as_str(),
                booking.start_date.format(DATETIME_FORMAT).to_string(),
                booking.end_date.format(DATETIME_FORMAT).to_string(),
                now.format(DATETIME_FORMAT).to_string(),
                booking.id,
            ],
        )?;

        if count == 0 {
            return Ok(None);
        }
        self.find_booking(booking.id)
    }

    fn delete_booking(&self, id: i64) -> Result<bool, StoreError> {
        let count = self
            .conn
            .execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }

    fn list_bookings(&self, limit: i64, offset: i64) -> Result<Vec<Booking>, StoreError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit, offset], |row| Ok(parse_booking_row(row)))?;

        let mut bookings = vec![];
        for row in rows {
            bookings.push(row??);
        }
        Ok(bookings)
    }

    fn count_bookings(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Variant-specific columns; the other variant's columns stay NULL.
#[derive(Default)]
struct DetailColumns<'a> {
    full_name: Option<&'a str>,
    phone: Option<&'a str>,
    driver: Option<&'static str>,
    renter_id: Option<i64>,
    owner_id: Option<i64>,
    total_price: Option<f64>,
    status: Option<&'static str>,
}

impl<'a> From<&'a BookingDetails> for DetailColumns<'a> {
    fn from(details: &'a BookingDetails) -> Self {
        match details {
            BookingDetails::Contact {
                full_name,
                phone,
                driver,
            } => DetailColumns {
                full_name: Some(full_name.as_str()),
                phone: Some(phone.as_str()),
                driver: Some(driver.as_str()),
                ..Default::default()
            },
            BookingDetails::Account {
                renter_id,
                owner_id,
                total_price,
                status,
            } => DetailColumns {
                renter_id: Some(*renter_id),
                owner_id: Some(*owner_id),
                total_price: Some(*total_price),
                status: Some(status.as_str()),
                ..Default::default()
            },
        }
    }
}

fn parse_booking_row(row: &rusqlite::Row) -> Result<Booking, StoreError> {
    let id: i64 = row.get(0)?;
    let variant_str: String = row.get(1)?;
    let product_id: i64 = row.get(2)?;
    let payment_str: String = row.get(10)?;
    let start_str: String = row.get(11)?;
    let end_str: String = row.get(12)?;
    let created_str: String = row.get(13)?;
    let updated_str: String = row.get(14)?;

    let corrupt = |what: &str| StoreError::Corrupt(format!("booking {id}: {what}"));

    let variant = BookingVariant::parse(&variant_str).ok_or_else(|| corrupt("unknown variant"))?;
    let details = match variant {
        BookingVariant::Contact => {
            let full_name: Option<String> = row.get(3)?;
            let phone: Option<String> = row.get(4)?;
            let driver: Option<String> = row.get(5)?;
            BookingDetails::Contact {
                full_name: full_name.ok_or_else(|| corrupt("missing full_name"))?,
                phone: phone.ok_or_else(|| corrupt("missing phone"))?,
                driver: driver.as_deref().and_then(Driver::parse).unwrap_or_default(),
            }
        }
        BookingVariant::Account => {
            let renter_id: Option<i64> = row.get(6)?;
            let owner_id: Option<i64> = row.get(7)?;
            let total_price: Option<f64> = row.get(8)?;
            let status: Option<String> = row.get(9)?;
            BookingDetails::Account {
                renter_id: renter_id.ok_or_else(|| corrupt("missing renter_id"))?,
                owner_id: owner_id.ok_or_else(|| corrupt("missing owner_id"))?,
                total_price: total_price.ok_or_else(|| corrupt("missing total_price"))?,
                status: status
                    .as_deref()
                    .and_then(BookingStatus::parse)
                    .ok_or_else(|| corrupt("invalid status"))?,
            }
        }
    };

    let parse_dt = |s: &str, field: &str| {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
            .map_err(|e| corrupt(&format!("invalid {field}: {e}")))
    };

    Ok(Booking {
        id,
        product_id,
        start_date: parse_dt(&start_str, "start_date")?,
        end_date: parse_dt(&end_str, "end_date")?,
        payment_status: PaymentStatus::parse(&payment_str)
            .ok_or_else(|| corrupt("invalid payment_status"))?,
        details,
        created_at: parse_dt(&created_str, "created_at")?,
        updated_at: parse_dt(&updated_str, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_store() -> SqliteStore {
        SqliteStore::open(":memory:").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).unwrap()
    }

    fn contact_booking(name: &str) -> NewBooking {
        NewBooking {
            product_id: 1,
            start_date: dt("2030-03-01 10:00:00"),
            end_date: dt("2030-03-04 10:00:00"),
            payment_status: PaymentStatus::Pending,
            details: BookingDetails::Contact {
                full_name: name.to_string(),
                phone: "+256771234567".to_string(),
                driver: Driver::No,
            },
        }
    }

    fn user(id: i64, email: &str) -> User {
        User {
            id,
            first_name: "Ada".to_string(),
            last_name: "Okello".to_string(),
            email: email.to_string(),
            phone: None,
            is_active: true,
        }
    }

    #[test]
    fn test_insert_and_find_booking() {
        let store = setup_store();
        let now = dt("2030-01-01 08:00:00");

        let created = store.insert_booking(&contact_booking("Alice"), now).unwrap();
        assert!(created.id > 0);
        assert_eq!(created.created_at, now);
        assert_eq!(created.updated_at, now);

        let found = store.find_booking(created.id).unwrap().unwrap();
        assert_eq!(found, created);
        assert!(store.find_booking(created.id + 100).unwrap().is_none());
    }

    #[test]
    fn test_account_booking_round_trips_through_columns() {
        let store = setup_store();
        let booking = NewBooking {
            product_id: 4,
            start_date: dt("2030-03-01 00:00:00"),
            end_date: dt("2030-03-02 00:00:00"),
            payment_status: PaymentStatus::Paid,
            details: BookingDetails::Account {
                renter_id: 10,
                owner_id: 11,
                total_price: 99.5,
                status: BookingStatus::Confirmed,
            },
        };

        let created = store
            .insert_booking(&booking, dt("2030-01-01 08:00:00"))
            .unwrap();
        assert_eq!(created.details, booking.details);
        assert_eq!(created.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_list_is_newest_first_with_stable_ties() {
        let store = setup_store();
        let t1 = dt("2030-01-01 08:00:00");
        let t2 = dt("2030-01-02 08:00:00");

        let a = store.insert_booking(&contact_booking("A"), t1).unwrap();
        let b = store.insert_booking(&contact_booking("B"), t2).unwrap();
        let c = store.insert_booking(&contact_booking("C"), t2).unwrap();

        let ids: Vec<i64> = store
            .list_bookings(10, 0)
            .unwrap()
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);

        let second_page = store.list_bookings(2, 2).unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].id, a.id);
        assert_eq!(store.count_bookings().unwrap(), 3);
    }

    #[test]
    fn test_update_missing_booking_returns_none() {
        let store = setup_store();
        let now = dt("2030-01-01 08:00:00");
        let mut booking = store.insert_booking(&contact_booking("A"), now).unwrap();
        assert!(store.delete_booking(booking.id).unwrap());
        assert!(!store.delete_booking(booking.id).unwrap());

        booking.payment_status = PaymentStatus::Paid;
        assert!(store.update_booking(&booking, now).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_user_is_typed() {
        let store = setup_store();
        store.insert_user(&user(1, "ada@example.com")).unwrap();

        let err = store.insert_user(&user(1, "other@example.com")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));

        let err = store.insert_user(&user(2, "ada@example.com")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));
    }

    #[test]
    fn test_product_with_unknown_owner_is_foreign_key_violation() {
        let store = setup_store();
        let product = Product {
            id: 1,
            title: "Corolla".to_string(),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2019,
            price_per_day: 45.0,
            owner_id: 999,
            is_active: true,
        };

        let err = store.insert_product(&product).unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }

    #[test]
    fn test_check_constraint_is_typed() {
        let store = setup_store();
        let mut booking = contact_booking("A");
        booking.end_date = booking.start_date;

        let err = store
            .insert_booking(&booking, dt("2030-01-01 08:00:00"))
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }
}
