use serde::{Deserialize, Serialize};

/// A rentable vehicle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price_per_day: f64,
    pub owner_id: i64,
    pub is_active: bool,
}
