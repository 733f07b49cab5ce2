pub mod phone;
pub mod reservation;
