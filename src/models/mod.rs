pub mod booking;
pub mod pagination;
pub mod product;
pub mod user;

pub use booking::{
    Booking, BookingChanges, BookingDetails, BookingResponse, BookingStatus, BookingVariant,
    Driver, NewBooking, PaymentStatus, DATETIME_FORMAT,
};
pub use pagination::{PageMeta, PageParams};
pub use product::Product;
pub use user::User;
