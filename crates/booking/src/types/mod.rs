//! Error and request types for the booking domain.

pub mod errors;
pub mod requests;

pub use errors::{BookingError, BookingResult};
pub use requests::{NewAppointment, NewService, NewShop, ServiceChanges, ShopChanges};
