//! Domain entities for the database layer
//!
//! Row-shaped entity definitions used by the repository layer

pub mod appointment;
pub mod notification;
pub mod schedule;
pub mod service;
pub mod shop;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus, CreateAppointmentRequest};
pub use notification::{CreateNotificationRequest, Notification, NotificationType};
pub use schedule::{ScheduleDay, ScheduleEntry};
pub use service::{CreateServiceRequest, Service, UpdateServiceRequest};
pub use shop::{CreateShopRequest, Shop, UpdateShopRequest};
pub use user::{CreateUserRequest, UpdateUserRequest, User, UserRole};
