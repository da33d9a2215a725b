//! Domain services.

pub mod appointment_service;
pub mod availability_service;
pub mod catalog_service;
pub mod notification_service;
pub mod schedule_service;
pub mod shop_service;

pub use appointment_service::AppointmentService;
pub use availability_service::{AvailabilityService, DayAvailability};
pub use catalog_service::CatalogService;
pub use notification_service::NotificationService;
pub use schedule_service::ScheduleService;
pub use shop_service::ShopService;
