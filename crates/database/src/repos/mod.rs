//! Database repository implementations

use cuid2::CuidConstructor;
use once_cell::sync::Lazy;

pub mod appointment_repository;
pub mod notification_repository;
pub mod schedule_repository;
pub mod service_repository;
pub mod shop_repository;
pub mod user_repository;

pub use appointment_repository::AppointmentRepository;
pub use notification_repository::NotificationRepository;
pub use schedule_repository::ScheduleRepository;
pub use service_repository::ServiceRepository;
pub use shop_repository::ShopRepository;
pub use user_repository::UserRepository;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

/// Opaque identifier exposed through the API in place of row ids.
pub(crate) fn new_public_id() -> String {
    CUID.create_id()
}
