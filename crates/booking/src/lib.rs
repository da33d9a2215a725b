//! Shops, services, weekly schedules, slot availability and the appointment
//! workflow of Reservo.

use std::sync::Arc;

use reservo_config::BookingConfig;
use sqlx::SqlitePool;

pub mod clock;
pub mod lifecycle;
pub mod services;
pub mod slots;
pub mod types;
pub mod utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use services::{
    AppointmentService, AvailabilityService, CatalogService, DayAvailability,
    NotificationService, ScheduleService, ShopService,
};
pub use slots::{DayWindow, Interval, Slot, SlotQuery};
pub use types::{
    BookingError, BookingResult, NewAppointment, NewService, NewShop, ServiceChanges,
    ShopChanges,
};
pub use utils::PermissionChecker;

/// Every booking service over one pool and clock
#[derive(Clone)]
pub struct BookingServices {
    pub shops: ShopService,
    pub catalog: CatalogService,
    pub schedules: ScheduleService,
    pub availability: AvailabilityService,
    pub appointments: AppointmentService,
    pub notifications: NotificationService,
}

impl BookingServices {
    pub fn new(pool: SqlitePool, config: &BookingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            shops: ShopService::new(pool.clone(), config),
            catalog: CatalogService::new(pool.clone()),
            schedules: ScheduleService::new(pool.clone()),
            availability: AvailabilityService::new(pool.clone(), config, clock.clone()),
            appointments: AppointmentService::new(pool.clone(), config, clock),
            notifications: NotificationService::new(pool),
        }
    }

    pub fn with_system_clock(pool: SqlitePool, config: &BookingConfig) -> Self {
        Self::new(pool, config, Arc::new(SystemClock))
    }
}
