//! Free slots of a shop for one service and day.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use reservo_config::BookingConfig;
use reservo_database::{AppointmentRepository, Service, Shop};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use super::{CatalogService, ScheduleService, ShopService};
use crate::clock::Clock;
use crate::slots::{generate_slots, Interval, Slot, SlotQuery};
use crate::types::{BookingError, BookingResult};

#[derive(Debug, Clone, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub shop_id: String,
    pub service_id: String,
    pub duration_minutes: i64,
    pub slots: Vec<Slot>,
}

#[derive(Clone)]
pub struct AvailabilityService {
    shops: ShopService,
    catalog: CatalogService,
    schedules: ScheduleService,
    appointments: AppointmentRepository,
    config: BookingConfig,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(pool: SqlitePool, config: &BookingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            shops: ShopService::new(pool.clone(), config),
            catalog: CatalogService::new(pool.clone()),
            schedules: ScheduleService::new(pool.clone()),
            appointments: AppointmentRepository::new(pool),
            config: config.clone(),
            clock,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub async fn slots_for(
        &self,
        shop_id: &str,
        service_id: &str,
        date: NaiveDate,
    ) -> BookingResult<DayAvailability> {
        let shop = self.shops.get(shop_id).await?;
        let service = self.catalog.get(&shop, service_id).await?;
        let slots = self.compute(&shop, &service, date, None).await?;

        Ok(DayAvailability {
            date,
            shop_id: shop.public_id,
            service_id: service.public_id,
            duration_minutes: service.duration_minutes,
            slots,
        })
    }

    /// Slots of `service` at `shop` on `date`. `ignore` leaves one
    /// appointment out of the occupancy, used when moving it.
    pub(crate) async fn compute(
        &self,
        shop: &Shop,
        service: &Service,
        date: NaiveDate,
        ignore: Option<i64>,
    ) -> BookingResult<Vec<Slot>> {
        self.ensure_bookable_date(date)?;

        let window = self.schedules.window_for(shop, date).await?;
        let bookings: Vec<Interval> = self
            .appointments
            .list_blocking_for_day(shop.id, date, ignore)
            .await?
            .into_iter()
            .map(|appointment| Interval::new(appointment.start_at, appointment.end_at))
            .collect();

        let query = SlotQuery {
            date,
            window,
            duration_minutes: u32::try_from(service.duration_minutes)
                .map_err(|_| BookingError::validation("invalid service duration"))?,
            granularity_minutes: u32::try_from(shop.slot_interval_minutes)
                .map_err(|_| BookingError::validation("invalid slot interval"))?,
            capacity: u32::try_from(shop.capacity).unwrap_or(1),
            not_before: Some(
                self.clock.now() + Duration::minutes(i64::from(self.config.min_notice_minutes)),
            ),
        };

        let slots = generate_slots(&query, &bookings);
        debug!(
            shop = %shop.public_id,
            service = %service.public_id,
            %date,
            booked = bookings.len(),
            slots = slots.len(),
            "computed availability"
        );
        Ok(slots)
    }

    fn ensure_bookable_date(&self, date: NaiveDate) -> BookingResult<()> {
        let today = self.clock.now().date();
        if date < today {
            return Err(BookingError::validation("date is in the past"));
        }
        let horizon = today + Duration::days(i64::from(self.config.max_advance_days));
        if date > horizon {
            return Err(BookingError::validation(format!(
                "bookings open at most {} days in advance",
                self.config.max_advance_days
            )));
        }
        Ok(())
    }
}
