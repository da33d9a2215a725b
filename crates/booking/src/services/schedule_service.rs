//! Weekly operating hours.

use chrono::{Datelike, NaiveDate};
use reservo_database::{ScheduleDay, ScheduleEntry, ScheduleRepository, Shop, ShopRepository, User};
use sqlx::SqlitePool;
use tracing::info;

use crate::slots::DayWindow;
use crate::types::{BookingError, BookingResult};
use crate::utils::validation::{normalize_week, parse_window};
use crate::utils::PermissionChecker;

#[derive(Clone)]
pub struct ScheduleService {
    shops: ShopRepository,
    schedules: ScheduleRepository,
}

impl ScheduleService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            shops: ShopRepository::new(pool.clone()),
            schedules: ScheduleRepository::new(pool),
        }
    }

    /// Stored weekdays of an active shop; missing days are closed
    pub async fn get_week(&self, shop_id: &str) -> BookingResult<Vec<ScheduleEntry>> {
        let shop = self
            .shops
            .find_by_public_id(shop_id)
            .await?
            .filter(|shop| shop.is_active)
            .ok_or_else(|| BookingError::not_found(format!("shop {shop_id}")))?;
        Ok(self.schedules.list_for_shop(shop.id).await?)
    }

    pub async fn replace_week(
        &self,
        actor: &User,
        shop_id: &str,
        days: Vec<ScheduleDay>,
    ) -> BookingResult<Vec<ScheduleEntry>> {
        let shop = self
            .shops
            .find_by_public_id(shop_id)
            .await?
            .ok_or_else(|| BookingError::not_found(format!("shop {shop_id}")))?;
        PermissionChecker::can_manage_shop(actor, &shop)?;

        let days = normalize_week(days)?;
        let week = self.schedules.replace_week(shop.id, &days).await?;
        info!(shop = %shop.public_id, open_days = week.iter().filter(|d| !d.is_closed).count(), "schedule replaced");
        Ok(week)
    }

    /// Opening hours of `shop` on `date`, or `None` when closed
    pub async fn window_for(&self, shop: &Shop, date: NaiveDate) -> BookingResult<Option<DayWindow>> {
        let day_of_week = i64::from(date.weekday().num_days_from_monday());
        let Some(entry) = self.schedules.find_for_day(shop.id, day_of_week).await? else {
            return Ok(None);
        };
        if entry.is_closed {
            return Ok(None);
        }
        parse_window(entry.open_time.as_deref(), entry.close_time.as_deref()).map(Some)
    }
}
