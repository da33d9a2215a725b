//! Weekly schedule repository.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::entities::{ScheduleDay, ScheduleEntry};
use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: SqlitePool,
}

impl ScheduleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All stored weekdays of a shop, Monday first
    pub async fn list_for_shop(&self, shop_id: i64) -> DatabaseResult<Vec<ScheduleEntry>> {
        let rows = sqlx::query(
            "SELECT id, shop_id, day_of_week, open_time, close_time, is_closed
             FROM schedules WHERE shop_id = ? ORDER BY day_of_week",
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_entry).collect()
    }

    pub async fn find_for_day(
        &self,
        shop_id: i64,
        day_of_week: i64,
    ) -> DatabaseResult<Option<ScheduleEntry>> {
        let row = sqlx::query(
            "SELECT id, shop_id, day_of_week, open_time, close_time, is_closed
             FROM schedules WHERE shop_id = ? AND day_of_week = ?",
        )
        .bind(shop_id)
        .bind(day_of_week)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_entry).transpose()
    }

    /// Replace the whole week in one transaction. Days missing from `days`
    /// end up without a row, which means closed.
    pub async fn replace_week(
        &self,
        shop_id: i64,
        days: &[ScheduleDay],
    ) -> DatabaseResult<Vec<ScheduleEntry>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM schedules WHERE shop_id = ?")
            .bind(shop_id)
            .execute(&mut *tx)
            .await?;

        for day in days {
            sqlx::query(
                "INSERT INTO schedules (shop_id, day_of_week, open_time, close_time, is_closed)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(shop_id)
            .bind(day.day_of_week)
            .bind(&day.open_time)
            .bind(&day.close_time)
            .bind(day.is_closed)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.list_for_shop(shop_id).await
    }
}

fn map_entry(row: &SqliteRow) -> DatabaseResult<ScheduleEntry> {
    Ok(ScheduleEntry {
        id: row.try_get("id")?,
        shop_id: row.try_get("shop_id")?,
        day_of_week: row.try_get("day_of_week")?,
        open_time: row.try_get("open_time")?,
        close_time: row.try_get("close_time")?,
        is_closed: row.try_get("is_closed")?,
    })
}
