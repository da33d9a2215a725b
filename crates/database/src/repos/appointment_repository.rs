//! Appointment repository.
//!
//! Inserts and reschedules re-check shop capacity inside a write transaction,
//! so two requests racing for the last free seat cannot both succeed.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use super::new_public_id;
use crate::entities::{Appointment, AppointmentStatus, CreateAppointmentRequest};
use crate::formats::{format_datetime, now_rfc3339, parse_datetime};
use crate::overlap::{peak_concurrency, Interval};
use crate::types::{DatabaseError, DatabaseResult};

const APPOINTMENT_SELECT: &str = "SELECT a.id, a.public_id, a.shop_id, s.public_id AS shop_public_id,
        s.name AS shop_name, s.owner_id AS shop_owner_id, a.service_id,
        sv.public_id AS service_public_id, sv.name AS service_name, a.customer_id,
        u.public_id AS customer_public_id, u.display_name AS customer_name,
        a.start_at, a.end_at, a.status, a.notes, a.cancellation_reason, a.created_at, a.updated_at
     FROM appointments a
     JOIN shops s ON s.id = a.shop_id
     JOIN services sv ON sv.id = a.service_id
     JOIN users u ON u.id = a.customer_id";

const BLOCKING_FILTER: &str = "status IN ('pending', 'confirmed', 'rescheduled')";

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: SqlitePool,
}

impl AppointmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Appointment>> {
        let row = sqlx::query(&format!("{APPOINTMENT_SELECT} WHERE a.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_appointment).transpose()
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<Appointment>> {
        let row = sqlx::query(&format!("{APPOINTMENT_SELECT} WHERE a.public_id = ?"))
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_appointment).transpose()
    }

    /// Insert a pending appointment unless the shop is already at capacity
    /// somewhere inside `[start_at, end_at)`.
    pub async fn insert_if_free(
        &self,
        request: &CreateAppointmentRequest,
    ) -> DatabaseResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        // Writing first takes the database write lock before anything is read.
        let locked = sqlx::query("UPDATE shops SET updated_at = updated_at WHERE id = ?")
            .bind(request.shop_id)
            .execute(&mut *tx)
            .await?;
        if locked.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("shop {}", request.shop_id)));
        }

        ensure_capacity(
            &mut tx,
            request.shop_id,
            request.start_at,
            request.end_at,
            None,
        )
        .await?;

        let now = now_rfc3339();
        let result = sqlx::query(
            "INSERT INTO appointments (public_id, shop_id, service_id, customer_id, start_at, end_at, status, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?)",
        )
        .bind(new_public_id())
        .bind(request.shop_id)
        .bind(request.service_id)
        .bind(request.customer_id)
        .bind(format_datetime(request.start_at))
        .bind(format_datetime(request.end_at))
        .bind(&request.notes)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let id = result.last_insert_rowid();
        debug!(appointment_id = id, shop_id = request.shop_id, "appointment inserted");
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::InternalError("failed to retrieve created appointment".into()))
    }

    /// Move an appointment to a new interval and mark it `rescheduled`.
    ///
    /// The appointment itself is ignored by the capacity check. Fails with
    /// `Conflict` when the status changed since it was read as `expected`.
    pub async fn reschedule_if_free(
        &self,
        id: i64,
        expected: AppointmentStatus,
        start_at: NaiveDateTime,
        end_at: NaiveDateTime,
    ) -> DatabaseResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("UPDATE appointments SET updated_at = updated_at WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if locked.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("appointment {id}")));
        }

        let row = sqlx::query("SELECT shop_id, status FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let shop_id: i64 = row.try_get("shop_id")?;
        let status: String = row.try_get("status")?;
        if status != expected.as_str() {
            return Err(DatabaseError::Conflict(format!(
                "appointment status changed to {status}"
            )));
        }

        ensure_capacity(&mut tx, shop_id, start_at, end_at, Some(id)).await?;

        sqlx::query(
            "UPDATE appointments SET start_at = ?, end_at = ?, status = 'rescheduled', updated_at = ?
             WHERE id = ?",
        )
        .bind(format_datetime(start_at))
        .bind(format_datetime(end_at))
        .bind(now_rfc3339())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("appointment {id}")))
    }

    /// Compare-and-set status change. `reason` is stored as the cancellation
    /// reason when present.
    pub async fn update_status(
        &self,
        id: i64,
        from: AppointmentStatus,
        to: AppointmentStatus,
        reason: Option<&str>,
    ) -> DatabaseResult<Appointment> {
        let result = sqlx::query(
            "UPDATE appointments
             SET status = ?, cancellation_reason = COALESCE(?, cancellation_reason), updated_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(to.as_str())
        .bind(reason)
        .bind(now_rfc3339())
        .bind(id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(id).await? {
                Some(current) => Err(DatabaseError::Conflict(format!(
                    "appointment status changed to {}",
                    current.status
                ))),
                None => Err(DatabaseError::NotFound(format!("appointment {id}"))),
            };
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("appointment {id}")))
    }

    /// Blocking appointments of a shop that overlap the given calendar day
    pub async fn list_blocking_for_day(
        &self,
        shop_id: i64,
        date: NaiveDate,
        exclude_id: Option<i64>,
    ) -> DatabaseResult<Vec<Appointment>> {
        let (day_start, day_end) = day_bounds(date)?;
        let rows = sqlx::query(&format!(
            "{APPOINTMENT_SELECT}
             WHERE a.shop_id = ? AND a.{BLOCKING_FILTER}
               AND a.start_at < ? AND a.end_at > ?
               AND (? IS NULL OR a.id != ?)
             ORDER BY a.start_at"
        ))
        .bind(shop_id)
        .bind(&day_end)
        .bind(&day_start)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_appointment).collect()
    }

    pub async fn list_for_customer(&self, customer_id: i64) -> DatabaseResult<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            "{APPOINTMENT_SELECT} WHERE a.customer_id = ? ORDER BY a.start_at"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_appointment).collect()
    }

    /// A shop's appointments, optionally narrowed to one day and one status
    pub async fn list_for_shop(
        &self,
        shop_id: i64,
        date: Option<NaiveDate>,
        status: Option<AppointmentStatus>,
    ) -> DatabaseResult<Vec<Appointment>> {
        let bounds = date.map(day_bounds).transpose()?;
        let rows = sqlx::query(&format!(
            "{APPOINTMENT_SELECT}
             WHERE a.shop_id = ?
               AND (? IS NULL OR (a.start_at >= ? AND a.start_at < ?))
               AND (? IS NULL OR a.status = ?)
             ORDER BY a.start_at"
        ))
        .bind(shop_id)
        .bind(bounds.as_ref().map(|(start, _)| start.as_str()))
        .bind(bounds.as_ref().map(|(start, _)| start.as_str()))
        .bind(bounds.as_ref().map(|(_, end)| end.as_str()))
        .bind(status.map(|s| s.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_appointment).collect()
    }
}

/// Refuse the write when adding `[start_at, end_at)` would push the shop's
/// concurrent blocking appointments past its capacity.
async fn ensure_capacity(
    tx: &mut Transaction<'_, Sqlite>,
    shop_id: i64,
    start_at: NaiveDateTime,
    end_at: NaiveDateTime,
    exclude_id: Option<i64>,
) -> DatabaseResult<()> {
    let capacity: i64 = sqlx::query_scalar("SELECT capacity FROM shops WHERE id = ?")
        .bind(shop_id)
        .fetch_one(&mut **tx)
        .await?;

    let rows = sqlx::query(&format!(
        "SELECT start_at, end_at FROM appointments
         WHERE shop_id = ? AND {BLOCKING_FILTER}
           AND start_at < ? AND end_at > ?
           AND (? IS NULL OR id != ?)"
    ))
    .bind(shop_id)
    .bind(format_datetime(end_at))
    .bind(format_datetime(start_at))
    .bind(exclude_id)
    .bind(exclude_id)
    .fetch_all(&mut **tx)
    .await?;

    let mut intervals = Vec::with_capacity(rows.len());
    for row in &rows {
        let start: String = row.try_get("start_at")?;
        let end: String = row.try_get("end_at")?;
        intervals.push(Interval::new(parse_datetime(&start)?, parse_datetime(&end)?));
    }

    let peak = peak_concurrency(&intervals, start_at, end_at);
    if i64::from(peak) >= capacity {
        return Err(DatabaseError::Conflict(format!(
            "time {} - {} is already booked",
            format_datetime(start_at),
            format_datetime(end_at)
        )));
    }
    Ok(())
}

/// `[midnight, next midnight)` of `date` as stored strings
fn day_bounds(date: NaiveDate) -> DatabaseResult<(String, String)> {
    let next = date
        .succ_opt()
        .ok_or_else(|| DatabaseError::ValidationError(format!("date {date} is out of range")))?;
    Ok((
        format_datetime(date.and_time(NaiveTime::MIN)),
        format_datetime(next.and_time(NaiveTime::MIN)),
    ))
}

fn map_appointment(row: &SqliteRow) -> DatabaseResult<Appointment> {
    let start_at: String = row.try_get("start_at")?;
    let end_at: String = row.try_get("end_at")?;
    let status: String = row.try_get("status")?;

    Ok(Appointment {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        shop_id: row.try_get("shop_id")?,
        shop_public_id: row.try_get("shop_public_id")?,
        shop_name: row.try_get("shop_name")?,
        shop_owner_id: row.try_get("shop_owner_id")?,
        service_id: row.try_get("service_id")?,
        service_public_id: row.try_get("service_public_id")?,
        service_name: row.try_get("service_name")?,
        customer_id: row.try_get("customer_id")?,
        customer_public_id: row.try_get("customer_public_id")?,
        customer_name: row.try_get("customer_name")?,
        start_at: parse_datetime(&start_at)?,
        end_at: parse_datetime(&end_at)?,
        status: status.parse().map_err(DatabaseError::InternalError)?,
        notes: row.try_get("notes")?,
        cancellation_reason: row.try_get("cancellation_reason")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
