//! Notification repository for database operations.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::new_public_id;
use crate::entities::{CreateNotificationRequest, Notification, NotificationType};
use crate::formats::now_rfc3339;
use crate::types::{DatabaseError, DatabaseResult};

const NOTIFICATION_SELECT: &str = "SELECT n.id, n.public_id, n.user_id, n.notification_type, n.title, n.message,
        n.appointment_id, a.public_id AS appointment_public_id, n.is_read, n.created_at
     FROM notifications n
     LEFT JOIN appointments a ON a.id = n.appointment_id";

/// Repository for notification database operations
#[derive(Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Create a new notification repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new notification
    pub async fn create(&self, request: &CreateNotificationRequest) -> DatabaseResult<Notification> {
        let result = sqlx::query(
            "INSERT INTO notifications (public_id, user_id, notification_type, title, message, appointment_id, is_read, created_at)
             VALUES (?, ?, ?, ?, ?, ?, false, ?)",
        )
        .bind(new_public_id())
        .bind(request.user_id)
        .bind(request.notification_type.as_str())
        .bind(&request.title)
        .bind(&request.message)
        .bind(request.appointment_id)
        .bind(now_rfc3339())
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| {
                DatabaseError::InternalError("failed to retrieve created notification".into())
            })
    }

    /// Find notification by ID
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Notification>> {
        let row = sqlx::query(&format!("{NOTIFICATION_SELECT} WHERE n.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_notification).transpose()
    }

    /// Notifications of a user, newest first
    pub async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
    ) -> DatabaseResult<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "{NOTIFICATION_SELECT}
             WHERE n.user_id = ? AND (? = false OR n.is_read = false)
             ORDER BY n.created_at DESC, n.id DESC"
        ))
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_notification).collect()
    }

    pub async fn count_unread(&self, user_id: i64) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Mark one notification read. Notifications of other users are reported
    /// as not found.
    pub async fn mark_read(&self, user_id: i64, public_id: &str) -> DatabaseResult<Notification> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE public_id = ? AND user_id = ?",
        )
        .bind(public_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("notification {public_id}")));
        }

        let row = sqlx::query(&format!("{NOTIFICATION_SELECT} WHERE n.public_id = ?"))
            .bind(public_id)
            .fetch_one(&self.pool)
            .await?;
        map_notification(&row)
    }

    /// Mark every unread notification of a user read, returning how many changed
    pub async fn mark_all_read(&self, user_id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE user_id = ? AND is_read = false",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

fn map_notification(row: &SqliteRow) -> DatabaseResult<Notification> {
    let notification_type: String = row.try_get("notification_type")?;
    Ok(Notification {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        user_id: row.try_get("user_id")?,
        notification_type: NotificationType::from(notification_type.as_str()),
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        appointment_id: row.try_get("appointment_id")?,
        appointment_public_id: row.try_get("appointment_public_id")?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}
