//! In-app notifications.

use reservo_database::{
    CreateNotificationRequest, DatabaseError, Notification, NotificationRepository,
    NotificationType, User,
};
use sqlx::SqlitePool;
use tracing::warn;

use crate::types::{BookingError, BookingResult};

#[derive(Clone)]
pub struct NotificationService {
    notifications: NotificationRepository,
}

impl NotificationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            notifications: NotificationRepository::new(pool),
        }
    }

    /// Store a notification. Failures are logged and swallowed so that a
    /// committed booking change is never reported as failed.
    pub async fn notify(
        &self,
        user_id: i64,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        appointment_id: Option<i64>,
    ) {
        let request = CreateNotificationRequest {
            user_id,
            notification_type,
            title: title.into(),
            message: message.into(),
            appointment_id,
        };

        if let Err(err) = self.notifications.create(&request).await {
            warn!(user_id, kind = %notification_type, error = %err, "failed to store notification");
        }
    }

    pub async fn list(&self, actor: &User, unread_only: bool) -> BookingResult<Vec<Notification>> {
        Ok(self.notifications.list_for_user(actor.id, unread_only).await?)
    }

    pub async fn unread_count(&self, actor: &User) -> BookingResult<i64> {
        Ok(self.notifications.count_unread(actor.id).await?)
    }

    pub async fn mark_read(&self, actor: &User, notification_id: &str) -> BookingResult<Notification> {
        self.notifications
            .mark_read(actor.id, notification_id)
            .await
            .map_err(|err| match err {
                DatabaseError::NotFound(_) => {
                    BookingError::not_found(format!("notification {notification_id}"))
                }
                other => other.into(),
            })
    }

    pub async fn mark_all_read(&self, actor: &User) -> BookingResult<u64> {
        Ok(self.notifications.mark_all_read(actor.id).await?)
    }
}
