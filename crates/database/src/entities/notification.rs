//! Notification entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub public_id: String,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub appointment_id: Option<i64>,
    pub appointment_public_id: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub appointment_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    AppointmentRequested,
    AppointmentConfirmed,
    AppointmentRescheduled,
    AppointmentCancelled,
    AppointmentCompleted,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::AppointmentRequested => "appointment_requested",
            NotificationType::AppointmentConfirmed => "appointment_confirmed",
            NotificationType::AppointmentRescheduled => "appointment_rescheduled",
            NotificationType::AppointmentCancelled => "appointment_cancelled",
            NotificationType::AppointmentCompleted => "appointment_completed",
            NotificationType::System => "system",
        }
    }
}

impl From<&str> for NotificationType {
    fn from(s: &str) -> Self {
        match s {
            "appointment_requested" => NotificationType::AppointmentRequested,
            "appointment_confirmed" => NotificationType::AppointmentConfirmed,
            "appointment_rescheduled" => NotificationType::AppointmentRescheduled,
            "appointment_cancelled" => NotificationType::AppointmentCancelled,
            "appointment_completed" => NotificationType::AppointmentCompleted,
            _ => NotificationType::System,
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
