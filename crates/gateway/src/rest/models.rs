//! JSON shapes returned by the REST API

use reservo_booking::{DayAvailability, Slot};
use reservo_database::formats::{format_date, format_datetime};
use reservo_database::{Appointment, Notification, ScheduleEntry, Service, Shop, User};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// `customer`, `shop_owner` or `admin`
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.public_id,
            email: user.email,
            display_name: user.display_name,
            phone: user.phone,
            role: user.role.as_str().to_string(),
            is_active: user.is_active,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub slot_interval_minutes: i64,
    pub capacity: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Shop> for ShopResponse {
    fn from(shop: Shop) -> Self {
        Self {
            id: shop.public_id,
            owner_id: shop.owner_public_id,
            name: shop.name,
            description: shop.description,
            address: shop.address,
            phone: shop.phone,
            slot_interval_minutes: shop.slot_interval_minutes,
            capacity: shop.capacity,
            is_active: shop.is_active,
            created_at: shop.created_at,
            updated_at: shop.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopsResponse {
    pub shops: Vec<ShopResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceResponse {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub price_cents: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ServiceResponse {
    /// Services only carry the internal shop id, so the caller supplies the public one.
    pub fn new(service: Service, shop_id: &str) -> Self {
        Self {
            id: service.public_id,
            shop_id: shop_id.to_string(),
            name: service.name,
            description: service.description,
            duration_minutes: service.duration_minutes,
            price_cents: service.price_cents,
            is_active: service.is_active,
            created_at: service.created_at,
            updated_at: service.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServicesResponse {
    pub services: Vec<ServiceResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleDayResponse {
    /// 0 = Monday … 6 = Sunday
    pub day_of_week: i64,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub is_closed: bool,
}

impl From<ScheduleEntry> for ScheduleDayResponse {
    fn from(entry: ScheduleEntry) -> Self {
        Self {
            day_of_week: entry.day_of_week,
            open_time: entry.open_time,
            close_time: entry.close_time,
            is_closed: entry.is_closed,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub shop_id: String,
    pub days: Vec<ScheduleDayResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SlotResponse {
    pub start_at: String,
    pub end_at: String,
    pub available: bool,
    pub remaining: u32,
}

impl From<Slot> for SlotResponse {
    fn from(slot: Slot) -> Self {
        Self {
            start_at: format_datetime(slot.start),
            end_at: format_datetime(slot.end),
            available: slot.available,
            remaining: slot.remaining,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub shop_id: String,
    pub service_id: String,
    pub date: String,
    pub duration_minutes: i64,
    pub slots: Vec<SlotResponse>,
}

impl From<DayAvailability> for AvailabilityResponse {
    fn from(day: DayAvailability) -> Self {
        Self {
            shop_id: day.shop_id,
            service_id: day.service_id,
            date: format_date(day.date),
            duration_minutes: day.duration_minutes,
            slots: day.slots.into_iter().map(SlotResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentResponse {
    pub id: String,
    pub shop_id: String,
    pub shop_name: String,
    pub service_id: String,
    pub service_name: String,
    pub customer_id: String,
    pub customer_name: String,
    /// Shop-local `YYYY-MM-DDTHH:MM:SS`
    pub start_at: String,
    pub end_at: String,
    pub status: String,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Appointment> for AppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.public_id,
            shop_id: appointment.shop_public_id,
            shop_name: appointment.shop_name,
            service_id: appointment.service_public_id,
            service_name: appointment.service_name,
            customer_id: appointment.customer_public_id,
            customer_name: appointment.customer_name,
            start_at: format_datetime(appointment.start_at),
            end_at: format_datetime(appointment.end_at),
            status: appointment.status.as_str().to_string(),
            notes: appointment.notes,
            cancellation_reason: appointment.cancellation_reason,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentsResponse {
    pub appointments: Vec<AppointmentResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub appointment_id: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.public_id,
            notification_type: notification.notification_type.as_str().to_string(),
            title: notification.title,
            message: notification.message,
            appointment_id: notification.appointment_public_id,
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: i64,
}
