//! Inputs accepted by the booking services.

use chrono::NaiveDateTime;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewShop {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub slot_interval_minutes: Option<i64>,
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub slot_interval_minutes: Option<i64>,
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub price_cents: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub price_cents: Option<i64>,
}

/// A booking request; ids are public ids.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub shop_id: String,
    pub service_id: String,
    pub start_at: NaiveDateTime,
    pub notes: Option<String>,
}
