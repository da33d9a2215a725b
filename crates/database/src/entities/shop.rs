//! Shop (tenant) entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: i64,
    pub public_id: String,
    pub owner_id: i64,
    pub owner_public_id: String,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Granularity of candidate slot starts.
    pub slot_interval_minutes: i64,
    /// Number of appointments the shop can serve at the same instant.
    pub capacity: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShopRequest {
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub slot_interval_minutes: i64,
    pub capacity: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateShopRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub slot_interval_minutes: Option<i64>,
    pub capacity: Option<i64>,
}
