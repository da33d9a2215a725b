//! Weekly operating hours

use serde::{Deserialize, Serialize};

/// Stored schedule row for one weekday of a shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: i64,
    pub shop_id: i64,
    /// 0 = Monday … 6 = Sunday
    pub day_of_week: i64,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub is_closed: bool,
}

/// One weekday of a replacement schedule. Times are `HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub day_of_week: i64,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub is_closed: bool,
}
