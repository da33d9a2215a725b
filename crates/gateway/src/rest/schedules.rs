//! Weekly schedule REST endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use reservo_database::ScheduleDay;
use serde::Deserialize;
use utoipa::ToSchema;

use super::models::{ScheduleDayResponse, ScheduleResponse};
use crate::error::{ErrorResponse, GatewayResult};
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleDayRequest {
    /// 0 = Monday … 6 = Sunday
    pub day_of_week: i64,
    /// `HH:MM`, required unless closed
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    #[serde(default)]
    pub is_closed: bool,
}

/// The full week; weekdays left out are closed
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceScheduleRequest {
    pub days: Vec<ScheduleDayRequest>,
}

#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/schedule",
    tag = "Schedules",
    params(("shop_id" = String, Path, description = "Shop public identifier")),
    responses(
        (status = 200, description = "Weekly operating hours", body = ScheduleResponse),
        (status = 404, description = "Shop not found", body = ErrorResponse)
    )
)]
pub async fn get_schedule(
    State(state): State<Arc<GatewayState>>,
    Path(shop_id): Path<String>,
) -> GatewayResult<Json<ScheduleResponse>> {
    let week = state.booking().schedules.get_week(&shop_id).await?;
    Ok(Json(ScheduleResponse {
        shop_id,
        days: week.into_iter().map(ScheduleDayResponse::from).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/shops/{shop_id}/schedule",
    tag = "Schedules",
    security(("bearerAuth" = [])),
    params(("shop_id" = String, Path, description = "Shop public identifier")),
    request_body = ReplaceScheduleRequest,
    responses(
        (status = 200, description = "Schedule replaced", body = ScheduleResponse),
        (status = 400, description = "Invalid schedule", body = ErrorResponse),
        (status = 403, description = "Caller does not manage the shop", body = ErrorResponse),
        (status = 404, description = "Shop not found", body = ErrorResponse)
    )
)]
pub async fn replace_schedule(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(shop_id): Path<String>,
    ApiJson(payload): ApiJson<ReplaceScheduleRequest>,
) -> GatewayResult<Json<ScheduleResponse>> {
    let days = payload
        .days
        .into_iter()
        .map(|day| ScheduleDay {
            day_of_week: day.day_of_week,
            open_time: day.open_time,
            close_time: day.close_time,
            is_closed: day.is_closed,
        })
        .collect();

    let week = state
        .booking()
        .schedules
        .replace_week(&user, &shop_id, days)
        .await?;
    Ok(Json(ScheduleResponse {
        shop_id,
        days: week.into_iter().map(ScheduleDayResponse::from).collect(),
    }))
}
