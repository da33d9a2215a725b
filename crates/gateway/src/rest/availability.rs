use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use reservo_database::formats::parse_date;
use serde::Deserialize;
use utoipa::IntoParams;

use super::models::AvailabilityResponse;
use crate::error::{ErrorResponse, GatewayResult};
use crate::extract::ApiQuery;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// Service public identifier
    pub service_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/availability",
    tag = "Availability",
    params(
        ("shop_id" = String, Path, description = "Shop public identifier"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Candidate slots of the day", body = AvailabilityResponse),
        (status = 400, description = "Invalid or out-of-range date", body = ErrorResponse),
        (status = 404, description = "Shop or service not found", body = ErrorResponse)
    )
)]
pub async fn get_availability(
    State(state): State<Arc<GatewayState>>,
    Path(shop_id): Path<String>,
    ApiQuery(query): ApiQuery<AvailabilityQuery>,
) -> GatewayResult<Json<AvailabilityResponse>> {
    let date = parse_date(&query.date)?;
    let day = state
        .booking()
        .availability
        .slots_for(&shop_id, &query.service_id, date)
        .await?;
    Ok(Json(day.into()))
}
