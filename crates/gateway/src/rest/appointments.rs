//! Appointment REST endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use reservo_booking::NewAppointment;
use reservo_database::formats::{parse_date, parse_datetime};
use reservo_database::AppointmentStatus;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::models::{AppointmentResponse, AppointmentsResponse};
use crate::error::{ErrorResponse, GatewayError, GatewayResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::AuthUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookAppointmentRequest {
    pub shop_id: String,
    pub service_id: String,
    /// Shop-local `YYYY-MM-DDTHH:MM[:SS]`; must be a slot start
    pub start_at: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RescheduleRequest {
    pub start_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ShopAppointmentsQuery {
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// `pending`, `confirmed`, `rescheduled`, `cancelled` or `completed`
    pub status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Appointments booked by the caller", body = AppointmentsResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn list_my_appointments(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> GatewayResult<Json<AppointmentsResponse>> {
    let appointments = state.booking().appointments.list_for_customer(&user).await?;
    Ok(Json(AppointmentsResponse {
        appointments: appointments.into_iter().map(AppointmentResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/appointments",
    tag = "Appointments",
    security(("bearerAuth" = [])),
    params(
        ("shop_id" = String, Path, description = "Shop public identifier"),
        ShopAppointmentsQuery
    ),
    responses(
        (status = 200, description = "Appointments of the shop", body = AppointmentsResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 403, description = "Caller does not manage the shop", body = ErrorResponse)
    )
)]
pub async fn list_shop_appointments(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(shop_id): Path<String>,
    ApiQuery(query): ApiQuery<ShopAppointmentsQuery>,
) -> GatewayResult<Json<AppointmentsResponse>> {
    let date = query.date.as_deref().map(parse_date).transpose()?;
    let status = query
        .status
        .as_deref()
        .map(|value| value.parse::<AppointmentStatus>())
        .transpose()
        .map_err(GatewayError::BadRequest)?;

    let appointments = state
        .booking()
        .appointments
        .list_for_shop(&user, &shop_id, date, status)
        .await?;
    Ok(Json(AppointmentsResponse {
        appointments: appointments.into_iter().map(AppointmentResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    security(("bearerAuth" = [])),
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment requested", body = AppointmentResponse),
        (status = 400, description = "Not a bookable start time", body = ErrorResponse),
        (status = 404, description = "Shop or service not found", body = ErrorResponse),
        (status = 409, description = "Slot already booked", body = ErrorResponse)
    )
)]
pub async fn book_appointment(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    ApiJson(payload): ApiJson<BookAppointmentRequest>,
) -> GatewayResult<(StatusCode, Json<AppointmentResponse>)> {
    let start_at = parse_datetime(&payload.start_at)?;
    let appointment = state
        .booking()
        .appointments
        .book(
            &user,
            NewAppointment {
                shop_id: payload.shop_id,
                service_id: payload.service_id,
                start_at,
                notes: payload.notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(appointment.into())))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{appointment_id}",
    tag = "Appointments",
    security(("bearerAuth" = [])),
    params(("appointment_id" = String, Path, description = "Appointment public identifier")),
    responses(
        (status = 200, description = "Appointment details", body = AppointmentResponse),
        (status = 403, description = "Caller is not a participant", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse)
    )
)]
pub async fn get_appointment(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(appointment_id): Path<String>,
) -> GatewayResult<Json<AppointmentResponse>> {
    let appointment = state
        .booking()
        .appointments
        .get(&user, &appointment_id)
        .await?;
    Ok(Json(appointment.into()))
}

#[utoipa::path(
    post,
    path = "/api/appointments/{appointment_id}/confirm",
    tag = "Appointments",
    security(("bearerAuth" = [])),
    params(("appointment_id" = String, Path, description = "Appointment public identifier")),
    responses(
        (status = 200, description = "Appointment confirmed", body = AppointmentResponse),
        (status = 403, description = "Only the shop side may confirm", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse)
    )
)]
pub async fn confirm_appointment(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(appointment_id): Path<String>,
) -> GatewayResult<Json<AppointmentResponse>> {
    let appointment = state
        .booking()
        .appointments
        .confirm(&user, &appointment_id)
        .await?;
    Ok(Json(appointment.into()))
}

#[utoipa::path(
    post,
    path = "/api/appointments/{appointment_id}/complete",
    tag = "Appointments",
    security(("bearerAuth" = [])),
    params(("appointment_id" = String, Path, description = "Appointment public identifier")),
    responses(
        (status = 200, description = "Appointment completed", body = AppointmentResponse),
        (status = 403, description = "Only the shop side may complete", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse)
    )
)]
pub async fn complete_appointment(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(appointment_id): Path<String>,
) -> GatewayResult<Json<AppointmentResponse>> {
    let appointment = state
        .booking()
        .appointments
        .complete(&user, &appointment_id)
        .await?;
    Ok(Json(appointment.into()))
}

#[utoipa::path(
    post,
    path = "/api/appointments/{appointment_id}/cancel",
    tag = "Appointments",
    security(("bearerAuth" = [])),
    params(("appointment_id" = String, Path, description = "Appointment public identifier")),
    request_body(content = CancelRequest, description = "Optional cancellation reason"),
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentResponse),
        (status = 403, description = "Caller is not a participant", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse)
    )
)]
pub async fn cancel_appointment(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(appointment_id): Path<String>,
    payload: Option<ApiJson<CancelRequest>>,
) -> GatewayResult<Json<AppointmentResponse>> {
    let reason = payload.and_then(|ApiJson(body)| body.reason);
    let appointment = state
        .booking()
        .appointments
        .cancel(&user, &appointment_id, reason)
        .await?;
    Ok(Json(appointment.into()))
}

#[utoipa::path(
    post,
    path = "/api/appointments/{appointment_id}/reschedule",
    tag = "Appointments",
    security(("bearerAuth" = [])),
    params(("appointment_id" = String, Path, description = "Appointment public identifier")),
    request_body = RescheduleRequest,
    responses(
        (status = 200, description = "Appointment moved, awaiting confirmation", body = AppointmentResponse),
        (status = 400, description = "Not a bookable start time", body = ErrorResponse),
        (status = 403, description = "Caller is not a participant", body = ErrorResponse),
        (status = 409, description = "Slot taken or transition not allowed", body = ErrorResponse)
    )
)]
pub async fn reschedule_appointment(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(appointment_id): Path<String>,
    ApiJson(payload): ApiJson<RescheduleRequest>,
) -> GatewayResult<Json<AppointmentResponse>> {
    let start_at = parse_datetime(&payload.start_at)?;
    let appointment = state
        .booking()
        .appointments
        .reschedule(&user, &appointment_id, start_at)
        .await?;
    Ok(Json(appointment.into()))
}
