//! Service catalog REST endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use reservo_booking::{NewService, ServiceChanges};
use serde::Deserialize;
use utoipa::ToSchema;

use super::models::{ServiceResponse, ServicesResponse};
use crate::error::{ErrorResponse, GatewayResult};
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub price_cents: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub price_cents: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/services",
    tag = "Services",
    params(("shop_id" = String, Path, description = "Shop public identifier")),
    responses(
        (status = 200, description = "Active services of the shop", body = ServicesResponse),
        (status = 404, description = "Shop not found", body = ErrorResponse)
    )
)]
pub async fn list_services(
    State(state): State<Arc<GatewayState>>,
    Path(shop_id): Path<String>,
) -> GatewayResult<Json<ServicesResponse>> {
    let services = state.booking().catalog.list(&shop_id).await?;
    Ok(Json(ServicesResponse {
        services: services
            .into_iter()
            .map(|service| ServiceResponse::new(service, &shop_id))
            .collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/shops/{shop_id}/services",
    tag = "Services",
    security(("bearerAuth" = [])),
    params(("shop_id" = String, Path, description = "Shop public identifier")),
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = ServiceResponse),
        (status = 400, description = "Invalid service payload", body = ErrorResponse),
        (status = 403, description = "Caller does not manage the shop", body = ErrorResponse),
        (status = 409, description = "A service with this name exists", body = ErrorResponse)
    )
)]
pub async fn create_service(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(shop_id): Path<String>,
    ApiJson(payload): ApiJson<CreateServiceRequest>,
) -> GatewayResult<(StatusCode, Json<ServiceResponse>)> {
    let service = state
        .booking()
        .catalog
        .create(
            &user,
            &shop_id,
            NewService {
                name: payload.name,
                description: payload.description,
                duration_minutes: payload.duration_minutes,
                price_cents: payload.price_cents,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ServiceResponse::new(service, &shop_id)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/shops/{shop_id}/services/{service_id}",
    tag = "Services",
    security(("bearerAuth" = [])),
    params(
        ("shop_id" = String, Path, description = "Shop public identifier"),
        ("service_id" = String, Path, description = "Service public identifier")
    ),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = ServiceResponse),
        (status = 400, description = "Invalid service payload", body = ErrorResponse),
        (status = 403, description = "Caller does not manage the shop", body = ErrorResponse),
        (status = 404, description = "Shop or service not found", body = ErrorResponse)
    )
)]
pub async fn update_service(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path((shop_id, service_id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<UpdateServiceRequest>,
) -> GatewayResult<Json<ServiceResponse>> {
    let service = state
        .booking()
        .catalog
        .update(
            &user,
            &shop_id,
            &service_id,
            ServiceChanges {
                name: payload.name,
                description: payload.description,
                duration_minutes: payload.duration_minutes,
                price_cents: payload.price_cents,
            },
        )
        .await?;
    Ok(Json(ServiceResponse::new(service, &shop_id)))
}

#[utoipa::path(
    delete,
    path = "/api/shops/{shop_id}/services/{service_id}",
    tag = "Services",
    security(("bearerAuth" = [])),
    params(
        ("shop_id" = String, Path, description = "Shop public identifier"),
        ("service_id" = String, Path, description = "Service public identifier")
    ),
    responses(
        (status = 204, description = "Service deactivated"),
        (status = 403, description = "Caller does not manage the shop", body = ErrorResponse),
        (status = 404, description = "Shop or service not found", body = ErrorResponse)
    )
)]
pub async fn delete_service(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path((shop_id, service_id)): Path<(String, String)>,
) -> GatewayResult<StatusCode> {
    state
        .booking()
        .catalog
        .deactivate(&user, &shop_id, &service_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
