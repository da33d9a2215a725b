//! Shop REST endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use reservo_booking::{NewShop, ShopChanges};
use serde::Deserialize;
use utoipa::ToSchema;

use super::models::{ShopResponse, ShopsResponse};
use crate::error::{ErrorResponse, GatewayResult};
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShopRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Defaults to the configured slot interval
    pub slot_interval_minutes: Option<i64>,
    /// Defaults to 1
    pub capacity: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateShopRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub slot_interval_minutes: Option<i64>,
    pub capacity: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/shops",
    tag = "Shops",
    responses(
        (status = 200, description = "Active shops", body = ShopsResponse)
    )
)]
pub async fn list_shops(State(state): State<Arc<GatewayState>>) -> GatewayResult<Json<ShopsResponse>> {
    let shops = state.booking().shops.list().await?;
    Ok(Json(ShopsResponse {
        shops: shops.into_iter().map(ShopResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/me/shops",
    tag = "Shops",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Shops owned by the caller, including inactive ones", body = ShopsResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn list_my_shops(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> GatewayResult<Json<ShopsResponse>> {
    let shops = state.booking().shops.list_owned(&user).await?;
    Ok(Json(ShopsResponse {
        shops: shops.into_iter().map(ShopResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/shops",
    tag = "Shops",
    security(("bearerAuth" = [])),
    request_body = CreateShopRequest,
    responses(
        (status = 201, description = "Shop created", body = ShopResponse),
        (status = 400, description = "Invalid shop payload", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Only shop owners can create shops", body = ErrorResponse)
    )
)]
pub async fn create_shop(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateShopRequest>,
) -> GatewayResult<(StatusCode, Json<ShopResponse>)> {
    let shop = state
        .booking()
        .shops
        .create(
            &user,
            NewShop {
                name: payload.name,
                description: payload.description,
                address: payload.address,
                phone: payload.phone,
                slot_interval_minutes: payload.slot_interval_minutes,
                capacity: payload.capacity,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(shop.into())))
}

#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}",
    tag = "Shops",
    params(("shop_id" = String, Path, description = "Shop public identifier")),
    responses(
        (status = 200, description = "Shop details", body = ShopResponse),
        (status = 404, description = "Shop not found", body = ErrorResponse)
    )
)]
pub async fn get_shop(
    State(state): State<Arc<GatewayState>>,
    Path(shop_id): Path<String>,
) -> GatewayResult<Json<ShopResponse>> {
    let shop = state.booking().shops.get(&shop_id).await?;
    Ok(Json(shop.into()))
}

#[utoipa::path(
    put,
    path = "/api/shops/{shop_id}",
    tag = "Shops",
    security(("bearerAuth" = [])),
    params(("shop_id" = String, Path, description = "Shop public identifier")),
    request_body = UpdateShopRequest,
    responses(
        (status = 200, description = "Shop updated", body = ShopResponse),
        (status = 400, description = "Invalid shop payload", body = ErrorResponse),
        (status = 403, description = "Caller does not manage the shop", body = ErrorResponse),
        (status = 404, description = "Shop not found", body = ErrorResponse)
    )
)]
pub async fn update_shop(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(shop_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateShopRequest>,
) -> GatewayResult<Json<ShopResponse>> {
    let shop = state
        .booking()
        .shops
        .update(
            &user,
            &shop_id,
            ShopChanges {
                name: payload.name,
                description: payload.description,
                address: payload.address,
                phone: payload.phone,
                slot_interval_minutes: payload.slot_interval_minutes,
                capacity: payload.capacity,
            },
        )
        .await?;
    Ok(Json(shop.into()))
}

#[utoipa::path(
    delete,
    path = "/api/shops/{shop_id}",
    tag = "Shops",
    security(("bearerAuth" = [])),
    params(("shop_id" = String, Path, description = "Shop public identifier")),
    responses(
        (status = 204, description = "Shop deactivated"),
        (status = 403, description = "Caller does not manage the shop", body = ErrorResponse),
        (status = 404, description = "Shop not found", body = ErrorResponse)
    )
)]
pub async fn delete_shop(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(shop_id): Path<String>,
) -> GatewayResult<StatusCode> {
    state.booking().shops.deactivate(&user, &shop_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
