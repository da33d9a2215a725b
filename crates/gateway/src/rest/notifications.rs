//! Notification inbox endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::models::{NotificationResponse, NotificationsResponse};
use crate::error::{ErrorResponse, GatewayResult};
use crate::extract::ApiQuery;
use crate::middleware::AuthUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    params(NotificationsQuery),
    responses(
        (status = 200, description = "Notifications of the caller, newest first", body = NotificationsResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn list_notifications(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<NotificationsQuery>,
) -> GatewayResult<Json<NotificationsResponse>> {
    let notifications = &state.booking().notifications;
    let items = notifications.list(&user, query.unread_only).await?;
    let unread_count = notifications.unread_count(&user).await?;

    Ok(Json(NotificationsResponse {
        notifications: items.into_iter().map(NotificationResponse::from).collect(),
        unread_count,
    }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{notification_id}/read",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    params(("notification_id" = String, Path, description = "Notification public identifier")),
    responses(
        (status = 200, description = "Notification marked read", body = NotificationResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    )
)]
pub async fn mark_read(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(notification_id): Path<String>,
) -> GatewayResult<Json<NotificationResponse>> {
    let notification = state
        .booking()
        .notifications
        .mark_read(&user, &notification_id)
        .await?;
    Ok(Json(notification.into()))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Number of notifications marked read", body = MarkAllReadResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn mark_all_read(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> GatewayResult<Json<MarkAllReadResponse>> {
    let updated = state.booking().notifications.mark_all_read(&user).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
