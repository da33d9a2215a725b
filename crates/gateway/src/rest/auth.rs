//! Authentication REST endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use reservo_auth::{AuthSession, Registration};
use reservo_database::UserRole;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::models::UserResponse;
use crate::error::{ErrorResponse, GatewayError, GatewayResult};
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub phone: Option<String>,
    /// `customer` (default) or `shop_owner`
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
            token_type: session.tokens.token_type.to_string(),
            expires_in: session.tokens.expires_in,
        }
    }
}

fn parse_role(role: Option<&str>) -> GatewayResult<Option<UserRole>> {
    match role.map(str::trim) {
        None | Some("") => Ok(None),
        Some("customer") => Ok(Some(UserRole::Customer)),
        Some("shop_owner") => Ok(Some(UserRole::ShopOwner)),
        Some("admin") => Ok(Some(UserRole::Admin)),
        Some(other) => Err(GatewayError::bad_request(format!("unknown role '{other}'"))),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid registration payload", body = ErrorResponse),
        (status = 403, description = "Role cannot be self-assigned", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<GatewayState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> GatewayResult<(StatusCode, Json<SessionResponse>)> {
    let role = parse_role(payload.role.as_deref())?;
    let session = state
        .authenticator()
        .register(Registration {
            email: payload.email,
            password: payload.password,
            display_name: payload.display_name,
            phone: payload.phone,
            role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> GatewayResult<Json<SessionResponse>> {
    let session = state
        .authenticator()
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(session.into()))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Rotated token pair", body = SessionResponse),
        (status = 401, description = "Unknown, expired or reused refresh token", body = ErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<Arc<GatewayState>>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> GatewayResult<Json<SessionResponse>> {
    let session = state.authenticator().refresh(&payload.refresh_token).await?;
    Ok(Json(session.into()))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    security(("bearerAuth" = [])),
    request_body = RefreshRequest,
    responses(
        (status = 204, description = "Refresh token revoked"),
        (status = 401, description = "Missing bearer token, or the refresh token belongs to another user", body = ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> GatewayResult<StatusCode> {
    state
        .authenticator()
        .logout(&user, &payload.refresh_token)
        .await?;
    info!(user = %user.public_id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn me(Extension(AuthUser(user)): Extension<AuthUser>) -> Json<UserResponse> {
    Json(user.into())
}
