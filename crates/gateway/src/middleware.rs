//! Middleware for authentication and other cross-cutting concerns

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, Method,
    },
    middleware::Next,
    response::Response,
};
use reservo_database::User;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{GatewayError, GatewayResult};
use crate::state::GatewayState;

/// The authenticated caller, placed in request extensions by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Reject requests without a valid bearer token and attach the caller
pub async fn auth_middleware(
    State(state): State<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let token = require_bearer(request.headers())?;
    let user = state.authenticate(&token).await?;

    tracing::debug!(user = %user.public_id, role = %user.role, "authenticated request");
    request.extensions_mut().insert(AuthUser(user));

    Ok(next.run(request).await)
}

pub fn require_bearer(headers: &HeaderMap) -> GatewayResult<String> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| GatewayError::unauthorized("missing authorization header"))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(GatewayError::unauthorized("invalid authorization scheme"));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(GatewayError::unauthorized("missing bearer token"));
    }

    Ok(token.to_string())
}

/// Logging middleware for request/response logging
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

/// Bearer tokens travel in headers, so no credentials mode is needed
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
