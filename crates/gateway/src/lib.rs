//! # Reservo Gateway Crate
//!
//! HTTP REST surface of the Reservo booking backend. Routes delegate to the
//! auth and booking crates and translate their errors into JSON responses.
//!
//! - **REST**: endpoints with OpenAPI documentation
//! - **State**: shared services behind an `Arc`
//! - **Middleware**: bearer authentication, CORS and request logging

pub mod docs;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod rest;
pub mod state;

pub use error::{ErrorResponse, GatewayError, GatewayResult};
pub use extract::{ApiJson, ApiQuery};
pub use middleware::{auth_middleware, AuthUser};
pub use state::GatewayState;

use std::sync::Arc;

use axum::{middleware as axum_middleware, Router};

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let state = Arc::new(state);

    #[allow(unused_mut)]
    let mut router = rest::create_rest_routes(state.clone()).with_state(state);

    #[cfg(debug_assertions)]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        router = router.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        );
    }

    router
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
