//! REST API endpoints for the gateway

pub mod appointments;
pub mod auth;
pub mod availability;
pub mod health;
pub mod models;
pub mod notifications;
pub mod schedules;
pub mod services;
pub mod shops;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::middleware::auth_middleware;
use crate::state::GatewayState;

/// Create all REST API routes. Catalog reads are public; the rest sits
/// behind the bearer-token middleware.
pub fn create_rest_routes(state: Arc<GatewayState>) -> Router<Arc<GatewayState>> {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/shops", get(shops::list_shops))
        .route("/api/shops/:shop_id", get(shops::get_shop))
        .route("/api/shops/:shop_id/services", get(services::list_services))
        .route("/api/shops/:shop_id/schedule", get(schedules::get_schedule))
        .route(
            "/api/shops/:shop_id/availability",
            get(availability::get_availability),
        );

    let protected = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/me/shops", get(shops::list_my_shops))
        .route("/api/shops", post(shops::create_shop))
        .route(
            "/api/shops/:shop_id",
            put(shops::update_shop).delete(shops::delete_shop),
        )
        .route("/api/shops/:shop_id/services", post(services::create_service))
        .route(
            "/api/shops/:shop_id/services/:service_id",
            put(services::update_service).delete(services::delete_service),
        )
        .route("/api/shops/:shop_id/schedule", put(schedules::replace_schedule))
        .route(
            "/api/shops/:shop_id/appointments",
            get(appointments::list_shop_appointments),
        )
        .route(
            "/api/appointments",
            get(appointments::list_my_appointments).post(appointments::book_appointment),
        )
        .route(
            "/api/appointments/:appointment_id",
            get(appointments::get_appointment),
        )
        .route(
            "/api/appointments/:appointment_id/confirm",
            post(appointments::confirm_appointment),
        )
        .route(
            "/api/appointments/:appointment_id/complete",
            post(appointments::complete_appointment),
        )
        .route(
            "/api/appointments/:appointment_id/cancel",
            post(appointments::cancel_appointment),
        )
        .route(
            "/api/appointments/:appointment_id/reschedule",
            post(appointments::reschedule_appointment),
        )
        .route("/api/notifications", get(notifications::list_notifications))
        .route(
            "/api/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route(
            "/api/notifications/:notification_id/read",
            post(notifications::mark_read),
        )
        .route_layer(from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}
