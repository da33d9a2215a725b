use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::rest;

#[derive(OpenApi)]
#[openapi(
    paths(
        rest::health::health_check,
        rest::auth::register,
        rest::auth::login,
        rest::auth::refresh,
        rest::auth::logout,
        rest::auth::me,
        rest::shops::list_shops,
        rest::shops::list_my_shops,
        rest::shops::create_shop,
        rest::shops::get_shop,
        rest::shops::update_shop,
        rest::shops::delete_shop,
        rest::services::list_services,
        rest::services::create_service,
        rest::services::update_service,
        rest::services::delete_service,
        rest::schedules::get_schedule,
        rest::schedules::replace_schedule,
        rest::availability::get_availability,
        rest::appointments::list_my_appointments,
        rest::appointments::list_shop_appointments,
        rest::appointments::book_appointment,
        rest::appointments::get_appointment,
        rest::appointments::confirm_appointment,
        rest::appointments::complete_appointment,
        rest::appointments::cancel_appointment,
        rest::appointments::reschedule_appointment,
        rest::notifications::list_notifications,
        rest::notifications::mark_read,
        rest::notifications::mark_all_read,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            rest::health::HealthResponse,
            rest::auth::RegisterRequest,
            rest::auth::LoginRequest,
            rest::auth::RefreshRequest,
            rest::auth::SessionResponse,
            rest::models::UserResponse,
            rest::models::ShopResponse,
            rest::models::ShopsResponse,
            rest::models::ServiceResponse,
            rest::models::ServicesResponse,
            rest::models::ScheduleDayResponse,
            rest::models::ScheduleResponse,
            rest::models::SlotResponse,
            rest::models::AvailabilityResponse,
            rest::models::AppointmentResponse,
            rest::models::AppointmentsResponse,
            rest::models::NotificationResponse,
            rest::models::NotificationsResponse,
            rest::shops::CreateShopRequest,
            rest::shops::UpdateShopRequest,
            rest::services::CreateServiceRequest,
            rest::services::UpdateServiceRequest,
            rest::schedules::ScheduleDayRequest,
            rest::schedules::ReplaceScheduleRequest,
            rest::appointments::BookAppointmentRequest,
            rest::appointments::RescheduleRequest,
            rest::appointments::CancelRequest,
            rest::notifications::MarkAllReadResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Registration, login and token rotation"),
        (name = "Shops", description = "Shop management and directory"),
        (name = "Services", description = "Bookable services of a shop"),
        (name = "Schedules", description = "Weekly operating hours"),
        (name = "Availability", description = "Free time slots"),
        (name = "Appointments", description = "Booking and appointment workflow"),
        (name = "Notifications", description = "User notifications"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("JWT".to_string());
        }

        components
            .security_schemes
            .insert("bearerAuth".to_string(), scheme);
    }
}
