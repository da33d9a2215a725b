use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use reservo_auth::{Authenticator, TokenStore};
use reservo_booking::{BookingServices, FixedClock};
use reservo_config::{AuthConfig, BookingConfig, DatabaseConfig};
use reservo_database::initialize_database;
use reservo_gateway::{create_router, GatewayState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

const MONDAY: &str = "2030-01-07";

struct TestContext {
    router: Router,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("gateway.sqlite");
        let pool = initialize_database(&DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 4,
        })
        .await?;

        let auth_config = AuthConfig {
            jwt_secret: "gateway_test_secret_value".to_string(),
            ..AuthConfig::default()
        };
        let authenticator = Authenticator::new(pool.clone(), &auth_config, TokenStore::in_memory());

        let now = NaiveDate::from_ymd_opt(2030, 1, 7)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .ok_or("invalid test clock")?;
        let booking = BookingServices::new(
            pool.clone(),
            &BookingConfig::default(),
            Arc::new(FixedClock(now)),
        );

        Ok(Self {
            router: create_router(GatewayState::new(pool, authenticator, booking)),
            _temp_dir: temp_dir,
        })
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResult<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    async fn register(&self, email: &str, role: &str) -> TestResult<String> {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "Sup3rSecret",
                    "display_name": email.split('@').next().unwrap_or(email),
                    "role": role,
                })),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        Ok(body["access_token"].as_str().ok_or("missing token")?.to_string())
    }

    /// Shop open Monday 09:00-11:00 with a 30 minute service
    async fn open_shop(&self, owner: &str) -> TestResult<(String, String)> {
        let (status, shop) = self
            .send(
                Method::POST,
                "/api/shops",
                Some(owner),
                Some(json!({ "name": "Corner Cuts", "slot_interval_minutes": 30 })),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{shop}");
        let shop_id = shop["id"].as_str().ok_or("missing shop id")?.to_string();

        let (status, service) = self
            .send(
                Method::POST,
                &format!("/api/shops/{shop_id}/services"),
                Some(owner),
                Some(json!({ "name": "Haircut", "duration_minutes": 30, "price_cents": 2500 })),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{service}");
        let service_id = service["id"].as_str().ok_or("missing service id")?.to_string();

        let (status, schedule) = self
            .send(
                Method::PUT,
                &format!("/api/shops/{shop_id}/schedule"),
                Some(owner),
                Some(json!({
                    "days": [
                        { "day_of_week": 0, "open_time": "09:00", "close_time": "11:00" },
                        { "day_of_week": 6, "is_closed": true }
                    ]
                })),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "{schedule}");
        assert_eq!(schedule["days"].as_array().map(Vec::len), Some(2));

        Ok((shop_id, service_id))
    }
}

#[tokio::test]
async fn health_reports_database_and_token_store() -> TestResult {
    let ctx = TestContext::new().await?;
    let (status, body) = ctx.send(Method::GET, "/health", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["token_store"], "memory");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx.send(Method::GET, "/api/auth/me", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["message"].as_str().is_some());

    let (status, _) = ctx
        .send(Method::GET, "/api/appointments", Some("not-a-jwt"), None)
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = ctx.register("ada@example.com", "customer").await?;
    let (status, me) = ctx.send(Method::GET, "/api/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada@example.com");
    assert_eq!(me["role"], "customer");
    Ok(())
}

#[tokio::test]
async fn registration_errors_use_json_bodies() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.register("ada@example.com", "customer").await?;

    let payload = json!({
        "email": "ada@example.com",
        "password": "Sup3rSecret",
        "display_name": "Ada",
    });
    let (status, body) = ctx
        .send(Method::POST, "/api/auth/register", None, Some(payload))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");

    let admin = json!({
        "email": "root@example.com",
        "password": "Sup3rSecret",
        "display_name": "Root",
        "role": "admin",
    });
    let (status, _) = ctx
        .send(Method::POST, "/api/auth/register", None, Some(admin))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong" })),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_tokens_over_http() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, session) = ctx
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "ada@example.com",
                "password": "Sup3rSecret",
                "display_name": "Ada",
            })),
        )
        .await?;
    let refresh_token = session["refresh_token"].clone();

    let (status, rotated) = ctx
        .send(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh_token })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rotated["token_type"], "Bearer");

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh_token })),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn booking_flow_over_http() -> TestResult {
    let ctx = TestContext::new().await?;
    let owner = ctx.register("owner@example.com", "shop_owner").await?;
    let customer = ctx.register("customer@example.com", "customer").await?;
    let rival = ctx.register("rival@example.com", "customer").await?;
    let (shop_id, service_id) = ctx.open_shop(&owner).await?;

    // Catalog reads need no token.
    let availability_uri =
        format!("/api/shops/{shop_id}/availability?service_id={service_id}&date={MONDAY}");
    let (status, day) = ctx.send(Method::GET, &availability_uri, None, None).await?;
    assert_eq!(status, StatusCode::OK, "{day}");
    assert_eq!(day["slots"].as_array().map(Vec::len), Some(4));
    assert_eq!(day["slots"][0]["start_at"], "2030-01-07T09:00:00");

    let booking = json!({
        "shop_id": shop_id,
        "service_id": service_id,
        "start_at": "2030-01-07T09:30",
    });
    let (status, appointment) = ctx
        .send(Method::POST, "/api/appointments", Some(&customer), Some(booking.clone()))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{appointment}");
    assert_eq!(appointment["status"], "pending");
    assert_eq!(appointment["end_at"], "2030-01-07T10:00:00");
    let appointment_id = appointment["id"].as_str().ok_or("missing id")?.to_string();

    let (status, body) = ctx
        .send(Method::POST, "/api/appointments", Some(&rival), Some(booking))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (_, day) = ctx.send(Method::GET, &availability_uri, None, None).await?;
    assert_eq!(day["slots"][1]["available"], false);

    let (status, _) = ctx
        .send(
            Method::POST,
            &format!("/api/appointments/{appointment_id}/confirm"),
            Some(&customer),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, confirmed) = ctx
        .send(
            Method::POST,
            &format!("/api/appointments/{appointment_id}/confirm"),
            Some(&owner),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "confirmed");

    let (status, inbox) = ctx
        .send(Method::GET, "/api/notifications?unread_only=true", Some(&customer), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox["unread_count"], 1);
    assert_eq!(inbox["notifications"][0]["type"], "appointment_confirmed");

    let (status, moved) = ctx
        .send(
            Method::POST,
            &format!("/api/appointments/{appointment_id}/reschedule"),
            Some(&customer),
            Some(json!({ "start_at": "2030-01-07T10:30:00" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{moved}");
    assert_eq!(moved["status"], "rescheduled");

    let (status, cancelled) = ctx
        .send(
            Method::POST,
            &format!("/api/appointments/{appointment_id}/cancel"),
            Some(&customer),
            Some(json!({ "reason": "sick" })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["cancellation_reason"], "sick");

    let (status, body) = ctx
        .send(
            Method::POST,
            &format!("/api/appointments/{appointment_id}/complete"),
            Some(&owner),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, listing) = ctx
        .send(
            Method::GET,
            &format!("/api/shops/{shop_id}/appointments?date={MONDAY}&status=cancelled"),
            Some(&owner),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["appointments"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn customers_cannot_manage_shops() -> TestResult {
    let ctx = TestContext::new().await?;
    let owner = ctx.register("owner@example.com", "shop_owner").await?;
    let customer = ctx.register("customer@example.com", "customer").await?;
    let (shop_id, _) = ctx.open_shop(&owner).await?;

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/shops",
            Some(&customer),
            Some(json!({ "name": "Pop-up" })),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(
            Method::PUT,
            &format!("/api/shops/{shop_id}"),
            Some(&customer),
            Some(json!({ "capacity": 3 })),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(Method::DELETE, &format!("/api/shops/{shop_id}"), Some(&owner), None)
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx
        .send(Method::GET, &format!("/api/shops/{shop_id}"), None, None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, mine) = ctx.send(Method::GET, "/api/me/shops", Some(&owner), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["shops"][0]["is_active"], false);
    Ok(())
}

#[tokio::test]
async fn malformed_dates_are_bad_requests() -> TestResult {
    let ctx = TestContext::new().await?;
    let owner = ctx.register("owner@example.com", "shop_owner").await?;
    let (shop_id, service_id) = ctx.open_shop(&owner).await?;

    let (status, body) = ctx
        .send(
            Method::GET,
            &format!("/api/shops/{shop_id}/availability?service_id={service_id}&date=07-01-2030"),
            None,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let (status, _) = ctx
        .send(
            Method::GET,
            &format!("/api/shops/{shop_id}/availability?service_id={service_id}&date=2029-12-31"),
            None,
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn out_of_range_years_are_bad_requests() -> TestResult {
    let ctx = TestContext::new().await?;
    let owner = ctx.register("owner@example.com", "shop_owner").await?;
    let (shop_id, service_id) = ctx.open_shop(&owner).await?;

    let (status, body) = ctx
        .send(
            Method::GET,
            &format!("/api/shops/{shop_id}/appointments?date=%2B262142-12-31"),
            Some(&owner),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/appointments",
            Some(&owner),
            Some(json!({
                "shop_id": shop_id,
                "service_id": service_id,
                "start_at": "+10000-01-07T09:00:00",
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unreadable_request_bodies_use_the_error_shape() -> TestResult {
    let ctx = TestContext::new().await?;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))?;
    let response = ctx.router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].is_string());

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let owner = ctx.register("owner@example.com", "shop_owner").await?;
    let (shop_id, _) = ctx.open_shop(&owner).await?;
    let (status, body) = ctx
        .send(Method::GET, &format!("/api/shops/{shop_id}/availability"), None, None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
    Ok(())
}
