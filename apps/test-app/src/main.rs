use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

const PASSWORD: &str = "Password123";

#[derive(Parser)]
#[command(name = "reservo-test-app")]
#[command(about = "Drives a running Reservo backend through its booking workflow")]
#[command(version)]
struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:7070")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the health endpoint
    Health,
    /// Register owner and customer accounts and check login and refresh
    TestAuth,
    /// Open a shop, book a slot and walk the appointment lifecycle
    TestWorkflow {
        /// Customers competing for the first free slot
        #[arg(long, default_value_t = 3)]
        customers: u32,
    },
    /// Run every check
    RunAll,
}

#[derive(Debug, Deserialize)]
struct Session {
    user: UserInfo,
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    id: String,
    email: String,
    role: String,
}

#[derive(Debug, Deserialize)]
struct Resource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Slot {
    start_at: String,
    available: bool,
}

#[derive(Debug, Deserialize)]
struct Availability {
    slots: Vec<Slot>,
}

#[derive(Debug, Deserialize)]
struct Appointment {
    id: String,
    status: String,
    start_at: String,
}

#[derive(Debug, Deserialize)]
struct Notifications {
    unread_count: i64,
}

struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self
            .client
            .request(method.clone(), format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{method} {path} failed"))?;
        let status = response.status();
        let text = response.text().await?;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok((status, value))
    }

    /// Send and require `expected`, decoding the body as `T`
    async fn expect<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
        expected: StatusCode,
    ) -> Result<T> {
        let (status, value) = self.send(method.clone(), path, token, body).await?;
        if status != expected {
            return Err(anyhow!(
                "{method} {path}: expected {expected}, got {status}: {value}"
            ));
        }
        serde_json::from_value(value).with_context(|| format!("unexpected body from {path}"))
    }

    async fn register(&self, label: &str, role: &str) -> Result<Session> {
        let email = format!("{label}-{}@reservo.test", Uuid::new_v4().simple());
        println!("Registering {role}: {email}");
        self.expect(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": email,
                "password": PASSWORD,
                "display_name": label,
                "role": role,
            })),
            StatusCode::CREATED,
        )
        .await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api = ApiClient::new(cli.api_url);

    match cli.command {
        Commands::Health => health(&api).await,
        Commands::TestAuth => test_auth(&api).await,
        Commands::TestWorkflow { customers } => test_workflow(&api, customers).await,
        Commands::RunAll => {
            health(&api).await?;
            test_auth(&api).await?;
            test_workflow(&api, 3).await?;
            println!("All checks passed");
            Ok(())
        }
    }
}

async fn health(api: &ApiClient) -> Result<()> {
    let (status, body) = api.send(Method::GET, "/health", None, None).await?;
    println!("Health: {status} {body}");
    if status != StatusCode::OK {
        return Err(anyhow!("backend is not healthy"));
    }
    Ok(())
}

async fn test_auth(api: &ApiClient) -> Result<()> {
    let session = api.register("auth-check", "customer").await?;
    println!("Registered {} as {}", session.user.id, session.user.role);

    let login: Session = api
        .expect(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": session.user.email, "password": PASSWORD })),
            StatusCode::OK,
        )
        .await?;

    let refreshed: Session = api
        .expect(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": login.refresh_token })),
            StatusCode::OK,
        )
        .await?;

    let (status, _) = api
        .send(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": login.refresh_token })),
        )
        .await?;
    if status != StatusCode::UNAUTHORIZED {
        return Err(anyhow!("reused refresh token was accepted ({status})"));
    }

    let me: UserInfo = api
        .expect(
            Method::GET,
            "/api/auth/me",
            Some(&refreshed.access_token),
            None,
            StatusCode::OK,
        )
        .await?;
    println!("Token refresh rotated correctly for {}", me.email);
    Ok(())
}

fn next_monday() -> NaiveDate {
    let today = Local::now().date_naive();
    let days_ahead = (7 - i64::from(today.weekday().num_days_from_monday())) % 7;
    let days_ahead = if days_ahead == 0 { 7 } else { days_ahead };
    today + Duration::days(days_ahead)
}

async fn test_workflow(api: &ApiClient, customers: u32) -> Result<()> {
    let owner = api.register("owner", "shop_owner").await?;
    let owner_token = owner.access_token.as_str();

    let shop: Resource = api
        .expect(
            Method::POST,
            "/api/shops",
            Some(owner_token),
            Some(json!({ "name": format!("Smoke Shop {}", Uuid::new_v4().simple()), "slot_interval_minutes": 30 })),
            StatusCode::CREATED,
        )
        .await?;
    println!("Shop created: {}", shop.id);

    let service: Resource = api
        .expect(
            Method::POST,
            &format!("/api/shops/{}/services", shop.id),
            Some(owner_token),
            Some(json!({ "name": "Consultation", "duration_minutes": 30, "price_cents": 1500 })),
            StatusCode::CREATED,
        )
        .await?;

    let date = next_monday();
    let _: Value = api
        .expect(
            Method::PUT,
            &format!("/api/shops/{}/schedule", shop.id),
            Some(owner_token),
            Some(json!({
                "days": [{ "day_of_week": 0, "open_time": "09:00", "close_time": "12:00" }]
            })),
            StatusCode::OK,
        )
        .await?;

    let availability_path = format!(
        "/api/shops/{}/availability?service_id={}&date={}",
        shop.id,
        service.id,
        date.format("%Y-%m-%d")
    );
    let availability: Availability = api
        .expect(Method::GET, &availability_path, None, None, StatusCode::OK)
        .await?;
    let slot = availability
        .slots
        .iter()
        .find(|slot| slot.available)
        .ok_or_else(|| anyhow!("no free slot on {date}"))?;
    println!("{} slots on {date}, booking {}", availability.slots.len(), slot.start_at);

    let booking_body = json!({
        "shop_id": shop.id,
        "service_id": service.id,
        "start_at": slot.start_at,
    });

    let mut booked: Option<(Session, Appointment)> = None;
    let mut conflicts = 0;
    for index in 0..customers.max(1) {
        let customer = api.register(&format!("customer{index}"), "customer").await?;
        let (status, body) = api
            .send(
                Method::POST,
                "/api/appointments",
                Some(&customer.access_token),
                Some(booking_body.clone()),
            )
            .await?;
        match status {
            StatusCode::CREATED if booked.is_none() => {
                let appointment: Appointment = serde_json::from_value(body)?;
                booked = Some((customer, appointment));
            }
            StatusCode::CONFLICT => conflicts += 1,
            other => return Err(anyhow!("unexpected booking response {other}: {body}")),
        }
    }
    let (customer, appointment) = booked.ok_or_else(|| anyhow!("nobody could book {}", slot.start_at))?;
    println!(
        "Booked {} at {} ({} competing requests rejected)",
        appointment.id, appointment.start_at, conflicts
    );

    let confirmed: Appointment = api
        .expect(
            Method::POST,
            &format!("/api/appointments/{}/confirm", appointment.id),
            Some(owner_token),
            None,
            StatusCode::OK,
        )
        .await?;
    println!("Owner confirmed: {}", confirmed.status);

    let cancelled: Appointment = api
        .expect(
            Method::POST,
            &format!("/api/appointments/{}/cancel", appointment.id),
            Some(&customer.access_token),
            Some(json!({ "reason": "smoke test" })),
            StatusCode::OK,
        )
        .await?;
    println!("Customer cancelled: {}", cancelled.status);

    let inbox: Notifications = api
        .expect(
            Method::GET,
            "/api/notifications",
            Some(owner_token),
            None,
            StatusCode::OK,
        )
        .await?;
    println!("Owner has {} unread notifications", inbox.unread_count);

    let again: Availability = api
        .expect(Method::GET, &availability_path, None, None, StatusCode::OK)
        .await?;
    let freed = again
        .slots
        .iter()
        .any(|candidate| candidate.start_at == slot.start_at && candidate.available);
    if !freed {
        return Err(anyhow!("cancelled slot {} was not released", slot.start_at));
    }
    println!("Workflow completed");
    Ok(())
}
