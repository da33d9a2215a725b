//! Maintenance commands that operate directly on the database

use anyhow::Context;
use reservo_auth::{AuthError, Registration};
use reservo_booking::{NewService, NewShop};
use reservo_database::{ScheduleDay, User, UserRole};
use reservo_runtime::BackendServices;
use sqlx::{Row, SqlitePool};
use tracing::info;

pub const DEMO_OWNER_EMAIL: &str = "owner@reservo.test";
pub const DEMO_CUSTOMER_EMAIL: &str = "customer@reservo.test";
pub const DEMO_PASSWORD: &str = "Password123";
const DEMO_SHOP_NAME: &str = "Corner Barbers";

/// Children first so foreign keys never block a delete
const CLEAR_ORDER: [&str; 6] = [
    "notifications",
    "appointments",
    "schedules",
    "services",
    "shops",
    "users",
];

pub struct Seeded {
    pub shop_id: String,
    pub service_id: String,
}

pub async fn seed(services: &BackendServices) -> anyhow::Result<Seeded> {
    info!("seeding database with demo data");

    let owner = ensure_user(services, DEMO_OWNER_EMAIL, "Demo Owner", UserRole::ShopOwner).await?;
    ensure_user(services, DEMO_CUSTOMER_EMAIL, "Demo Customer", UserRole::Customer).await?;

    let booking = &services.booking;
    let existing = booking
        .shops
        .list_owned(&owner)
        .await?
        .into_iter()
        .find(|shop| shop.name == DEMO_SHOP_NAME);

    let shop = match existing {
        Some(shop) => shop,
        None => {
            booking
                .shops
                .create(
                    &owner,
                    NewShop {
                        name: DEMO_SHOP_NAME.to_string(),
                        description: Some("Cuts and shaves".to_string()),
                        address: Some("1 Main Street".to_string()),
                        phone: Some("+15550100".to_string()),
                        slot_interval_minutes: Some(30),
                        capacity: Some(1),
                    },
                )
                .await
                .context("failed to create demo shop")?
        }
    };

    let service = match booking.catalog.list(&shop.public_id).await?.into_iter().next() {
        Some(service) => service,
        None => booking
            .catalog
            .create(
                &owner,
                &shop.public_id,
                NewService {
                    name: "Haircut".to_string(),
                    description: Some("Wash, cut and style".to_string()),
                    duration_minutes: 30,
                    price_cents: 2500,
                },
            )
            .await
            .context("failed to create demo service")?,
    };

    let week: Vec<ScheduleDay> = (0..7)
        .map(|day_of_week| {
            let weekend = day_of_week >= 5;
            ScheduleDay {
                day_of_week,
                open_time: (!weekend).then(|| "09:00".to_string()),
                close_time: (!weekend).then(|| "17:00".to_string()),
                is_closed: weekend,
            }
        })
        .collect();
    booking
        .schedules
        .replace_week(&owner, &shop.public_id, week)
        .await
        .context("failed to store demo schedule")?;

    Ok(Seeded {
        shop_id: shop.public_id,
        service_id: service.public_id,
    })
}

async fn ensure_user(
    services: &BackendServices,
    email: &str,
    display_name: &str,
    role: UserRole,
) -> anyhow::Result<User> {
    let registration = Registration {
        email: email.to_string(),
        password: DEMO_PASSWORD.to_string(),
        display_name: display_name.to_string(),
        phone: None,
        role: Some(role),
    };

    let session = match services.authenticator.register(registration).await {
        Ok(session) => session,
        Err(AuthError::UserExists) => services
            .authenticator
            .login(email, DEMO_PASSWORD)
            .await
            .with_context(|| format!("{email} exists with a different password"))?,
        Err(error) => return Err(error).with_context(|| format!("failed to register {email}")),
    };
    Ok(session.user)
}

pub async fn clear(pool: &SqlitePool) -> anyhow::Result<Vec<(&'static str, u64)>> {
    info!("clearing all data from database");

    let mut tx = pool.begin().await?;
    let mut summary = Vec::with_capacity(CLEAR_ORDER.len());
    for table in CLEAR_ORDER {
        let result = sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to delete {table}"))?;
        summary.push((table, result.rows_affected()));
    }
    tx.commit().await?;
    Ok(summary)
}

pub async fn dump(pool: &SqlitePool) -> anyhow::Result<()> {
    let users = sqlx::query(
        "SELECT id, public_id, email, display_name, role, is_active, created_at FROM users ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("failed to fetch users")?;

    println!("=== USERS ===");
    if users.is_empty() {
        println!("No users found in database");
    } else {
        println!(
            "{:<5} {:<26} {:<30} {:<24} {:<12} {:<8} {:<25}",
            "ID", "Public ID", "Email", "Name", "Role", "Active", "Created At"
        );
        println!("{}", "-".repeat(135));
        for row in users {
            println!(
                "{:<5} {:<26} {:<30} {:<24} {:<12} {:<8} {:<25}",
                row.try_get::<i64, _>("id")?,
                row.try_get::<String, _>("public_id")?,
                row.try_get::<String, _>("email")?,
                row.try_get::<String, _>("display_name")?,
                row.try_get::<String, _>("role")?,
                row.try_get::<bool, _>("is_active")?,
                row.try_get::<String, _>("created_at")?,
            );
        }
    }

    let shops = sqlx::query(
        "SELECT id, public_id, owner_id, name, slot_interval_minutes, capacity, is_active FROM shops ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("failed to fetch shops")?;

    println!("\n=== SHOPS ===");
    if shops.is_empty() {
        println!("No shops found in database");
    } else {
        println!(
            "{:<5} {:<26} {:<8} {:<30} {:<10} {:<9} {:<8}",
            "ID", "Public ID", "Owner", "Name", "Interval", "Capacity", "Active"
        );
        println!("{}", "-".repeat(100));
        for row in shops {
            println!(
                "{:<5} {:<26} {:<8} {:<30} {:<10} {:<9} {:<8}",
                row.try_get::<i64, _>("id")?,
                row.try_get::<String, _>("public_id")?,
                row.try_get::<i64, _>("owner_id")?,
                row.try_get::<String, _>("name")?,
                row.try_get::<i64, _>("slot_interval_minutes")?,
                row.try_get::<i64, _>("capacity")?,
                row.try_get::<bool, _>("is_active")?,
            );
        }
    }

    let services = sqlx::query(
        "SELECT id, public_id, shop_id, name, duration_minutes, price_cents, is_active FROM services ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("failed to fetch services")?;

    println!("\n=== SERVICES ===");
    if services.is_empty() {
        println!("No services found in database");
    } else {
        println!(
            "{:<5} {:<26} {:<6} {:<30} {:<9} {:<8} {:<8}",
            "ID", "Public ID", "Shop", "Name", "Minutes", "Cents", "Active"
        );
        println!("{}", "-".repeat(96));
        for row in services {
            println!(
                "{:<5} {:<26} {:<6} {:<30} {:<9} {:<8} {:<8}",
                row.try_get::<i64, _>("id")?,
                row.try_get::<String, _>("public_id")?,
                row.try_get::<i64, _>("shop_id")?,
                row.try_get::<String, _>("name")?,
                row.try_get::<i64, _>("duration_minutes")?,
                row.try_get::<i64, _>("price_cents")?,
                row.try_get::<bool, _>("is_active")?,
            );
        }
    }

    let appointments = sqlx::query(
        "SELECT id, public_id, shop_id, service_id, customer_id, start_at, end_at, status FROM appointments ORDER BY start_at",
    )
    .fetch_all(pool)
    .await
    .context("failed to fetch appointments")?;

    println!("\n=== APPOINTMENTS ===");
    if appointments.is_empty() {
        println!("No appointments found in database");
    } else {
        println!(
            "{:<5} {:<26} {:<6} {:<8} {:<9} {:<20} {:<20} {:<12}",
            "ID", "Public ID", "Shop", "Service", "Customer", "Start", "End", "Status"
        );
        println!("{}", "-".repeat(112));
        for row in appointments {
            println!(
                "{:<5} {:<26} {:<6} {:<8} {:<9} {:<20} {:<20} {:<12}",
                row.try_get::<i64, _>("id")?,
                row.try_get::<String, _>("public_id")?,
                row.try_get::<i64, _>("shop_id")?,
                row.try_get::<i64, _>("service_id")?,
                row.try_get::<i64, _>("customer_id")?,
                row.try_get::<String, _>("start_at")?,
                row.try_get::<String, _>("end_at")?,
                row.try_get::<String, _>("status")?,
            );
        }
    }

    Ok(())
}
