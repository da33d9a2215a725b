//! Reservo Database Crate
//!
//! This crate provides database functionality for the Reservo booking backend,
//! including connection management, migrations, and repository implementations.

use reservo_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod formats;
pub mod migrations;
pub mod overlap;
pub mod repos;
pub mod types;

pub use connection::{prepare_database, DatabaseConnection};
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{
    AppointmentRepository, NotificationRepository, ScheduleRepository, ServiceRepository,
    ShopRepository, UserRepository,
};

// Re-export entities
pub use entities::{
    appointment::{Appointment, AppointmentStatus, CreateAppointmentRequest},
    notification::{CreateNotificationRequest, Notification, NotificationType},
    schedule::{ScheduleDay, ScheduleEntry},
    service::{CreateServiceRequest, Service, UpdateServiceRequest},
    shop::{CreateShopRequest, Shop, UpdateShopRequest},
    user::{CreateUserRequest, UpdateUserRequest, User, UserRole},
};

// Re-export types
pub use types::{errors::DatabaseError, DatabaseResult};

/// Re-export commonly used types for convenience
pub use sqlx::SqlitePool as Pool;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}
