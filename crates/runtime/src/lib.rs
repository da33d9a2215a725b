use std::time::Duration;

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use reservo_auth::{Authenticator, TokenStore};
use reservo_booking::BookingServices;
use reservo_config::AppConfig;
use reservo_database::initialize_database;
use sqlx::SqlitePool;
use tracing::{info, warn};

const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Infrastructure shared by the whole process
#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub booking: BookingServices,
    pub redis_conn: Option<ConnectionManager>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let redis_conn = match config.cache.redis_url() {
            Some(url) => connect_redis(url).await,
            None => {
                info!("redis disabled by configuration");
                None
            }
        };

        let token_store = match redis_conn.clone() {
            Some(manager) => TokenStore::redis(manager),
            None => {
                warn!("refresh tokens are kept in process memory and will not survive restarts");
                TokenStore::in_memory()
            }
        };

        let authenticator = Authenticator::new(db_pool.clone(), &config.auth, token_store);
        let booking = BookingServices::with_system_clock(db_pool.clone(), &config.booking);

        info!(
            token_store = authenticator.token_store().backend_name(),
            "backend services ready"
        );

        Ok(Self {
            db_pool,
            authenticator,
            booking,
            redis_conn,
        })
    }
}

/// Connect to Redis, logging and swallowing failures so development setups
/// can run without it
async fn connect_redis(url: &str) -> Option<ConnectionManager> {
    let client = match redis::Client::open(url) {
        Ok(client) => client,
        Err(error) => {
            warn!(%error, "failed to create redis client, proceeding without redis");
            return None;
        }
    };

    match tokio::time::timeout(REDIS_CONNECT_TIMEOUT, ConnectionManager::new(client)).await {
        Ok(Ok(manager)) => {
            info!("redis connection established");
            Some(manager)
        }
        Ok(Err(error)) => {
            warn!(%error, "failed to connect to redis, proceeding without redis");
            None
        }
        Err(_) => {
            warn!("timed out connecting to redis, proceeding without redis");
            None
        }
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
