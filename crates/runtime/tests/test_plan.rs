use std::path::Path;

use anyhow::{Context, Result};
use reservo_config::AppConfig;
use reservo_runtime::BackendServices;
use tempfile::TempDir;

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

fn build_config(database_url: String, redis_url: Option<&str>) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = database_url;
    config.database.max_connections = 2;
    config.cache.redis_url = redis_url.map(str::to_string);
    config
}

async fn initialise(config: &AppConfig) -> Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_runs_migrations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("init.db");
    let services = initialise(&build_config(sqlite_url(&db_path), None)).await?;

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'shops', 'appointments') ORDER BY name",
    )
    .fetch_all(&services.db_pool)
    .await?;

    assert_eq!(tables, vec!["appointments", "shops", "users"]);
    assert!(services.redis_conn.is_none());
    assert_eq!(services.authenticator.token_store().backend_name(), "memory");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_redis_falls_back_to_memory_store() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("redis.db");
    // Port 1 is reserved and refuses connections.
    let config = build_config(sqlite_url(&db_path), Some("redis://127.0.0.1:1"));

    let services = initialise(&config).await?;
    assert!(
        services.redis_conn.is_none(),
        "redis connection errors should be tolerated"
    );
    assert_eq!(services.authenticator.token_store().backend_name(), "memory");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_redis_url_disables_redis() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("blank.db");
    let services = initialise(&build_config(sqlite_url(&db_path), Some("  "))).await?;
    assert!(services.redis_conn.is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_creates_sqlite_directory_if_missing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_dir = temp_dir.path().join("nested/deeper");
    let db_path = db_dir.join("prepared.db");

    assert!(!db_dir.exists());
    let services = initialise(&build_config(sqlite_url(&db_path), None)).await?;
    assert!(db_dir.exists(), "database directory should be created");
    assert!(db_path.exists(), "database file should be created");
    drop(services);
    Ok(())
}
