use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "reservo.toml",
    "config/reservo.toml",
    "crates/config/reservo.toml",
    "../reservo.toml",
    "../config/reservo.toml",
    "../crates/config/reservo.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://reservo.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Token signing and lifetime settings.
///
/// ```
/// use reservo_config::AuthConfig;
///
/// let auth = AuthConfig::default();
/// assert_eq!(auth.access_token_ttl_seconds, 900);
/// assert_eq!(auth.refresh_token_ttl_seconds, 1_209_600);
/// assert_eq!(auth.issuer, "reservo");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "AuthConfig::default_issuer")]
    pub issuer: String,
    #[serde(default = "AuthConfig::default_audience")]
    pub audience: String,
    #[serde(default = "AuthConfig::default_access_ttl")]
    pub access_token_ttl_seconds: u64,
    #[serde(default = "AuthConfig::default_refresh_ttl")]
    pub refresh_token_ttl_seconds: u64,
}

impl AuthConfig {
    fn default_issuer() -> String {
        "reservo".to_string()
    }

    fn default_audience() -> String {
        "reservo-api".to_string()
    }

    const fn default_access_ttl() -> u64 {
        900
    }

    const fn default_refresh_ttl() -> u64 {
        14 * 24 * 60 * 60
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development_secret_change_in_production".to_string(),
            issuer: Self::default_issuer(),
            audience: Self::default_audience(),
            access_token_ttl_seconds: Self::default_access_ttl(),
            refresh_token_ttl_seconds: Self::default_refresh_ttl(),
        }
    }
}

/// Key-value cache used for refresh tokens. An empty or missing URL disables Redis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub redis_url: Option<String>,
}

impl CacheConfig {
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: Some("redis://127.0.0.1:6379".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default = "BookingConfig::default_slot_interval")]
    pub default_slot_interval_minutes: u32,
    #[serde(default = "BookingConfig::default_max_advance_days")]
    pub max_advance_days: u32,
    #[serde(default)]
    pub min_notice_minutes: u32,
}

impl BookingConfig {
    const fn default_slot_interval() -> u32 {
        15
    }

    const fn default_max_advance_days() -> u32 {
        60
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_slot_interval_minutes: Self::default_slot_interval(),
            max_advance_days: Self::default_max_advance_days(),
            min_notice_minutes: 0,
        }
    }
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use reservo_config::load;
///
/// std::env::remove_var("RESERVO_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.jwt_secret", defaults.auth.jwt_secret.clone())?
        .set_default("auth.issuer", defaults.auth.issuer.clone())?
        .set_default("auth.audience", defaults.auth.audience.clone())?
        .set_default(
            "auth.access_token_ttl_seconds",
            clamp_to_i64(defaults.auth.access_token_ttl_seconds),
        )?
        .set_default(
            "auth.refresh_token_ttl_seconds",
            clamp_to_i64(defaults.auth.refresh_token_ttl_seconds),
        )?
        .set_default(
            "booking.default_slot_interval_minutes",
            i64::from(defaults.booking.default_slot_interval_minutes),
        )?
        .set_default(
            "booking.max_advance_days",
            i64::from(defaults.booking.max_advance_days),
        )?
        .set_default(
            "booking.min_notice_minutes",
            i64::from(defaults.booking.min_notice_minutes),
        )?;

    if let Some(redis_url) = defaults.cache.redis_url.clone() {
        builder = builder.set_default("cache.redis_url", redis_url)?;
    }

    let environment_overrides = config::Environment::with_prefix("RESERVO")
        .separator("__")
        .try_parsing(true);

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("RESERVO_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via RESERVO_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    validate(&config)?;

    debug!(
        http = ?config.http,
        database = ?config.database,
        booking = ?config.booking,
        "loaded backend configuration"
    );
    Ok(config)
}

fn validate(config: &AppConfig) -> anyhow::Result<()> {
    if config.auth.jwt_secret.len() < 16 {
        anyhow::bail!("auth.jwt_secret must be at least 16 characters");
    }
    if config.auth.access_token_ttl_seconds == 0 || config.auth.refresh_token_ttl_seconds == 0 {
        anyhow::bail!("token lifetimes must be greater than zero");
    }
    if !(5..=240).contains(&config.booking.default_slot_interval_minutes) {
        anyhow::bail!("booking.default_slot_interval_minutes must be between 5 and 240");
    }
    Ok(())
}
