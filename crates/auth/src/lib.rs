//! Account registration, password login and token management.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use reservo_config::AuthConfig;
use reservo_database::{CreateUserRequest, DatabaseError, User, UserRepository, UserRole};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod jwt;
pub mod password;
pub mod token_store;
pub mod validation;

pub use jwt::{Claims, JwtManager};
pub use token_store::{MemoryTokenStore, TokenStore};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    UserExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("invalid access token: {0}")]
    InvalidToken(String),
    #[error("role {0} cannot be chosen at registration")]
    RoleNotAllowed(UserRole),
    #[error("{0}")]
    Validation(String),
    #[error("token creation failed: {0}")]
    TokenCreation(String),
    #[error("token store error: {0}")]
    TokenStore(String),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Access token plus the refresh token that can replace it
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Clone)]
pub struct Authenticator {
    users: UserRepository,
    jwt: JwtManager,
    tokens: TokenStore,
    refresh_ttl: Duration,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: &AuthConfig, tokens: TokenStore) -> Self {
        let jwt = JwtManager::new(
            &config.jwt_secret,
            config.issuer.clone(),
            config.audience.clone(),
        )
        .with_duration(Duration::from_secs(config.access_token_ttl_seconds));

        Self {
            users: UserRepository::new(pool),
            jwt,
            tokens,
            refresh_ttl: Duration::from_secs(config.refresh_token_ttl_seconds),
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    pub async fn register(&self, registration: Registration) -> Result<AuthSession, AuthError> {
        let email = registration.email.trim().to_lowercase();
        let display_name = registration.display_name.trim().to_string();

        validation::validate_email(&email)?;
        validation::validate_password(&registration.password)?;
        validation::validate_display_name(&display_name)?;
        if let Some(phone) = registration.phone.as_deref() {
            validation::validate_phone(phone)?;
        }

        let role = registration.role.unwrap_or(UserRole::Customer);
        if role == UserRole::Admin {
            return Err(AuthError::RoleNotAllowed(role));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let password_hash = password::hash_password(&registration.password)?;
        let user = self
            .users
            .create(&CreateUserRequest {
                email,
                password_hash,
                display_name,
                phone: registration.phone,
                role,
            })
            .await
            .map_err(|err| match err {
                DatabaseError::Duplicate(_) => AuthError::UserExists,
                other => AuthError::Database(other),
            })?;

        info!(user = %user.public_id, role = %user.role, "registered user");
        let tokens = self.issue_tokens(&user).await?;
        Ok(AuthSession { user, tokens })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = email.trim().to_lowercase();
        let Some((user, hash)) = self.users.find_with_password_by_email(&email).await? else {
            debug!("login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(password, &hash)? || !user.is_active {
            warn!(user = %user.public_id, "rejected login");
            return Err(AuthError::InvalidCredentials);
        }

        self.users.touch_last_login(user.id).await?;
        info!(user = %user.public_id, "user logged in");

        let tokens = self.issue_tokens(&user).await?;
        Ok(AuthSession { user, tokens })
    }

    /// Exchange a refresh token for a new pair. The old token is consumed.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let subject = self
            .tokens
            .take(refresh_token)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_public_id(&subject)
            .await?
            .filter(|user| user.is_active)
            .ok_or(AuthError::InvalidRefreshToken)?;

        debug!(user = %user.public_id, "rotated refresh token");
        let tokens = self.issue_tokens(&user).await?;
        Ok(AuthSession { user, tokens })
    }

    /// Revoke one of `user`'s refresh tokens. Unknown tokens are ignored;
    /// tokens issued to someone else are refused.
    pub async fn logout(&self, user: &User, refresh_token: &str) -> Result<(), AuthError> {
        match self.tokens.subject(refresh_token).await? {
            Some(subject) if subject != user.public_id => Err(AuthError::InvalidRefreshToken),
            Some(_) => self.tokens.revoke(refresh_token).await,
            None => Ok(()),
        }
    }

    /// Resolve an access token to its active user
    pub async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let claims = self.jwt.validate_token(access_token)?;

        self.users
            .find_by_public_id(&claims.sub)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AuthError::InvalidToken("unknown or inactive user".to_string()))
    }

    pub async fn user_profile(&self, public_id: &str) -> Result<User, AuthError> {
        self.users
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| AuthError::Database(DatabaseError::NotFound(format!("user {public_id}"))))
    }

    async fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        let access_token = self.jwt.generate_token(&user.public_id, user.role.as_str())?;
        let refresh_token = generate_refresh_token();

        self.tokens
            .put(&refresh_token, &user.public_id, self.refresh_ttl)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.jwt.token_duration().as_secs(),
        })
    }
}

fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
