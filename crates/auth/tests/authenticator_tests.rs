use std::time::Duration;

use reservo_auth::{AuthError, Authenticator, MemoryTokenStore, Registration, TokenStore};
use reservo_config::{AuthConfig, DatabaseConfig};
use reservo_database::{initialize_database, UpdateUserRequest, UserRepository, UserRole};
use sqlx::SqlitePool;
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration_test_secret_value".to_string(),
        issuer: "reservo-test".to_string(),
        audience: "reservo-test-api".to_string(),
        access_token_ttl_seconds: 600,
        refresh_token_ttl_seconds: 3_600,
    }
}

struct TestContext {
    pool: SqlitePool,
    authenticator: Authenticator,
    store: MemoryTokenStore,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        Self::with_config(auth_config()).await
    }

    async fn with_config(config: AuthConfig) -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("auth.sqlite");
        let pool = initialize_database(&DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 4,
        })
        .await?;

        let store = MemoryTokenStore::default();
        let authenticator =
            Authenticator::new(pool.clone(), &config, TokenStore::Memory(store.clone()));

        Ok(Self {
            pool,
            authenticator,
            store,
            _temp_dir: temp_dir,
        })
    }
}

fn registration(email: &str) -> Registration {
    Registration {
        email: email.to_string(),
        password: "Sup3rSecret".to_string(),
        display_name: "Ada Lovelace".to_string(),
        phone: None,
        role: None,
    }
}

#[tokio::test]
async fn register_then_login_issue_usable_tokens() -> TestResult {
    let ctx = TestContext::new().await?;

    let registered = ctx.authenticator.register(registration("Ada@Example.com")).await?;
    assert_eq!(registered.user.email, "ada@example.com");
    assert_eq!(registered.user.role, UserRole::Customer);
    assert_eq!(registered.tokens.token_type, "Bearer");
    assert_eq!(registered.tokens.expires_in, 600);

    let user = ctx
        .authenticator
        .authenticate(&registered.tokens.access_token)
        .await?;
    assert_eq!(user.public_id, registered.user.public_id);

    let session = ctx
        .authenticator
        .login("ada@example.com", "Sup3rSecret")
        .await?;
    assert_eq!(session.user.public_id, registered.user.public_id);
    assert!(session.user.last_login_at.is_none());

    let profile = ctx
        .authenticator
        .user_profile(&registered.user.public_id)
        .await?;
    assert!(profile.last_login_at.is_some());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.authenticator.register(registration("ada@example.com")).await?;

    let err = ctx
        .authenticator
        .register(registration("ADA@example.com"))
        .await
        .expect_err("duplicate registration must fail");
    assert!(matches!(err, AuthError::UserExists));
    Ok(())
}

#[tokio::test]
async fn admin_role_cannot_be_self_assigned() -> TestResult {
    let ctx = TestContext::new().await?;

    let mut request = registration("root@example.com");
    request.role = Some(UserRole::Admin);
    let err = ctx.authenticator.register(request).await.expect_err("admin must be refused");
    assert!(matches!(err, AuthError::RoleNotAllowed(UserRole::Admin)));

    let mut owner = registration("owner@example.com");
    owner.role = Some(UserRole::ShopOwner);
    let session = ctx.authenticator.register(owner).await?;
    assert_eq!(session.user.role, UserRole::ShopOwner);
    Ok(())
}

#[tokio::test]
async fn weak_passwords_and_bad_emails_fail_validation() -> TestResult {
    let ctx = TestContext::new().await?;

    let mut weak = registration("ada@example.com");
    weak.password = "password".to_string();
    assert!(matches!(
        ctx.authenticator.register(weak).await,
        Err(AuthError::Validation(_))
    ));

    assert!(matches!(
        ctx.authenticator.register(registration("not-an-email")).await,
        Err(AuthError::Validation(_))
    ));
    Ok(())
}

#[tokio::test]
async fn login_failures_are_indistinguishable() -> TestResult {
    let ctx = TestContext::new().await?;
    let session = ctx.authenticator.register(registration("ada@example.com")).await?;

    let wrong_password = ctx.authenticator.login("ada@example.com", "Wrong1234").await;
    assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));

    let unknown = ctx.authenticator.login("nobody@example.com", "Sup3rSecret").await;
    assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));

    UserRepository::new(ctx.pool.clone())
        .update(
            session.user.id,
            &UpdateUserRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;
    let inactive = ctx.authenticator.login("ada@example.com", "Sup3rSecret").await;
    assert!(matches!(inactive, Err(AuthError::InvalidCredentials)));

    // Existing access tokens stop working for deactivated accounts too.
    assert!(matches!(
        ctx.authenticator.authenticate(&session.tokens.access_token).await,
        Err(AuthError::InvalidToken(_))
    ));
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_and_rejects_reuse() -> TestResult {
    let ctx = TestContext::new().await?;
    let session = ctx.authenticator.register(registration("ada@example.com")).await?;

    let rotated = ctx.authenticator.refresh(&session.tokens.refresh_token).await?;
    assert_ne!(rotated.tokens.refresh_token, session.tokens.refresh_token);
    assert_eq!(rotated.user.public_id, session.user.public_id);

    let reused = ctx.authenticator.refresh(&session.tokens.refresh_token).await;
    assert!(matches!(reused, Err(AuthError::InvalidRefreshToken)));

    ctx.authenticator.refresh(&rotated.tokens.refresh_token).await?;
    Ok(())
}

#[tokio::test]
async fn logout_revokes_refresh_token() -> TestResult {
    let ctx = TestContext::new().await?;
    let session = ctx.authenticator.register(registration("ada@example.com")).await?;
    assert_eq!(ctx.store.len().await, 1);

    ctx.authenticator
        .logout(&session.user, &session.tokens.refresh_token)
        .await?;
    ctx.authenticator
        .logout(&session.user, &session.tokens.refresh_token)
        .await?;
    assert_eq!(ctx.store.len().await, 0);

    let err = ctx
        .authenticator
        .refresh(&session.tokens.refresh_token)
        .await
        .expect_err("revoked token must not refresh");
    assert!(matches!(err, AuthError::InvalidRefreshToken));
    Ok(())
}

#[tokio::test]
async fn logout_cannot_revoke_another_users_token() -> TestResult {
    let ctx = TestContext::new().await?;
    let ada = ctx.authenticator.register(registration("ada@example.com")).await?;
    let bob = ctx.authenticator.register(registration("bob@example.com")).await?;

    let err = ctx
        .authenticator
        .logout(&bob.user, &ada.tokens.refresh_token)
        .await
        .expect_err("foreign refresh token must be refused");
    assert!(matches!(err, AuthError::InvalidRefreshToken));
    assert_eq!(ctx.store.len().await, 2);

    let refreshed = ctx.authenticator.refresh(&ada.tokens.refresh_token).await?;
    assert_eq!(refreshed.user.public_id, ada.user.public_id);
    Ok(())
}

#[tokio::test]
async fn refresh_tokens_expire() -> TestResult {
    let mut config = auth_config();
    config.refresh_token_ttl_seconds = 1;
    let ctx = TestContext::with_config(config).await?;
    let session = ctx.authenticator.register(registration("ada@example.com")).await?;

    tokio::time::sleep(Duration::from_millis(1_100)).await;

    let err = ctx
        .authenticator
        .refresh(&session.tokens.refresh_token)
        .await
        .expect_err("expired token must not refresh");
    assert!(matches!(err, AuthError::InvalidRefreshToken));
    Ok(())
}

#[tokio::test]
async fn tampered_access_token_is_rejected() -> TestResult {
    let ctx = TestContext::new().await?;
    let session = ctx.authenticator.register(registration("ada@example.com")).await?;

    let mut token = session.tokens.access_token.clone();
    token.push('x');
    assert!(matches!(
        ctx.authenticator.authenticate(&token).await,
        Err(AuthError::InvalidToken(_))
    ));
    Ok(())
}
