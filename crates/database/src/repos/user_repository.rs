//! User repository for database operations.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::new_public_id;
use crate::entities::{CreateUserRequest, UpdateUserRequest, User, UserRole};
use crate::formats::now_rfc3339;
use crate::types::{DatabaseError, DatabaseResult};

const USER_COLUMNS: &str = "id, public_id, email, display_name, phone, role, is_active, created_at, updated_at, last_login_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Find user by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Find user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Find user by email together with the stored password hash
    pub async fn find_with_password_by_email(
        &self,
        email: &str,
    ) -> DatabaseResult<Option<(User, String)>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let user = map_user(&row)?;
                let hash: String = row.try_get("password_hash")?;
                Ok(Some((user, hash)))
            }
            None => Ok(None),
        }
    }

    /// Create new user
    pub async fn create(&self, request: &CreateUserRequest) -> DatabaseResult<User> {
        let now = now_rfc3339();
        let public_id = new_public_id();

        let result = sqlx::query(
            "INSERT INTO users (public_id, email, password_hash, display_name, phone, role, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, true, ?, ?)",
        )
        .bind(&public_id)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(&request.display_name)
        .bind(&request.phone)
        .bind(request.role.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            DatabaseError::Duplicate(_) => {
                DatabaseError::Duplicate(format!("email {} is already registered", request.email))
            }
            other => other,
        })?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| DatabaseError::InternalError("failed to retrieve created user".into()))
    }

    /// Update user fields that are present in the request
    pub async fn update(&self, user_id: i64, request: &UpdateUserRequest) -> DatabaseResult<User> {
        let result = sqlx::query(
            "UPDATE users SET
                display_name = COALESCE(?, display_name),
                phone = COALESCE(?, phone),
                role = COALESCE(?, role),
                is_active = COALESCE(?, is_active),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&request.display_name)
        .bind(&request.phone)
        .bind(request.role.map(|role| role.as_str()))
        .bind(request.is_active)
        .bind(now_rfc3339())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {user_id}")));
        }

        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {user_id}")))
    }

    /// Record a successful login
    pub async fn touch_last_login(&self, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(now_rfc3339())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn map_user(row: &SqliteRow) -> DatabaseResult<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        phone: row.try_get("phone")?,
        role: UserRole::from(role.as_str()),
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_login_at: row.try_get("last_login_at")?,
    })
}
