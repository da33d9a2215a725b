//! Service catalog repository.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::new_public_id;
use crate::entities::{CreateServiceRequest, Service, UpdateServiceRequest};
use crate::formats::now_rfc3339;
use crate::types::{DatabaseError, DatabaseResult};

const SERVICE_COLUMNS: &str = "id, public_id, shop_id, name, description, duration_minutes, price_cents, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct ServiceRepository {
    pool: SqlitePool,
}

impl ServiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a service; names are unique within a shop
    pub async fn create(&self, request: &CreateServiceRequest) -> DatabaseResult<Service> {
        let now = now_rfc3339();
        let result = sqlx::query(
            "INSERT INTO services (public_id, shop_id, name, description, duration_minutes, price_cents, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, true, ?, ?)",
        )
        .bind(new_public_id())
        .bind(request.shop_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.duration_minutes)
        .bind(request.price_cents)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_name(e, &request.name))?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| DatabaseError::InternalError("failed to retrieve created service".into()))
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Service>> {
        let row = sqlx::query(&format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_service).transpose()
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<Service>> {
        let row = sqlx::query(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_service).transpose()
    }

    pub async fn list_for_shop(
        &self,
        shop_id: i64,
        include_inactive: bool,
    ) -> DatabaseResult<Vec<Service>> {
        let rows = sqlx::query(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services
             WHERE shop_id = ? AND (? OR is_active = true)
             ORDER BY name"
        ))
        .bind(shop_id)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_service).collect()
    }

    pub async fn update(&self, id: i64, request: &UpdateServiceRequest) -> DatabaseResult<Service> {
        let result = sqlx::query(
            "UPDATE services SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                duration_minutes = COALESCE(?, duration_minutes),
                price_cents = COALESCE(?, price_cents),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.duration_minutes)
        .bind(request.price_cents)
        .bind(now_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_name(e, request.name.as_deref().unwrap_or_default()))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("service {id}")));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("service {id}")))
    }

    pub async fn set_active(&self, id: i64, is_active: bool) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE services SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(is_active)
            .bind(now_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("service {id}")));
        }
        Ok(())
    }
}

fn duplicate_name(error: sqlx::Error, name: &str) -> DatabaseError {
    match DatabaseError::from(error) {
        DatabaseError::Duplicate(_) => {
            DatabaseError::Duplicate(format!("service '{name}' already exists in this shop"))
        }
        other => other,
    }
}

fn map_service(row: &SqliteRow) -> DatabaseResult<Service> {
    Ok(Service {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        shop_id: row.try_get("shop_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        duration_minutes: row.try_get("duration_minutes")?,
        price_cents: row.try_get("price_cents")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
