//! Shop repository for database operations.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::new_public_id;
use crate::entities::{CreateShopRequest, Shop, UpdateShopRequest};
use crate::formats::now_rfc3339;
use crate::types::{DatabaseError, DatabaseResult};

const SHOP_SELECT: &str = "SELECT s.id, s.public_id, s.owner_id, u.public_id AS owner_public_id, s.name,
        s.description, s.address, s.phone, s.slot_interval_minutes, s.capacity, s.is_active,
        s.created_at, s.updated_at
     FROM shops s JOIN users u ON u.id = s.owner_id";

/// Repository for shop database operations
#[derive(Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateShopRequest) -> DatabaseResult<Shop> {
        let now = now_rfc3339();
        let result = sqlx::query(
            "INSERT INTO shops (public_id, owner_id, name, description, address, phone, slot_interval_minutes, capacity, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, true, ?, ?)",
        )
        .bind(new_public_id())
        .bind(request.owner_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.address)
        .bind(&request.phone)
        .bind(request.slot_interval_minutes)
        .bind(request.capacity)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| DatabaseError::InternalError("failed to retrieve created shop".into()))
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Shop>> {
        let row = sqlx::query(&format!("{SHOP_SELECT} WHERE s.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_shop).transpose()
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<Shop>> {
        let row = sqlx::query(&format!("{SHOP_SELECT} WHERE s.public_id = ?"))
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_shop).transpose()
    }

    /// List shops, optionally restricted to one owner. Inactive shops are
    /// only returned when `include_inactive` is set.
    pub async fn list(
        &self,
        owner_id: Option<i64>,
        include_inactive: bool,
    ) -> DatabaseResult<Vec<Shop>> {
        let rows = sqlx::query(&format!(
            "{SHOP_SELECT}
             WHERE (? IS NULL OR s.owner_id = ?) AND (? OR s.is_active = true)
             ORDER BY s.name, s.id"
        ))
        .bind(owner_id)
        .bind(owner_id)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_shop).collect()
    }

    pub async fn update(&self, id: i64, request: &UpdateShopRequest) -> DatabaseResult<Shop> {
        let result = sqlx::query(
            "UPDATE shops SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                address = COALESCE(?, address),
                phone = COALESCE(?, phone),
                slot_interval_minutes = COALESCE(?, slot_interval_minutes),
                capacity = COALESCE(?, capacity),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.address)
        .bind(&request.phone)
        .bind(request.slot_interval_minutes)
        .bind(request.capacity)
        .bind(now_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("shop {id}")));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("shop {id}")))
    }

    /// Toggle the active flag; deleting a shop deactivates it
    pub async fn set_active(&self, id: i64, is_active: bool) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE shops SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(is_active)
            .bind(now_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("shop {id}")));
        }
        Ok(())
    }
}

fn map_shop(row: &SqliteRow) -> DatabaseResult<Shop> {
    Ok(Shop {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        owner_id: row.try_get("owner_id")?,
        owner_public_id: row.try_get("owner_public_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        address: row.try_get("address")?,
        phone: row.try_get("phone")?,
        slot_interval_minutes: row.try_get("slot_interval_minutes")?,
        capacity: row.try_get("capacity")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
