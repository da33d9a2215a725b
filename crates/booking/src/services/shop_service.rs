//! Shop (tenant) management.

use reservo_config::BookingConfig;
use reservo_database::{CreateShopRequest, Shop, ShopRepository, UpdateShopRequest, User};
use sqlx::SqlitePool;
use tracing::info;

use crate::types::{BookingError, BookingResult, NewShop, ShopChanges};
use crate::utils::validation::{validate_capacity, validate_name, validate_slot_interval};
use crate::utils::PermissionChecker;

#[derive(Clone)]
pub struct ShopService {
    shops: ShopRepository,
    default_slot_interval: i64,
}

impl ShopService {
    pub fn new(pool: SqlitePool, config: &BookingConfig) -> Self {
        Self {
            shops: ShopRepository::new(pool),
            default_slot_interval: i64::from(config.default_slot_interval_minutes),
        }
    }

    pub async fn create(&self, actor: &User, request: NewShop) -> BookingResult<Shop> {
        PermissionChecker::can_create_shop(actor)?;
        validate_name("name", &request.name)?;

        let slot_interval_minutes = request
            .slot_interval_minutes
            .unwrap_or(self.default_slot_interval);
        validate_slot_interval(slot_interval_minutes)?;
        let capacity = request.capacity.unwrap_or(1);
        validate_capacity(capacity)?;

        let shop = self
            .shops
            .create(&CreateShopRequest {
                owner_id: actor.id,
                name: request.name.trim().to_string(),
                description: request.description,
                address: request.address,
                phone: request.phone,
                slot_interval_minutes,
                capacity,
            })
            .await?;

        info!(shop = %shop.public_id, owner = %actor.public_id, "shop created");
        Ok(shop)
    }

    /// Active shop by public id
    pub async fn get(&self, public_id: &str) -> BookingResult<Shop> {
        self.shops
            .find_by_public_id(public_id)
            .await?
            .filter(|shop| shop.is_active)
            .ok_or_else(|| BookingError::not_found(format!("shop {public_id}")))
    }

    /// Shop the actor manages, including deactivated ones
    pub async fn get_managed(&self, actor: &User, public_id: &str) -> BookingResult<Shop> {
        let shop = self
            .shops
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| BookingError::not_found(format!("shop {public_id}")))?;
        PermissionChecker::can_manage_shop(actor, &shop)?;
        Ok(shop)
    }

    /// Public directory of active shops
    pub async fn list(&self) -> BookingResult<Vec<Shop>> {
        Ok(self.shops.list(None, false).await?)
    }

    /// Shops owned by the actor, active or not
    pub async fn list_owned(&self, actor: &User) -> BookingResult<Vec<Shop>> {
        Ok(self.shops.list(Some(actor.id), true).await?)
    }

    pub async fn update(
        &self,
        actor: &User,
        public_id: &str,
        changes: ShopChanges,
    ) -> BookingResult<Shop> {
        let shop = self.get_managed(actor, public_id).await?;

        if let Some(name) = changes.name.as_deref() {
            validate_name("name", name)?;
        }
        if let Some(interval) = changes.slot_interval_minutes {
            validate_slot_interval(interval)?;
        }
        if let Some(capacity) = changes.capacity {
            validate_capacity(capacity)?;
        }

        let updated = self
            .shops
            .update(
                shop.id,
                &UpdateShopRequest {
                    name: changes.name.map(|name| name.trim().to_string()),
                    description: changes.description,
                    address: changes.address,
                    phone: changes.phone,
                    slot_interval_minutes: changes.slot_interval_minutes,
                    capacity: changes.capacity,
                },
            )
            .await?;

        info!(shop = %updated.public_id, "shop updated");
        Ok(updated)
    }

    /// Deleting a shop only deactivates it; its history stays readable
    pub async fn deactivate(&self, actor: &User, public_id: &str) -> BookingResult<()> {
        let shop = self.get_managed(actor, public_id).await?;
        self.shops.set_active(shop.id, false).await?;
        info!(shop = %shop.public_id, "shop deactivated");
        Ok(())
    }
}
