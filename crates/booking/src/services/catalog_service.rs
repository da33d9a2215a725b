//! Services offered by a shop.

use reservo_database::{
    CreateServiceRequest, Service, ServiceRepository, Shop, ShopRepository, UpdateServiceRequest,
    User,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::types::{BookingError, BookingResult, NewService, ServiceChanges};
use crate::utils::validation::{validate_duration, validate_name, validate_price};
use crate::utils::PermissionChecker;

#[derive(Clone)]
pub struct CatalogService {
    shops: ShopRepository,
    services: ServiceRepository,
}

impl CatalogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            shops: ShopRepository::new(pool.clone()),
            services: ServiceRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        actor: &User,
        shop_id: &str,
        request: NewService,
    ) -> BookingResult<Service> {
        let shop = self.managed_shop(actor, shop_id).await?;
        validate_name("name", &request.name)?;
        validate_duration(request.duration_minutes)?;
        validate_price(request.price_cents)?;

        let service = self
            .services
            .create(&CreateServiceRequest {
                shop_id: shop.id,
                name: request.name.trim().to_string(),
                description: request.description,
                duration_minutes: request.duration_minutes,
                price_cents: request.price_cents,
            })
            .await?;

        info!(shop = %shop.public_id, service = %service.public_id, "service created");
        Ok(service)
    }

    /// Active services of an active shop
    pub async fn list(&self, shop_id: &str) -> BookingResult<Vec<Service>> {
        let shop = self
            .shops
            .find_by_public_id(shop_id)
            .await?
            .filter(|shop| shop.is_active)
            .ok_or_else(|| BookingError::not_found(format!("shop {shop_id}")))?;
        Ok(self.services.list_for_shop(shop.id, false).await?)
    }

    /// Active service of the given shop
    pub async fn get(&self, shop: &Shop, service_id: &str) -> BookingResult<Service> {
        self.services
            .find_by_public_id(service_id)
            .await?
            .filter(|service| service.shop_id == shop.id && service.is_active)
            .ok_or_else(|| BookingError::not_found(format!("service {service_id}")))
    }

    pub async fn update(
        &self,
        actor: &User,
        shop_id: &str,
        service_id: &str,
        changes: ServiceChanges,
    ) -> BookingResult<Service> {
        let shop = self.managed_shop(actor, shop_id).await?;
        let service = self.owned_service(&shop, service_id).await?;

        if let Some(name) = changes.name.as_deref() {
            validate_name("name", name)?;
        }
        if let Some(duration) = changes.duration_minutes {
            validate_duration(duration)?;
        }
        if let Some(price) = changes.price_cents {
            validate_price(price)?;
        }

        let updated = self
            .services
            .update(
                service.id,
                &UpdateServiceRequest {
                    name: changes.name.map(|name| name.trim().to_string()),
                    description: changes.description,
                    duration_minutes: changes.duration_minutes,
                    price_cents: changes.price_cents,
                },
            )
            .await?;

        info!(service = %updated.public_id, "service updated");
        Ok(updated)
    }

    pub async fn deactivate(
        &self,
        actor: &User,
        shop_id: &str,
        service_id: &str,
    ) -> BookingResult<()> {
        let shop = self.managed_shop(actor, shop_id).await?;
        let service = self.owned_service(&shop, service_id).await?;
        self.services.set_active(service.id, false).await?;
        info!(service = %service.public_id, "service deactivated");
        Ok(())
    }

    async fn managed_shop(&self, actor: &User, shop_id: &str) -> BookingResult<Shop> {
        let shop = self
            .shops
            .find_by_public_id(shop_id)
            .await?
            .ok_or_else(|| BookingError::not_found(format!("shop {shop_id}")))?;
        PermissionChecker::can_manage_shop(actor, &shop)?;
        Ok(shop)
    }

    async fn owned_service(&self, shop: &Shop, service_id: &str) -> BookingResult<Service> {
        self.services
            .find_by_public_id(service_id)
            .await?
            .filter(|service| service.shop_id == shop.id)
            .ok_or_else(|| BookingError::not_found(format!("service {service_id}")))
    }
}
