//! Shared application state for the gateway

use reservo_auth::Authenticator;
use reservo_booking::BookingServices;
use reservo_database::User;
use sqlx::SqlitePool;

use crate::error::GatewayResult;

/// Services shared by every handler
#[derive(Clone)]
pub struct GatewayState {
    pool: SqlitePool,
    authenticator: Authenticator,
    booking: BookingServices,
}

impl GatewayState {
    pub fn new(pool: SqlitePool, authenticator: Authenticator, booking: BookingServices) -> Self {
        Self {
            pool,
            authenticator,
            booking,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn booking(&self) -> &BookingServices {
        &self.booking
    }

    /// Resolve a bearer token to its active user
    pub async fn authenticate(&self, token: &str) -> GatewayResult<User> {
        Ok(self.authenticator.authenticate(token).await?)
    }
}
