//! Permission checking utilities.

use reservo_database::{Appointment, Shop, User, UserRole};

use crate::types::{BookingError, BookingResult};

/// Who may do what with shops and appointments
pub struct PermissionChecker;

impl PermissionChecker {
    /// Shop owners and admins may open shops
    pub fn can_create_shop(user: &User) -> BookingResult<()> {
        match user.role {
            UserRole::ShopOwner | UserRole::Admin => Ok(()),
            UserRole::Customer => Err(BookingError::forbidden(
                "only shop owners can create shops",
            )),
        }
    }

    /// The owner of a shop, or an admin
    pub fn can_manage_shop(user: &User, shop: &Shop) -> BookingResult<()> {
        if user.is_admin() || shop.owner_id == user.id {
            return Ok(());
        }
        Err(BookingError::forbidden("you do not manage this shop"))
    }

    /// Confirm and complete are for the shop side
    pub fn can_operate_appointment(user: &User, appointment: &Appointment) -> BookingResult<()> {
        if user.is_admin() || appointment.shop_owner_id == user.id {
            return Ok(());
        }
        Err(BookingError::forbidden(
            "only the shop owner can perform this action",
        ))
    }

    /// Viewing, cancelling and rescheduling are open to both parties
    pub fn can_access_appointment(user: &User, appointment: &Appointment) -> BookingResult<()> {
        if user.is_admin()
            || appointment.customer_id == user.id
            || appointment.shop_owner_id == user.id
        {
            return Ok(());
        }
        Err(BookingError::forbidden("not a participant of this appointment"))
    }
}
