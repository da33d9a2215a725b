//! Booking and the appointment workflow.
//!
//! Every write re-validates the requested time against the computed slots
//! and then goes through the repository's transactional capacity check, so a
//! slot shown as free can still be refused if someone else took it first.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use reservo_config::BookingConfig;
use reservo_database::{
    Appointment, AppointmentRepository, AppointmentStatus, CreateAppointmentRequest,
    NotificationType, Service, ServiceRepository, Shop, User,
};
use sqlx::SqlitePool;
use tracing::info;

use super::{AvailabilityService, CatalogService, NotificationService, ShopService};
use crate::clock::Clock;
use crate::lifecycle::ensure_transition;
use crate::slots::Slot;
use crate::types::{BookingError, BookingResult, NewAppointment};
use crate::utils::PermissionChecker;

const MAX_NOTE_LENGTH: usize = 500;

#[derive(Clone)]
pub struct AppointmentService {
    shops: ShopService,
    catalog: CatalogService,
    services: ServiceRepository,
    availability: AvailabilityService,
    appointments: AppointmentRepository,
    notifications: NotificationService,
}

impl AppointmentService {
    pub fn new(pool: SqlitePool, config: &BookingConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            shops: ShopService::new(pool.clone(), config),
            catalog: CatalogService::new(pool.clone()),
            services: ServiceRepository::new(pool.clone()),
            availability: AvailabilityService::new(pool.clone(), config, clock),
            appointments: AppointmentRepository::new(pool.clone()),
            notifications: NotificationService::new(pool),
        }
    }

    /// Book `request.start_at` for the actor. The start must be one of the
    /// day's available slot starts; the appointment begins `pending`.
    pub async fn book(&self, actor: &User, request: NewAppointment) -> BookingResult<Appointment> {
        let shop = self.shops.get(&request.shop_id).await?;
        let service = self.catalog.get(&shop, &request.service_id).await?;
        let notes = normalize_notes(request.notes)?;

        let slot = self
            .find_slot(&shop, &service, request.start_at, None)
            .await?;

        let appointment = self
            .appointments
            .insert_if_free(&CreateAppointmentRequest {
                shop_id: shop.id,
                service_id: service.id,
                customer_id: actor.id,
                start_at: slot.start,
                end_at: slot.end,
                notes,
            })
            .await?;

        info!(
            appointment = %appointment.public_id,
            shop = %shop.public_id,
            customer = %actor.public_id,
            start = %appointment.start_at,
            "appointment booked"
        );

        if shop.owner_id != actor.id {
            self.notifications
                .notify(
                    shop.owner_id,
                    NotificationType::AppointmentRequested,
                    "New appointment request",
                    format!("{} requested {}", appointment.customer_name, describe(&appointment)),
                    Some(appointment.id),
                )
                .await;
        }

        Ok(appointment)
    }

    pub async fn confirm(&self, actor: &User, appointment_id: &str) -> BookingResult<Appointment> {
        let appointment = self.load(appointment_id).await?;
        PermissionChecker::can_operate_appointment(actor, &appointment)?;

        let updated = self
            .change_status(&appointment, AppointmentStatus::Confirmed, None)
            .await?;
        self.notify_counterparties(
            actor,
            &updated,
            NotificationType::AppointmentConfirmed,
            "Appointment confirmed",
            format!("{} is confirmed", describe(&updated)),
        )
        .await;
        Ok(updated)
    }

    pub async fn complete(&self, actor: &User, appointment_id: &str) -> BookingResult<Appointment> {
        let appointment = self.load(appointment_id).await?;
        PermissionChecker::can_operate_appointment(actor, &appointment)?;

        let updated = self
            .change_status(&appointment, AppointmentStatus::Completed, None)
            .await?;
        self.notify_counterparties(
            actor,
            &updated,
            NotificationType::AppointmentCompleted,
            "Appointment completed",
            format!("{} was completed", describe(&updated)),
        )
        .await;
        Ok(updated)
    }

    pub async fn cancel(
        &self,
        actor: &User,
        appointment_id: &str,
        reason: Option<String>,
    ) -> BookingResult<Appointment> {
        let appointment = self.load(appointment_id).await?;
        PermissionChecker::can_access_appointment(actor, &appointment)?;
        let reason = normalize_notes(reason)?;

        let updated = self
            .change_status(&appointment, AppointmentStatus::Cancelled, reason.as_deref())
            .await?;

        let mut message = format!("{} was cancelled by {}", describe(&updated), actor.display_name);
        if let Some(reason) = reason.as_deref() {
            message.push_str(&format!(": {reason}"));
        }
        self.notify_counterparties(
            actor,
            &updated,
            NotificationType::AppointmentCancelled,
            "Appointment cancelled",
            message,
        )
        .await;
        Ok(updated)
    }

    /// Move an appointment to another available slot. The appointment's own
    /// interval does not count as occupied. The result is `rescheduled` and
    /// needs a fresh confirmation from the shop.
    pub async fn reschedule(
        &self,
        actor: &User,
        appointment_id: &str,
        new_start: NaiveDateTime,
    ) -> BookingResult<Appointment> {
        let appointment = self.load(appointment_id).await?;
        PermissionChecker::can_access_appointment(actor, &appointment)?;
        ensure_transition(appointment.status, AppointmentStatus::Rescheduled)?;

        let shop = self.shops.get(&appointment.shop_public_id).await?;
        let service = self
            .services
            .find_by_id(appointment.service_id)
            .await?
            .ok_or_else(|| BookingError::not_found(format!("service {}", appointment.service_public_id)))?;

        let slot = self
            .find_slot(&shop, &service, new_start, Some(appointment.id))
            .await?;

        let updated = self
            .appointments
            .reschedule_if_free(appointment.id, appointment.status, slot.start, slot.end)
            .await?;

        info!(
            appointment = %updated.public_id,
            from = %appointment.start_at,
            to = %updated.start_at,
            actor = %actor.public_id,
            "appointment rescheduled"
        );

        self.notify_counterparties(
            actor,
            &updated,
            NotificationType::AppointmentRescheduled,
            "Appointment rescheduled",
            format!(
                "{} moved {} from {}",
                actor.display_name,
                describe(&updated),
                appointment.start_at.format("%Y-%m-%d %H:%M")
            ),
        )
        .await;
        Ok(updated)
    }

    /// An appointment visible to the actor
    pub async fn get(&self, actor: &User, appointment_id: &str) -> BookingResult<Appointment> {
        let appointment = self.load(appointment_id).await?;
        PermissionChecker::can_access_appointment(actor, &appointment)?;
        Ok(appointment)
    }

    pub async fn list_for_customer(&self, actor: &User) -> BookingResult<Vec<Appointment>> {
        Ok(self.appointments.list_for_customer(actor.id).await?)
    }

    pub async fn list_for_shop(
        &self,
        actor: &User,
        shop_id: &str,
        date: Option<NaiveDate>,
        status: Option<AppointmentStatus>,
    ) -> BookingResult<Vec<Appointment>> {
        let shop = self.shops.get_managed(actor, shop_id).await?;
        Ok(self.appointments.list_for_shop(shop.id, date, status).await?)
    }

    async fn load(&self, appointment_id: &str) -> BookingResult<Appointment> {
        self.appointments
            .find_by_public_id(appointment_id)
            .await?
            .ok_or_else(|| BookingError::not_found(format!("appointment {appointment_id}")))
    }

    async fn change_status(
        &self,
        appointment: &Appointment,
        to: AppointmentStatus,
        reason: Option<&str>,
    ) -> BookingResult<Appointment> {
        ensure_transition(appointment.status, to)?;
        let updated = self
            .appointments
            .update_status(appointment.id, appointment.status, to, reason)
            .await?;
        info!(
            appointment = %updated.public_id,
            from = %appointment.status,
            to = %updated.status,
            "appointment status changed"
        );
        Ok(updated)
    }

    async fn find_slot(
        &self,
        shop: &Shop,
        service: &Service,
        start_at: NaiveDateTime,
        ignore: Option<i64>,
    ) -> BookingResult<Slot> {
        let slots = self
            .availability
            .compute(shop, service, start_at.date(), ignore)
            .await?;

        let slot = slots
            .into_iter()
            .find(|slot| slot.start == start_at)
            .ok_or_else(|| {
                BookingError::validation(format!(
                    "{} is not a bookable start time",
                    start_at.format("%Y-%m-%dT%H:%M")
                ))
            })?;

        if slot.remaining == 0 {
            return Err(BookingError::Conflict(
                "the requested time is already booked".to_string(),
            ));
        }
        if !slot.available {
            return Err(BookingError::validation(
                "the requested time is too soon to book",
            ));
        }
        Ok(slot)
    }

    async fn notify_counterparties(
        &self,
        actor: &User,
        appointment: &Appointment,
        kind: NotificationType,
        title: &str,
        message: String,
    ) {
        for user_id in counterparties(actor, appointment) {
            self.notifications
                .notify(user_id, kind, title, message.clone(), Some(appointment.id))
                .await;
        }
    }
}

/// Participants other than the actor
fn counterparties(actor: &User, appointment: &Appointment) -> Vec<i64> {
    let mut recipients = vec![appointment.customer_id];
    if appointment.shop_owner_id != appointment.customer_id {
        recipients.push(appointment.shop_owner_id);
    }
    recipients.retain(|id| *id != actor.id);
    recipients
}

fn describe(appointment: &Appointment) -> String {
    format!(
        "{} at {} on {}",
        appointment.service_name,
        appointment.shop_name,
        appointment.start_at.format("%Y-%m-%d %H:%M")
    )
}

fn normalize_notes(notes: Option<String>) -> BookingResult<Option<String>> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTE_LENGTH {
        return Err(BookingError::validation(format!(
            "notes must be at most {MAX_NOTE_LENGTH} characters long"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reservo_database::UserRole;

    fn user(id: i64) -> User {
        User {
            id,
            public_id: format!("user_{id}"),
            email: format!("user{id}@example.com"),
            display_name: format!("User {id}"),
            phone: None,
            role: UserRole::Customer,
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
            last_login_at: None,
        }
    }

    fn appointment(customer_id: i64, owner_id: i64) -> Appointment {
        let start = NaiveDate::from_ymd_opt(2030, 1, 7)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Appointment {
            id: 1,
            public_id: "appt".into(),
            shop_id: 1,
            shop_public_id: "shop".into(),
            shop_name: "Corner Cuts".into(),
            shop_owner_id: owner_id,
            service_id: 1,
            service_public_id: "svc".into(),
            service_name: "Haircut".into(),
            customer_id,
            customer_public_id: format!("user_{customer_id}"),
            customer_name: "Customer".into(),
            start_at: start,
            end_at: start + chrono::Duration::minutes(30),
            status: AppointmentStatus::Pending,
            notes: None,
            cancellation_reason: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn counterparties_exclude_the_actor() {
        let appt = appointment(1, 2);
        assert_eq!(counterparties(&user(1), &appt), vec![2]);
        assert_eq!(counterparties(&user(2), &appt), vec![1]);
        // Admins are outsiders and notify both sides.
        assert_eq!(counterparties(&user(9), &appt), vec![1, 2]);
        // Owners booking their own shop have no one to notify.
        assert!(counterparties(&user(3), &appointment(3, 3)).is_empty());
    }

    #[test]
    fn describe_mentions_service_shop_and_time() {
        assert_eq!(
            describe(&appointment(1, 2)),
            "Haircut at Corner Cuts on 2030-01-07 10:00"
        );
    }

    #[test]
    fn notes_are_trimmed_and_bounded() {
        assert_eq!(normalize_notes(Some("  hi ".into())).unwrap().as_deref(), Some("hi"));
        assert!(normalize_notes(Some("   ".into())).unwrap().is_none());
        assert!(normalize_notes(Some("x".repeat(501))).is_err());
    }
}
