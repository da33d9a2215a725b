use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use reservo_booking::{
    BookingError, BookingServices, FixedClock, NewAppointment, NewService, NewShop,
};
use reservo_config::{BookingConfig, DatabaseConfig};
use reservo_database::{
    initialize_database, AppointmentStatus, CreateUserRequest, NotificationType, ScheduleDay,
    Service, Shop, User, UserRepository, UserRole,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Monday
fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    day().and_hms_opt(hour, minute, 0).unwrap()
}

struct TestContext {
    pool: SqlitePool,
    booking: BookingServices,
    owner: User,
    customer: User,
    shop: Shop,
    service: Service,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        Self::with_config(BookingConfig::default()).await
    }

    async fn with_config(config: BookingConfig) -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("booking.sqlite");
        let pool = initialize_database(&DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 4,
        })
        .await?;

        let booking = BookingServices::new(pool.clone(), &config, Arc::new(FixedClock(at(8, 0))));

        let owner = create_user(&pool, "owner@example.com", UserRole::ShopOwner).await?;
        let customer = create_user(&pool, "customer@example.com", UserRole::Customer).await?;

        let shop = booking
            .shops
            .create(
                &owner,
                NewShop {
                    name: "Corner Cuts".to_string(),
                    slot_interval_minutes: Some(30),
                    ..Default::default()
                },
            )
            .await?;
        let service = booking
            .catalog
            .create(
                &owner,
                &shop.public_id,
                NewService {
                    name: "Haircut".to_string(),
                    description: None,
                    duration_minutes: 30,
                    price_cents: 2_500,
                },
            )
            .await?;
        booking
            .schedules
            .replace_week(
                &owner,
                &shop.public_id,
                vec![ScheduleDay {
                    day_of_week: 0,
                    open_time: Some("09:00".to_string()),
                    close_time: Some("11:00".to_string()),
                    is_closed: false,
                }],
            )
            .await?;

        Ok(Self {
            pool,
            booking,
            owner,
            customer,
            shop,
            service,
            _temp_dir: temp_dir,
        })
    }

    fn request(&self, start_at: NaiveDateTime) -> NewAppointment {
        NewAppointment {
            shop_id: self.shop.public_id.clone(),
            service_id: self.service.public_id.clone(),
            start_at,
            notes: None,
        }
    }

    async fn free_starts(&self) -> TestResult<Vec<NaiveDateTime>> {
        let availability = self
            .booking
            .availability
            .slots_for(&self.shop.public_id, &self.service.public_id, day())
            .await?;
        Ok(availability
            .slots
            .iter()
            .filter(|slot| slot.available)
            .map(|slot| slot.start)
            .collect())
    }
}

async fn create_user(pool: &SqlitePool, email: &str, role: UserRole) -> TestResult<User> {
    let user = UserRepository::new(pool.clone())
        .create(&CreateUserRequest {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            display_name: email.split('@').next().unwrap_or(email).to_string(),
            phone: None,
            role,
        })
        .await?;
    Ok(user)
}

#[tokio::test]
async fn booking_lifecycle_from_request_to_completion() -> TestResult {
    let ctx = TestContext::new().await?;
    assert_eq!(
        ctx.free_starts().await?,
        vec![at(9, 0), at(9, 30), at(10, 0), at(10, 30)]
    );

    let booked = ctx
        .booking
        .appointments
        .book(&ctx.customer, ctx.request(at(9, 30)))
        .await?;
    assert_eq!(booked.status, AppointmentStatus::Pending);
    assert_eq!(booked.end_at, at(10, 0));
    assert_eq!(ctx.free_starts().await?, vec![at(9, 0), at(10, 0), at(10, 30)]);

    let owner_inbox = ctx.booking.notifications.list(&ctx.owner, true).await?;
    assert_eq!(owner_inbox.len(), 1);
    assert_eq!(
        owner_inbox[0].notification_type,
        NotificationType::AppointmentRequested
    );

    let confirmed = ctx
        .booking
        .appointments
        .confirm(&ctx.owner, &booked.public_id)
        .await?;
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
    assert_eq!(ctx.booking.notifications.unread_count(&ctx.customer).await?, 1);

    let completed = ctx
        .booking
        .appointments
        .complete(&ctx.owner, &booked.public_id)
        .await?;
    assert_eq!(completed.status, AppointmentStatus::Completed);

    let again = ctx
        .booking
        .appointments
        .cancel(&ctx.customer, &booked.public_id, None)
        .await;
    assert!(matches!(
        again,
        Err(BookingError::InvalidTransition {
            from: AppointmentStatus::Completed,
            to: AppointmentStatus::Cancelled
        })
    ));
    Ok(())
}

#[tokio::test]
async fn taken_slots_and_off_grid_starts_are_refused() -> TestResult {
    let ctx = TestContext::new().await?;
    let other = create_user(&ctx.pool, "other@example.com", UserRole::Customer).await?;

    ctx.booking
        .appointments
        .book(&ctx.customer, ctx.request(at(9, 0)))
        .await?;

    let taken = ctx
        .booking
        .appointments
        .book(&other, ctx.request(at(9, 0)))
        .await;
    assert!(matches!(taken, Err(BookingError::Conflict(_))));

    let off_grid = ctx
        .booking
        .appointments
        .book(&other, ctx.request(at(9, 10)))
        .await;
    assert!(matches!(off_grid, Err(BookingError::Validation(_))));

    let after_close = ctx
        .booking
        .appointments
        .book(&other, ctx.request(at(11, 0)))
        .await;
    assert!(matches!(after_close, Err(BookingError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn cancelling_frees_the_slot_and_notifies_the_shop() -> TestResult {
    let ctx = TestContext::new().await?;
    let booked = ctx
        .booking
        .appointments
        .book(&ctx.customer, ctx.request(at(10, 0)))
        .await?;

    let stranger = create_user(&ctx.pool, "stranger@example.com", UserRole::Customer).await?;
    let denied = ctx
        .booking
        .appointments
        .cancel(&stranger, &booked.public_id, None)
        .await;
    assert!(matches!(denied, Err(BookingError::Forbidden(_))));

    let cancelled = ctx
        .booking
        .appointments
        .cancel(&ctx.customer, &booked.public_id, Some("  running late ".to_string()))
        .await?;
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("running late"));
    assert!(ctx.free_starts().await?.contains(&at(10, 0)));

    let inbox = ctx.booking.notifications.list(&ctx.owner, false).await?;
    assert!(inbox
        .iter()
        .any(|n| n.notification_type == NotificationType::AppointmentCancelled
            && n.message.contains("running late")));
    Ok(())
}

#[tokio::test]
async fn reschedule_moves_the_booking_and_needs_reconfirmation() -> TestResult {
    let ctx = TestContext::new().await?;
    let booked = ctx
        .booking
        .appointments
        .book(&ctx.customer, ctx.request(at(9, 0)))
        .await?;
    ctx.booking
        .appointments
        .confirm(&ctx.owner, &booked.public_id)
        .await?;

    let moved = ctx
        .booking
        .appointments
        .reschedule(&ctx.customer, &booked.public_id, at(10, 30))
        .await?;
    assert_eq!(moved.status, AppointmentStatus::Rescheduled);
    assert_eq!(moved.start_at, at(10, 30));
    assert_eq!(moved.end_at, at(11, 0));
    assert_eq!(ctx.free_starts().await?, vec![at(9, 0), at(9, 30), at(10, 0)]);

    // Its own interval does not block a move to the same time.
    ctx.booking
        .appointments
        .reschedule(&ctx.customer, &booked.public_id, at(10, 30))
        .await?;

    let blocker = create_user(&ctx.pool, "blocker@example.com", UserRole::Customer).await?;
    ctx.booking
        .appointments
        .book(&blocker, ctx.request(at(9, 30)))
        .await?;
    let onto_taken = ctx
        .booking
        .appointments
        .reschedule(&ctx.customer, &booked.public_id, at(9, 30))
        .await;
    assert!(matches!(onto_taken, Err(BookingError::Conflict(_))));

    let reconfirmed = ctx
        .booking
        .appointments
        .confirm(&ctx.owner, &booked.public_id)
        .await?;
    assert_eq!(reconfirmed.status, AppointmentStatus::Confirmed);
    Ok(())
}

#[tokio::test]
async fn customers_cannot_operate_shop_side_transitions() -> TestResult {
    let ctx = TestContext::new().await?;
    let booked = ctx
        .booking
        .appointments
        .book(&ctx.customer, ctx.request(at(9, 0)))
        .await?;

    let denied = ctx
        .booking
        .appointments
        .confirm(&ctx.customer, &booked.public_id)
        .await;
    assert!(matches!(denied, Err(BookingError::Forbidden(_))));

    let shop_create = ctx
        .booking
        .shops
        .create(
            &ctx.customer,
            NewShop {
                name: "Pop-up".to_string(),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(shop_create, Err(BookingError::Forbidden(_))));

    let listing = ctx
        .booking
        .appointments
        .list_for_shop(&ctx.customer, &ctx.shop.public_id, None, None)
        .await;
    assert!(matches!(listing, Err(BookingError::Forbidden(_))));

    let mine = ctx.booking.appointments.list_for_customer(&ctx.customer).await?;
    assert_eq!(mine.len(), 1);
    let shop_view = ctx
        .booking
        .appointments
        .list_for_shop(&ctx.owner, &ctx.shop.public_id, Some(day()), None)
        .await?;
    assert_eq!(shop_view.len(), 1);
    Ok(())
}

#[tokio::test]
async fn availability_respects_calendar_limits() -> TestResult {
    let ctx = TestContext::with_config(BookingConfig {
        min_notice_minutes: 90,
        max_advance_days: 7,
        ..BookingConfig::default()
    })
    .await?;

    // Clock is 08:00, so the first bookable start is 09:30.
    assert_eq!(ctx.free_starts().await?, vec![at(9, 30), at(10, 0), at(10, 30)]);
    let too_soon = ctx
        .booking
        .appointments
        .book(&ctx.customer, ctx.request(at(9, 0)))
        .await;
    assert!(matches!(too_soon, Err(BookingError::Validation(_))));

    let tuesday = ctx
        .booking
        .availability
        .slots_for(&ctx.shop.public_id, &ctx.service.public_id, day().succ_opt().unwrap())
        .await?;
    assert!(tuesday.slots.is_empty());

    let past = ctx
        .booking
        .availability
        .slots_for(&ctx.shop.public_id, &ctx.service.public_id, day().pred_opt().unwrap())
        .await;
    assert!(matches!(past, Err(BookingError::Validation(_))));

    let far = ctx
        .booking
        .availability
        .slots_for(
            &ctx.shop.public_id,
            &ctx.service.public_id,
            day() + chrono::Duration::days(8),
        )
        .await;
    assert!(matches!(far, Err(BookingError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn deactivated_shops_disappear_from_the_directory() -> TestResult {
    let ctx = TestContext::new().await?;
    assert_eq!(ctx.booking.shops.list().await?.len(), 1);

    ctx.booking
        .shops
        .deactivate(&ctx.owner, &ctx.shop.public_id)
        .await?;

    assert!(ctx.booking.shops.list().await?.is_empty());
    assert_eq!(ctx.booking.shops.list_owned(&ctx.owner).await?.len(), 1);
    assert!(matches!(
        ctx.booking.shops.get(&ctx.shop.public_id).await,
        Err(BookingError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn owners_booking_their_own_shop_are_not_notified() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.booking
        .appointments
        .book(&ctx.owner, ctx.request(at(9, 0)))
        .await?;
    assert!(ctx.booking.notifications.list(&ctx.owner, false).await?.is_empty());

    ctx.booking
        .appointments
        .book(&ctx.customer, ctx.request(at(9, 30)))
        .await?;
    let inbox = ctx.booking.notifications.list(&ctx.owner, false).await?;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].notification_type, NotificationType::AppointmentRequested);
    Ok(())
}
