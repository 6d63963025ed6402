use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::menu::{DaySlot, MenuRecord};
use crate::models::week::WeekKey;
use crate::services::email::EmailService;
use crate::services::menu::MenuService;
use crate::services::notify::NotificationService;
use crate::services::order::OrderService;

pub struct AdminService;

impl AdminService {
    /// Publish next week's menu, then announce it. A duplicate menu
    /// surfaces to the caller; announcement failures do not, the menu
    /// already exists at that point.
    pub async fn publish_menu_and_notify(
        pool: &PgPool,
        email_svc: Option<&EmailService>,
        notifications: &NotificationService,
        config: &Config,
        slots: Vec<DaySlot>,
        created_by: Uuid,
        today: NaiveDate,
    ) -> AppResult<MenuRecord> {
        let week_key = WeekKey::next(today);
        let menu = MenuService::create(pool, week_key, slots, created_by).await?;

        let mut announced = 0usize;
        if let Some(svc) = email_svc {
            let recipients: Vec<(String, String, String)> = sqlx::query_as(
                r#"SELECT email, first_name, last_name FROM users
                   WHERE is_active = TRUE AND role IN ('student', 'teacher')"#,
            )
            .fetch_all(pool)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Lunch-open announcement: recipient query failed: {e}");
                Vec::new()
            });

            for (email, first_name, last_name) in &recipients {
                let name = format!("{last_name} {first_name}");
                match svc
                    .send_lunch_open(
                        email,
                        &name,
                        week_key,
                        &menu.options.0,
                        &config.school_name,
                        &config.app_base_url,
                    )
                    .await
                {
                    Ok(()) => announced += 1,
                    Err(e) => tracing::warn!("Lunch-open email to {email} failed: {e}"),
                }
            }
        }

        if let Err(e) = notifications
            .send_operational_message(
                "Menu published",
                &format!("Week {week_key} menu is live, announcement sent to {announced} recipient(s)"),
                false,
            )
            .await
        {
            tracing::warn!("Ops webhook failed: {e}");
        }

        Ok(menu)
    }

    /// Close next week's order window and report the order count.
    pub async fn close_window_for_next_week(
        pool: &PgPool,
        notifications: &NotificationService,
        today: NaiveDate,
    ) -> AppResult<(WeekKey, i64)> {
        let week_key = WeekKey::next(today);
        MenuService::set_open(pool, week_key, false).await?;
        let count = OrderService::count(pool, week_key).await?;

        if let Err(e) = notifications
            .send_operational_message(
                "Order window closed",
                &format!("Week {week_key}: {count} order(s) received"),
                false,
            )
            .await
        {
            tracing::warn!("Ops webhook failed: {e}");
        }

        Ok((week_key, count))
    }

    /// Assign (or clear) a user's kiosk NFC token.
    pub async fn assign_nfc_token(
        pool: &PgPool,
        user_id: Uuid,
        token: Option<String>,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET nfc_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(token)
            .execute(pool)
            .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => Err(AppError::NotFound("user")),
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                AppError::AlreadyExists("this NFC token is assigned to another user".into()),
            ),
            Err(e) => Err(e.into()),
        }
    }
}
