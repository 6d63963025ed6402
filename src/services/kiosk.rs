use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::menu::DaySlot;
use crate::models::order::{OrderRecord, RedemptionResult, Selection};
use crate::models::user::User;
use crate::models::week::{day_index, WeekKey};
use crate::services::menu::MenuService;

pub struct KioskService;

impl KioskService {
    /// NFC token to user, active accounts only.
    pub async fn resolve_token(pool: &PgPool, token_id: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, email, first_name, last_name, role, nfc_token, blocked, is_active,
                      created_at, updated_at
               FROM users
               WHERE nfc_token = $1 AND is_active = TRUE"#,
        )
        .bind(token_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::UnknownToken)
    }

    /// Mark today's order as served, exactly once.
    ///
    /// The stamp is a single conditional update ("set where still null"):
    /// of two concurrent scans of the same token only the first affects a
    /// row, the second observes `AlreadyRedeemed`.
    pub async fn redeem(
        pool: &PgPool,
        token_id: &str,
        date: NaiveDate,
    ) -> AppResult<RedemptionResult> {
        let user = Self::resolve_token(pool, token_id).await?;
        let day = day_index(date).ok_or(AppError::OutOfRange(date))?;
        let week_key = WeekKey::of(date);
        let user_name = user.full_name();

        let order = sqlx::query_as::<_, OrderRecord>(
            r#"SELECT id, user_id, week, year, selections, redeemed, created_at, updated_at
               FROM orders
               WHERE user_id = $1 AND week = $2 AND year = $3"#,
        )
        .bind(user.id)
        .bind(week_key.week as i32)
        .bind(week_key.year)
        .fetch_optional(pool)
        .await?;

        let Some(order) = order else {
            return Ok(RedemptionResult::NotOrdered { user_name });
        };

        let option_id = match order.selection(day) {
            Selection::Undecided | Selection::NoLunch => {
                return Ok(RedemptionResult::NotOrdered { user_name });
            }
            Selection::Choice(id) => id,
        };

        if let Some(at) = order.redeemed_at(day) {
            return Ok(RedemptionResult::AlreadyRedeemed {
                user_name,
                redeemed_at: Some(at),
            });
        }

        let updated = sqlx::query(
            r#"UPDATE orders
               SET redeemed = jsonb_set(redeemed, ARRAY[$2::text], to_jsonb(NOW())),
                   updated_at = NOW()
               WHERE id = $1 AND redeemed -> $3 = 'null'::jsonb"#,
        )
        .bind(order.id)
        .bind(day.to_string())
        .bind(day as i32)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            // Lost the race against a second station; re-read for the display.
            let redeemed: Option<Json<Vec<Option<DateTime<Utc>>>>> =
                sqlx::query_scalar("SELECT redeemed FROM orders WHERE id = $1")
                    .bind(order.id)
                    .fetch_optional(pool)
                    .await?;
            let redeemed_at = redeemed.and_then(|Json(r)| r.get(day).copied().flatten());
            return Ok(RedemptionResult::AlreadyRedeemed {
                user_name,
                redeemed_at,
            });
        }

        let label = match MenuService::get(pool, week_key).await {
            Ok(menu) => option_label(&menu.options.0, day, &option_id),
            Err(_) => option_id,
        };
        Ok(RedemptionResult::Redeemed { user_name, label })
    }
}

/// Display label for a chosen option; falls back to the raw id when the
/// menu no longer carries it.
fn option_label(slots: &[DaySlot], day: usize, option_id: &str) -> String {
    slots
        .get(day)
        .and_then(|slot| slot.label_of(option_id))
        .unwrap_or(option_id)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::menu::MenuOption;

    #[test]
    fn label_resolution_prefers_the_menu() {
        let slots = vec![
            DaySlot::default(),
            DaySlot(vec![MenuOption {
                id: "b-menu".into(),
                label: "Rakott káposzta".into(),
            }]),
        ];
        assert_eq!(option_label(&slots, 1, "b-menu"), "Rakott káposzta");
        // Unknown id or missing slot falls back to the id itself
        assert_eq!(option_label(&slots, 1, "c-menu"), "c-menu");
        assert_eq!(option_label(&slots, 4, "b-menu"), "b-menu");
    }
}
