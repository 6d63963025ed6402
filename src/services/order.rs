use std::collections::BTreeMap;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::menu::DaySlot;
use crate::models::order::{OrderRecord, Selection};
use crate::models::week::{WeekKey, DAY_COUNT};

const ORDER_COLUMNS: &str = "id, user_id, week, year, selections, redeemed, created_at, updated_at";

pub struct OrderService;

impl OrderService {
    pub async fn get(pool: &PgPool, user_id: Uuid, week_key: WeekKey) -> AppResult<OrderRecord> {
        sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 AND week = $2 AND year = $3"
        ))
        .bind(user_id)
        .bind(week_key.week as i32)
        .bind(week_key.year)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("order"))
    }

    pub async fn count(pool: &PgPool, week_key: WeekKey) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM orders WHERE week = $1 AND year = $2")
                .bind(week_key.week as i32)
                .bind(week_key.year)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Validate and store one user's selections for a week. Full overwrite,
    /// `redeemed` untouched.
    ///
    /// The menu row is read FOR SHARE inside the transaction: a concurrent
    /// `set_open(false)` blocks until in-flight submissions commit, so once
    /// the close completes no submission that saw the window open can still
    /// land.
    pub async fn submit(
        pool: &PgPool,
        user_id: Uuid,
        week_key: WeekKey,
        selections: Vec<Selection>,
    ) -> AppResult<OrderRecord> {
        let mut tx = pool.begin().await?;

        let eligibility: Option<(bool, bool)> =
            sqlx::query_as("SELECT is_active, blocked FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        match eligibility {
            None => return Err(AppError::NotFound("user")),
            Some((false, _)) | Some((_, true)) => return Err(AppError::Forbidden),
            Some(_) => {}
        }

        let menu: Option<(Json<Vec<DaySlot>>, bool)> =
            sqlx::query_as("SELECT options, is_open FROM menus WHERE week = $1 AND year = $2 FOR SHARE")
                .bind(week_key.week as i32)
                .bind(week_key.year)
                .fetch_optional(&mut *tx)
                .await?;
        let (Json(slots), is_open) = menu.ok_or(AppError::NotFound("menu"))?;
        if !is_open {
            return Err(AppError::WindowClosed(week_key));
        }

        validate_selections(&slots, &selections)?;

        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            r#"INSERT INTO orders (user_id, week, year, selections)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (user_id, week, year) DO UPDATE SET
                   selections = EXCLUDED.selections,
                   updated_at = NOW()
               RETURNING {ORDER_COLUMNS}"#
        ))
        .bind(user_id)
        .bind(week_key.week as i32)
        .bind(week_key.year)
        .bind(Json(selections))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Per-day tallies of chosen option ids for kitchen prep.
    pub async fn day_summary(
        pool: &PgPool,
        week_key: WeekKey,
    ) -> AppResult<Vec<BTreeMap<String, i64>>> {
        let rows: Vec<(Json<Vec<Selection>>,)> =
            sqlx::query_as("SELECT selections FROM orders WHERE week = $1 AND year = $2")
                .bind(week_key.week as i32)
                .bind(week_key.year)
                .fetch_all(pool)
                .await?;

        let mut summary: Vec<BTreeMap<String, i64>> = vec![BTreeMap::new(); DAY_COUNT];
        for (Json(selections),) in rows {
            for (day, selection) in selections.iter().take(DAY_COUNT).enumerate() {
                if let Selection::Choice(id) = selection {
                    *summary[day].entry(id.clone()).or_insert(0) += 1;
                }
            }
        }
        Ok(summary)
    }
}

/// Every entry must be undecided, the opt-out sentinel, or an option id
/// published for that day.
fn validate_selections(slots: &[DaySlot], selections: &[Selection]) -> Result<(), AppError> {
    if selections.len() != DAY_COUNT {
        return Err(AppError::InvalidSelection(format!(
            "expected {DAY_COUNT} entries, got {}",
            selections.len()
        )));
    }
    for (day, selection) in selections.iter().enumerate() {
        if let Selection::Choice(id) = selection {
            let known = slots.get(day).is_some_and(|slot| slot.contains(id));
            if !known {
                return Err(AppError::InvalidSelection(format!(
                    "\"{id}\" is not on the menu for day {day}"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::menu::MenuOption;

    fn slots() -> Vec<DaySlot> {
        (0..DAY_COUNT)
            .map(|day| {
                DaySlot(vec![
                    MenuOption {
                        id: "a-menu".into(),
                        label: format!("A menü {day}"),
                    },
                    MenuOption {
                        id: "b-menu".into(),
                        label: format!("B menü {day}"),
                    },
                ])
            })
            .collect()
    }

    #[test]
    fn accepts_choices_sentinel_and_undecided() {
        let selections = vec![
            Selection::Choice("a-menu".into()),
            Selection::NoLunch,
            Selection::Undecided,
            Selection::Choice("b-menu".into()),
            Selection::NoLunch,
        ];
        assert!(validate_selections(&slots(), &selections).is_ok());
    }

    #[test]
    fn rejects_an_option_id_missing_from_that_day() {
        let mut day_slots = slots();
        day_slots[2] = DaySlot(vec![MenuOption {
            id: "soup-only".into(),
            label: "Leves".into(),
        }]);
        let selections = vec![
            Selection::NoLunch,
            Selection::NoLunch,
            Selection::Choice("a-menu".into()), // valid elsewhere, not on day 2
            Selection::NoLunch,
            Selection::NoLunch,
        ];
        assert!(matches!(
            validate_selections(&day_slots, &selections),
            Err(AppError::InvalidSelection(_))
        ));
    }

    #[test]
    fn rejects_wrong_entry_count() {
        let selections = vec![Selection::NoLunch; 4];
        assert!(matches!(
            validate_selections(&slots(), &selections),
            Err(AppError::InvalidSelection(_))
        ));
    }

    #[test]
    fn sentinel_never_needs_to_be_on_the_menu() {
        let empty: Vec<DaySlot> = (0..DAY_COUNT).map(|_| DaySlot::default()).collect();
        let selections = vec![Selection::NoLunch; DAY_COUNT];
        assert!(validate_selections(&empty, &selections).is_ok());
    }
}
