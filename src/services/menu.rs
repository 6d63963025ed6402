use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::menu::{validate_slots, DaySlot, MenuRecord};
use crate::models::week::WeekKey;

pub struct MenuService;

impl MenuService {
    /// Publish the menu for a week. Rejects duplicates without touching the
    /// existing record.
    pub async fn create(
        pool: &PgPool,
        week_key: WeekKey,
        slots: Vec<DaySlot>,
        created_by: Uuid,
    ) -> AppResult<MenuRecord> {
        validate_slots(&slots)?;
        let record = sqlx::query_as::<_, MenuRecord>(
            r#"INSERT INTO menus (week, year, options, created_by)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (week, year) DO NOTHING
               RETURNING id, week, year, options, is_open, created_by, created_at, updated_at"#,
        )
        .bind(week_key.week as i32)
        .bind(week_key.year)
        .bind(Json(slots))
        .bind(created_by)
        .fetch_optional(pool)
        .await?;
        record.ok_or_else(|| {
            AppError::AlreadyExists(format!("a menu already exists for week {week_key}"))
        })
    }

    pub async fn get(pool: &PgPool, week_key: WeekKey) -> AppResult<MenuRecord> {
        sqlx::query_as::<_, MenuRecord>(
            r#"SELECT id, week, year, options, is_open, created_by, created_at, updated_at
               FROM menus
               WHERE week = $1 AND year = $2"#,
        )
        .bind(week_key.week as i32)
        .bind(week_key.year)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("menu"))
    }

    /// Flip the order window. Only the flag changes; options and existing
    /// orders are untouched.
    pub async fn set_open(pool: &PgPool, week_key: WeekKey, open: bool) -> AppResult<()> {
        let result = sqlx::query(
            r#"UPDATE menus SET is_open = $3, updated_at = NOW()
               WHERE week = $1 AND year = $2"#,
        )
        .bind(week_key.week as i32)
        .bind(week_key.year)
        .bind(open)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("menu"));
        }
        Ok(())
    }
}
