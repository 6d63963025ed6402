use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::week::{WeekKey, DAY_COUNT};

/// One selectable lunch option within a day slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    pub id: String,
    pub label: String,
}

/// Ordered options for one day; order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaySlot(pub Vec<MenuOption>);

impl DaySlot {
    pub fn label_of(&self, option_id: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|o| o.id == option_id)
            .map(|o| o.label.as_str())
    }

    pub fn contains(&self, option_id: &str) -> bool {
        self.0.iter().any(|o| o.id == option_id)
    }
}

/// Schema check for published menu options: exactly one slot per weekday,
/// ids non-empty and unique within their slot, labels non-empty. An empty
/// slot is allowed (no lunch served that day).
pub fn validate_slots(slots: &[DaySlot]) -> Result<(), AppError> {
    if slots.len() != DAY_COUNT {
        return Err(AppError::InvalidMenu(format!(
            "expected {DAY_COUNT} day slots, got {}",
            slots.len()
        )));
    }
    for (day, slot) in slots.iter().enumerate() {
        let mut seen: Vec<&str> = Vec::with_capacity(slot.0.len());
        for opt in &slot.0 {
            if opt.id.trim().is_empty() {
                return Err(AppError::InvalidMenu(format!("empty option id on day {day}")));
            }
            if opt.label.trim().is_empty() {
                return Err(AppError::InvalidMenu(format!(
                    "empty label for option \"{}\" on day {day}",
                    opt.id
                )));
            }
            if seen.contains(&opt.id.as_str()) {
                return Err(AppError::InvalidMenu(format!(
                    "duplicate option id \"{}\" on day {day}",
                    opt.id
                )));
            }
            seen.push(&opt.id);
        }
    }
    Ok(())
}

/// One published weekly menu. `options` holds the five day slots in
/// Monday-to-Friday order; they are immutable after creation, only
/// `is_open` changes over the record's lifetime.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MenuRecord {
    pub id: Uuid,
    pub week: i32,
    pub year: i32,
    pub options: Json<Vec<DaySlot>>,
    pub is_open: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuRecord {
    pub fn week_key(&self) -> WeekKey {
        WeekKey {
            week: self.week as u32,
            year: self.year,
        }
    }
}

/// Body for POST /admin/menus.
#[derive(Debug, Deserialize)]
pub struct PublishMenuRequest {
    pub options: Vec<DaySlot>,
}

/// Body for PUT /admin/window.
#[derive(Debug, Deserialize)]
pub struct SetWindowRequest {
    pub week: u32,
    pub year: i32,
    pub open: bool,
}

/// Query params for week-scoped GETs; both absent means "next week".
#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week: Option<u32>,
    pub year: Option<i32>,
}

impl WeekQuery {
    pub fn resolve(&self, default: WeekKey) -> WeekKey {
        match (self.week, self.year) {
            (Some(week), Some(year)) => WeekKey { week, year },
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(ids: &[(&str, &str)]) -> DaySlot {
        DaySlot(
            ids.iter()
                .map(|(id, label)| MenuOption {
                    id: id.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        )
    }

    fn full_week() -> Vec<DaySlot> {
        (0..5)
            .map(|_| slot(&[("a-menu", "Csirkepaprikás"), ("b-menu", "Rakott káposzta")]))
            .collect()
    }

    #[test]
    fn accepts_a_well_formed_week() {
        assert!(validate_slots(&full_week()).is_ok());
    }

    #[test]
    fn accepts_an_empty_day_slot() {
        let mut slots = full_week();
        slots[2] = DaySlot::default();
        assert!(validate_slots(&slots).is_ok());
    }

    #[test]
    fn rejects_wrong_slot_count() {
        let mut slots = full_week();
        slots.pop();
        assert!(matches!(
            validate_slots(&slots),
            Err(AppError::InvalidMenu(_))
        ));
    }

    #[test]
    fn rejects_duplicate_ids_within_a_day() {
        let mut slots = full_week();
        slots[0] = slot(&[("a-menu", "Csirkepaprikás"), ("a-menu", "Lencsefőzelék")]);
        assert!(matches!(
            validate_slots(&slots),
            Err(AppError::InvalidMenu(_))
        ));
    }

    #[test]
    fn rejects_blank_ids_and_labels() {
        let mut slots = full_week();
        slots[1] = slot(&[("", "Gulyásleves")]);
        assert!(validate_slots(&slots).is_err());
        slots[1] = slot(&[("a-menu", "  ")]);
        assert!(validate_slots(&slots).is_err());
    }

    #[test]
    fn slot_lookups_respect_ids() {
        let s = slot(&[("a-menu", "Csirkepaprikás")]);
        assert!(s.contains("a-menu"));
        assert!(!s.contains("b-menu"));
        assert_eq!(s.label_of("a-menu"), Some("Csirkepaprikás"));
        assert_eq!(s.label_of("b-menu"), None);
    }

    #[test]
    fn week_query_falls_back_to_default() {
        let default = WeekKey { week: 43, year: 2025 };
        let q = WeekQuery { week: None, year: None };
        assert_eq!(q.resolve(default), default);
        let q = WeekQuery { week: Some(10), year: Some(2026) };
        assert_eq!(q.resolve(default), WeekKey { week: 10, year: 2026 });
        // Half-specified falls back rather than guessing the other half
        let q = WeekQuery { week: Some(10), year: None };
        assert_eq!(q.resolve(default), default);
    }
}
