use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::week::WeekKey;

/// Reserved selection value meaning the user explicitly opted out that day.
pub const NO_LUNCH: &str = "no-lunch";

/// One day's decision on an order: nothing yet, explicit opt-out, or a
/// menu option id. Wire form is `null` / `"no-lunch"` / `"<option-id>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Selection {
    Undecided,
    NoLunch,
    Choice(String),
}

impl From<Option<String>> for Selection {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Selection::Undecided,
            Some(s) if s == NO_LUNCH => Selection::NoLunch,
            Some(id) => Selection::Choice(id),
        }
    }
}

impl From<Selection> for Option<String> {
    fn from(value: Selection) -> Self {
        match value {
            Selection::Undecided => None,
            Selection::NoLunch => Some(NO_LUNCH.to_string()),
            Selection::Choice(id) => Some(id),
        }
    }
}

/// One user's order for one week. `selections` and `redeemed` both hold
/// exactly five entries, Monday to Friday. `selections` is overwritten
/// wholesale on resubmission; `redeemed` is only ever stamped by the kiosk.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub week: i32,
    pub year: i32,
    pub selections: Json<Vec<Selection>>,
    pub redeemed: Json<Vec<Option<DateTime<Utc>>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn week_key(&self) -> WeekKey {
        WeekKey {
            week: self.week as u32,
            year: self.year,
        }
    }

    pub fn selection(&self, day: usize) -> Selection {
        self.selections
            .0
            .get(day)
            .cloned()
            .unwrap_or(Selection::Undecided)
    }

    pub fn redeemed_at(&self, day: usize) -> Option<DateTime<Utc>> {
        self.redeemed.0.get(day).copied().flatten()
    }
}

/// Body for PUT /orders; week/year absent means "next week".
#[derive(Debug, Deserialize)]
pub struct SubmitOrderRequest {
    pub week: Option<u32>,
    pub year: Option<i32>,
    pub selections: Vec<Selection>,
}

/// Body for POST /kiosk/redeem. `date` lets an operator redeem against an
/// explicit day; absent, the service-local date is used.
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub token_id: String,
    pub date: Option<NaiveDate>,
}

/// Operator-facing outcome of a kiosk scan. Unknown tokens and off-calendar
/// dates are reported as errors, not states.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RedemptionResult {
    Redeemed {
        user_name: String,
        label: String,
    },
    AlreadyRedeemed {
        user_name: String,
        redeemed_at: Option<DateTime<Utc>>,
    },
    NotOrdered {
        user_name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wire_form_round_trips() {
        let all: Vec<Selection> = serde_json::from_str(r#"[null, "no-lunch", "a-menu"]"#).unwrap();
        assert_eq!(
            all,
            vec![
                Selection::Undecided,
                Selection::NoLunch,
                Selection::Choice("a-menu".into())
            ]
        );
        assert_eq!(
            serde_json::to_string(&all).unwrap(),
            r#"[null,"no-lunch","a-menu"]"#
        );
    }

    #[test]
    fn sentinel_is_not_a_choice() {
        assert_eq!(Selection::from(Some(NO_LUNCH.to_string())), Selection::NoLunch);
        assert_ne!(
            Selection::from(Some(NO_LUNCH.to_string())),
            Selection::Choice(NO_LUNCH.into())
        );
    }

    #[test]
    fn redemption_result_tags_by_status() {
        let v = serde_json::to_value(RedemptionResult::Redeemed {
            user_name: "Kiss Anna".into(),
            label: "Csirkepaprikás".into(),
        })
        .unwrap();
        assert_eq!(v["status"], "redeemed");
        assert_eq!(v["label"], "Csirkepaprikás");

        let v = serde_json::to_value(RedemptionResult::NotOrdered {
            user_name: "Kiss Anna".into(),
        })
        .unwrap();
        assert_eq!(v["status"], "not_ordered");
    }

    #[test]
    fn out_of_bounds_day_reads_as_undecided_and_unredeemed() {
        let rec = OrderRecord {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            week: 42,
            year: 2025,
            selections: Json(vec![Selection::Choice("a-menu".into())]),
            redeemed: Json(vec![Some(Utc::now())]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(rec.selection(0), Selection::Choice("a-menu".into()));
        assert_eq!(rec.selection(4), Selection::Undecided);
        assert!(rec.redeemed_at(0).is_some());
        assert!(rec.redeemed_at(4).is_none());
    }
}
