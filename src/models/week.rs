use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number of day slots in one ordering cycle (Monday through Friday).
pub const DAY_COUNT: usize = 5;

/// Display labels for the five day slots.
pub const DAY_LABELS: [&str; DAY_COUNT] = ["Hétfő", "Kedd", "Szerda", "Csütörtök", "Péntek"];

/// ISO-8601 (week, year) pair identifying one ordering cycle. The year is
/// the week-year (the year owning the week's Thursday), not the calendar
/// year, so early-January and late-December dates key correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekKey {
    pub week: u32,
    pub year: i32,
}

impl WeekKey {
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            week: iso.week(),
            year: iso.year(),
        }
    }

    /// Key of the week after the one containing `today` — the cycle that
    /// menus are published for and orders are taken against.
    pub fn next(today: NaiveDate) -> Self {
        Self::of(today + Duration::weeks(1))
    }
}

impl std::fmt::Display for WeekKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.week, self.year)
    }
}

/// Day slot index for a date: 0 = Monday .. 4 = Friday, `None` on weekends.
pub fn day_index(date: NaiveDate) -> Option<usize> {
    let idx = date.weekday().num_days_from_monday() as usize;
    (idx < DAY_COUNT).then_some(idx)
}

/// The service-local date for an instant, under the configured UTC offset.
/// Every "today"-dependent decision goes through this so week edges don't
/// depend on the host time zone.
pub fn service_date(now: DateTime<Utc>, utc_offset_minutes: i32) -> NaiveDate {
    (now + Duration::minutes(utc_offset_minutes as i64)).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn dates_in_the_same_iso_week_share_a_key() {
        // Monday through Sunday of one week
        let monday = d(2025, 10, 13);
        for offset in 0..7 {
            assert_eq!(
                WeekKey::of(monday + Duration::days(offset)),
                WeekKey { week: 42, year: 2025 }
            );
        }
        assert_ne!(
            WeekKey::of(monday + Duration::days(7)),
            WeekKey { week: 42, year: 2025 }
        );
    }

    #[test]
    fn week_year_follows_the_thursday_rule() {
        // 2024-12-30 (Mon) belongs to week 1 of 2025
        assert_eq!(d(2024, 12, 30).iso_week().week(), 1);
        assert_eq!(WeekKey::of(d(2024, 12, 30)), WeekKey { week: 1, year: 2025 });
        // 2021-01-01 (Fri) belongs to week 53 of 2020
        assert_eq!(WeekKey::of(d(2021, 1, 1)), WeekKey { week: 53, year: 2020 });
    }

    #[test]
    fn next_rolls_over_year_boundaries() {
        assert_eq!(WeekKey::next(d(2025, 12, 29)), WeekKey { week: 2, year: 2026 });
        assert_eq!(WeekKey::next(d(2025, 10, 15)), WeekKey { week: 43, year: 2025 });
    }

    #[test]
    fn day_index_covers_weekdays_only() {
        assert_eq!(day_index(d(2025, 10, 13)), Some(0)); // Monday
        assert_eq!(day_index(d(2025, 10, 17)), Some(4)); // Friday
        assert_eq!(day_index(d(2025, 10, 18)), None); // Saturday
        assert_eq!(day_index(d(2025, 10, 19)), None); // Sunday
    }

    #[test]
    fn service_date_respects_the_configured_offset() {
        let just_before_midnight = DateTime::parse_from_rfc3339("2025-10-12T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(service_date(just_before_midnight, 0), d(2025, 10, 12));
        // +60 min pushes the local date over midnight into Monday
        assert_eq!(service_date(just_before_midnight, 60), d(2025, 10, 13));
    }
}
