//! Display-calendar helpers pinned to the storefront's region.
//!
//! Day eligibility and flyer expiry are computed at UTC-03:00, the offset of
//! the region the carousel serves. Server-local time is never consulted, so
//! deployments in other regions see the same calendar.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use domains::DayRule;

/// Offset of the display calendar from UTC, in seconds.
pub const DISPLAY_OFFSET_SECS: i32 = -3 * 3600;

fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_OFFSET_SECS).expect("UTC-03:00 is in range")
}

/// Calendar date in the display region for a given instant.
pub fn display_date(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&display_offset()).date_naive()
}

/// Weekday tag for a calendar date.
pub fn weekday_tag(date: NaiveDate) -> DayRule {
    DayRule::from_weekday(date.weekday())
}

/// Weekday tag for "today" as the display region sees it.
pub fn today_tag() -> DayRule {
    weekday_tag(display_date(Utc::now()))
}

/// Unix timestamp of the first display-region midnight after `now`.
pub fn next_midnight_after(now: DateTime<Utc>) -> i64 {
    let local_date = now.with_timezone(&display_offset()).date_naive();
    let next = local_date
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("tomorrow's midnight is representable");
    match next.and_local_timezone(display_offset()) {
        chrono::LocalResult::Single(dt) => dt.timestamp(),
        // a fixed offset has no gaps or folds
        _ => now.timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn weekday_tag_matches_known_dates() {
        // 2024-01-01 was a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(weekday_tag(monday), DayRule::Mon);
        let friday = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(weekday_tag(friday), DayRule::Fri);
    }

    #[test]
    fn display_date_lags_utc_by_three_hours() {
        // 02:30 UTC is still the previous day at UTC-03:00
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 2, 30, 0).unwrap();
        assert_eq!(display_date(now), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn next_midnight_is_three_hours_past_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 2, 30, 0).unwrap();
        // local date is 2023-12-31, so next local midnight is 2024-01-01T03:00Z
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap().timestamp();
        assert_eq!(next_midnight_after(now), expected);
    }

    #[test]
    fn next_midnight_is_strictly_in_the_future() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert!(next_midnight_after(now) > now.timestamp());
    }
}
