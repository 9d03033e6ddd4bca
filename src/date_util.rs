//! Local calendar-date helpers.
//!
//! Every date in this crate is a [`LocalDate`]: a wall-clock calendar day with
//! no time zone and no time of day. Arithmetic on it can never drift across a
//! daylight-saving change, so there is no need to pin a time-of-day before
//! adding days.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

use crate::error::{Result, ScheduleError};

pub type LocalDate = NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format as `YYYY-MM-DD` from the date's own year/month/day fields.
pub fn format_date(date: LocalDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a strict `YYYY-MM-DD` string. Surrounding whitespace is ignored.
pub fn parse_date(input: &str) -> Result<LocalDate> {
    let trimmed = input.trim();
    // chrono accepts unpadded fields; stored dates are always zero-padded.
    if trimmed.len() != 10 {
        return Err(ScheduleError::InvalidDate(input.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ScheduleError::InvalidDate(input.to_string()))
}

/// Longest horizon, in months, that generation and extension will cover.
pub const MAX_HORIZON_MONTHS: u32 = 120;

/// Add days, saturating at the ends of the representable range.
pub fn add_days(date: LocalDate, days: i64) -> LocalDate {
    checked_add_days(date, days).unwrap_or(if days < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

pub fn checked_add_days(date: LocalDate, days: i64) -> Option<LocalDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// Add calendar months. A day that does not exist in the target month is
/// clamped to that month's last day (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: LocalDate, months: u32) -> LocalDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: LocalDate, to: LocalDate) -> i64 {
    (to - from).num_days()
}

/// Day of week with Sunday = 0 through Saturday = 6.
pub fn day_of_week(date: LocalDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// The Monday on or before `reference`. Sunday goes back six days.
pub fn most_recent_monday(reference: LocalDate) -> LocalDate {
    let back = match reference.weekday() {
        Weekday::Sun => 6,
        _ => i64::from(day_of_week(reference)) - 1,
    };
    add_days(reference, -back)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> LocalDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_date(d(2024, 3, 7)), "2024-03-07");
    }

    #[test]
    fn parse_rejects_unpadded_and_garbage() {
        assert_eq!(parse_date(" 2024-01-05 ").unwrap(), d(2024, 1, 5));
        assert!(parse_date("2024-1-5").is_err());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("not a date").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn add_days_rolls_over_month_and_year() {
        assert_eq!(add_days(d(2024, 12, 29), 7), d(2025, 1, 5));
        assert_eq!(add_days(d(2024, 2, 27), 3), d(2024, 3, 1));
        assert_eq!(add_days(d(2024, 3, 1), -1), d(2024, 2, 29));
    }

    #[test]
    fn add_days_saturates_instead_of_overflowing() {
        assert_eq!(checked_add_days(NaiveDate::MAX, 1), None);
        assert_eq!(add_days(NaiveDate::MAX, 7), NaiveDate::MAX);
        assert_eq!(add_days(NaiveDate::MIN, -7), NaiveDate::MIN);
        assert_eq!(checked_add_days(d(2024, 1, 1), i64::MAX), None);
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
        assert_eq!(add_months(d(2024, 11, 15), 3), d(2025, 2, 15));
        assert_eq!(add_months(d(2024, 1, 1), 0), d(2024, 1, 1));
    }

    #[test]
    fn most_recent_monday_for_every_weekday() {
        // 2024-01-01 is a Monday.
        for offset in 0..7 {
            let date = add_days(d(2024, 1, 1), offset);
            assert_eq!(most_recent_monday(date), d(2024, 1, 1), "offset {offset}");
        }
        assert_eq!(most_recent_monday(d(2024, 1, 8)), d(2024, 1, 8));
    }

    #[test]
    fn day_of_week_counts_from_sunday() {
        assert_eq!(day_of_week(d(2024, 1, 7)), 0);
        assert_eq!(day_of_week(d(2024, 1, 1)), 1);
        assert_eq!(day_of_week(d(2024, 1, 6)), 6);
    }
}
