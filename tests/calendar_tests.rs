use chrono::{Datelike, NaiveDate};
use custody_schedule::{
    HolidayCalendar, HolidayKind, MonthView, Parent, Schedule, ScheduleError, ScheduleGenerator,
    holidays::easter_sunday,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn easter_dates() {
    assert_eq!(easter_sunday(2024), Some(d(2024, 3, 31)));
    assert_eq!(easter_sunday(2025), Some(d(2025, 4, 20)));
    assert_eq!(easter_sunday(2019), Some(d(2019, 4, 21)));
}

#[test]
fn swedish_holidays_2024() {
    let calendar = HolidayCalendar::for_year(2024);
    let name = |date| calendar.holiday_on(date).map(|h| h.name.as_str());

    assert_eq!(name(d(2024, 1, 1)), Some("Nyårsdagen"));
    assert_eq!(name(d(2024, 3, 29)), Some("Långfredagen"));
    assert_eq!(name(d(2024, 4, 1)), Some("Annandag påsk"));
    assert_eq!(name(d(2024, 5, 9)), Some("Kristi himmelsfärdsdag"));
    assert_eq!(name(d(2024, 5, 19)), Some("Pingstdagen"));
    assert_eq!(name(d(2024, 6, 21)), Some("Midsommarafton"));
    assert_eq!(name(d(2024, 6, 22)), Some("Midsommardagen"));
    assert_eq!(name(d(2024, 11, 2)), Some("Alla helgons dag"));
    assert_eq!(name(d(2024, 12, 25)), Some("Juldagen"));
    assert_eq!(name(d(2024, 7, 15)), None);

    assert!(calendar.is_public_holiday(d(2024, 6, 22)));
    assert!(!calendar.is_public_holiday(d(2024, 6, 21)));
    assert_eq!(
        calendar.holiday_on(d(2024, 12, 24)).map(|h| h.kind),
        Some(HolidayKind::Flag)
    );
}

#[test]
fn movable_holidays_2025() {
    let calendar = HolidayCalendar::for_year(2025);
    assert!(calendar.holiday_on(d(2025, 6, 20)).is_some());
    assert!(calendar.is_public_holiday(d(2025, 11, 1)));
    assert!(calendar.is_public_holiday(d(2025, 4, 18)));
}

#[test]
fn coinciding_holidays_are_all_kept() {
    // Ascension Day fell on May Day in 2008.
    let calendar = HolidayCalendar::for_year(2008);
    assert_eq!(calendar.len(), 17);
    assert_eq!(calendar.holidays_in_year(2008).len(), 17);

    let names: Vec<&str> = calendar
        .holidays_on(d(2008, 5, 1))
        .iter()
        .map(|h| h.name.as_str())
        .collect();
    assert_eq!(names, vec!["Första maj", "Kristi himmelsfärdsdag"]);
    assert_eq!(
        calendar.holiday_on(d(2008, 5, 1)).map(|h| h.name.as_str()),
        Some("Första maj")
    );
    assert!(calendar.is_public_holiday(d(2008, 5, 1)));
    assert!(calendar.holidays_on(d(2008, 5, 2)).is_empty());
}

#[test]
fn year_range_covers_all_years_in_order() {
    let calendar = HolidayCalendar::with_year_range(2026, 2024);
    let per_year = HolidayCalendar::for_year(2025).len();
    assert_eq!(calendar.len(), per_year * 3);

    let in_2025 = calendar.holidays_in_year(2025);
    assert_eq!(in_2025.len(), per_year);
    assert!(in_2025.windows(2).all(|pair| pair[0].date < pair[1].date));
}

#[test]
fn month_view_lays_out_monday_first_weeks() {
    let schedule = Schedule::generate(d(2024, 1, 1), &ScheduleGenerator::new(1));
    let holidays = HolidayCalendar::for_year(2024);
    let view = MonthView::build(2024, 1, &schedule, &holidays).unwrap();

    // January 2024 starts on a Monday and spans five ISO weeks.
    assert_eq!(view.leading_blanks(), 0);
    assert_eq!(view.weeks.len(), 5);
    assert_eq!(view.weeks[0].iso_week, 1);

    let first = view.day(d(2024, 1, 1)).unwrap();
    assert_eq!(first.events.len(), 1);
    assert_eq!(first.events[0].parent, Parent::Dad);
    assert_eq!(
        first.holiday.as_ref().map(|h| h.name.as_str()),
        Some("Nyårsdagen")
    );
    assert!(view.day(d(2024, 1, 2)).unwrap().events.is_empty());
    assert!(view.day(d(2024, 2, 1)).is_none());
}

#[test]
fn month_view_pads_before_first_day() {
    let schedule = Schedule::new();
    let holidays = HolidayCalendar::for_year(2024);
    // 2024-02-01 is a Thursday.
    let view = MonthView::build(2024, 2, &schedule, &holidays).unwrap();
    assert_eq!(view.leading_blanks(), 3);
    let days: usize = view
        .weeks
        .iter()
        .map(|w| w.days.iter().flatten().count())
        .sum();
    assert_eq!(days, 29);
}

#[test]
fn month_view_rejects_invalid_month() {
    let err = MonthView::build(2024, 13, &Schedule::new(), &HolidayCalendar::default()).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidDate(_)));
}

#[test]
fn month_view_reaches_the_last_representable_day() {
    let view = MonthView::build(
        NaiveDate::MAX.year(),
        NaiveDate::MAX.month(),
        &Schedule::new(),
        &HolidayCalendar::default(),
    )
    .unwrap();
    let last = view.weeks.last().unwrap().days.iter().flatten().last().unwrap();
    assert_eq!(last.date, NaiveDate::MAX);
}
