use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::date_util::LocalDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayKind {
    /// Public holiday ("röd dag").
    Public,
    /// Flag day / eve, not a public holiday in itself.
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub name: String,
    pub date: LocalDate,
    pub kind: HolidayKind,
}

/// Swedish public holidays and holiday eves for a span of years.
///
/// Movable feasts can land on a fixed holiday (Ascension Day fell on
/// 1 May in 2008), so each date keeps every holiday in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HolidayCalendar {
    holidays: BTreeMap<LocalDate, Vec<Holiday>>,
}

impl HolidayCalendar {
    pub fn with_year_range(start_year: i32, end_year: i32) -> Self {
        let (start, end) = if start_year <= end_year {
            (start_year, end_year)
        } else {
            (end_year, start_year)
        };

        let mut calendar = Self::default();
        for year in start..=end {
            calendar.add_swedish_holidays(year);
        }
        calendar
    }

    pub fn for_year(year: i32) -> Self {
        Self::with_year_range(year, year)
    }

    fn insert(&mut self, name: &str, date: Option<NaiveDate>, kind: HolidayKind) {
        if let Some(date) = date {
            self.holidays.entry(date).or_default().push(Holiday {
                name: name.to_string(),
                date,
                kind,
            });
        }
    }

    fn add_swedish_holidays(&mut self, year: i32) {
        let fixed = |month, day| NaiveDate::from_ymd_opt(year, month, day);

        self.insert("Nyårsdagen", fixed(1, 1), HolidayKind::Public);
        self.insert("Trettondedag jul", fixed(1, 6), HolidayKind::Public);
        self.insert("Första maj", fixed(5, 1), HolidayKind::Public);
        self.insert("Sveriges nationaldag", fixed(6, 6), HolidayKind::Public);
        self.insert("Julafton", fixed(12, 24), HolidayKind::Flag);
        self.insert("Juldagen", fixed(12, 25), HolidayKind::Public);
        self.insert("Annandag jul", fixed(12, 26), HolidayKind::Public);
        self.insert("Nyårsafton", fixed(12, 31), HolidayKind::Flag);

        if let Some(easter) = easter_sunday(year) {
            let offset = |days| Some(easter + Duration::days(days));
            self.insert("Långfredagen", offset(-2), HolidayKind::Public);
            self.insert("Påskafton", offset(-1), HolidayKind::Flag);
            self.insert("Påskdagen", offset(0), HolidayKind::Public);
            self.insert("Annandag påsk", offset(1), HolidayKind::Public);
            self.insert("Kristi himmelsfärdsdag", offset(39), HolidayKind::Public);
            self.insert("Pingstdagen", offset(49), HolidayKind::Public);
        }

        // Midsummer Eve is the Friday between 19 and 25 June.
        let midsummer_eve = Self::first_weekday_from(year, 6, 19, Weekday::Fri);
        self.insert("Midsommarafton", midsummer_eve, HolidayKind::Flag);
        self.insert(
            "Midsommardagen",
            midsummer_eve.map(|eve| eve + Duration::days(1)),
            HolidayKind::Public,
        );

        // All Saints' Day is the Saturday between 31 October and 6 November.
        self.insert(
            "Alla helgons dag",
            Self::first_weekday_from(year, 10, 31, Weekday::Sat),
            HolidayKind::Public,
        );
    }

    /// First `weekday` on or after the given day.
    fn first_weekday_from(year: i32, month: u32, day: u32, weekday: Weekday) -> Option<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(year, month, day)?;
        (0..7)
            .map(|offset| start + Duration::days(offset))
            .find(|date| date.weekday() == weekday)
    }

    /// First holiday registered for `date`; fixed-date holidays come first.
    pub fn holiday_on(&self, date: LocalDate) -> Option<&Holiday> {
        self.holidays_on(date).first()
    }

    pub fn holidays_on(&self, date: LocalDate) -> &[Holiday] {
        self.holidays.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_public_holiday(&self, date: LocalDate) -> bool {
        self.holidays_on(date)
            .iter()
            .any(|holiday| holiday.kind == HolidayKind::Public)
    }

    /// Holidays of `year` in date order.
    pub fn holidays_in_year(&self, year: i32) -> Vec<&Holiday> {
        self.holidays
            .values()
            .flatten()
            .filter(|holiday| holiday.date.year() == year)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.holidays.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}

/// Easter Sunday by the anonymous Gregorian computus.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
