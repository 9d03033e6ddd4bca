//! Month grid data for calendar displays: Monday-first weeks with ISO week
//! numbers, events grouped by day, and the holiday of each day.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::date_util::LocalDate;
use crate::error::{Result, ScheduleError};
use crate::event::ScheduleEvent;
use crate::holidays::{Holiday, HolidayCalendar};
use crate::schedule::Schedule;

#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub date: LocalDate,
    pub events: Vec<ScheduleEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holiday: Option<Holiday>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekRow {
    pub iso_week: u32,
    /// Monday through Sunday; `None` outside the month.
    pub days: [Option<DayCell>; 7],
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<WeekRow>,
}

impl MonthView {
    pub fn build(
        year: i32,
        month: u32,
        schedule: &Schedule,
        holidays: &HolidayCalendar,
    ) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ScheduleError::InvalidDate(format!("{year}-{month:02}")))?;

        let mut weeks: Vec<WeekRow> = Vec::new();
        let mut current = first;
        while current.month() == month && current.year() == year {
            let column = current.weekday().num_days_from_monday() as usize;
            if column == 0 || weeks.is_empty() {
                weeks.push(WeekRow {
                    iso_week: current.iso_week().week(),
                    days: Default::default(),
                });
            }
            let cell = DayCell {
                date: current,
                events: schedule.events_on(current).into_iter().cloned().collect(),
                holiday: holidays.holiday_on(current).cloned(),
            };
            if let Some(row) = weeks.last_mut() {
                row.days[column] = Some(cell);
            }
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }

        Ok(Self { year, month, weeks })
    }

    pub fn day(&self, date: LocalDate) -> Option<&DayCell> {
        self.weeks
            .iter()
            .flat_map(|week| week.days.iter().flatten())
            .find(|cell| cell.date == date)
    }

    /// Leading empty cells before the 1st (Monday-first week).
    pub fn leading_blanks(&self) -> usize {
        self.weeks
            .first()
            .map(|week| week.days.iter().take_while(|day| day.is_none()).count())
            .unwrap_or(0)
    }
}
