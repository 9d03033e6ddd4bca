//! iCalendar (RFC 5545) export of the event collection.

use chrono::{Duration, NaiveDateTime};

use crate::date_util::LocalDate;
use crate::event::{ScheduleEvent, sort_chronologically};

pub const DEFAULT_DOMAIN: &str = "custody-schedule";

const PRODID: &str = "-//custody-schedule//Custody Schedule//EN";
const LOCAL_STAMP: &str = "%Y%m%dT%H%M%S";
const MAX_LINE_OCTETS: usize = 75;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Suffix appended to event ids to form globally unique UIDs.
    pub domain: String,
    /// Events dated before this are left out.
    pub from: Option<LocalDate>,
    /// Creation timestamp written as DTSTAMP, in UTC.
    pub created_at: NaiveDateTime,
}

impl ExportOptions {
    pub fn new(created_at: NaiveDateTime) -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            from: None,
            created_at,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn from_date(mut self, from: Option<LocalDate>) -> Self {
        self.from = from;
        self
    }
}

pub fn export_ics(events: &[ScheduleEvent], options: &ExportOptions) -> String {
    let mut selected: Vec<ScheduleEvent> = events
        .iter()
        .filter(|event| options.from.is_none_or(|from| event.date >= from))
        .cloned()
        .collect();
    sort_chronologically(&mut selected);

    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{PRODID}"));
    push_line(&mut out, "CALSCALE:GREGORIAN");
    push_line(&mut out, "METHOD:PUBLISH");
    for event in &selected {
        write_event(&mut out, event, options);
    }
    push_line(&mut out, "END:VCALENDAR");
    out
}

fn write_event(out: &mut String, event: &ScheduleEvent, options: &ExportOptions) {
    let start = event.date.and_time(event.time);
    let end = start + Duration::hours(1);

    push_line(out, "BEGIN:VEVENT");
    push_line(out, &format!("UID:{}@{}", event.id, options.domain));
    push_line(
        out,
        &format!("DTSTAMP:{}Z", options.created_at.format(LOCAL_STAMP)),
    );
    push_line(out, &format!("DTSTART:{}", start.format(LOCAL_STAMP)));
    push_line(out, &format!("DTEND:{}", end.format(LOCAL_STAMP)));
    push_line(out, &format!("SUMMARY:{}", escape_text(&event.title)));
    if !event.description.is_empty() {
        push_line(
            out,
            &format!("DESCRIPTION:{}", escape_text(&event.description)),
        );
    }
    push_line(
        out,
        &format!("LOCATION:{}", escape_text(event.parent.display_name())),
    );
    push_line(out, &format!("CATEGORIES:{}", event.event_type.as_str().to_uppercase()));
    push_line(out, "END:VEVENT");
}

/// Escape a TEXT value.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

/// Append a content line, folded at 75 octets, terminated by CRLF.
fn push_line(out: &mut String, line: &str) {
    let mut octets = 0;
    for ch in line.chars() {
        let width = ch.len_utf8();
        if octets + width > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            // the leading space of a continuation line counts
            octets = 1;
        }
        out.push(ch);
        octets += width;
    }
    out.push_str("\r\n");
}
