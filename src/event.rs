use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::date_util::LocalDate;

/// Guardian owning the custody block that starts at an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parent {
    Mom,
    Dad,
}

impl Parent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Parent::Mom => "mom",
            Parent::Dad => "dad",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mom" | "mamma" => Some(Parent::Mom),
            "dad" | "pappa" => Some(Parent::Dad),
            _ => None,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Parent::Mom => Parent::Dad,
            Parent::Dad => Parent::Mom,
        }
    }

    /// Name shown in calendars and used as the exported location.
    pub fn display_name(&self) -> &'static str {
        match self {
            Parent::Mom => "Mamma",
            Parent::Dad => "Pappa",
        }
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display tag only; the rotation logic never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Pickup,
    Dropoff,
    Activity,
    Appointment,
    #[default]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::Pickup,
        EventType::Dropoff,
        EventType::Activity,
        EventType::Appointment,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Pickup => "pickup",
            EventType::Dropoff => "dropoff",
            EventType::Activity => "activity",
            EventType::Appointment => "appointment",
            EventType::Other => "other",
        }
    }

    /// Unknown tags fall back to [`EventType::Other`].
    pub fn from_str_lenient(value: &str) -> Self {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value))
            .unwrap_or(EventType::Other)
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(EventType::from_str_lenient(&raw))
    }
}

/// A custody-transition marker (or any user-entered event) on a local date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: String,
    pub title: String,
    pub date: LocalDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub description: String,
    pub parent: Parent,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
}

impl ScheduleEvent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        date: LocalDate,
        time: NaiveTime,
        parent: Parent,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date,
            time,
            description: String::new(),
            parent,
            event_type: EventType::Other,
        }
    }

    pub fn from_new(id: impl Into<String>, event: NewEvent) -> Self {
        Self {
            id: id.into(),
            title: event.title,
            date: event.date,
            time: event.time,
            description: event.description,
            parent: event.parent,
            event_type: event.event_type,
        }
    }
}

/// An event as produced by the add/edit form: everything except the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub date: LocalDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub description: String,
    pub parent: Parent,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
}

impl NewEvent {
    pub fn new(title: impl Into<String>, date: LocalDate, time: NaiveTime, parent: Parent) -> Self {
        Self {
            title: title.into(),
            date,
            time,
            description: String::new(),
            parent,
            event_type: EventType::Other,
        }
    }
}

/// Stable chronological order: by date, then time, insertion order on ties.
pub fn sort_chronologically(events: &mut [ScheduleEvent]) {
    events.sort_by(|a, b| a.date.cmp(&b.date).then(a.time.cmp(&b.time)));
}

pub const TIME_FORMAT: &str = "%H:%M";

/// Parse a 24-hour `HH:MM` wall-clock time.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT).ok()
}

pub(crate) mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(super::TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw)
            .or_else(|| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S").ok())
            .ok_or_else(|| D::Error::custom(format!("invalid time '{raw}' (expected HH:MM)")))
    }
}
