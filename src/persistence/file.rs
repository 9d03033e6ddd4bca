use super::{PersistenceError, PersistenceResult, ScheduleStore};
use crate::Schedule;
use crate::date_util::{self, LocalDate};
use crate::event::{self, EventType, Parent, ScheduleEvent};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Serialize)]
struct ScheduleSnapshot<'a> {
    version: u64,
    next_sequence: u64,
    events: &'a [ScheduleEvent],
}

/// Accepts both the versioned snapshot and a bare array of events.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSchedule {
    Snapshot {
        #[serde(default)]
        version: u64,
        #[serde(default)]
        next_sequence: u64,
        events: Vec<ScheduleEvent>,
    },
    Events(Vec<ScheduleEvent>),
}

impl StoredSchedule {
    fn into_schedule(self) -> PersistenceResult<Schedule> {
        let (events, version, next_sequence) = match self {
            StoredSchedule::Snapshot {
                version,
                next_sequence,
                events,
            } => (events, version, next_sequence),
            StoredSchedule::Events(events) => (events, 0, 0),
        };
        super::validate_events(&events)?;
        Ok(Schedule::from_parts(events, version, next_sequence))
    }
}

fn write_snapshot<W: Write>(schedule: &Schedule, writer: W) -> PersistenceResult<()> {
    super::validate_events(schedule.events())?;
    let snapshot = ScheduleSnapshot {
        version: schedule.version(),
        next_sequence: schedule.next_sequence(),
        events: schedule.events(),
    };
    serde_json::to_writer_pretty(writer, &snapshot)?;
    Ok(())
}

pub fn save_schedule_to_json<P: AsRef<Path>>(
    schedule: &Schedule,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_snapshot(schedule, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn load_schedule_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Schedule> {
    let file = File::open(path)?;
    let stored: StoredSchedule = serde_json::from_reader(BufReader::new(file))?;
    stored.into_schedule()
}

/// Key-value style store backed by one JSON file. Saves write a sibling
/// temp file and rename it over the target, so readers never observe a
/// partially written collection.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ScheduleStore for JsonFileStore {
    fn save_schedule(&self, schedule: &Schedule) -> PersistenceResult<()> {
        let tmp = self.temp_path();
        save_schedule_to_json(schedule, &tmp)?;
        fs::rename(&tmp, &self.path)?;
        info!(
            path = %self.path.display(),
            events = schedule.len(),
            version = schedule.version(),
            "saved schedule"
        );
        Ok(())
    }

    fn load_schedule(&self) -> PersistenceResult<Option<Schedule>> {
        match load_schedule_from_json(&self.path) {
            Ok(schedule) => Ok(Some(schedule)),
            Err(PersistenceError::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[derive(Default, Serialize, Deserialize)]
struct EventCsvRecord {
    id: String,
    title: String,
    date: String,
    time: String,
    #[serde(default)]
    description: String,
    parent: String,
    #[serde(default, rename = "type")]
    event_type: String,
}

impl From<&ScheduleEvent> for EventCsvRecord {
    fn from(event: &ScheduleEvent) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            date: date_util::format_date(event.date),
            time: event.time.format(event::TIME_FORMAT).to_string(),
            description: event.description.clone(),
            parent: event.parent.as_str().to_string(),
            event_type: event.event_type.as_str().to_string(),
        }
    }
}

impl EventCsvRecord {
    fn into_event(self) -> PersistenceResult<ScheduleEvent> {
        let date = parse_date(&self.date)?;
        let time = event::parse_time(&self.time).ok_or_else(|| {
            PersistenceError::InvalidData(format!("invalid time '{}' for {}", self.time, self.id))
        })?;
        let parent = Parent::from_str(&self.parent).ok_or_else(|| {
            PersistenceError::InvalidData(format!(
                "invalid parent '{}' for {}",
                self.parent, self.id
            ))
        })?;
        Ok(ScheduleEvent {
            id: self.id,
            title: self.title,
            date,
            time,
            description: self.description,
            parent,
            event_type: EventType::from_str_lenient(&self.event_type),
        })
    }
}

pub fn save_schedule_to_csv<P: AsRef<Path>>(schedule: &Schedule, path: P) -> PersistenceResult<()> {
    super::validate_events(schedule.events())?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for event in schedule.sorted_events() {
        writer.serialize(EventCsvRecord::from(&event))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_schedule_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Schedule> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut events = Vec::new();
    for record in reader.deserialize::<EventCsvRecord>() {
        events.push(record?.into_event()?);
    }
    super::validate_events(&events)?;
    Ok(Schedule::from_events(events))
}

fn parse_date(input: &str) -> PersistenceResult<LocalDate> {
    date_util::parse_date(input)
        .map_err(|e| PersistenceError::InvalidData(e.to_string()))
}
