use crate::Schedule;
use crate::config::StoreKind;
use crate::date_util::LocalDate;
use crate::event::ScheduleEvent;
use crate::event_validation;
use crate::generator::ScheduleGenerator;
use serde_json::Error as SerdeJsonError;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Whole-collection storage: every save replaces what was stored before.
pub trait ScheduleStore {
    fn save_schedule(&self, schedule: &Schedule) -> PersistenceResult<()>;
    fn load_schedule(&self) -> PersistenceResult<Option<Schedule>>;
}

pub fn validate_events(events: &[ScheduleEvent]) -> PersistenceResult<()> {
    event_validation::validate_event_collection(events)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

/// Load the stored schedule, or generate a fresh one when nothing usable is
/// stored. Unreadable state is discarded rather than reported.
pub fn load_or_generate<S: ScheduleStore + ?Sized>(
    store: &S,
    reference: LocalDate,
    generator: &ScheduleGenerator,
) -> Schedule {
    match store.load_schedule() {
        Ok(Some(schedule)) => {
            info!(
                events = schedule.len(),
                version = schedule.version(),
                "loaded stored schedule"
            );
            schedule
        }
        Ok(None) => {
            info!(%reference, "no stored schedule, generating initial schedule");
            Schedule::generate(reference, generator)
        }
        Err(err) => {
            warn!(error = %err, "stored schedule is unreadable, regenerating");
            Schedule::generate(reference, generator)
        }
    }
}

pub type SharedStore = Box<dyn ScheduleStore + Send + Sync>;

/// Open the store configured for `path`.
pub fn open_store(path: &Path, kind: StoreKind) -> PersistenceResult<SharedStore> {
    match kind {
        StoreKind::Json => Ok(Box::new(JsonFileStore::new(path))),
        #[cfg(feature = "sqlite")]
        StoreKind::Sqlite => Ok(Box::new(sqlite::SqliteScheduleStore::new(path)?)),
        #[cfg(not(feature = "sqlite"))]
        StoreKind::Sqlite => Err(PersistenceError::InvalidData(
            "sqlite support is not compiled in".into(),
        )),
    }
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    JsonFileStore, load_schedule_from_csv, load_schedule_from_json, save_schedule_to_csv,
    save_schedule_to_json,
};
