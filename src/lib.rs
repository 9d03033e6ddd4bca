//! # custody-schedule
//!
//! Keeps track of which guardian has custody on which day. The schedule is a
//! list of custody-transition events following a fixed 28-day rotation; this
//! crate generates it, works out where an edited schedule currently is in the
//! rotation, and continues it forward.
//!
//! ## Modules
//!
//! - [`date_util`]: local calendar-date helpers
//! - [`cycle`]: the four-phase rotation
//! - [`generator`]: initial schedule generation
//! - [`inference`]: current-phase inference from existing events
//! - [`extender`]: additive continuation of the rotation
//! - [`schedule`]: the owned, versioned event collection
//! - [`holidays`] / [`calendar`]: Swedish holidays and month views
//! - [`export`]: iCalendar export
//! - [`persistence`]: JSON, CSV and SQLite storage

pub mod calendar;
pub mod config;
pub mod cycle;
pub mod date_util;
pub mod error;
pub mod event;
pub(crate) mod event_validation;
pub mod export;
pub mod extender;
pub mod generator;
pub mod holidays;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod ids;
pub mod inference;
pub mod persistence;
pub mod schedule;

pub use calendar::MonthView;
pub use config::{AppConfig, ConfigError, StoreKind};
pub use cycle::{CYCLE, CyclePhase, TOTAL_CYCLE_DAYS};
pub use date_util::LocalDate;
pub use error::ScheduleError;
pub use event::{EventType, NewEvent, Parent, ScheduleEvent};
pub use export::{ExportOptions, export_ics};
pub use extender::{DEFAULT_CONTINUE_MONTHS, continue_schedule, extend, extend_until};
pub use generator::ScheduleGenerator;
pub use holidays::{Holiday, HolidayCalendar, HolidayKind};
pub use ids::IdGenerator;
pub use inference::{CycleInference, InferenceBasis, infer};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteScheduleStore;
pub use persistence::{
    JsonFileStore, PersistenceError, ScheduleStore, load_or_generate, load_schedule_from_csv,
    load_schedule_from_json, save_schedule_to_csv, save_schedule_to_json,
};
pub use schedule::{Continuation, Schedule, ScheduleSummary};
