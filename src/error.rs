//! Error types for schedule operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("no schedule to continue: the event collection is empty")]
    NothingToContinue,

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("event {0} not found")]
    EventNotFound(String),

    #[error("invalid event: {0}")]
    InvalidEvent(String),

    #[error(
        "horizon {0} is more than {max} months ahead",
        max = crate::date_util::MAX_HORIZON_MONTHS
    )]
    HorizonTooLong(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
