use crate::event::{NewEvent, ScheduleEvent};
use std::collections::HashSet;
use std::fmt;

const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct EventValidationError {
    message: String,
}

impl EventValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EventValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EventValidationError {}

pub fn validate_new_event(event: &NewEvent) -> Result<(), EventValidationError> {
    validate_title(&event.title)
}

pub fn validate_event(event: &ScheduleEvent) -> Result<(), EventValidationError> {
    if event.id.trim().is_empty() {
        return Err(EventValidationError::new("event id must not be empty"));
    }
    validate_title(&event.title)
        .map_err(|err| EventValidationError::new(format!("event {}: {}", event.id, err)))
}

fn validate_title(title: &str) -> Result<(), EventValidationError> {
    if title.trim().is_empty() {
        return Err(EventValidationError::new("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(EventValidationError::new(format!(
            "title is longer than {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_event_collection(events: &[ScheduleEvent]) -> Result<(), EventValidationError> {
    let mut seen = HashSet::with_capacity(events.len());
    for event in events {
        validate_event(event)?;
        if !seen.insert(event.id.as_str()) {
            return Err(EventValidationError::new(format!(
                "duplicate event id {}",
                event.id
            )));
        }
    }
    Ok(())
}
