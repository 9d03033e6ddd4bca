use crate::date_util::{self, LocalDate};
use crate::error::{Result, ScheduleError};
use crate::event::{NewEvent, ScheduleEvent, sort_chronologically};
use crate::event_validation::{self, EventValidationError};
use crate::extender;
use crate::generator::ScheduleGenerator;
use crate::ids::{self, CYCLE_PREFIX, EVENT_PREFIX, INITIAL_PREFIX, IdGenerator};
use crate::inference::{self, CycleInference};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub version: u64,
    pub event_count: usize,
    pub first_date: Option<LocalDate>,
    pub last_date: Option<LocalDate>,
    pub current_phase: Option<usize>,
    pub anchor_date: Option<LocalDate>,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("v{}", self.version));
        parts.push(format!("events={}", self.event_count));
        if let (Some(first), Some(last)) = (self.first_date, self.last_date) {
            parts.push(format!("span={first}..{last}"));
        }
        if let Some(phase) = self.current_phase {
            parts.push(format!("phase={phase}"));
        }
        if let Some(anchor) = self.anchor_date {
            parts.push(format!("anchor={anchor}"));
        }
        parts.join(", ")
    }
}

/// Outcome of a "continue schedule" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    Extended {
        schedule: Schedule,
        added: Vec<ScheduleEvent>,
    },
    /// The requested horizon is already covered; nothing was added.
    AlreadyCovered,
}

/// The authoritative event collection.
///
/// A `Schedule` is a value: every mutation returns a new schedule with the
/// version bumped and leaves the receiver untouched, so a failed operation
/// can never leave a half-applied collection behind. `next_sequence` only
/// grows, so ids of deleted events are never handed out again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    events: Vec<ScheduleEvent>,
    version: u64,
    next_sequence: u64,
}

impl Default for Schedule {
    fn default() -> Self {
        Self::from_parts(Vec::new(), 0, 1)
    }
}

impl Schedule {
    /// `next_sequence` is raised past every id already in `events`.
    pub(crate) fn from_parts(events: Vec<ScheduleEvent>, version: u64, next_sequence: u64) -> Self {
        let next_sequence = next_sequence.max(ids::next_free_sequence(&events));
        Self {
            events,
            version,
            next_sequence,
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<ScheduleEvent>) -> Self {
        Self::from_parts(events, 0, 1)
    }

    pub fn generate(reference: LocalDate, generator: &ScheduleGenerator) -> Self {
        let mut ids = IdGenerator::new(INITIAL_PREFIX);
        let events = generator.generate_with(reference, &mut ids);
        Self::from_parts(events, 0, ids.next_sequence())
    }

    /// Replace the whole collection with a freshly generated schedule.
    pub fn regenerated(&self, reference: LocalDate, generator: &ScheduleGenerator) -> Self {
        let mut ids = self.id_generator(INITIAL_PREFIX);
        let events = generator.generate_with(reference, &mut ids);
        self.successor(events, ids.next_sequence())
    }

    /// Replace the whole collection with an imported schedule, keeping
    /// this schedule's version and id sequence moving forward.
    pub fn replaced_with(&self, imported: Schedule) -> Self {
        let next_sequence = self.next_sequence.max(imported.next_sequence);
        self.successor(imported.events, next_sequence)
    }

    fn successor(&self, events: Vec<ScheduleEvent>, next_sequence: u64) -> Self {
        Self::from_parts(events, self.version + 1, next_sequence)
    }

    fn id_generator(&self, prefix: &str) -> IdGenerator {
        IdGenerator::starting_at(prefix, self.next_sequence)
    }

    fn validation_error(err: EventValidationError) -> ScheduleError {
        ScheduleError::InvalidEvent(err.to_string())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Sequence number the next new id will carry.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Events in insertion order.
    pub fn events(&self) -> &[ScheduleEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn sorted_events(&self) -> Vec<ScheduleEvent> {
        let mut events = self.events.clone();
        sort_chronologically(&mut events);
        events
    }

    pub fn find_event(&self, id: &str) -> Option<&ScheduleEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn events_on(&self, date: LocalDate) -> Vec<&ScheduleEvent> {
        let mut found: Vec<&ScheduleEvent> =
            self.events.iter().filter(|event| event.date == date).collect();
        found.sort_by_key(|event| event.time);
        found
    }

    pub fn first_event_date(&self) -> Option<LocalDate> {
        self.events.iter().map(|event| event.date).min()
    }

    pub fn last_event_date(&self) -> Option<LocalDate> {
        self.events.iter().map(|event| event.date).max()
    }

    pub fn inference(&self) -> Result<CycleInference> {
        inference::infer(&self.events)
    }

    pub fn summary(&self) -> ScheduleSummary {
        let inferred = self.inference().ok();
        ScheduleSummary {
            version: self.version,
            event_count: self.events.len(),
            first_date: self.first_event_date(),
            last_date: self.last_event_date(),
            current_phase: inferred.map(|i| i.phase_index),
            anchor_date: inferred.map(|i| i.anchor_date),
        }
    }

    /// Add an event from the form, assigning it a fresh id.
    pub fn with_event(&self, event: NewEvent) -> Result<(Schedule, ScheduleEvent)> {
        event_validation::validate_new_event(&event).map_err(Self::validation_error)?;
        let mut ids = self.id_generator(EVENT_PREFIX);
        let created = ScheduleEvent::from_new(ids.next_id(), event);
        let mut events = self.events.clone();
        events.push(created.clone());
        Ok((self.successor(events, ids.next_sequence()), created))
    }

    /// Replace every field except the id of an existing event.
    pub fn with_updated_event(&self, id: &str, event: NewEvent) -> Result<Schedule> {
        event_validation::validate_new_event(&event).map_err(Self::validation_error)?;
        let position = self
            .events
            .iter()
            .position(|existing| existing.id == id)
            .ok_or_else(|| ScheduleError::EventNotFound(id.to_string()))?;
        let mut events = self.events.clone();
        events[position] = ScheduleEvent::from_new(id, event);
        Ok(self.successor(events, self.next_sequence))
    }

    pub fn without_event(&self, id: &str) -> Result<Schedule> {
        if self.find_event(id).is_none() {
            return Err(ScheduleError::EventNotFound(id.to_string()));
        }
        let events = self
            .events
            .iter()
            .filter(|event| event.id != id)
            .cloned()
            .collect();
        Ok(self.successor(events, self.next_sequence))
    }

    /// Drop every event dated strictly before `cutoff` (a `YYYY-MM-DD`
    /// string as typed by the user). The date is validated first.
    pub fn without_events_before(&self, cutoff: &str) -> Result<(Schedule, usize)> {
        let cutoff = date_util::parse_date(cutoff)?;
        let kept: Vec<ScheduleEvent> = self
            .events
            .iter()
            .filter(|event| event.date >= cutoff)
            .cloned()
            .collect();
        let removed = self.events.len() - kept.len();
        Ok((self.successor(kept, self.next_sequence), removed))
    }

    /// Continue the rotation `months` past the latest event.
    pub fn continued(&self, months: u32, generator: &ScheduleGenerator) -> Result<Continuation> {
        let mut ids = self.id_generator(CYCLE_PREFIX);
        let added = extender::continue_schedule(&self.events, months, generator, &mut ids)?;
        Ok(self.adopt(added, &ids))
    }

    /// Continue the rotation through `until`.
    pub fn continued_through(
        &self,
        until: LocalDate,
        generator: &ScheduleGenerator,
    ) -> Result<Continuation> {
        let inference = self.inference()?;
        let mut ids = self.id_generator(CYCLE_PREFIX);
        let added = extender::extend_until(&self.events, &inference, until, generator, &mut ids)?;
        Ok(self.adopt(added, &ids))
    }

    fn adopt(&self, added: Vec<ScheduleEvent>, ids: &IdGenerator) -> Continuation {
        if added.is_empty() {
            return Continuation::AlreadyCovered;
        }
        let mut events = self.events.clone();
        events.extend(added.iter().cloned());
        Continuation::Extended {
            schedule: self.successor(events, ids.next_sequence()),
            added,
        }
    }
}
