//! Seeds a fresh schedule by tiling the rotation forward from a Monday.

use chrono::NaiveTime;
use tracing::debug;

use crate::cycle::{self, CyclePhase};
use crate::date_util::{self, LocalDate, MAX_HORIZON_MONTHS};
use crate::event::{EventType, ScheduleEvent};
use crate::ids::{INITIAL_PREFIX, IdGenerator};

pub const DEFAULT_INITIAL_MONTHS: u32 = 6;
pub const DEFAULT_CHILD_NAME: &str = "Child";

pub fn default_handoff_time() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleGenerator {
    pub horizon_months: u32,
    pub handoff_time: NaiveTime,
    pub child_name: String,
}

impl Default for ScheduleGenerator {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_INITIAL_MONTHS,
            handoff_time: default_handoff_time(),
            child_name: DEFAULT_CHILD_NAME.to_string(),
        }
    }
}

impl ScheduleGenerator {
    pub fn new(horizon_months: u32) -> Self {
        Self {
            horizon_months,
            ..Self::default()
        }
    }

    pub fn with_child_name(mut self, child_name: impl Into<String>) -> Self {
        self.child_name = child_name.into();
        self
    }

    pub fn with_handoff_time(mut self, handoff_time: NaiveTime) -> Self {
        self.handoff_time = handoff_time;
        self
    }

    /// Tile the rotation from the Monday on or before `reference` through
    /// `reference + horizon_months`, starting at phase 0. The horizon is
    /// capped at [`MAX_HORIZON_MONTHS`].
    pub fn generate(&self, reference: LocalDate) -> Vec<ScheduleEvent> {
        self.generate_with(reference, &mut IdGenerator::new(INITIAL_PREFIX))
    }

    /// Same as [`generate`](Self::generate), drawing ids from `ids`.
    pub fn generate_with(&self, reference: LocalDate, ids: &mut IdGenerator) -> Vec<ScheduleEvent> {
        let start = date_util::most_recent_monday(reference);
        let months = self.horizon_months.min(MAX_HORIZON_MONTHS);
        let end = date_util::add_months(reference, months);
        let events = self.tile(start, 0, end, ids);
        debug!(
            %start,
            %end,
            count = events.len(),
            "generated initial custody schedule"
        );
        events
    }

    /// Emit one transition per phase from `cursor` while it stays on or
    /// before `end`, starting with `first_phase`.
    pub(crate) fn tile(
        &self,
        mut cursor: LocalDate,
        first_phase: usize,
        end: LocalDate,
        ids: &mut IdGenerator,
    ) -> Vec<ScheduleEvent> {
        let mut events = Vec::new();
        let mut index = first_phase;
        while cursor <= end {
            let phase = cycle::phase(index);
            events.push(self.transition_event(ids.next_id(), cursor, phase));
            let Some(next) = date_util::checked_add_days(cursor, phase.days) else {
                break;
            };
            cursor = next;
            index = cycle::next_phase_index(index);
        }
        events
    }

    fn transition_event(&self, id: String, date: LocalDate, phase: &CyclePhase) -> ScheduleEvent {
        ScheduleEvent {
            id,
            title: format!("{} with {}", self.child_name, phase.parent),
            date,
            time: self.handoff_time,
            description: phase.label.to_string(),
            parent: phase.parent,
            event_type: EventType::Other,
        }
    }
}

/// Generate with default presentation settings.
pub fn generate(reference: LocalDate, horizon_months: u32) -> Vec<ScheduleEvent> {
    ScheduleGenerator::new(horizon_months).generate(reference)
}
