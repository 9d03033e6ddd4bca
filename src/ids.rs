use crate::event::ScheduleEvent;

pub const INITIAL_PREFIX: &str = "initial";
pub const CYCLE_PREFIX: &str = "cycle";
pub const EVENT_PREFIX: &str = "event";

/// `"{prefix}-{n}"` identifiers. The number comes from one sequence per
/// schedule, shared by all prefixes, so no number is issued twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    prefix: String,
    next: u64,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    pub fn starting_at(prefix: impl Into<String>, next: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: next.max(1),
        }
    }

    /// Continue after the highest sequence number used by any id in `events`.
    pub fn resume(prefix: impl Into<String>, events: &[ScheduleEvent]) -> Self {
        Self::starting_at(prefix, next_free_sequence(events))
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }

    /// Number the next id will carry.
    pub fn next_sequence(&self) -> u64 {
        self.next
    }
}

/// One past the highest numeric suffix among the ids of `events`.
pub fn next_free_sequence(events: &[ScheduleEvent]) -> u64 {
    events
        .iter()
        .filter_map(|event| sequence_of(&event.id))
        .max()
        .map_or(1, |highest| highest.saturating_add(1))
}

fn sequence_of(id: &str) -> Option<u64> {
    let (prefix, number) = id.rsplit_once('-')?;
    if prefix.is_empty() {
        return None;
    }
    number.parse().ok()
}
