//! The fixed four-phase, 28-day custody rotation.

use serde::Serialize;

use crate::event::Parent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CyclePhase {
    pub parent: Parent,
    pub days: i64,
    pub label: &'static str,
}

pub const PHASE_COUNT: usize = 4;

pub static CYCLE: [CyclePhase; PHASE_COUNT] = [
    CyclePhase {
        parent: Parent::Dad,
        days: 7,
        label: "week+weekend with dad",
    },
    CyclePhase {
        parent: Parent::Mom,
        days: 4,
        label: "weekdays with mom",
    },
    CyclePhase {
        parent: Parent::Dad,
        days: 7,
        label: "weekend+week with dad",
    },
    CyclePhase {
        parent: Parent::Mom,
        days: 10,
        label: "weekend+week+weekend with mom",
    },
];

pub const TOTAL_CYCLE_DAYS: i64 = 28;

/// Phase at `index`, wrapping around the rotation.
pub fn phase(index: usize) -> &'static CyclePhase {
    &CYCLE[index % PHASE_COUNT]
}

pub fn next_phase_index(index: usize) -> usize {
    (index + 1) % PHASE_COUNT
}

/// Phase preceding `index`, wrapping around the rotation.
pub fn previous_phase_index(index: usize) -> usize {
    (index + PHASE_COUNT - 1) % PHASE_COUNT
}
