//! Appends new transitions that continue the inferred rotation.
//!
//! Extension is strictly additive: the input is never modified and every
//! emitted date is later than the latest existing one.

use tracing::debug;

use crate::cycle;
use crate::date_util::{self, LocalDate, MAX_HORIZON_MONTHS};
use crate::error::{Result, ScheduleError};
use crate::event::ScheduleEvent;
use crate::generator::ScheduleGenerator;
use crate::ids::IdGenerator;
use crate::inference::{self, CycleInference};

/// Horizon used by the "continue schedule" action.
pub const DEFAULT_CONTINUE_MONTHS: u32 = 3;

/// Date of the first transition after `last_event_date` given `inference`.
pub fn first_new_transition(last_event_date: LocalDate, inference: &CycleInference) -> LocalDate {
    let elapsed = date_util::days_between(inference.anchor_date, last_event_date);
    let remaining = (cycle::phase(inference.phase_index).days - elapsed).max(1);
    date_util::add_days(last_event_date, remaining)
}

/// Continue through `last event date + horizon_months`.
pub fn extend(
    events: &[ScheduleEvent],
    inference: &CycleInference,
    horizon_months: u32,
    generator: &ScheduleGenerator,
    ids: &mut IdGenerator,
) -> Result<Vec<ScheduleEvent>> {
    if horizon_months > MAX_HORIZON_MONTHS {
        return Err(ScheduleError::HorizonTooLong(format!(
            "+{horizon_months} months"
        )));
    }
    let Some(last_event_date) = events.iter().map(|event| event.date).max() else {
        return Ok(Vec::new());
    };
    let new_end = date_util::add_months(last_event_date, horizon_months);
    extend_until(events, inference, new_end, generator, ids)
}

/// Continue through an explicit horizon date. Returns nothing when the first
/// new transition would already fall after `until`.
pub fn extend_until(
    events: &[ScheduleEvent],
    inference: &CycleInference,
    until: LocalDate,
    generator: &ScheduleGenerator,
    ids: &mut IdGenerator,
) -> Result<Vec<ScheduleEvent>> {
    let Some(last_event_date) = events.iter().map(|event| event.date).max() else {
        return Ok(Vec::new());
    };
    if until > date_util::add_months(last_event_date, MAX_HORIZON_MONTHS) {
        return Err(ScheduleError::HorizonTooLong(date_util::format_date(until)));
    }
    let first = first_new_transition(last_event_date, inference);
    let next_phase = cycle::next_phase_index(inference.phase_index);
    if first > until {
        debug!(%first, %until, "horizon already covered, nothing to extend");
        return Ok(Vec::new());
    }

    let added = generator.tile(first, next_phase, until, ids);
    debug!(
        %first,
        %until,
        next_phase,
        count = added.len(),
        "extended custody schedule"
    );
    Ok(added)
}

/// Infer the current phase and extend by `horizon_months`.
pub fn continue_schedule(
    events: &[ScheduleEvent],
    horizon_months: u32,
    generator: &ScheduleGenerator,
    ids: &mut IdGenerator,
) -> Result<Vec<ScheduleEvent>> {
    if events.is_empty() {
        return Err(ScheduleError::NothingToContinue);
    }
    let inference = inference::infer(events)?;
    extend(events, &inference, horizon_months, generator, ids)
}
