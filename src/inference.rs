//! Infers where in the rotation an existing, possibly hand-edited, event
//! collection currently is.
//!
//! Only custody *transitions* matter: the first event, and every later event
//! whose parent differs from the one before it (after a stable sort by date).
//! The gaps between consecutive transitions are the completed custody blocks.
//!
//! # Matching
//!
//! Candidates for the current phase are the phases owned by the latest
//! transition's parent. For each candidate the completed blocks are walked
//! backwards against the phases preceding it, comparing parent and length
//! with a tolerance of [`DAY_TOLERANCE`]. A candidate needs at least the most
//! recent block to match; the longest consistent run wins and ties go to the
//! lowest phase index.
//!
//! # Fallback
//!
//! With a single transition, or when no candidate matches the most recent
//! block, the result is the first phase whose parent differs from the latest
//! transition's parent ([`InferenceBasis::Fallback`]).

use serde::Serialize;
use tracing::debug;

use crate::cycle::{self, CYCLE, PHASE_COUNT};
use crate::date_util::{self, LocalDate};
use crate::error::{Result, ScheduleError};
use crate::event::{Parent, ScheduleEvent};

/// Accepted difference, in days, between a recorded block and a phase length.
pub const DAY_TOLERANCE: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub date: LocalDate,
    pub parent: Parent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InferenceBasis {
    /// `matched_blocks` completed blocks agreed with the rotation.
    Matched { matched_blocks: usize },
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleInference {
    pub phase_index: usize,
    pub anchor_date: LocalDate,
    pub days_since_transition: i64,
    pub basis: InferenceBasis,
}

impl CycleInference {
    pub fn is_fallback(&self) -> bool {
        matches!(self.basis, InferenceBasis::Fallback)
    }
}

/// Transition points of `events` in chronological order.
pub fn transitions(events: &[ScheduleEvent]) -> Vec<Transition> {
    let mut sorted: Vec<&ScheduleEvent> = events.iter().collect();
    sorted.sort_by_key(|event| event.date);

    let mut found: Vec<Transition> = Vec::new();
    let mut previous: Option<Parent> = None;
    for event in sorted {
        if previous != Some(event.parent) {
            found.push(Transition {
                date: event.date,
                parent: event.parent,
            });
        }
        previous = Some(event.parent);
    }
    found
}

pub fn infer(events: &[ScheduleEvent]) -> Result<CycleInference> {
    let transitions = transitions(events);
    let Some(latest) = transitions.last().copied() else {
        return Err(ScheduleError::NothingToContinue);
    };
    let last_date = events
        .iter()
        .map(|event| event.date)
        .max()
        .unwrap_or(latest.date);
    let days_since_transition = date_util::days_between(latest.date, last_date);

    let (phase_index, basis) = match best_match(&transitions) {
        Some((index, matched_blocks)) => (index, InferenceBasis::Matched { matched_blocks }),
        None => (fallback_phase(latest.parent), InferenceBasis::Fallback),
    };

    debug!(
        phase_index,
        anchor = %latest.date,
        days_since_transition,
        ?basis,
        transitions = transitions.len(),
        "inferred current rotation phase"
    );

    Ok(CycleInference {
        phase_index,
        anchor_date: latest.date,
        days_since_transition,
        basis,
    })
}

/// First phase not owned by `parent`: the next block must be the other one's.
pub fn fallback_phase(parent: Parent) -> usize {
    CYCLE
        .iter()
        .position(|phase| phase.parent != parent)
        .unwrap_or(0)
}

fn within_tolerance(recorded_days: i64, phase_days: i64) -> bool {
    (recorded_days - phase_days).abs() <= DAY_TOLERANCE
}

/// Completed blocks, most recent first, as (owner, length in days).
fn completed_blocks(transitions: &[Transition]) -> Vec<(Parent, i64)> {
    transitions
        .windows(2)
        .rev()
        .map(|pair| {
            (
                pair[0].parent,
                date_util::days_between(pair[0].date, pair[1].date),
            )
        })
        .collect()
}

fn best_match(transitions: &[Transition]) -> Option<(usize, usize)> {
    let latest = transitions.last()?;
    let blocks = completed_blocks(transitions);
    if blocks.is_empty() {
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    for candidate in (0..PHASE_COUNT).filter(|&i| CYCLE[i].parent == latest.parent) {
        let run = matching_run(candidate, &blocks);
        if run == 0 {
            continue;
        }
        if best.is_none_or(|(_, best_run)| run > best_run) {
            best = Some((candidate, run));
        }
    }
    best
}

/// Number of consecutive recent blocks that agree with the phases before
/// `candidate`.
fn matching_run(candidate: usize, blocks: &[(Parent, i64)]) -> usize {
    let mut index = candidate;
    let mut run = 0;
    for &(parent, days) in blocks {
        index = cycle::previous_phase_index(index);
        let expected = cycle::phase(index);
        if expected.parent != parent || !within_tolerance(days, expected.days) {
            break;
        }
        run += 1;
    }
    run
}
