use chrono::{NaiveDate, NaiveTime};
use custody_schedule::{
    EventType, NewEvent, Parent, Schedule, ScheduleError, ScheduleGenerator,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn sample() -> Schedule {
    Schedule::generate(d(2024, 1, 1), &ScheduleGenerator::new(1))
}

#[test]
fn add_event_assigns_fresh_id_and_bumps_version() {
    let schedule = sample();
    let mut form = NewEvent::new("Dentist", d(2024, 1, 10), t(9, 30), Parent::Mom);
    form.event_type = EventType::Appointment;
    form.description = "Check-up".into();

    let (next, created) = schedule.with_event(form).unwrap();
    assert_eq!(created.id, "event-6");
    assert_eq!(next.version(), schedule.version() + 1);
    assert_eq!(next.len(), schedule.len() + 1);
    assert_eq!(next.find_event("event-6"), Some(&created));
    assert_eq!(schedule.find_event("event-6"), None);

    let (after, second) = next
        .with_event(NewEvent::new("Swim", d(2024, 1, 11), t(16, 0), Parent::Mom))
        .unwrap();
    assert_eq!(second.id, "event-7");
    assert_eq!(after.len(), next.len() + 1);
}

#[test]
fn blank_title_is_rejected_without_change() {
    let schedule = sample();
    let err = schedule
        .with_event(NewEvent::new("  ", d(2024, 1, 10), t(9, 0), Parent::Dad))
        .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidEvent(_)));
}

#[test]
fn update_keeps_id_and_replaces_fields() {
    let schedule = sample();
    let mut form = NewEvent::new("Moved handoff", d(2024, 1, 9), t(12, 0), Parent::Mom);
    form.event_type = EventType::Activity;

    let next = schedule.with_updated_event("initial-2", form).unwrap();
    let updated = next.find_event("initial-2").unwrap();
    assert_eq!(updated.date, d(2024, 1, 9));
    assert_eq!(updated.title, "Moved handoff");
    assert_eq!(updated.event_type, EventType::Activity);
    assert_eq!(next.len(), schedule.len());

    let missing = schedule.with_updated_event(
        "nope",
        NewEvent::new("x", d(2024, 1, 9), t(12, 0), Parent::Mom),
    );
    assert_eq!(missing, Err(ScheduleError::EventNotFound("nope".into())));
}

#[test]
fn delete_removes_only_that_event() {
    let schedule = sample();
    let next = schedule.without_event("initial-3").unwrap();
    assert_eq!(next.len(), schedule.len() - 1);
    assert!(next.find_event("initial-3").is_none());
    assert!(next.find_event("initial-2").is_some());
    assert_eq!(
        schedule.without_event("initial-99"),
        Err(ScheduleError::EventNotFound("initial-99".into()))
    );
}

#[test]
fn cleanup_removes_events_strictly_before_cutoff() {
    let schedule = sample();
    let (next, removed) = schedule.without_events_before("2024-01-12").unwrap();
    assert_eq!(removed, 2);
    assert_eq!(next.first_event_date(), Some(d(2024, 1, 12)));
    assert!(next.events().iter().all(|e| e.date >= d(2024, 1, 12)));
}

#[test]
fn cleanup_with_bad_date_leaves_schedule_untouched() {
    let schedule = sample();
    for bad in ["", "2024-13-01", "12/01/2024", "2024-1-5"] {
        let err = schedule.without_events_before(bad).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidDate(_)), "{bad}");
    }
    assert_eq!(schedule, sample());
}

#[test]
fn events_on_a_day_are_ordered_by_time() {
    let schedule = sample();
    let (schedule, _) = schedule
        .with_event(NewEvent::new("Breakfast", d(2024, 1, 8), t(8, 0), Parent::Dad))
        .unwrap();
    let day = schedule.events_on(d(2024, 1, 8));
    assert_eq!(day.len(), 2);
    assert_eq!(day[0].title, "Breakfast");
    assert_eq!(day[1].time, t(18, 0));
}

#[test]
fn regenerate_replaces_collection() {
    let schedule = sample();
    let (edited, _) = schedule
        .with_event(NewEvent::new("Extra", d(2024, 1, 3), t(10, 0), Parent::Dad))
        .unwrap();
    let fresh = edited.regenerated(d(2024, 6, 5), &ScheduleGenerator::new(1));
    assert_eq!(fresh.version(), edited.version() + 1);
    assert_eq!(fresh.first_event_date(), Some(d(2024, 6, 3)));
    assert!(fresh.find_event("event-6").is_none());
}

#[test]
fn deleted_ids_are_never_handed_out_again() {
    let schedule = sample();
    let (added, created) = schedule
        .with_event(NewEvent::new("Dentist", d(2024, 1, 10), t(9, 30), Parent::Mom))
        .unwrap();
    let deleted = added.without_event(&created.id).unwrap();
    let (_, replacement) = deleted
        .with_event(NewEvent::new("Dentist", d(2024, 1, 12), t(9, 30), Parent::Mom))
        .unwrap();
    assert_ne!(replacement.id, created.id);

    let without_last = schedule.without_event("initial-5").unwrap();
    let (_, after_delete) = without_last
        .with_event(NewEvent::new("Swim", d(2024, 1, 11), t(16, 0), Parent::Mom))
        .unwrap();
    assert_eq!(after_delete.id, "event-6");
    assert!(without_last.next_sequence() >= schedule.next_sequence());
}

#[test]
fn regenerate_does_not_reuse_earlier_ids() {
    let schedule = sample();
    let earlier: Vec<String> = schedule.events().iter().map(|e| e.id.clone()).collect();
    let fresh = schedule.regenerated(d(2024, 1, 1), &ScheduleGenerator::new(1));
    assert_eq!(fresh.len(), schedule.len());
    assert!(fresh.events().iter().all(|e| !earlier.contains(&e.id)));
    assert_eq!(fresh.events()[0].id, "initial-6");
}

#[test]
fn summary_reports_span_and_phase() {
    let schedule = sample();
    let summary = schedule.summary();
    assert_eq!(summary.event_count, 5);
    assert_eq!(summary.first_date, Some(d(2024, 1, 1)));
    assert_eq!(summary.last_date, Some(d(2024, 1, 29)));
    assert_eq!(summary.current_phase, Some(0));
    let line = summary.to_cli_summary();
    assert!(line.contains("events=5"));
    assert!(line.contains("span=2024-01-01..2024-01-29"));

    let empty = Schedule::new().summary();
    assert_eq!(empty.current_phase, None);
    assert_eq!(empty.to_cli_summary(), "v0, events=0");
}
