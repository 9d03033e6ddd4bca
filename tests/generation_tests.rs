use chrono::{NaiveDate, NaiveTime};
use custody_schedule::{
    CYCLE, EventType, Parent, ScheduleGenerator, TOTAL_CYCLE_DAYS, date_util, generator,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn one_month_from_a_monday() {
    let events = generator::generate(d(2024, 1, 1), 1);

    let summary: Vec<(NaiveDate, Parent)> = events.iter().map(|e| (e.date, e.parent)).collect();
    assert_eq!(
        summary,
        vec![
            (d(2024, 1, 1), Parent::Dad),
            (d(2024, 1, 8), Parent::Mom),
            (d(2024, 1, 12), Parent::Dad),
            (d(2024, 1, 19), Parent::Mom),
            (d(2024, 1, 29), Parent::Dad),
        ]
    );
    assert!(events.iter().all(|e| e.date <= d(2024, 2, 1)));
}

#[test]
fn starts_on_the_monday_before_a_midweek_reference() {
    // 2024-01-04 is a Thursday.
    let events = generator::generate(d(2024, 1, 4), 1);
    assert_eq!(events[0].date, d(2024, 1, 1));
    assert_eq!(events[0].parent, Parent::Dad);
    assert_eq!(date_util::day_of_week(events[0].date), 1);
}

#[test]
fn consecutive_events_alternate_parents() {
    let events = generator::generate(d(2024, 3, 13), 6);
    assert!(events.len() > 10);
    for pair in events.windows(2) {
        assert_ne!(pair[0].parent, pair[1].parent);
        assert!(pair[0].date < pair[1].date);
    }
}

#[test]
fn gaps_follow_the_rotation_lengths() {
    let events = generator::generate(d(2024, 1, 1), 6);
    for (i, pair) in events.windows(2).enumerate() {
        let gap = date_util::days_between(pair[0].date, pair[1].date);
        assert_eq!(gap, CYCLE[i % CYCLE.len()].days, "gap {i}");
    }
    let total: i64 = CYCLE.iter().map(|phase| phase.days).sum();
    assert_eq!(total, TOTAL_CYCLE_DAYS);
}

#[test]
fn events_carry_generator_settings() {
    let handoff = NaiveTime::from_hms_opt(17, 30, 0).unwrap();
    let generator = ScheduleGenerator::new(1)
        .with_child_name("Aston")
        .with_handoff_time(handoff);
    let events = generator.generate(d(2024, 1, 1));

    let first = &events[0];
    assert_eq!(first.id, "initial-1");
    assert_eq!(first.title, "Aston with dad");
    assert_eq!(first.time, handoff);
    assert_eq!(first.event_type, EventType::Other);
    assert!(!first.description.is_empty());
    assert_eq!(events[1].id, "initial-2");
    assert_eq!(events[1].title, "Aston with mom");
}

#[test]
fn zero_month_horizon_still_emits_the_first_transition() {
    let events = generator::generate(d(2024, 1, 1), 0);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].date, d(2024, 1, 1));
}
