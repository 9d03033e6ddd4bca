use chrono::{Local, NaiveDate, Utc};
use custody_schedule::{
    AppConfig, Continuation, ExportOptions, HolidayCalendar, HolidayKind, MonthView, NewEvent,
    Parent, Schedule, ScheduleEvent, ScheduleGenerator, ScheduleStore, date_util, event,
    export_ics, load_or_generate, load_schedule_from_csv, load_schedule_from_json, persistence,
    save_schedule_to_csv, save_schedule_to_json,
};
use std::fs;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if len > widths[ci] {
                widths[ci] = len;
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, headers.iter().map(|h| h.to_string()), &widths);
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        push_row(&mut out, row.iter().cloned(), &widths);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    out.push('|');
    for (ci, cell) in cells.enumerate() {
        out.push(' ');
        out.push_str(&cell);
        let pad = widths[ci].saturating_sub(cell.chars().count());
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
}

fn render_events(events: &[ScheduleEvent]) -> String {
    let rows: Vec<Vec<String>> = events
        .iter()
        .map(|e| {
            vec![
                e.id.clone(),
                date_util::format_date(e.date),
                e.date.format("%a").to_string(),
                e.time.format(event::TIME_FORMAT).to_string(),
                e.parent.to_string(),
                e.event_type.as_str().to_string(),
                e.title.clone(),
            ]
        })
        .collect();
    render_table(
        &["id", "date", "day", "time", "parent", "type", "title"],
        &rows,
    )
}

fn render_month(view: &MonthView) -> String {
    let mut rows = Vec::with_capacity(view.weeks.len());
    for week in &view.weeks {
        let mut row = vec![format!("v{}", week.iso_week)];
        for cell in &week.days {
            let text = match cell {
                None => String::new(),
                Some(cell) => {
                    let mut text = format!("{:>2}", chrono::Datelike::day(&cell.date));
                    for e in &cell.events {
                        text.push(match e.parent {
                            Parent::Mom => 'M',
                            Parent::Dad => 'P',
                        });
                    }
                    if cell
                        .holiday
                        .as_ref()
                        .is_some_and(|h| h.kind == HolidayKind::Public)
                    {
                        text.push('*');
                    }
                    text
                }
            };
            row.push(text);
        }
        rows.push(row);
    }
    render_table(
        &["week", "Mån", "Tis", "Ons", "Tor", "Fre", "Lör", "Sön"],
        &rows,
    )
}

fn print_help() {
    println!(
        "Commands:\n  help                                  Show this help\n  show                                  List all events in date order\n  summary                               Show schedule summary and current phase\n  day <YYYY-MM-DD>                      Events on one day\n  month <YYYY-MM>                       Month grid (M=mamma, P=pappa, *=holiday)\n  add <date> <HH:MM> <mom|dad> <title...>\n                                        Add an event\n  edit <id> <date> <HH:MM> <mom|dad> <title...>\n                                        Replace an event (id kept)\n  delete <id>                           Delete an event\n  cleanup <YYYY-MM-DD>                  Delete all events before a date\n  continue [months]                     Continue the rotation (default from config)\n  through <YYYY-MM-DD>                  Continue the rotation through a date\n  reset [YYYY-MM-DD]                    Regenerate the schedule from a date (default today)\n  holidays <year>                       Swedish holidays for a year\n  export <path> [from YYYY-MM-DD]       Write an iCalendar file\n  save <json|csv> <path>                Save schedule to disk\n  load <json|csv> <path>                Load schedule from disk\n  quit|exit                             Exit"
    );
}

/// Persist `next` (when a store is configured) and adopt it.
fn commit(
    schedule: &mut Schedule,
    next: Schedule,
    store: Option<&(dyn ScheduleStore + Send + Sync)>,
) -> bool {
    if let Some(store) = store {
        if let Err(e) = store.save_schedule(&next) {
            println!("Error saving schedule: {}", e);
            return false;
        }
    }
    *schedule = next;
    true
}

fn parse_new_event<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<NewEvent, String> {
    let date = parts.next().ok_or("missing date")?;
    let time = parts.next().ok_or("missing time")?;
    let parent = parts.next().ok_or("missing parent")?;
    let title = parts.collect::<Vec<_>>().join(" ");

    let date = date_util::parse_date(date).map_err(|e| e.to_string())?;
    let time = event::parse_time(time).ok_or("Invalid time (HH:MM)")?;
    let parent = Parent::from_str(parent).ok_or("Invalid parent (mom|dad)")?;
    Ok(NewEvent::new(title, date, time, parent))
}

fn report_continuation(
    schedule: &mut Schedule,
    outcome: Continuation,
    store: Option<&(dyn ScheduleStore + Send + Sync)>,
) {
    match outcome {
        Continuation::Extended {
            schedule: next,
            added,
        } => {
            if commit(schedule, next, store) {
                println!("Added {} events.", added.len());
                println!("{}", render_events(&added));
            }
        }
        Continuation::AlreadyCovered => {
            println!("Schedule already covers the requested period; nothing added.");
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };
    let generator: ScheduleGenerator = config.generator();
    let today = Local::now().date_naive();

    let store = match (&config.store_path, config.store_kind()) {
        (Some(path), Some(kind)) => match persistence::open_store(path, kind) {
            Ok(store) => Some(store),
            Err(e) => {
                eprintln!("Could not open store {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        _ => None,
    };
    let store_ref = store.as_deref();

    let mut schedule = match store_ref {
        Some(store) => load_or_generate(store, today, &generator),
        None => Schedule::generate(today, &generator),
    };

    println!("Custody Schedule (CLI) - type 'help' for commands\n");
    println!("{}", schedule.summary().to_cli_summary());

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_events(&schedule.sorted_events())),
            "summary" => {
                println!("{}", schedule.summary().to_cli_summary());
                match schedule.inference() {
                    Ok(inferred) => {
                        let phase = custody_schedule::cycle::phase(inferred.phase_index);
                        println!(
                            "Current phase {} ({}, {} days) since {}{}",
                            inferred.phase_index,
                            phase.label,
                            phase.days,
                            inferred.anchor_date,
                            if inferred.is_fallback() {
                                " [fallback]"
                            } else {
                                ""
                            }
                        );
                    }
                    Err(e) => println!("{}", e),
                }
            }
            "day" => match parts.next().map(date_util::parse_date) {
                Some(Ok(date)) => {
                    let events: Vec<ScheduleEvent> =
                        schedule.events_on(date).into_iter().cloned().collect();
                    println!("{}", render_events(&events));
                    let calendar = HolidayCalendar::for_year(chrono::Datelike::year(&date));
                    for h in calendar.holidays_on(date) {
                        println!("Holiday: {}", h.name);
                    }
                }
                Some(Err(e)) => println!("{}", e),
                None => println!("Usage: day <YYYY-MM-DD>"),
            },
            "month" => {
                let parsed = parts
                    .next()
                    .and_then(|s| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok());
                match parsed {
                    Some(first) => {
                        let year = chrono::Datelike::year(&first);
                        let month = chrono::Datelike::month(&first);
                        let holidays = HolidayCalendar::for_year(year);
                        match MonthView::build(year, month, &schedule, &holidays) {
                            Ok(view) => {
                                println!("{}-{:02}", year, month);
                                println!("{}", render_month(&view));
                            }
                            Err(e) => println!("{}", e),
                        }
                    }
                    None => println!("Usage: month <YYYY-MM>"),
                }
            }
            "add" => match parse_new_event(parts) {
                Ok(new_event) => match schedule.with_event(new_event) {
                    Ok((next, created)) => {
                        if commit(&mut schedule, next, store_ref) {
                            println!("Added event {}.", created.id);
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                },
                Err(e) => {
                    println!("{}", e);
                    println!("Usage: add <YYYY-MM-DD> <HH:MM> <mom|dad> <title...>");
                }
            },
            "edit" => match parts.next() {
                Some(id) => match parse_new_event(parts) {
                    Ok(new_event) => match schedule.with_updated_event(id, new_event) {
                        Ok(next) => {
                            if commit(&mut schedule, next, store_ref) {
                                println!("Updated event {id}.");
                            }
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    Err(e) => println!("{}", e),
                },
                None => println!("Usage: edit <id> <YYYY-MM-DD> <HH:MM> <mom|dad> <title...>"),
            },
            "delete" => match parts.next() {
                Some(id) => match schedule.without_event(id) {
                    Ok(next) => {
                        if commit(&mut schedule, next, store_ref) {
                            println!("Deleted event {id}.");
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: delete <id>"),
            },
            "cleanup" => match parts.next() {
                Some(cutoff) => match schedule.without_events_before(cutoff) {
                    Ok((next, removed)) => {
                        if removed == 0 {
                            println!("No events before {cutoff}.");
                        } else if commit(&mut schedule, next, store_ref) {
                            println!("Removed {removed} events before {cutoff}.");
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: cleanup <YYYY-MM-DD>"),
            },
            "continue" => {
                let months = match parts.next() {
                    Some(raw) => match raw.parse::<u32>() {
                        Ok(months) => months,
                        Err(_) => {
                            println!("Invalid month count");
                            continue;
                        }
                    },
                    None => config.continue_months,
                };
                match schedule.continued(months, &generator) {
                    Ok(outcome) => report_continuation(&mut schedule, outcome, store_ref),
                    Err(e) => println!("Cannot continue: {}", e),
                }
            }
            "through" => match parts.next().map(date_util::parse_date) {
                Some(Ok(until)) => match schedule.continued_through(until, &generator) {
                    Ok(outcome) => report_continuation(&mut schedule, outcome, store_ref),
                    Err(e) => println!("Cannot continue: {}", e),
                },
                Some(Err(e)) => println!("{}", e),
                None => println!("Usage: through <YYYY-MM-DD>"),
            },
            "reset" => {
                let reference = match parts.next().map(date_util::parse_date) {
                    Some(Ok(date)) => date,
                    Some(Err(e)) => {
                        println!("{}", e);
                        continue;
                    }
                    None => today,
                };
                let next = schedule.regenerated(reference, &generator);
                if commit(&mut schedule, next, store_ref) {
                    println!("Schedule regenerated from {}.", reference);
                    println!("{}", render_events(&schedule.sorted_events()));
                }
            }
            "holidays" => match parts.next().map(str::parse::<i32>) {
                Some(Ok(year)) if (1583..=9999).contains(&year) => {
                    let calendar = HolidayCalendar::for_year(year);
                    for holiday in calendar.holidays_in_year(year) {
                        let marker = match holiday.kind {
                            HolidayKind::Public => "public",
                            HolidayKind::Flag => "flag",
                        };
                        println!("{}  {:<24} {}", holiday.date, holiday.name, marker);
                    }
                }
                _ => println!("Usage: holidays <year>"),
            },
            "export" => {
                let path = parts.next();
                let from = match parts.next().map(date_util::parse_date) {
                    Some(Ok(date)) => Some(date),
                    Some(Err(e)) => {
                        println!("{}", e);
                        continue;
                    }
                    None => None,
                };
                match path {
                    Some(path) => {
                        let options = ExportOptions::new(Utc::now().naive_utc())
                            .with_domain(config.export_domain.clone())
                            .from_date(from);
                        let ics = export_ics(schedule.events(), &options);
                        match fs::write(path, ics) {
                            Ok(_) => println!("Exported calendar to {}.", path),
                            Err(e) => println!("Error writing {}: {}", path, e),
                        }
                    }
                    None => println!("Usage: export <path> [from YYYY-MM-DD]"),
                }
            }
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_schedule_to_json(&schedule, path) {
                        Ok(_) => println!("Schedule saved to {}.", path),
                        Err(e) => println!("Error saving schedule: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_schedule_to_csv(&schedule, path) {
                        Ok(_) => println!("Schedule saved to {}.", path),
                        Err(e) => println!("Error saving schedule: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                let loaded = match (fmt, path) {
                    (Some("json"), Some(path)) => load_schedule_from_json(path),
                    (Some("csv"), Some(path)) => load_schedule_from_csv(path),
                    _ => {
                        println!("Usage: load <json|csv> <path>");
                        continue;
                    }
                };
                match loaded {
                    Ok(loaded) => {
                        let next = schedule.replaced_with(loaded);
                        if commit(&mut schedule, next, store_ref) {
                            println!("Schedule loaded from {}.", path.unwrap_or_default());
                            println!("{}", render_events(&schedule.sorted_events()));
                        }
                    }
                    Err(e) => println!("Error loading schedule: {}", e),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
