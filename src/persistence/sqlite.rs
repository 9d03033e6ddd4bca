use super::{PersistenceResult, ScheduleStore};
use crate::Schedule;
use crate::event::ScheduleEvent;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;
use tracing::info;

pub struct SqliteScheduleStore {
    connection: Mutex<Connection>,
}

impl SqliteScheduleStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS schedule_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL,
                next_sequence INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS events (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                date TEXT NOT NULL,
                event_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // writes are transactional, so a poisoned lock still guards a consistent db
        self.connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn save_events(
        &self,
        tx: &rusqlite::Transaction,
        events: &[ScheduleEvent],
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM events", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO events (position, id, date, event_json) VALUES (?1, ?2, ?3, ?4)")?;
        for (position, event) in events.iter().enumerate() {
            let json = serde_json::to_string(event)?;
            stmt.execute(params![
                position as i64,
                event.id,
                event.date.to_string(),
                json
            ])?;
        }
        Ok(())
    }
}

impl ScheduleStore for SqliteScheduleStore {
    fn save_schedule(&self, schedule: &Schedule) -> PersistenceResult<()> {
        super::validate_events(schedule.events())?;
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO schedule_state (id, version, next_sequence) VALUES (1, ?1, ?2)",
            params![schedule.version() as i64, schedule.next_sequence() as i64],
        )?;
        self.save_events(&tx, schedule.events())?;
        tx.commit()?;
        info!(
            events = schedule.len(),
            version = schedule.version(),
            "saved schedule to sqlite"
        );
        Ok(())
    }

    fn load_schedule(&self) -> PersistenceResult<Option<Schedule>> {
        let conn = self.lock();

        let mut stmt =
            conn.prepare("SELECT version, next_sequence FROM schedule_state WHERE id = 1")?;
        let state: Option<(i64, i64)> = stmt
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((version, next_sequence)) = state else {
            return Ok(None);
        };

        let mut stmt = conn.prepare("SELECT event_json FROM events ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut events = Vec::new();
        for json in rows {
            let json = json?;
            let event: ScheduleEvent = serde_json::from_str(&json)?;
            events.push(event);
        }

        super::validate_events(&events)?;
        Ok(Some(Schedule::from_parts(
            events,
            version.max(0) as u64,
            next_sequence.max(0) as u64,
        )))
    }
}
