//! Database module - SQLite storage for workout summaries

use std::cell::RefCell;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use crate::session::{ExerciseTally, WorkoutSummary};

/// Where finished workouts go; the core only appends
pub trait HistoryStore {
    /// Fire-and-forget from the caller's point of view; returns the record id
    fn append_workout_summary(&self, summary: &WorkoutSummary) -> Result<i64>;

    /// Oldest first
    fn load_workout_history(&self) -> Result<Vec<WorkoutSummary>>;
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("opening database {}", path))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                calories REAL NOT NULL,
                duration_secs INTEGER NOT NULL,
                exercises TEXT NOT NULL
            )",
            [],
        )?;

        // Migration: early databases did not track duration
        let has_duration: bool = self.conn
            .prepare("SELECT duration_secs FROM workouts LIMIT 1")
            .is_ok();
        if !has_duration {
            self.conn.execute(
                "ALTER TABLE workouts ADD COLUMN duration_secs INTEGER NOT NULL DEFAULT 0",
                [],
            )?;
        }

        Ok(())
    }
}

impl HistoryStore for Database {
    fn append_workout_summary(&self, summary: &WorkoutSummary) -> Result<i64> {
        let exercises = serde_json::to_string(&summary.exercises)?;
        self.conn.execute(
            "INSERT INTO workouts (date, calories, duration_secs, exercises) VALUES (?1, ?2, ?3, ?4)",
            params![
                summary.date.to_rfc3339(),
                summary.total_calories,
                summary.total_duration_secs as i64,
                exercises,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn load_workout_history(&self) -> Result<Vec<WorkoutSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, calories, duration_secs, exercises FROM workouts ORDER BY id ASC"
        )?;

        let rows = stmt
            .query_map([], |row| {
                let date: String = row.get(0)?;
                let calories: f64 = row.get(1)?;
                let duration: i64 = row.get(2)?;
                let exercises: String = row.get(3)?;
                Ok((date, calories, duration, exercises))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(date, calories, duration, exercises)| {
                let exercises: Vec<ExerciseTally> = serde_json::from_str(&exercises)
                    .with_context(|| format!("corrupt exercise list for workout on {}", date))?;
                let date = DateTime::parse_from_rfc3339(&date)
                    .with_context(|| format!("corrupt workout date {:?}", date))?
                    .with_timezone(&Utc);
                Ok(WorkoutSummary {
                    date,
                    total_calories: calories,
                    total_duration_secs: duration.max(0) as u64,
                    exercises,
                })
            })
            .collect()
    }
}

/// In-process history, for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryHistory {
    summaries: RefCell<Vec<WorkoutSummary>>,
}

impl HistoryStore for MemoryHistory {
    fn append_workout_summary(&self, summary: &WorkoutSummary) -> Result<i64> {
        let mut summaries = self.summaries.borrow_mut();
        summaries.push(summary.clone());
        Ok(summaries.len() as i64)
    }

    fn load_workout_history(&self) -> Result<Vec<WorkoutSummary>> {
        Ok(self.summaries.borrow().clone())
    }
}
