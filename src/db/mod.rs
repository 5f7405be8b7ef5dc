//! Database module - SQLite storage for the workout log

mod exercises;
mod months;
pub mod models;
mod options;
mod routines;
mod stats;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use tracing::debug;

use crate::error::Result;

pub use models::{
    Category, Exercise, ExerciseSet, HistoryPoint, MonthlyWorkout, PersonalRecord, RoutineItem,
    WorkoutOption, WorkoutRoutine, WorkoutStat,
};

const SCHEMA_VERSION: i64 = 1;

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Create or upgrade the schema
    fn migrate(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", true)?;

        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS workout_options (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    name_key TEXT NOT NULL UNIQUE,
                    category TEXT NOT NULL,
                    image_data BLOB,
                    is_barbell INTEGER NOT NULL DEFAULT 0,
                    timer_seconds REAL NOT NULL DEFAULT 90,
                    show_timer INTEGER NOT NULL DEFAULT 1,
                    last_updated TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS workout_stats (
                    option_id INTEGER PRIMARY KEY REFERENCES workout_options(id) ON DELETE CASCADE,
                    workout_name TEXT NOT NULL,
                    one_rep_max_history TEXT NOT NULL,
                    max_weight_history TEXT NOT NULL,
                    frequency INTEGER NOT NULL,
                    total_volume REAL NOT NULL,
                    total_exercises INTEGER NOT NULL,
                    total_days INTEGER NOT NULL,
                    last_updated TEXT NOT NULL,
                    best_one_rep_max TEXT,
                    best_weight TEXT
                );

                CREATE TABLE IF NOT EXISTS monthly_workouts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    year INTEGER NOT NULL,
                    month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
                    UNIQUE(year, month)
                );

                CREATE TABLE IF NOT EXISTS exercises (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    date TEXT NOT NULL,
                    option_id INTEGER REFERENCES workout_options(id) ON DELETE SET NULL,
                    monthly_id INTEGER REFERENCES monthly_workouts(id) ON DELETE SET NULL
                );

                CREATE TABLE IF NOT EXISTS exercise_sets (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                    reps INTEGER NOT NULL CHECK (reps >= 0),
                    weight REAL NOT NULL CHECK (weight >= 0),
                    order_index INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS workout_routines (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    color_hex TEXT NOT NULL DEFAULT '#10B981',
                    click_frequency INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS routine_items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    routine_id INTEGER NOT NULL REFERENCES workout_routines(id) ON DELETE CASCADE,
                    option_id INTEGER REFERENCES workout_options(id) ON DELETE SET NULL,
                    order_index INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_exercises_option ON exercises(option_id);
                CREATE INDEX IF NOT EXISTS idx_exercises_monthly ON exercises(monthly_id);
                CREATE INDEX IF NOT EXISTS idx_exercises_date ON exercises(date);
                CREATE INDEX IF NOT EXISTS idx_sets_exercise ON exercise_sets(exercise_id);
                CREATE INDEX IF NOT EXISTS idx_routine_items_routine ON routine_items(routine_id);",
            )?;
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
            debug!("Schema created at version {}", SCHEMA_VERSION);
        }

        Ok(())
    }

    /// Run `f` inside one transaction; nested calls join the outer one
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        if !self.conn.is_autocommit() {
            return f(self);
        }
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }
}

/// Truncate to the precision timestamps are stored with
pub fn stamp(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so text order equals time order
pub(crate) fn format_ts(at: DateTime<Utc>) -> String {
    stamp(at).to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn read_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_open_in_memory_creates_schema() {
        let db = Database::open_in_memory().unwrap();
        let version: i64 = db
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        let fk: i64 = db
            .conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_migrate_is_repeatable() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
    }

    #[test]
    fn test_timestamp_format_sorts_lexically() {
        let early = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let late = early + chrono::Duration::microseconds(1);
        assert!(format_ts(early) < format_ts(late));
        assert_eq!(format_ts(early), "2026-03-01T09:00:00.000000Z");
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        let result: Result<()> = db.transaction(|db| {
            db.conn.execute(
                "INSERT INTO monthly_workouts (year, month) VALUES (2026, 3)",
                [],
            )?;
            Err(crate::error::TrackerError::EmptyName)
        });
        assert!(result.is_err());
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM monthly_workouts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_nested_transaction_joins_outer() {
        let db = Database::open_in_memory().unwrap();
        db.transaction(|db| {
            db.transaction(|db| {
                db.conn.execute(
                    "INSERT INTO monthly_workouts (year, month) VALUES (2026, 4)",
                    [],
                )?;
                Ok(())
            })
        })
        .unwrap();
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM monthly_workouts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
