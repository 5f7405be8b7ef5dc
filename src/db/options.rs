//! Workout option rows

use chrono::{DateTime, Duration, Utc};
use rusqlite::{OptionalExtension, Row, params};

use super::models::WorkoutOption;
use super::{Database, format_ts, read_ts, stamp};
use crate::error::{Result, TrackerError};

const OPTION_COLUMNS: &str =
    "id, name, category, image_data, is_barbell, timer_seconds, show_timer, last_updated";

fn option_from_row(row: &Row<'_>) -> rusqlite::Result<WorkoutOption> {
    let category: String = row.get(2)?;
    Ok(WorkoutOption {
        id: row.get(0)?,
        name: row.get(1)?,
        category: category.parse().map_err(|e: TrackerError| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?,
        image_data: row.get(3)?,
        is_barbell: row.get(4)?,
        timer_seconds: row.get(5)?,
        show_timer: row.get(6)?,
        last_updated: read_ts(row, 7)?,
    })
}

/// Key used for case-insensitive name uniqueness
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Database {
    /// Insert an option; `option.id` is ignored
    pub fn insert_option(&self, option: &WorkoutOption) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO workout_options (name, name_key, category, image_data, is_barbell, timer_seconds, show_timer, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                option.name,
                name_key(&option.name),
                option.category.as_str(),
                option.image_data,
                option.is_barbell,
                option.timer_seconds,
                option.show_timer,
                format_ts(option.last_updated),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_option(&self, id: i64) -> Result<Option<WorkoutOption>> {
        let option = self
            .conn
            .query_row(
                &format!("SELECT {OPTION_COLUMNS} FROM workout_options WHERE id = ?1"),
                params![id],
                option_from_row,
            )
            .optional()?;
        Ok(option)
    }

    pub fn require_option(&self, id: i64) -> Result<WorkoutOption> {
        self.get_option(id)?
            .ok_or_else(|| TrackerError::not_found("option", id))
    }

    /// Case-insensitive lookup by name
    pub fn find_option_by_name(&self, name: &str) -> Result<Option<WorkoutOption>> {
        let option = self
            .conn
            .query_row(
                &format!("SELECT {OPTION_COLUMNS} FROM workout_options WHERE name_key = ?1"),
                params![name_key(name)],
                option_from_row,
            )
            .optional()?;
        Ok(option)
    }

    pub fn list_options(&self) -> Result<Vec<WorkoutOption>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {OPTION_COLUMNS} FROM workout_options ORDER BY name_key"
        ))?;
        let options = stmt
            .query_map([], option_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(options)
    }

    /// Overwrite every editable column of an existing option
    pub fn update_option(&self, option: &WorkoutOption) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE workout_options
             SET name = ?1, name_key = ?2, category = ?3, image_data = ?4, is_barbell = ?5,
                 timer_seconds = ?6, show_timer = ?7, last_updated = ?8
             WHERE id = ?9",
            params![
                option.name,
                name_key(&option.name),
                option.category.as_str(),
                option.image_data,
                option.is_barbell,
                option.timer_seconds,
                option.show_timer,
                format_ts(option.last_updated),
                option.id,
            ],
        )?;
        if changed == 0 {
            return Err(TrackerError::not_found("option", option.id));
        }
        Ok(())
    }

    pub fn delete_option(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM workout_options WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Advance an option's watermark; always moves strictly forward
    pub fn touch_option(&self, id: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let previous: DateTime<Utc> = self
            .conn
            .query_row(
                "SELECT last_updated FROM workout_options WHERE id = ?1",
                params![id],
                |row| read_ts(row, 0),
            )
            .optional()?
            .ok_or_else(|| TrackerError::not_found("option", id))?;

        let next = stamp(now).max(previous + Duration::microseconds(1));
        self.conn.execute(
            "UPDATE workout_options SET last_updated = ?1 WHERE id = ?2",
            params![format_ts(next), id],
        )?;
        Ok(next)
    }
}
