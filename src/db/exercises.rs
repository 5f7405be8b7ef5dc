//! Exercise and set rows

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};

use super::models::{Exercise, ExerciseSet};
use super::{Database, format_ts, read_ts};
use crate::error::{Result, TrackerError};

const EXERCISE_SELECT: &str = "SELECT e.id, e.name, e.date, e.option_id, o.name, e.monthly_id
     FROM exercises e LEFT JOIN workout_options o ON o.id = e.option_id";

fn exercise_from_row(row: &Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: row.get(0)?,
        name: row.get(1)?,
        date: read_ts(row, 2)?,
        option_id: row.get(3)?,
        option_name: row.get(4)?,
        monthly_id: row.get(5)?,
        sets: Vec::new(),
    })
}

fn set_from_row(row: &Row<'_>) -> rusqlite::Result<ExerciseSet> {
    Ok(ExerciseSet {
        id: row.get(0)?,
        exercise_id: row.get(1)?,
        reps: row.get(2)?,
        weight: row.get(3)?,
        order_index: row.get(4)?,
    })
}

impl Database {
    /// Insert an exercise without sets and without a month bucket
    pub fn insert_exercise(
        &self,
        name: &str,
        date: DateTime<Utc>,
        option_id: Option<i64>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO exercises (name, date, option_id) VALUES (?1, ?2, ?3)",
            params![name, format_ts(date), option_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_exercise(&self, id: i64) -> Result<Option<Exercise>> {
        let exercise = self
            .conn
            .query_row(
                &format!("{EXERCISE_SELECT} WHERE e.id = ?1"),
                params![id],
                exercise_from_row,
            )
            .optional()?;
        match exercise {
            Some(mut exercise) => {
                exercise.sets = self.sets_for(exercise.id)?;
                Ok(Some(exercise))
            }
            None => Ok(None),
        }
    }

    pub fn require_exercise(&self, id: i64) -> Result<Exercise> {
        self.get_exercise(id)?
            .ok_or_else(|| TrackerError::not_found("exercise", id))
    }

    /// Exercises of one option, oldest first
    pub fn exercises_for_option(&self, option_id: i64) -> Result<Vec<Exercise>> {
        self.query_exercises(
            &format!("{EXERCISE_SELECT} WHERE e.option_id = ?1 ORDER BY e.date, e.id"),
            params![option_id],
        )
    }

    pub fn exercises_in_month(&self, monthly_id: i64) -> Result<Vec<Exercise>> {
        self.query_exercises(
            &format!("{EXERCISE_SELECT} WHERE e.monthly_id = ?1 ORDER BY e.date, e.id"),
            params![monthly_id],
        )
    }

    /// Every exercise in the log, oldest first
    pub fn all_exercises(&self) -> Result<Vec<Exercise>> {
        self.query_exercises(&format!("{EXERCISE_SELECT} ORDER BY e.date, e.id"), params![])
    }

    /// Exercises still waiting for a month bucket, as (id, date)
    pub fn exercises_without_month(&self) -> Result<Vec<(i64, DateTime<Utc>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date FROM exercises WHERE monthly_id IS NULL ORDER BY date, id",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, read_ts(row, 1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn query_exercises<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Exercise>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut exercises = stmt
            .query_map(params, exercise_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for exercise in &mut exercises {
            exercise.sets = self.sets_for(exercise.id)?;
        }
        Ok(exercises)
    }

    pub fn set_exercise_month(&self, exercise_id: i64, monthly_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE exercises SET monthly_id = ?1 WHERE id = ?2",
            params![monthly_id, exercise_id],
        )?;
        Ok(())
    }

    pub fn set_exercise_option(
        &self,
        exercise_id: i64,
        option_id: Option<i64>,
        name: &str,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE exercises SET option_id = ?1, name = ?2 WHERE id = ?3",
            params![option_id, name, exercise_id],
        )?;
        Ok(())
    }

    pub fn set_exercise_name(&self, exercise_id: i64, name: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE exercises SET name = ?1 WHERE id = ?2",
            params![name, exercise_id],
        )?;
        Ok(())
    }

    /// Refresh the fallback name of every exercise pointing at an option
    pub fn copy_option_name_to_exercises(&self, option_id: i64, name: &str) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE exercises SET name = ?1 WHERE option_id = ?2",
            params![name, option_id],
        )?;
        Ok(changed)
    }

    pub fn delete_exercise(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM exercises WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn insert_set(&self, exercise_id: i64, reps: u32, weight: f64, order_index: u32) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO exercise_sets (exercise_id, reps, weight, order_index) VALUES (?1, ?2, ?3, ?4)",
            params![exercise_id, reps, weight, order_index],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_set(&self, id: i64) -> Result<Option<ExerciseSet>> {
        let set = self
            .conn
            .query_row(
                "SELECT id, exercise_id, reps, weight, order_index FROM exercise_sets WHERE id = ?1",
                params![id],
                set_from_row,
            )
            .optional()?;
        Ok(set)
    }

    /// Sets of an exercise in display order
    pub fn sets_for(&self, exercise_id: i64) -> Result<Vec<ExerciseSet>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, exercise_id, reps, weight, order_index FROM exercise_sets
             WHERE exercise_id = ?1 ORDER BY order_index, id",
        )?;
        let sets = stmt
            .query_map(params![exercise_id], set_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sets)
    }

    pub fn update_set_values(&self, id: i64, reps: u32, weight: f64) -> Result<()> {
        self.conn.execute(
            "UPDATE exercise_sets SET reps = ?1, weight = ?2 WHERE id = ?3",
            params![reps, weight, id],
        )?;
        Ok(())
    }

    pub fn update_set_order(&self, id: i64, order_index: u32) -> Result<()> {
        self.conn.execute(
            "UPDATE exercise_sets SET order_index = ?1 WHERE id = ?2",
            params![order_index, id],
        )?;
        Ok(())
    }

    pub fn delete_set(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM exercise_sets WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
