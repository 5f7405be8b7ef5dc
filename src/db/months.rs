//! Monthly bucket rows

use rusqlite::{OptionalExtension, params};

use super::Database;
use crate::error::Result;

impl Database {
    /// Bucket id for (year, month), creating the row if needed
    pub fn find_or_create_month(&self, year: i32, month: u32) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO monthly_workouts (year, month) VALUES (?1, ?2)
             ON CONFLICT(year, month) DO NOTHING",
            params![year, month],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM monthly_workouts WHERE year = ?1 AND month = ?2",
            params![year, month],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn find_month(&self, year: i32, month: u32) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM monthly_workouts WHERE year = ?1 AND month = ?2",
                params![year, month],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// All buckets as (id, year, month), newest first
    pub fn list_months(&self) -> Result<Vec<(i64, i32, u32)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, year, month FROM monthly_workouts ORDER BY year DESC, month DESC",
        )?;
        let months = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(months)
    }

    pub fn count_months(&self, year: i32, month: u32) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM monthly_workouts WHERE year = ?1 AND month = ?2",
            params![year, month],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
