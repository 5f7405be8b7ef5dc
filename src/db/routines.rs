//! Routine rows

use rusqlite::{OptionalExtension, params};

use super::Database;
use super::models::{RoutineItem, WorkoutRoutine};
use crate::error::{Result, TrackerError};

impl Database {
    pub fn insert_routine(&self, name: &str, color_hex: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO workout_routines (name, color_hex) VALUES (?1, ?2)",
            params![name, color_hex],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_routine_item(
        &self,
        routine_id: i64,
        option_id: i64,
        order_index: u32,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO routine_items (routine_id, option_id, order_index) VALUES (?1, ?2, ?3)",
            params![routine_id, option_id, order_index],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_routine(&self, id: i64) -> Result<Option<WorkoutRoutine>> {
        let routine = self
            .conn
            .query_row(
                "SELECT id, name, color_hex, click_frequency FROM workout_routines WHERE id = ?1",
                params![id],
                |row| {
                    Ok(WorkoutRoutine {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        color_hex: row.get(2)?,
                        click_frequency: row.get(3)?,
                        items: Vec::new(),
                    })
                },
            )
            .optional()?;
        match routine {
            Some(mut routine) => {
                routine.items = self.routine_items(routine.id)?;
                Ok(Some(routine))
            }
            None => Ok(None),
        }
    }

    pub fn require_routine(&self, id: i64) -> Result<WorkoutRoutine> {
        self.get_routine(id)?
            .ok_or_else(|| TrackerError::not_found("routine", id))
    }

    /// Routines by usage, most used first
    pub fn list_routines(&self) -> Result<Vec<WorkoutRoutine>> {
        let ids: Vec<i64> = {
            let mut stmt = self.conn.prepare(
                "SELECT id FROM workout_routines ORDER BY click_frequency DESC, name, id",
            )?;
            stmt.query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?
        };
        let mut routines = Vec::with_capacity(ids.len());
        for id in ids {
            routines.push(self.require_routine(id)?);
        }
        Ok(routines)
    }

    fn routine_items(&self, routine_id: i64) -> Result<Vec<RoutineItem>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, routine_id, option_id, order_index FROM routine_items
             WHERE routine_id = ?1 ORDER BY order_index, id",
        )?;
        let items = stmt
            .query_map(params![routine_id], |row| {
                Ok(RoutineItem {
                    id: row.get(0)?,
                    routine_id: row.get(1)?,
                    option_id: row.get(2)?,
                    order_index: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    pub fn update_routine_item_order(&self, item_id: i64, order_index: u32) -> Result<()> {
        self.conn.execute(
            "UPDATE routine_items SET order_index = ?1 WHERE id = ?2",
            params![order_index, item_id],
        )?;
        Ok(())
    }

    pub fn delete_routine_item(&self, item_id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM routine_items WHERE id = ?1", params![item_id])?;
        Ok(changed > 0)
    }

    pub fn bump_click_frequency(&self, routine_id: i64) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE workout_routines SET click_frequency = click_frequency + 1 WHERE id = ?1",
            params![routine_id],
        )?;
        if changed == 0 {
            return Err(TrackerError::not_found("routine", routine_id));
        }
        Ok(())
    }

    pub fn delete_routine(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM workout_routines WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Category, WorkoutOption};
    use chrono::{TimeZone, Utc};

    fn option(db: &Database, name: &str) -> i64 {
        db.insert_option(&WorkoutOption {
            id: 0,
            name: name.to_string(),
            category: Category::Chest,
            image_data: None,
            is_barbell: false,
            timer_seconds: 90.0,
            show_timer: true,
            last_updated: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        })
        .unwrap()
    }

    fn item_count(db: &Database) -> i64 {
        db.conn
            .query_row("SELECT COUNT(*) FROM routine_items", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_item_requires_existing_option() {
        let db = Database::open_in_memory().unwrap();
        let routine = db.insert_routine("Push", "#10B981").unwrap();
        assert!(db.insert_routine_item(routine, 99, 0).is_err());
        assert!(db.require_routine(routine).unwrap().items.is_empty());
    }

    #[test]
    fn test_routine_items_cascade() {
        let db = Database::open_in_memory().unwrap();
        let bench = option(&db, "Bench");
        let dip = option(&db, "Dip");
        let routine = db.insert_routine("Push", "#10B981").unwrap();
        db.insert_routine_item(routine, bench, 0).unwrap();
        db.insert_routine_item(routine, dip, 1).unwrap();

        let loaded = db.require_routine(routine).unwrap();
        assert_eq!(loaded.click_frequency, 0);
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(item_count(&db), 2);

        db.bump_click_frequency(routine).unwrap();
        assert_eq!(db.require_routine(routine).unwrap().click_frequency, 1);

        assert!(db.delete_routine(routine).unwrap());
        assert!(db.get_routine(routine).unwrap().is_none());
        assert_eq!(item_count(&db), 0);
    }

    #[test]
    fn test_deleted_option_leaves_empty_item() {
        let db = Database::open_in_memory().unwrap();
        let bench = option(&db, "Bench");
        let routine = db.insert_routine("Push", "#10B981").unwrap();
        db.insert_routine_item(routine, bench, 0).unwrap();

        assert!(db.delete_option(bench).unwrap());
        let items = db.require_routine(routine).unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].option_id, None);
    }
}
