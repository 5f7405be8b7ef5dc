//! Cached stat rows

use rusqlite::{OptionalExtension, params};

use super::models::WorkoutStat;
use super::{Database, format_ts, read_json, read_ts};
use crate::error::Result;

impl Database {
    pub fn get_stat(&self, option_id: i64) -> Result<Option<WorkoutStat>> {
        let stat = self
            .conn
            .query_row(
                "SELECT option_id, workout_name, one_rep_max_history, max_weight_history, frequency,
                        total_volume, total_exercises, total_days, last_updated, best_one_rep_max, best_weight
                 FROM workout_stats WHERE option_id = ?1",
                params![option_id],
                |row| {
                    let best_one_rep_max: Option<String> = row.get(9)?;
                    let best_weight: Option<String> = row.get(10)?;
                    Ok(WorkoutStat {
                        option_id: row.get(0)?,
                        workout_name: row.get(1)?,
                        one_rep_max_history: read_json(row, 2)?,
                        max_weight_history: read_json(row, 3)?,
                        frequency: row.get(4)?,
                        total_volume: row.get(5)?,
                        total_exercises: row.get(6)?,
                        total_days: row.get(7)?,
                        last_updated: read_ts(row, 8)?,
                        best_one_rep_max: parse_optional(best_one_rep_max, 9)?,
                        best_weight: parse_optional(best_weight, 10)?,
                    })
                },
            )
            .optional()?;
        Ok(stat)
    }

    /// Insert or replace the stat row for `stat.option_id`
    pub fn save_stat(&self, stat: &WorkoutStat) -> Result<()> {
        let best_one_rep_max = stat
            .best_one_rep_max
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let best_weight = stat
            .best_weight
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "INSERT INTO workout_stats (option_id, workout_name, one_rep_max_history, max_weight_history,
                 frequency, total_volume, total_exercises, total_days, last_updated, best_one_rep_max, best_weight)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(option_id) DO UPDATE SET
                 workout_name = excluded.workout_name,
                 one_rep_max_history = excluded.one_rep_max_history,
                 max_weight_history = excluded.max_weight_history,
                 frequency = excluded.frequency,
                 total_volume = excluded.total_volume,
                 total_exercises = excluded.total_exercises,
                 total_days = excluded.total_days,
                 last_updated = excluded.last_updated,
                 best_one_rep_max = excluded.best_one_rep_max,
                 best_weight = excluded.best_weight",
            params![
                stat.option_id,
                stat.workout_name,
                serde_json::to_string(&stat.one_rep_max_history)?,
                serde_json::to_string(&stat.max_weight_history)?,
                stat.frequency,
                stat.total_volume,
                stat.total_exercises,
                stat.total_days,
                format_ts(stat.last_updated),
                best_one_rep_max,
                best_weight,
            ],
        )?;
        Ok(())
    }
}

fn parse_optional<T: serde::de::DeserializeOwned>(
    raw: Option<String>,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    raw.map(|s| {
        serde_json::from_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Category, HistoryPoint, PersonalRecord, WorkoutOption};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_stat_round_trips_exactly() {
        let db = Database::open_in_memory().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let option_id = db
            .insert_option(&WorkoutOption {
                id: 0,
                name: "Bench".to_string(),
                category: Category::Chest,
                image_data: None,
                is_barbell: false,
                timer_seconds: 90.0,
                show_timer: true,
                last_updated: at,
            })
            .unwrap();

        let one_rep_max = 200.0 * (1.0 + 5.0 / 30.0);
        let stat = WorkoutStat {
            option_id,
            workout_name: "Bench".to_string(),
            one_rep_max_history: vec![HistoryPoint { date: at, value: one_rep_max }],
            max_weight_history: vec![HistoryPoint { date: at, value: 200.0 }],
            frequency: 1,
            total_volume: 1000.0,
            total_exercises: 1,
            total_days: 1,
            last_updated: at,
            best_one_rep_max: Some(PersonalRecord { date: at, exercise_id: 7, value: one_rep_max }),
            best_weight: None,
        };
        db.save_stat(&stat).unwrap();
        assert_eq!(db.get_stat(option_id).unwrap(), Some(stat.clone()));

        // Upsert replaces in place
        let mut updated = stat;
        updated.frequency = 2;
        db.save_stat(&updated).unwrap();
        assert_eq!(db.get_stat(option_id).unwrap().unwrap().frequency, 2);

        // Cascade with the option
        db.delete_option(option_id).unwrap();
        assert!(db.get_stat(option_id).unwrap().is_none());
    }
}
