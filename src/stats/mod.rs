//! Stat aggregation - cached per-option history, volume and personal records
//!
//! Every option owns one `WorkoutStat`. Mutations only advance the option's
//! `last_updated` watermark; the stat is rebuilt in full the next time it is read
//! and the option is newer than the stat.

pub mod cadence;
pub mod records;
pub mod trend;

pub use cadence::TrainingCadence;
pub use records::{RecordTracker, one_rep_max};
pub use trend::ProgressTrend;

use std::collections::HashSet;

use chrono::FixedOffset;
use tracing::debug;

use crate::db::{Database, Exercise, HistoryPoint, WorkoutOption, WorkoutStat};
use crate::error::Result;
use crate::ops::Tracker;

/// Full recompute of one option's stat from its exercises
pub struct StatAggregator {
    exercises: Vec<Exercise>,
    tz: FixedOffset,
}

impl StatAggregator {
    pub fn new(exercises: Vec<Exercise>, tz: FixedOffset) -> Self {
        Self { exercises, tz }
    }

    pub fn compute(&self, option: &WorkoutOption) -> WorkoutStat {
        // Exercises without sets do not count anywhere
        let mut exercises: Vec<&Exercise> =
            self.exercises.iter().filter(|e| !e.sets.is_empty()).collect();
        exercises.sort_by_key(|e| e.date);

        let mut one_rep_max_history = Vec::new();
        let mut max_weight_history = Vec::new();
        let mut best_one_rep_max = RecordTracker::new();
        let mut best_weight = RecordTracker::new();

        for exercise in &exercises {
            let daily_one_rep_max = exercise.one_rep_max();
            let daily_max_weight = exercise.max_weight();

            if daily_one_rep_max > 0.0 {
                one_rep_max_history.push(HistoryPoint {
                    date: exercise.date,
                    value: daily_one_rep_max,
                });
                best_one_rep_max.offer(exercise.date, exercise.id, daily_one_rep_max);
            }
            if daily_max_weight > 0.0 {
                max_weight_history.push(HistoryPoint {
                    date: exercise.date,
                    value: daily_max_weight,
                });
                best_weight.offer(exercise.date, exercise.id, daily_max_weight);
            }
        }

        let total_volume = exercises.iter().map(|e| e.volume()).sum();
        let total_days = exercises
            .iter()
            .map(|e| e.local_day(&self.tz))
            .collect::<HashSet<_>>()
            .len();

        WorkoutStat {
            option_id: option.id,
            workout_name: option.name.clone(),
            one_rep_max_history,
            max_weight_history,
            frequency: exercises.len() as u32,
            total_volume,
            total_exercises: exercises.len() as u32,
            total_days: total_days as u32,
            last_updated: option.last_updated,
            best_one_rep_max: best_one_rep_max.best(),
            best_weight: best_weight.best(),
        }
    }
}

impl Tracker {
    /// Return the option's stat, recomputing it first if the option changed since
    pub fn refresh_stat(&self, option_id: i64) -> Result<WorkoutStat> {
        self.db.transaction(|db| {
            let option = db.require_option(option_id)?;
            if let Some(stat) = db.get_stat(option_id)?
                && !stat.is_stale(&option)
            {
                return Ok(stat);
            }
            self.recompute_stat(db, &option)
        })
    }

    /// Refresh every option's stat, ordered by option name
    pub fn refresh_all_stats(&self) -> Result<Vec<WorkoutStat>> {
        let mut stats = Vec::new();
        for option in self.db.list_options()? {
            stats.push(self.refresh_stat(option.id)?);
        }
        Ok(stats)
    }

    pub(crate) fn recompute_stat(&self, db: &Database, option: &WorkoutOption) -> Result<WorkoutStat> {
        let exercises = db.exercises_for_option(option.id)?;
        debug!(
            "Recomputing stat for '{}' from {} exercises",
            option.name,
            exercises.len()
        );
        let stat = StatAggregator::new(exercises, self.tz).compute(option);
        db.save_stat(&stat)?;
        Ok(stat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Category, ExerciseSet};
    use crate::ops::{NewOption, SetInput};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    fn tracker() -> Tracker {
        Tracker::new(Database::open_in_memory().unwrap(), FixedOffset::east_opt(0).unwrap())
    }

    fn exercise(id: i64, day: u32, sets: &[(u32, f64)]) -> Exercise {
        Exercise {
            id,
            name: "Bench".to_string(),
            date: at(day),
            option_id: Some(1),
            option_name: Some("Bench".to_string()),
            monthly_id: None,
            sets: sets
                .iter()
                .enumerate()
                .map(|(i, (reps, weight))| ExerciseSet {
                    id: id * 100 + i as i64,
                    exercise_id: id,
                    reps: *reps,
                    weight: *weight,
                    order_index: i as u32,
                })
                .collect(),
        }
    }

    fn option() -> WorkoutOption {
        WorkoutOption {
            id: 1,
            name: "Bench".to_string(),
            category: Category::Chest,
            image_data: None,
            is_barbell: true,
            timer_seconds: 90.0,
            show_timer: true,
            last_updated: at(20),
        }
    }

    #[test]
    fn test_compute_empty() {
        let stat = StatAggregator::new(vec![], FixedOffset::east_opt(0).unwrap()).compute(&option());
        assert!(stat.one_rep_max_history.is_empty());
        assert!(stat.max_weight_history.is_empty());
        assert_eq!(stat.frequency, 0);
        assert_eq!(stat.total_volume, 0.0);
        assert!(stat.best_one_rep_max.is_none());
        assert!(stat.best_weight.is_none());
        assert_eq!(stat.last_updated, at(20));
    }

    #[test]
    fn test_compute_skips_empty_exercises() {
        let exercises = vec![exercise(1, 1, &[]), exercise(2, 2, &[(5, 100.0)])];
        let stat = StatAggregator::new(exercises, FixedOffset::east_opt(0).unwrap()).compute(&option());
        assert_eq!(stat.frequency, 1);
        assert_eq!(stat.total_exercises, 1);
        assert_eq!(stat.one_rep_max_history.len(), 1);
    }

    #[test]
    fn test_compute_sorts_by_date_and_tracks_records() {
        let exercises = vec![
            exercise(3, 10, &[(5, 220.0)]),
            exercise(1, 1, &[(5, 200.0)]),
            exercise(2, 5, &[(1, 190.0)]),
        ];
        let stat = StatAggregator::new(exercises, FixedOffset::east_opt(0).unwrap()).compute(&option());

        let dates: Vec<_> = stat.max_weight_history.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![at(1), at(5), at(10)]);
        assert_eq!(stat.best_weight.unwrap().exercise_id, 3);
        assert_eq!(stat.best_weight.unwrap().value, 220.0);
        assert_eq!(stat.best_one_rep_max.unwrap().exercise_id, 3);
        assert_eq!(stat.total_days, 3);
    }

    #[test]
    fn test_zero_weight_sets_count_but_do_not_chart() {
        // Bodyweight work: frequency and days count, histories stay empty
        let exercises = vec![exercise(1, 1, &[(20, 0.0)])];
        let stat = StatAggregator::new(exercises, FixedOffset::east_opt(0).unwrap()).compute(&option());
        assert_eq!(stat.frequency, 1);
        assert!(stat.max_weight_history.is_empty());
        assert!(stat.one_rep_max_history.is_empty());
        assert!(stat.best_weight.is_none());
    }

    #[test]
    fn test_scenario_single_set() {
        let tracker = tracker();
        let bench = tracker
            .create_option(NewOption::new("Bench", Category::Chest), at(1))
            .unwrap();
        let ex = tracker.create_exercise(bench.id, at(1), at(1)).unwrap();
        tracker
            .add_set(ex.id, SetInput { reps: 5, weight: 200.0 }, at(1))
            .unwrap();

        let stat = tracker.refresh_stat(bench.id).unwrap();
        assert_eq!(stat.frequency, 1);
        assert_eq!(stat.total_volume, 1000.0);
        let best = stat.best_one_rep_max.unwrap();
        assert!((best.value - 233.333).abs() < 0.01);
        assert_eq!(best.exercise_id, ex.id);
        assert_eq!(stat.best_weight.unwrap().value, 200.0);
    }

    #[test]
    fn test_scenario_second_set() {
        let tracker = tracker();
        let bench = tracker
            .create_option(NewOption::new("Bench", Category::Chest), at(1))
            .unwrap();
        let ex = tracker.create_exercise(bench.id, at(1), at(1)).unwrap();
        tracker.add_set(ex.id, SetInput { reps: 5, weight: 200.0 }, at(1)).unwrap();
        tracker.add_set(ex.id, SetInput { reps: 10, weight: 180.0 }, at(1)).unwrap();

        let stat = tracker.refresh_stat(bench.id).unwrap();
        assert_eq!(stat.total_volume, 2800.0);
        assert_eq!(stat.best_weight.unwrap().value, 200.0);
        // Daily 1RM is the best set of the day: 180 x 10 estimates 240
        let best = stat.best_one_rep_max.unwrap().value;
        assert!((best - 240.0).abs() < 1e-9);
        assert_eq!(stat.one_rep_max_history.len(), 1);
    }

    #[test]
    fn test_scenario_duplicate_and_retype() {
        let tracker = tracker();
        let bench = tracker
            .create_option(NewOption::new("Bench", Category::Chest), at(1))
            .unwrap();
        let incline = tracker
            .create_option(NewOption::new("Incline Bench", Category::Chest), at(1))
            .unwrap();
        let ex = tracker.create_exercise(bench.id, at(1), at(1)).unwrap();
        tracker.add_set(ex.id, SetInput { reps: 5, weight: 200.0 }, at(1)).unwrap();
        tracker.add_set(ex.id, SetInput { reps: 10, weight: 180.0 }, at(1)).unwrap();

        let copy = tracker.duplicate_exercise(ex.id, at(2)).unwrap();
        assert_eq!(copy.date, at(2));
        assert_eq!(
            copy.sets.iter().map(|s| s.order_index).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert_eq!(tracker.refresh_stat(bench.id).unwrap().frequency, 2);

        let bench_before = tracker.database().require_option(bench.id).unwrap().last_updated;
        let incline_before = tracker.database().require_option(incline.id).unwrap().last_updated;
        tracker.retype_exercise(ex.id, incline.id, at(3)).unwrap();
        assert!(tracker.database().require_option(bench.id).unwrap().last_updated > bench_before);
        assert!(
            tracker.database().require_option(incline.id).unwrap().last_updated > incline_before
        );

        assert_eq!(tracker.refresh_stat(bench.id).unwrap().frequency, 1);
        assert_eq!(tracker.refresh_stat(incline.id).unwrap().frequency, 1);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let tracker = tracker();
        let bench = tracker
            .create_option(NewOption::new("Bench", Category::Chest), at(1))
            .unwrap();
        let ex = tracker.create_exercise(bench.id, at(1), at(1)).unwrap();
        tracker.add_set(ex.id, SetInput { reps: 7, weight: 187.3 }, at(1)).unwrap();

        let first = tracker.refresh_stat(bench.id).unwrap();
        let second = tracker.refresh_stat(bench.id).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_staleness_round_trip() {
        let tracker = tracker();
        let bench = tracker
            .create_option(NewOption::new("Bench", Category::Chest), at(1))
            .unwrap();
        let db = tracker.database();

        // Fresh right after creation
        let stat = db.get_stat(bench.id).unwrap().unwrap();
        assert!(!stat.is_stale(&db.require_option(bench.id).unwrap()));

        // Same clock reading as the creation still marks it dirty
        let ex = tracker.create_exercise(bench.id, at(1), at(1)).unwrap();
        let option = db.require_option(bench.id).unwrap();
        let stat = db.get_stat(bench.id).unwrap().unwrap();
        assert!(option.last_updated > stat.last_updated);

        let stat = tracker.refresh_stat(bench.id).unwrap();
        assert_eq!(stat.last_updated, db.require_option(bench.id).unwrap().last_updated);

        tracker.add_set(ex.id, SetInput { reps: 5, weight: 100.0 }, at(1)).unwrap();
        assert!(db.get_stat(bench.id).unwrap().unwrap().is_stale(&db.require_option(bench.id).unwrap()));
        tracker.refresh_stat(bench.id).unwrap();
        assert!(!db.get_stat(bench.id).unwrap().unwrap().is_stale(&db.require_option(bench.id).unwrap()));
    }

    #[test]
    fn test_volume_additivity() {
        let tracker = tracker();
        let squat = tracker
            .create_option(NewOption::new("Squat", Category::Legs), at(1))
            .unwrap();
        let ex = tracker.create_exercise(squat.id, at(1), at(1)).unwrap();
        tracker.add_set(ex.id, SetInput { reps: 3, weight: 315.0 }, at(1)).unwrap();
        let before = tracker.refresh_stat(squat.id).unwrap().total_volume;

        tracker.add_set(ex.id, SetInput { reps: 5, weight: 100.0 }, at(1)).unwrap();
        let after = tracker.refresh_stat(squat.id).unwrap().total_volume;
        assert_eq!(after - before, 500.0);
    }

    #[test]
    fn test_refresh_backfills_missing_stat() {
        let tracker = tracker();
        let db = tracker.database();
        let option_id = db
            .insert_option(&WorkoutOption { id: 0, ..option() })
            .unwrap();
        assert!(db.get_stat(option_id).unwrap().is_none());

        let stat = tracker.refresh_stat(option_id).unwrap();
        assert_eq!(stat.frequency, 0);
        assert!(db.get_stat(option_id).unwrap().is_some());
    }

    #[test]
    fn test_rename_refreshes_cached_name() {
        let tracker = tracker();
        let bench = tracker
            .create_option(NewOption::new("Bench", Category::Chest), at(1))
            .unwrap();
        tracker
            .update_option(
                bench.id,
                crate::ops::OptionUpdate {
                    name: Some("Flat Bench".to_string()),
                    ..Default::default()
                },
                at(1) + Duration::minutes(1),
            )
            .unwrap();
        assert_eq!(tracker.refresh_stat(bench.id).unwrap().workout_name, "Flat Bench");
    }
}
