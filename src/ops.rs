//! Mutation operations - the only writers of the workout log
//!
//! Each operation validates its input before touching the store, runs as one
//! transaction, and advances the watermark of every option whose stat it affects.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::info;

use crate::catalog;
use crate::db::models::{move_item, synchronize_indices};
use crate::db::{Category, Database, Exercise, ExerciseSet, WorkoutOption, stamp};
use crate::error::{Result, TrackerError};
use crate::monthly;
use crate::units::WeightEntry;

const DEFAULT_TIMER_SECONDS: f64 = 90.0;

/// Input for a new workout option
#[derive(Debug, Clone)]
pub struct NewOption {
    pub name: String,
    pub category: Category,
    pub is_barbell: bool,
    pub timer_seconds: f64,
    pub show_timer: bool,
    pub image_data: Option<Vec<u8>>,
}

impl NewOption {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            is_barbell: false,
            timer_seconds: DEFAULT_TIMER_SECONDS,
            show_timer: true,
            image_data: None,
        }
    }

    pub fn barbell(mut self, is_barbell: bool) -> Self {
        self.is_barbell = is_barbell;
        self
    }

    pub fn timer(mut self, seconds: f64) -> Self {
        self.timer_seconds = seconds;
        self
    }
}

/// Partial edit of an option; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct OptionUpdate {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub is_barbell: Option<bool>,
    pub timer_seconds: Option<f64>,
    pub show_timer: Option<bool>,
    /// `Some(None)` clears the icon
    pub image_data: Option<Option<Vec<u8>>>,
}

/// One set as entered, weight already canonical
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetInput {
    pub reps: u32,
    pub weight: f64,
}

impl SetInput {
    /// Parse raw text, converting the weight through `entry`
    pub fn parse(reps: &str, weight: &str, entry: &WeightEntry) -> Result<Self> {
        let reps: u32 = reps
            .trim()
            .parse()
            .map_err(|_| TrackerError::InvalidInput(format!("reps '{}'", reps)))?;
        let weight = entry.parse(weight)?;
        Ok(Self { reps, weight })
    }

    /// Parse `REPSxWEIGHT`, e.g. `5x225`
    pub fn parse_pair(raw: &str, entry: &WeightEntry) -> Result<Self> {
        let (reps, weight) = raw
            .split_once(['x', 'X'])
            .ok_or_else(|| TrackerError::InvalidInput(format!("set '{}' should look like 5x225", raw)))?;
        Self::parse(reps, weight, entry)
    }

    fn validate(&self) -> Result<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(TrackerError::InvalidWeight(format!("{}", self.weight)));
        }
        Ok(())
    }
}

fn validate_timer(seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(TrackerError::InvalidInput(format!("timer seconds {}", seconds)));
    }
    Ok(())
}

/// Workout log with its calendar
pub struct Tracker {
    pub(crate) db: Database,
    pub(crate) tz: FixedOffset,
}

impl Tracker {
    pub fn new(db: Database, tz: FixedOffset) -> Self {
        Self { db, tz }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn timezone(&self) -> FixedOffset {
        self.tz
    }

    /// Trimmed name that no other option uses (case-insensitive)
    fn validate_option_name(&self, name: &str, exclude: Option<i64>) -> Result<String> {
        let cleaned = name.trim();
        if cleaned.is_empty() {
            return Err(TrackerError::EmptyName);
        }
        if let Some(existing) = self.db.find_option_by_name(cleaned)?
            && Some(existing.id) != exclude
        {
            return Err(TrackerError::DuplicateName(existing.name));
        }
        Ok(cleaned.to_string())
    }

    pub fn create_option(&self, draft: NewOption, now: DateTime<Utc>) -> Result<WorkoutOption> {
        let name = self.validate_option_name(&draft.name, None)?;
        validate_timer(draft.timer_seconds)?;

        let option = self.db.transaction(|db| {
            let id = db.insert_option(&WorkoutOption {
                id: 0,
                name,
                category: draft.category,
                image_data: draft.image_data,
                is_barbell: draft.is_barbell,
                timer_seconds: draft.timer_seconds,
                show_timer: draft.show_timer,
                last_updated: stamp(now),
            })?;
            let option = db.require_option(id)?;
            self.recompute_stat(db, &option)?;
            Ok(option)
        })?;

        info!("Created option '{}' ({})", option.name, option.category);
        Ok(option)
    }

    pub fn update_option(
        &self,
        id: i64,
        update: OptionUpdate,
        now: DateTime<Utc>,
    ) -> Result<WorkoutOption> {
        let mut option = self.db.require_option(id)?;

        if let Some(name) = update.name {
            option.name = self.validate_option_name(&name, Some(id))?;
        }
        if let Some(seconds) = update.timer_seconds {
            validate_timer(seconds)?;
            option.timer_seconds = seconds;
        }
        if let Some(category) = update.category {
            option.category = category;
        }
        if let Some(is_barbell) = update.is_barbell {
            option.is_barbell = is_barbell;
        }
        if let Some(show_timer) = update.show_timer {
            option.show_timer = show_timer;
        }
        if let Some(image_data) = update.image_data {
            option.image_data = image_data;
        }

        self.db.transaction(|db| {
            db.update_option(&option)?;
            db.touch_option(id, now)?;
            db.require_option(id)
        })
    }

    /// Delete an option; its exercises keep their data under the last known name
    pub fn delete_option(&self, id: i64) -> Result<()> {
        self.db.transaction(|db| {
            let option = db.require_option(id)?;
            let orphaned = db.copy_option_name_to_exercises(id, &option.name)?;
            db.delete_option(id)?;
            info!("Deleted option '{}', {} exercises orphaned", option.name, orphaned);
            Ok(())
        })
    }

    pub fn list_options(&self) -> Result<Vec<WorkoutOption>> {
        self.db.list_options()
    }

    /// Find or create the option for a built-in catalog entry
    pub fn option_from_catalog(&self, entry_id: &str, now: DateTime<Utc>) -> Result<WorkoutOption> {
        let entry = catalog::find_entry(entry_id).ok_or_else(|| {
            TrackerError::InvalidInput(format!("unknown catalog entry '{}'", entry_id))
        })?;
        if let Some(existing) = self.db.find_option_by_name(entry.name)? {
            return Ok(existing);
        }
        self.create_option(
            NewOption::new(entry.name, entry.category).barbell(entry.is_barbell),
            now,
        )
    }

    /// Option by id, or by case-insensitive name when no option has that id
    pub fn find_option(&self, key: &str) -> Result<WorkoutOption> {
        let key = key.trim();
        if let Ok(id) = key.parse::<i64>()
            && let Some(option) = self.db.get_option(id)?
        {
            return Ok(option);
        }
        self.db
            .find_option_by_name(key)?
            .ok_or_else(|| TrackerError::InvalidInput(format!("no option named '{}'", key)))
    }

    pub fn exercise(&self, id: i64) -> Result<Exercise> {
        self.db.require_exercise(id)
    }

    /// Log a new, empty exercise of `option_id` on `date`
    pub fn create_exercise(
        &self,
        option_id: i64,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Exercise> {
        self.db.transaction(|db| {
            let option = db.require_option(option_id)?;
            let id = db.insert_exercise(&option.name, date, Some(option.id))?;
            monthly::assign(db, id, date, &self.tz)?;
            db.touch_option(option.id, now)?;
            db.require_exercise(id)
        })
    }

    /// Log an exercise together with its sets; nothing is kept if any part fails
    pub fn log_exercise(
        &self,
        option_id: i64,
        date: DateTime<Utc>,
        sets: &[SetInput],
        now: DateTime<Utc>,
    ) -> Result<Exercise> {
        for input in sets {
            input.validate()?;
        }
        self.db.transaction(|db| {
            let exercise = self.create_exercise(option_id, date, now)?;
            for input in sets {
                self.add_set(exercise.id, *input, now)?;
            }
            db.require_exercise(exercise.id)
        })
    }

    pub fn delete_exercise(&self, id: i64, now: DateTime<Utc>) -> Result<()> {
        self.db.transaction(|db| {
            let exercise = db.require_exercise(id)?;
            db.delete_exercise(id)?;
            touch_owner(db, &exercise, now)
        })
    }

    /// Point an exercise at a different option
    pub fn retype_exercise(
        &self,
        id: i64,
        new_option_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Exercise> {
        self.db.transaction(|db| {
            let exercise = db.require_exercise(id)?;
            let target = db.require_option(new_option_id)?;
            db.set_exercise_option(id, Some(target.id), &target.name)?;
            touch_owner(db, &exercise, now)?;
            db.touch_option(target.id, now)?;
            db.require_exercise(id)
        })
    }

    /// Copy an exercise and its set values into a new entry dated `now`
    pub fn duplicate_exercise(&self, id: i64, now: DateTime<Utc>) -> Result<Exercise> {
        self.db.transaction(|db| {
            let source = db.require_exercise(id)?;
            let new_id = db.insert_exercise(source.display_name(), now, source.option_id)?;
            for (index, set) in source.sets.iter().enumerate() {
                db.insert_set(new_id, set.reps, set.weight, index as u32)?;
            }
            monthly::assign(db, new_id, now, &self.tz)?;
            touch_owner(db, &source, now)?;
            db.require_exercise(new_id)
        })
    }

    /// Change only the fallback display name; no stat is affected
    pub fn rename_exercise(&self, id: i64, name: &str) -> Result<Exercise> {
        let cleaned = name.trim();
        if cleaned.is_empty() {
            return Err(TrackerError::EmptyName);
        }
        self.db.transaction(|db| {
            db.require_exercise(id)?;
            db.set_exercise_name(id, cleaned)?;
            db.require_exercise(id)
        })
    }

    pub fn add_set(&self, exercise_id: i64, input: SetInput, now: DateTime<Utc>) -> Result<ExerciseSet> {
        input.validate()?;
        self.db.transaction(|db| {
            let exercise = db.require_exercise(exercise_id)?;
            let next_index = exercise
                .sets
                .iter()
                .map(|s| s.order_index + 1)
                .max()
                .unwrap_or(0);
            let set_id = db.insert_set(exercise_id, input.reps, input.weight, next_index)?;
            touch_owner(db, &exercise, now)?;
            db.get_set(set_id)?
                .ok_or_else(|| TrackerError::not_found("set", set_id))
        })
    }

    /// Edit reps/weight in place; order is untouched
    pub fn update_set(&self, set_id: i64, input: SetInput, now: DateTime<Utc>) -> Result<ExerciseSet> {
        input.validate()?;
        self.db.transaction(|db| {
            let set = db
                .get_set(set_id)?
                .ok_or_else(|| TrackerError::not_found("set", set_id))?;
            db.update_set_values(set_id, input.reps, input.weight)?;
            let exercise = db.require_exercise(set.exercise_id)?;
            touch_owner(db, &exercise, now)?;
            db.get_set(set_id)?
                .ok_or_else(|| TrackerError::not_found("set", set_id))
        })
    }

    /// Remove the set at display position `index`; returns the remaining sets
    pub fn delete_set(
        &self,
        exercise_id: i64,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExerciseSet>> {
        self.db.transaction(|db| {
            let exercise = db.require_exercise(exercise_id)?;
            let mut sets = exercise.sets.clone();
            if index >= sets.len() {
                return Err(TrackerError::IndexOutOfRange { index, len: sets.len() });
            }
            let removed = sets.remove(index);
            db.delete_set(removed.id)?;
            synchronize_indices(&mut sets);
            persist_set_order(db, &sets)?;
            touch_owner(db, &exercise, now)?;
            Ok(sets)
        })
    }

    /// Move the set at position `from` to position `to`; returns the new order
    pub fn reorder_sets(
        &self,
        exercise_id: i64,
        from: usize,
        to: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExerciseSet>> {
        self.db.transaction(|db| {
            let exercise = db.require_exercise(exercise_id)?;
            let mut sets = exercise.sets.clone();
            move_item(&mut sets, from, to)?;
            persist_set_order(db, &sets)?;
            touch_owner(db, &exercise, now)?;
            Ok(sets)
        })
    }
}

/// Invalidate the option an exercise belongs to, if it still has one
fn touch_owner(db: &Database, exercise: &Exercise, now: DateTime<Utc>) -> Result<()> {
    if let Some(option_id) = exercise.option_id {
        db.touch_option(option_id, now)?;
    }
    Ok(())
}

fn persist_set_order(db: &Database, sets: &[ExerciseSet]) -> Result<()> {
    for set in sets {
        db.update_set_order(set.id, set.order_index)?;
    }
    Ok(())
}
