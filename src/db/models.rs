//! Persisted entities and their derived values

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::stats::records::one_rep_max;

/// Body-part category of a workout option
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Core,
    Cardio,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Chest => "chest",
            Category::Back => "back",
            Category::Legs => "legs",
            Category::Shoulders => "shoulders",
            Category::Arms => "arms",
            Category::Core => "core",
            Category::Cardio => "cardio",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Chest => "Chest",
            Category::Back => "Back",
            Category::Legs => "Legs",
            Category::Shoulders => "Shoulders",
            Category::Arms => "Arms",
            Category::Core => "Core",
            Category::Cardio => "Cardio",
        }
    }

    /// All categories for iteration
    pub fn all() -> &'static [Category] {
        &[
            Category::Chest,
            Category::Back,
            Category::Legs,
            Category::Shoulders,
            Category::Arms,
            Category::Core,
            Category::Cardio,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TrackerError::InvalidInput(format!("unknown category '{}'", s)))
    }
}

/// A named exercise type that logged sessions point at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutOption {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub image_data: Option<Vec<u8>>,
    pub is_barbell: bool,
    pub timer_seconds: f64,
    pub show_timer: bool,
    pub last_updated: DateTime<Utc>,
}

/// One performed set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub id: i64,
    pub exercise_id: i64,
    pub reps: u32,
    pub weight: f64,
    pub order_index: u32,
}

impl ExerciseSet {
    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }

    pub fn one_rep_max(&self) -> f64 {
        one_rep_max(self.reps, self.weight)
    }
}

/// One logged session of an option on a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    /// Name copied from the option; shown only when the option is gone
    pub name: String,
    pub date: DateTime<Utc>,
    pub option_id: Option<i64>,
    /// Live name of the referenced option, if any
    pub option_name: Option<String>,
    pub monthly_id: Option<i64>,
    /// Sets in `order_index` order
    pub sets: Vec<ExerciseSet>,
}

impl Exercise {
    pub fn display_name(&self) -> &str {
        self.option_name.as_deref().unwrap_or(&self.name)
    }

    pub fn total_sets(&self) -> usize {
        self.sets.len()
    }

    pub fn max_weight(&self) -> f64 {
        self.sets.iter().map(|s| s.weight).fold(0.0, f64::max)
    }

    pub fn one_rep_max(&self) -> f64 {
        self.sets.iter().map(ExerciseSet::one_rep_max).fold(0.0, f64::max)
    }

    pub fn volume(&self) -> f64 {
        self.sets.iter().map(ExerciseSet::volume).sum()
    }

    pub fn local_day(&self, tz: &FixedOffset) -> NaiveDate {
        self.date.with_timezone(tz).date_naive()
    }
}

/// Dated value in a stat history series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

/// Best-ever value of a tracked metric and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub date: DateTime<Utc>,
    pub exercise_id: i64,
    pub value: f64,
}

/// Cached aggregate for one workout option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStat {
    pub option_id: i64,
    pub workout_name: String,
    pub one_rep_max_history: Vec<HistoryPoint>,
    pub max_weight_history: Vec<HistoryPoint>,
    pub frequency: u32,
    pub total_volume: f64,
    pub total_exercises: u32,
    pub total_days: u32,
    /// Option watermark this aggregate reflects
    pub last_updated: DateTime<Utc>,
    pub best_one_rep_max: Option<PersonalRecord>,
    pub best_weight: Option<PersonalRecord>,
}

impl WorkoutStat {
    pub fn is_stale(&self, option: &WorkoutOption) -> bool {
        option.last_updated > self.last_updated
    }
}

/// Calendar month bucket with its exercises loaded
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyWorkout {
    pub id: i64,
    pub year: i32,
    pub month: u32,
    pub exercises: Vec<Exercise>,
}

impl MonthlyWorkout {
    /// e.g. "March 2026"
    pub fn display_name(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => first.format("%B %Y").to_string(),
            None => format!("{}/{}", self.month, self.year),
        }
    }

    pub fn id_string(&self) -> String {
        format!("{}-{}", self.year, self.month)
    }

    pub fn total_exercises(&self) -> usize {
        self.exercises.len()
    }

    pub fn total_volume(&self) -> f64 {
        self.exercises.iter().map(Exercise::volume).sum()
    }

    /// Distinct local days with at least one exercise
    pub fn total_days(&self, tz: &FixedOffset) -> usize {
        self.exercises
            .iter()
            .map(|e| e.local_day(tz))
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn exercises_on(&self, day: NaiveDate, tz: &FixedOffset) -> Vec<&Exercise> {
        self.exercises.iter().filter(|e| e.local_day(tz) == day).collect()
    }
}

/// Option slot inside a routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineItem {
    pub id: i64,
    pub routine_id: i64,
    pub option_id: Option<i64>,
    pub order_index: u32,
}

/// Named, ordered template of options for batch logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRoutine {
    pub id: i64,
    pub name: String,
    pub color_hex: String,
    pub click_frequency: u32,
    /// Items in `order_index` order
    pub items: Vec<RoutineItem>,
}

/// Anything kept in a contiguous 0-based display order
pub trait Ordered {
    fn order_index(&self) -> u32;
    fn set_order_index(&mut self, index: u32);
}

impl Ordered for ExerciseSet {
    fn order_index(&self) -> u32 {
        self.order_index
    }

    fn set_order_index(&mut self, index: u32) {
        self.order_index = index;
    }
}

impl Ordered for RoutineItem {
    fn order_index(&self) -> u32 {
        self.order_index
    }

    fn set_order_index(&mut self, index: u32) {
        self.order_index = index;
    }
}

/// Stable-sort by current index, then renumber 0..n-1
pub fn synchronize_indices<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(|item| item.order_index());
    for (index, item) in items.iter_mut().enumerate() {
        item.set_order_index(index as u32);
    }
}

/// Move the element at position `from` to position `to`, then renumber
pub fn move_item<T: Ordered>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), TrackerError> {
    let len = items.len();
    if from >= len {
        return Err(TrackerError::IndexOutOfRange { index: from, len });
    }
    if to >= len {
        return Err(TrackerError::IndexOutOfRange { index: to, len });
    }
    items.sort_by_key(|item| item.order_index());
    let item = items.remove(from);
    items.insert(to, item);
    for (index, item) in items.iter_mut().enumerate() {
        item.set_order_index(index as u32);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn set(id: i64, reps: u32, weight: f64, order_index: u32) -> ExerciseSet {
        ExerciseSet { id, exercise_id: 1, reps, weight, order_index }
    }

    fn exercise(sets: Vec<ExerciseSet>) -> Exercise {
        Exercise {
            id: 1,
            name: "Bench".to_string(),
            date: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            option_id: None,
            option_name: None,
            monthly_id: None,
            sets,
        }
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!("Chest".parse::<Category>().unwrap(), Category::Chest);
        assert_eq!(" legs ".parse::<Category>().unwrap(), Category::Legs);
        assert!("neck".parse::<Category>().is_err());
    }

    #[test]
    fn test_exercise_derived_values() {
        let ex = exercise(vec![set(1, 5, 200.0, 0), set(2, 10, 180.0, 1)]);
        assert_eq!(ex.total_sets(), 2);
        assert_eq!(ex.max_weight(), 200.0);
        assert_eq!(ex.volume(), 2800.0);
        // 180 * (1 + 10/30) = 240 beats 200 * (1 + 5/30)
        assert!((ex.one_rep_max() - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_exercise_derived_values() {
        let ex = exercise(vec![]);
        assert_eq!(ex.max_weight(), 0.0);
        assert_eq!(ex.one_rep_max(), 0.0);
        assert_eq!(ex.volume(), 0.0);
    }

    #[test]
    fn test_display_name_prefers_live_option() {
        let mut ex = exercise(vec![]);
        assert_eq!(ex.display_name(), "Bench");
        ex.option_name = Some("Bench Press".to_string());
        assert_eq!(ex.display_name(), "Bench Press");
    }

    #[test]
    fn test_synchronize_closes_gaps() {
        let mut sets = vec![set(1, 5, 100.0, 4), set(2, 5, 100.0, 0), set(3, 5, 100.0, 2)];
        synchronize_indices(&mut sets);
        let ids: Vec<i64> = sets.iter().map(|s| s.id).collect();
        let indices: Vec<u32> = sets.iter().map(|s| s.order_index).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_move_item_forward_and_back() {
        let mut sets = vec![set(1, 1, 1.0, 0), set(2, 1, 1.0, 1), set(3, 1, 1.0, 2)];
        move_item(&mut sets, 0, 2).unwrap();
        assert_eq!(sets.iter().map(|s| s.id).collect::<Vec<_>>(), vec![2, 3, 1]);
        move_item(&mut sets, 2, 0).unwrap();
        assert_eq!(sets.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(sets.iter().map(|s| s.order_index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_move_item_out_of_range() {
        let mut sets = vec![set(1, 1, 1.0, 0)];
        assert!(matches!(
            move_item(&mut sets, 0, 3),
            Err(TrackerError::IndexOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn test_month_display() {
        let month = MonthlyWorkout { id: 1, year: 2026, month: 3, exercises: vec![] };
        assert_eq!(month.display_name(), "March 2026");
        assert_eq!(month.id_string(), "2026-3");
    }
}
