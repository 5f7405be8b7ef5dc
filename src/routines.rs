//! Routines - ordered option templates that log a whole workout at once

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::db::models::{move_item, synchronize_indices};
use crate::db::{Database, Exercise, RoutineItem, WorkoutRoutine};
use crate::error::{Result, TrackerError};
use crate::ops::Tracker;

pub const DEFAULT_ROUTINE_COLOR: &str = "#10B981";

/// Routine item that produced no exercise, and why
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    pub item_id: i64,
    pub reason: String,
}

/// Result of expanding a routine; created exercises are never rolled back
#[derive(Debug, Clone, Default)]
pub struct ExpansionReport {
    pub created: Vec<Exercise>,
    pub skipped: Vec<SkippedItem>,
}

fn validate_color(hex: &str) -> Result<String> {
    let hex = hex.trim();
    let digits = hex.strip_prefix('#').unwrap_or("");
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TrackerError::InvalidInput(format!("color '{}'", hex)));
    }
    Ok(format!("#{}", digits.to_ascii_uppercase()))
}

impl Tracker {
    pub fn create_routine(
        &self,
        name: &str,
        color_hex: Option<&str>,
        option_ids: &[i64],
    ) -> Result<WorkoutRoutine> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyName);
        }
        let color = validate_color(color_hex.unwrap_or(DEFAULT_ROUTINE_COLOR))?;

        self.db.transaction(|db| {
            let routine_id = db.insert_routine(name, &color)?;
            for (index, option_id) in option_ids.iter().enumerate() {
                db.require_option(*option_id)?;
                db.insert_routine_item(routine_id, *option_id, index as u32)?;
            }
            db.require_routine(routine_id)
        })
    }

    pub fn add_routine_item(&self, routine_id: i64, option_id: i64) -> Result<WorkoutRoutine> {
        self.db.transaction(|db| {
            let routine = db.require_routine(routine_id)?;
            db.require_option(option_id)?;
            let next_index = routine
                .items
                .iter()
                .map(|i| i.order_index + 1)
                .max()
                .unwrap_or(0);
            db.insert_routine_item(routine_id, option_id, next_index)?;
            db.require_routine(routine_id)
        })
    }

    pub fn remove_routine_item(&self, routine_id: i64, index: usize) -> Result<WorkoutRoutine> {
        self.db.transaction(|db| {
            let mut items = db.require_routine(routine_id)?.items;
            if index >= items.len() {
                return Err(TrackerError::IndexOutOfRange { index, len: items.len() });
            }
            let removed = items.remove(index);
            db.delete_routine_item(removed.id)?;
            synchronize_indices(&mut items);
            persist_item_order(db, &items)?;
            db.require_routine(routine_id)
        })
    }

    pub fn move_routine_item(&self, routine_id: i64, from: usize, to: usize) -> Result<WorkoutRoutine> {
        self.db.transaction(|db| {
            let mut items = db.require_routine(routine_id)?.items;
            move_item(&mut items, from, to)?;
            persist_item_order(db, &items)?;
            db.require_routine(routine_id)
        })
    }

    pub fn delete_routine(&self, routine_id: i64) -> Result<()> {
        if !self.db.delete_routine(routine_id)? {
            return Err(TrackerError::not_found("routine", routine_id));
        }
        Ok(())
    }

    /// Most used first
    pub fn routines_ranked(&self) -> Result<Vec<WorkoutRoutine>> {
        self.db.list_routines()
    }

    /// Log one new exercise per routine item, in routine order, dated `now`
    pub fn expand_routine(&self, routine_id: i64, now: DateTime<Utc>) -> Result<ExpansionReport> {
        let routine = self.db.require_routine(routine_id)?;
        self.db.bump_click_frequency(routine_id)?;

        let mut report = ExpansionReport::default();
        for item in &routine.items {
            let Some(option_id) = item.option_id else {
                warn!("Routine '{}': item {} has no option, skipped", routine.name, item.id);
                report.skipped.push(SkippedItem {
                    item_id: item.id,
                    reason: "option was deleted".to_string(),
                });
                continue;
            };

            match self.create_exercise(option_id, now, now) {
                Ok(exercise) => report.created.push(exercise),
                Err(e) => {
                    warn!("Routine '{}': item {} failed: {}", routine.name, item.id, e);
                    report.skipped.push(SkippedItem {
                        item_id: item.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Started routine '{}': {} exercises, {} skipped",
            routine.name,
            report.created.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}

fn persist_item_order(db: &Database, items: &[RoutineItem]) -> Result<()> {
    for item in items {
        db.update_routine_item_order(item.id, item.order_index)?;
    }
    Ok(())
}
