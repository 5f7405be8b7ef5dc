//! Monthly index - one bucket per calendar month holding that month's exercises

use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use tracing::{debug, info};

use crate::db::{Database, Exercise, MonthlyWorkout};
use crate::error::Result;
use crate::ops::Tracker;

/// Calendar (year, month) of an instant in `tz`
pub fn month_of(date: DateTime<Utc>, tz: &FixedOffset) -> (i32, u32) {
    let local = date.with_timezone(tz);
    (local.year(), local.month())
}

/// Put a freshly created exercise into its month bucket
pub(crate) fn assign(
    db: &Database,
    exercise_id: i64,
    date: DateTime<Utc>,
    tz: &FixedOffset,
) -> Result<i64> {
    let (year, month) = month_of(date, tz);
    let monthly_id = db.find_or_create_month(year, month)?;
    db.set_exercise_month(exercise_id, monthly_id)?;
    debug!("Exercise {} assigned to {}-{}", exercise_id, year, month);
    Ok(monthly_id)
}

/// Outcome of a backfill pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub assigned: usize,
    pub buckets_created: usize,
}

impl Tracker {
    /// Give every exercise without a bucket its bucket; safe to run any time
    pub fn backfill_missing_months(&self) -> Result<BackfillReport> {
        let report = self.db.transaction(|db| {
            let orphans = db.exercises_without_month()?;
            let mut report = BackfillReport::default();
            let mut buckets: HashMap<(i32, u32), i64> = HashMap::new();

            for (exercise_id, date) in orphans {
                let key = month_of(date, &self.tz);
                let monthly_id = match buckets.get(&key) {
                    Some(id) => *id,
                    None => {
                        let id = match db.find_month(key.0, key.1)? {
                            Some(id) => id,
                            None => {
                                report.buckets_created += 1;
                                db.find_or_create_month(key.0, key.1)?
                            }
                        };
                        buckets.insert(key, id);
                        id
                    }
                };
                db.set_exercise_month(exercise_id, monthly_id)?;
                report.assigned += 1;
            }
            Ok(report)
        })?;

        if report.assigned > 0 {
            info!(
                "Backfilled {} exercises into months ({} new buckets)",
                report.assigned, report.buckets_created
            );
        }
        Ok(report)
    }

    /// Bucket for (year, month) with its exercises, if one exists
    pub fn monthly_bucket(&self, year: i32, month: u32) -> Result<Option<MonthlyWorkout>> {
        match self.db.find_month(year, month)? {
            Some(id) => Ok(Some(MonthlyWorkout {
                id,
                year,
                month,
                exercises: self.db.exercises_in_month(id)?,
            })),
            None => Ok(None),
        }
    }

    /// All buckets, newest first; empty buckets are kept
    pub fn months(&self) -> Result<Vec<MonthlyWorkout>> {
        self.db
            .list_months()?
            .into_iter()
            .map(|(id, year, month)| {
                Ok(MonthlyWorkout {
                    id,
                    year,
                    month,
                    exercises: self.db.exercises_in_month(id)?,
                })
            })
            .collect()
    }

    /// Exercises logged on a local calendar day
    ///
    /// Buckets were assigned under the offset in force when each exercise was
    /// logged, so on the first and last day of a month the neighbouring bucket
    /// is searched too.
    pub fn exercises_on_day(&self, day: NaiveDate) -> Result<Vec<Exercise>> {
        let mut months = vec![(day.year(), day.month())];
        for neighbour in [day.pred_opt(), day.succ_opt()].into_iter().flatten() {
            let key = (neighbour.year(), neighbour.month());
            if !months.contains(&key) {
                months.push(key);
            }
        }

        let mut found = Vec::new();
        for (year, month) in months {
            if let Some(bucket) = self.monthly_bucket(year, month)? {
                found.extend(
                    bucket
                        .exercises
                        .into_iter()
                        .filter(|e| e.local_day(&self.tz) == day),
                );
            }
        }
        found.sort_by_key(|e| (e.date, e.id));
        Ok(found)
    }

    pub fn exercises_today(&self, now: DateTime<Utc>) -> Result<Vec<Exercise>> {
        self.exercises_on_day(now.with_timezone(&self.tz).date_naive())
    }
}
