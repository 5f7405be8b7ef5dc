//! One-rep-max estimate and personal record tracking

use chrono::{DateTime, Utc};

use crate::db::PersonalRecord;

/// Estimated one-rep max: `weight * (1 + reps / 30)`
pub fn one_rep_max(reps: u32, weight: f64) -> f64 {
    weight * (1.0 + reps as f64 / 30.0)
}

/// Running all-time best of one metric
///
/// Only a strictly greater, positive value replaces the current record, so the
/// first entry seen in date order keeps a tie.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordTracker {
    best: Option<PersonalRecord>,
}

impl RecordTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a value; returns true if it became the new record
    pub fn offer(&mut self, date: DateTime<Utc>, exercise_id: i64, value: f64) -> bool {
        let current = self.best.map(|r| r.value).unwrap_or(0.0);
        if value > current {
            self.best = Some(PersonalRecord { date, exercise_id, value });
            true
        } else {
            false
        }
    }

    pub fn best(&self) -> Option<PersonalRecord> {
        self.best
    }
}
