//! Training-day cadence over the log

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::db::Exercise;
use crate::error::Result;
use crate::ops::Tracker;

/// How often and how recently something was trained
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingCadence {
    /// Exercises with at least one set
    pub sessions: usize,
    /// Distinct local days with a session
    pub training_days: usize,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
}

impl TrainingCadence {
    pub fn from_exercises(exercises: &[Exercise], tz: &FixedOffset) -> Self {
        let days: Vec<NaiveDate> = exercises
            .iter()
            .filter(|e| !e.sets.is_empty())
            .map(|e| e.local_day(tz))
            .collect();
        let distinct: BTreeSet<NaiveDate> = days.iter().copied().collect();

        Self {
            sessions: days.len(),
            training_days: distinct.len(),
            first_day: distinct.first().copied(),
            last_day: distinct.last().copied(),
        }
    }

    /// Sessions per week across the logged span
    pub fn sessions_per_week(&self) -> f64 {
        let (Some(first), Some(last)) = (self.first_day, self.last_day) else {
            return 0.0;
        };
        if self.sessions < 2 {
            return 0.0;
        }

        let days = (last - first).num_days() as f64;
        if days < 1.0 {
            return self.sessions as f64;
        }

        (self.sessions as f64 / days) * 7.0
    }

    /// Whole days between the last session and `now`
    pub fn days_since_last(&self, now: DateTime<Utc>, tz: &FixedOffset) -> Option<i64> {
        let today = now.with_timezone(tz).date_naive();
        self.last_day.map(|last| (today - last).num_days())
    }
}

impl Tracker {
    /// Cadence for one option, or for the whole log when `option_id` is `None`
    pub fn cadence(&self, option_id: Option<i64>) -> Result<TrainingCadence> {
        let exercises = match option_id {
            Some(id) => {
                self.db.require_option(id)?;
                self.db.exercises_for_option(id)?
            }
            None => self.db.all_exercises()?,
        };
        Ok(TrainingCadence::from_exercises(&exercises, &self.tz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ExerciseSet;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn session(id: i64, date: DateTime<Utc>, with_set: bool) -> Exercise {
        let sets = if with_set {
            vec![ExerciseSet { id, exercise_id: id, reps: 5, weight: 100.0, order_index: 0 }]
        } else {
            vec![]
        };
        Exercise {
            id,
            name: "Row".to_string(),
            date,
            option_id: None,
            option_name: None,
            monthly_id: None,
            sets,
        }
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 29, 12, 0, 0).unwrap() - chrono::Duration::days(days)
    }

    #[test]
    fn test_cadence_empty() {
        let cadence = TrainingCadence::from_exercises(&[], &utc());
        assert_eq!(cadence.sessions, 0);
        assert_eq!(cadence.sessions_per_week(), 0.0);
        assert!(cadence.days_since_last(days_ago(0), &utc()).is_none());
    }

    #[test]
    fn test_cadence_single_session() {
        let cadence = TrainingCadence::from_exercises(&[session(1, days_ago(3), true)], &utc());
        assert_eq!(cadence.sessions_per_week(), 0.0);
        assert_eq!(cadence.days_since_last(days_ago(0), &utc()), Some(3));
    }

    #[test]
    fn test_cadence_same_day() {
        let exercises = vec![session(1, days_ago(0), true), session(2, days_ago(0), true)];
        let cadence = TrainingCadence::from_exercises(&exercises, &utc());
        assert_eq!(cadence.training_days, 1);
        assert_eq!(cadence.sessions_per_week(), 2.0);
    }

    #[test]
    fn test_cadence_over_week() {
        let exercises = vec![session(1, days_ago(7), true), session(2, days_ago(0), true)];
        let cadence = TrainingCadence::from_exercises(&exercises, &utc());
        assert!((cadence.sessions_per_week() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_cadence_ignores_empty_sessions() {
        let exercises = vec![session(1, days_ago(7), false), session(2, days_ago(0), true)];
        let cadence = TrainingCadence::from_exercises(&exercises, &utc());
        assert_eq!(cadence.sessions, 1);
        assert_eq!(cadence.first_day, cadence.last_day);
    }

    #[test]
    fn test_cadence_uses_local_calendar() {
        // 23:30 UTC is already the next day at UTC+3
        let late = Utc.with_ymd_and_hms(2026, 3, 1, 23, 30, 0).unwrap();
        let cadence =
            TrainingCadence::from_exercises(&[session(1, late, true)], &FixedOffset::east_opt(3 * 3600).unwrap());
        assert_eq!(cadence.last_day, NaiveDate::from_ymd_opt(2026, 3, 2));
    }
}
