//! One-rep-max progression trend using linear regression (linfa)

use chrono::{DateTime, Utc};
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};

use crate::db::HistoryPoint;

/// Minimum history points required for a fit
const MIN_DATA_POINTS: usize = 3;

/// Least-squares line through a stat history
#[derive(Debug, Clone)]
pub struct ProgressTrend {
    slope: f64,
    intercept: f64,
    r2_score: f64,
    data_points: usize,
    first_date: DateTime<Utc>,
}

impl ProgressTrend {
    /// Fit value against days since the first point
    pub fn fit(history: &[HistoryPoint]) -> Option<Self> {
        if history.len() < MIN_DATA_POINTS {
            return None;
        }

        let first_date = history.iter().map(|p| p.date).min()?;

        let x_data: Vec<f64> = history
            .iter()
            .map(|p| (p.date - first_date).num_days() as f64)
            .collect();
        let y_data: Vec<f64> = history.iter().map(|p| p.value).collect();

        // Everything on one day has no slope to speak of
        if x_data.iter().all(|x| *x == x_data[0]) {
            return None;
        }

        let n_samples = x_data.len();
        let records = Array2::from_shape_vec((n_samples, 1), x_data).ok()?;
        let targets = Array1::from_vec(y_data);
        let dataset = Dataset::new(records, targets);

        let model = LinearRegression::default().fit(&dataset).ok()?;

        let slope = model.params()[0];
        let intercept = model.intercept();

        let predictions = model.predict(&dataset);
        let r2_score = predictions.r2(&dataset).unwrap_or(0.0);

        Some(Self {
            slope,
            intercept,
            r2_score,
            data_points: n_samples,
            first_date,
        })
    }

    /// Predicted value `days_ahead` days after `now`
    pub fn predict(&self, now: DateTime<Utc>, days_ahead: i64) -> f64 {
        let days_from_start = (now - self.first_date).num_days() as f64;
        self.slope * (days_from_start + days_ahead as f64) + self.intercept
    }

    /// Change in value per day
    pub fn daily_progress(&self) -> f64 {
        self.slope
    }

    pub fn r2_score(&self) -> f64 {
        self.r2_score
    }

    pub fn data_points(&self) -> usize {
        self.data_points
    }
}
